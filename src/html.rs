// ABOUTME: Narrow HTML helpers shared by the editor and export pipeline
// ABOUTME: First-heading text, heading colour injection, tag stripping, entities

use regex_lite::Regex;
use std::sync::LazyLock;

pub const HEADING_COLOR: &str = "#2B697A";

// Markup a browser never renders: comments (an unclosed one runs to the end)
// and raw-text or metadata elements.
static INERT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?(?:-->|\z)|<script\b.*?(?:</script\s*>|\z)|<style\b.*?(?:</style\s*>|\z)|<template\b.*?(?:</template\s*>|\z)|<head\b.*?(?:</head\s*>|\z)",
    )
    .expect("valid inert-markup regex")
});

static FIRST_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").expect("valid heading regex"));

// Only a bare `<h1>` on a single line is restyled; headings that already
// carry attributes are left alone.
static BARE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h1>(.*?)</h1>").expect("valid heading regex"));

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Text content of the first rendered `<h1>` in `html`, trimmed. Headings
/// inside comments or script/style blocks do not count. `None` when there is
/// no heading or it holds only whitespace.
pub fn first_heading_text(html: &str) -> Option<String> {
    let visible = INERT.replace_all(html, "");
    let caps = FIRST_HEADING.captures(&visible)?;
    let inner = caps.get(1).map_or("", |m| m.as_str());
    let text = decode_entities(&ANY_TAG.replace_all(inner, ""));
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Adds the brand colour to the first bare `<h1>`. Later headings are untouched.
pub fn style_first_heading(html: &str) -> String {
    let replacement = format!("<h1 style=\"color:{};\">${{1}}</h1>", HEADING_COLOR);
    BARE_HEADING.replace(html, replacement.as_str()).into_owned()
}

/// Removes anything that looks like a tag. Entities are left encoded and
/// stray angle brackets in text are not escaped.
pub fn strip_tags(html: &str) -> String {
    ANY_TAG.replace_all(html, "").into_owned()
}

pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
