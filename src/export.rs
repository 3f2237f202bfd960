// ABOUTME: Export pipeline turning document HTML into a downloadable file
// ABOUTME: Markdown on limited platforms, .docx everywhere else

use crate::docx::{DocxConverter, DOCX_MIME};
use crate::html::{first_heading_text, strip_tags, style_first_heading};
use crate::platform::Platform;
use crate::{Error, Result};

pub const MARKDOWN_MIME: &str = "text/markdown;charset=utf-8";

const ILLEGAL_FILENAME_CHARS: [char; 8] = ['/', ':', '*', '?', '"', '<', '>', '|'];

/// Where an export was triggered from. Each call site has its own fallback
/// title and its own empty-content message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    /// Download button on a list row, exporting the stored record.
    ListItem,
    /// Download button in the lightbox, exporting live editor content.
    Lightbox,
}

impl ExportSource {
    pub fn fallback_title(self) -> &'static str {
        match self {
            ExportSource::ListItem => "Little-Plans-Document",
            ExportSource::Lightbox => "Document",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ExportSource::ListItem => "No content to download.",
            ExportSource::Lightbox => "Nothing to download.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Docx,
}

impl ExportFormat {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Limited => ExportFormat::Markdown,
            Platform::Standard => ExportFormat::Docx,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => ".md",
            ExportFormat::Docx => ".docx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Markdown => MARKDOWN_MIME,
            ExportFormat::Docx => DOCX_MIME,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub title: String,
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Title used for exports and saves: the first heading's text, or `fallback`.
pub fn extract_title(html: &str, fallback: &str) -> String {
    first_heading_text(html).unwrap_or_else(|| fallback.to_string())
}

/// Drops exactly the characters most filesystems reject: `/ : * ? " < > |`.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}

pub fn markdown_document(title: &str, styled_html: &str) -> String {
    format!("# {}\n\n{}\n", title, strip_tags(styled_html))
}

pub fn docx_page(styled_html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head>\n  <body style=\"font-family:Arial,sans-serif;\">\n    <div>{}</div>\n  </body>\n</html>",
        styled_html
    )
}

pub fn export_html(
    html: &str,
    source: ExportSource,
    platform: Platform,
    converter: &dyn DocxConverter,
) -> Result<ExportedFile> {
    if html.is_empty() {
        return Err(Error::Export(source.empty_message().into()));
    }

    let title = extract_title(html, source.fallback_title());
    let styled = style_first_heading(html);
    let format = ExportFormat::for_platform(platform);

    let bytes = match format {
        ExportFormat::Markdown => markdown_document(&title, &styled).into_bytes(),
        ExportFormat::Docx => converter.as_blob(&docx_page(&styled))?,
    };
    let filename = format!("{}{}", sanitize_filename(&title), format.extension());

    tracing::debug!(%filename, ?format, ?source, "exported document");
    Ok(ExportedFile {
        title,
        filename,
        format,
        bytes,
    })
}
