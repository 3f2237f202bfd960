// ABOUTME: Shared rich-text editor host with a fixed toolbar capability set
// ABOUTME: Imports HTML into a block/run model and serialises it back

use crate::html::{decode_entities, escape_attr, escape_text};
use crate::{Error, Result};
use rand::Rng;
use regex_lite::Regex;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>|<[!?][^>]*>")
        .expect("valid tag regex")
});

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("valid href regex")
});

const SAFE_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];
const BLANK_LINK: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarControl {
    Header,
    Bold,
    Italic,
    Underline,
    Link,
    BulletList,
    OrderedList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
    /// Selectable heading levels; `None` is the plain-text entry.
    pub header_levels: Vec<Option<u8>>,
    pub controls: Vec<ToolbarControl>,
}

impl Toolbar {
    pub fn standard() -> Self {
        Toolbar {
            header_levels: vec![None, Some(1), Some(2)],
            controls: vec![
                ToolbarControl::Header,
                ToolbarControl::Bold,
                ToolbarControl::Italic,
                ToolbarControl::Underline,
                ToolbarControl::Link,
                ToolbarControl::BulletList,
                ToolbarControl::OrderedList,
            ],
        }
    }

    pub fn allows(&self, control: ToolbarControl) -> bool {
        self.controls.contains(&control)
    }

    pub fn allows_header(&self, level: u8) -> bool {
        self.allows(ToolbarControl::Header) && self.header_levels.contains(&Some(level))
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Toolbar::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem(ListKind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub formats: Formats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<Run>,
}

impl Block {
    fn new(kind: BlockKind) -> Self {
        Block {
            kind,
            runs: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn ends_with_space(&self) -> bool {
        self.runs
            .iter()
            .rev()
            .find(|r| !r.text.is_empty())
            .is_some_and(|r| r.text.ends_with(' '))
    }

    fn push_text(&mut self, text: &str, formats: Formats) {
        match self.runs.last_mut() {
            Some(last) if last.formats == formats => last.text.push_str(text),
            _ => self.runs.push(Run {
                text: text.to_string(),
                formats,
            }),
        }
    }

    fn trim_end(&mut self) {
        while let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end_matches(' ').len();
            last.text.truncate(trimmed);
            if !last.text.is_empty() {
                break;
            }
            self.runs.pop();
        }
    }
}

/// Text selection inside the editor, as char offsets into `EditorHost::text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

/// The single editor instance a page owns. Contents are only ever set
/// through HTML conversion, never raw.
#[derive(Debug, Default)]
pub struct EditorHost {
    toolbar: Toolbar,
    blocks: Vec<Block>,
    selection: Option<Selection>,
}

impl EditorHost {
    pub fn new(toolbar: Toolbar) -> Self {
        EditorHost {
            toolbar,
            blocks: Vec::new(),
            selection: None,
        }
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Replaces the contents with the converted form of `html`.
    pub fn load(&mut self, html: &str) {
        self.clear();
        self.blocks = convert(html, &self.toolbar);
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.selection = None;
    }

    pub fn get_html(&self) -> String {
        to_html(&self.blocks)
    }

    /// Plain text, one line per block.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty)
    }

    pub fn select_all(&mut self) {
        self.selection = Some(Selection {
            start: 0,
            end: self.text().chars().count(),
        });
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_text(&self) -> Option<String> {
        let sel = self.selection?;
        Some(
            self.text()
                .chars()
                .skip(sel.start)
                .take(sel.end.saturating_sub(sel.start))
                .collect(),
        )
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

/// Clipboard-style import: turns arbitrary HTML into editor blocks, keeping
/// only what the toolbar can express.
pub fn convert(html: &str, toolbar: &Toolbar) -> Vec<Block> {
    let mut importer = Importer::new(toolbar);
    let mut cursor = 0;

    for caps in TAG.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        importer.text(&html[cursor..whole.start()]);
        cursor = whole.end();

        if let Some(name) = caps.get(2) {
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            importer.tag(&name.as_str().to_ascii_lowercase(), closing, attrs);
        }
    }
    importer.text(&html[cursor..]);
    importer.finish()
}

struct Importer<'a> {
    toolbar: &'a Toolbar,
    blocks: Vec<Block>,
    open: Option<Block>,
    lists: Vec<ListKind>,
    bold: usize,
    italic: usize,
    underline: usize,
    links: Vec<Option<String>>,
    skipping: Option<String>,
}

impl<'a> Importer<'a> {
    fn new(toolbar: &'a Toolbar) -> Self {
        Importer {
            toolbar,
            blocks: Vec::new(),
            open: None,
            lists: Vec::new(),
            bold: 0,
            italic: 0,
            underline: 0,
            links: Vec::new(),
            skipping: None,
        }
    }

    fn formats(&self) -> Formats {
        let link = if self.toolbar.allows(ToolbarControl::Link) {
            self.links.iter().rev().find_map(Clone::clone)
        } else {
            None
        };
        Formats {
            bold: self.bold > 0 && self.toolbar.allows(ToolbarControl::Bold),
            italic: self.italic > 0 && self.toolbar.allows(ToolbarControl::Italic),
            underline: self.underline > 0 && self.toolbar.allows(ToolbarControl::Underline),
            link,
        }
    }

    fn list_item_kind(&self) -> BlockKind {
        let kind = self.lists.last().copied().unwrap_or(ListKind::Bullet);
        let control = match kind {
            ListKind::Bullet => ToolbarControl::BulletList,
            ListKind::Ordered => ToolbarControl::OrderedList,
        };
        if self.toolbar.allows(control) {
            BlockKind::ListItem(kind)
        } else {
            BlockKind::Paragraph
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skipping.is_some() || raw.is_empty() {
            return;
        }

        let decoded = decode_entities(raw);
        let mut collapsed = String::with_capacity(decoded.len());
        for c in decoded.chars() {
            if c.is_ascii_whitespace() {
                if !collapsed.ends_with(' ') {
                    collapsed.push(' ');
                }
            } else {
                collapsed.push(c);
            }
        }

        if self.open.is_none() {
            if collapsed.chars().all(|c| c == ' ') {
                return;
            }
            self.open = Some(Block::new(BlockKind::Paragraph));
        }

        let formats = self.formats();
        if let Some(block) = self.open.as_mut() {
            let text = if block.is_empty() || block.ends_with_space() {
                collapsed.trim_start_matches(' ')
            } else {
                collapsed.as_str()
            };
            if !text.is_empty() {
                block.push_text(text, formats);
            }
        }
    }

    fn tag(&mut self, name: &str, closing: bool, attrs: &str) {
        if let Some(skipped) = &self.skipping {
            if closing && skipped == name {
                self.skipping = None;
            }
            return;
        }

        match (name, closing) {
            ("script" | "style" | "head" | "template", false) => {
                self.skipping = Some(name.to_string());
            }
            ("ul" | "ol", false) => {
                self.end_block();
                self.lists.push(if name == "ol" {
                    ListKind::Ordered
                } else {
                    ListKind::Bullet
                });
            }
            ("ul" | "ol", true) => {
                self.end_block();
                self.lists.pop();
            }
            ("li", false) => {
                let kind = self.list_item_kind();
                self.start_block(kind);
            }
            ("br", _) => self.line_break(),
            ("strong" | "b", false) => self.bold += 1,
            ("strong" | "b", true) => self.bold = self.bold.saturating_sub(1),
            ("em" | "i", false) => self.italic += 1,
            ("em" | "i", true) => self.italic = self.italic.saturating_sub(1),
            ("u", false) => self.underline += 1,
            ("u", true) => self.underline = self.underline.saturating_sub(1),
            ("a", false) => self.links.push(href(attrs)),
            ("a", true) => {
                self.links.pop();
            }
            (_, false) => {
                if let Some(kind) = self.block_kind(name) {
                    self.start_block(kind);
                }
            }
            (_, true) => {
                if name == "li" || self.block_kind(name).is_some() {
                    self.end_block();
                }
            }
        }
    }

    fn block_kind(&self, name: &str) -> Option<BlockKind> {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(0);
                if self.toolbar.allows_header(level) {
                    Some(BlockKind::Heading(level))
                } else {
                    Some(BlockKind::Paragraph)
                }
            }
            "p" | "div" | "blockquote" | "pre" | "section" | "article" | "header" | "footer"
            | "tr" => Some(BlockKind::Paragraph),
            _ => None,
        }
    }

    fn start_block(&mut self, kind: BlockKind) {
        if let Some(open) = self.open.as_mut() {
            if open.is_empty() {
                // A wrapper opened this block; the more specific kind wins.
                if kind != BlockKind::Paragraph {
                    open.kind = kind;
                }
                return;
            }
            self.end_block();
        }
        self.open = Some(Block::new(kind));
    }

    fn end_block(&mut self) {
        if let Some(mut block) = self.open.take() {
            block.trim_end();
            self.blocks.push(block);
        }
    }

    fn line_break(&mut self) {
        match self.open.as_ref() {
            Some(open) if open.is_empty() => {}
            Some(open) => {
                let kind = open.kind;
                self.end_block();
                self.open = Some(Block::new(kind));
            }
            None => self.open = Some(Block::new(BlockKind::Paragraph)),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.end_block();
        self.blocks
    }
}

fn href(attrs: &str) -> Option<String> {
    let caps = HREF.captures(attrs)?;
    let raw = caps.get(1).or(caps.get(2)).or(caps.get(3))?.as_str();
    Some(sanitize_link(&decode_entities(raw)))
}

fn sanitize_link(href: &str) -> String {
    let href = href.trim();
    let scheme_end = href.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if href[i..].starts_with(':') => {
            let scheme = href[..i].to_ascii_lowercase();
            if SAFE_SCHEMES.contains(&scheme.as_str()) {
                href.to_string()
            } else {
                BLANK_LINK.to_string()
            }
        }
        _ => href.to_string(),
    }
}

pub fn to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in blocks {
        let list = match block.kind {
            BlockKind::ListItem(kind) => Some(kind),
            _ => None,
        };
        if open_list != list {
            if let Some(kind) = open_list {
                out.push_str(list_close(kind));
            }
            if let Some(kind) = list {
                out.push_str(list_open(kind));
            }
            open_list = list;
        }

        let tag = match block.kind {
            BlockKind::Paragraph => "p".to_string(),
            BlockKind::Heading(level) => format!("h{}", level),
            BlockKind::ListItem(_) => "li".to_string(),
        };
        out.push_str(&format!("<{}>", tag));
        if block.is_empty() {
            out.push_str("<br>");
        } else {
            for run in &block.runs {
                push_run(&mut out, run);
            }
        }
        out.push_str(&format!("</{}>", tag));
    }

    if let Some(kind) = open_list {
        out.push_str(list_close(kind));
    }
    out
}

fn list_open(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "<ul>",
        ListKind::Ordered => "<ol>",
    }
}

fn list_close(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "</ul>",
        ListKind::Ordered => "</ol>",
    }
}

fn push_run(out: &mut String, run: &Run) {
    let f = &run.formats;
    if let Some(link) = &f.link {
        out.push_str(&format!("<a href=\"{}\">", escape_attr(link)));
    }
    if f.bold {
        out.push_str("<strong>");
    }
    if f.italic {
        out.push_str("<em>");
    }
    if f.underline {
        out.push_str("<u>");
    }
    out.push_str(&escape_text(&run.text));
    if f.underline {
        out.push_str("</u>");
    }
    if f.italic {
        out.push_str("</em>");
    }
    if f.bold {
        out.push_str("</strong>");
    }
    if f.link.is_some() {
        out.push_str("</a>");
    }
}

/// Hands the current HTML to the user's `$VISUAL`/`$EDITOR` and returns
/// whatever they saved.
pub struct ExternalEditor {
    command: String,
    tmp_dir: PathBuf,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>, tmp_dir: PathBuf) -> Self {
        ExternalEditor {
            command: command.into(),
            tmp_dir,
        }
    }

    pub fn from_env(tmp_dir: PathBuf) -> Self {
        let command = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".into());
        ExternalEditor::new(command, tmp_dir)
    }

    pub fn edit(&self, html: &str) -> Result<String> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Editor("no editor command configured".into()))?;

        fs::create_dir_all(&self.tmp_dir)?;
        let random: u32 = rand::thread_rng().gen();
        let path = self.tmp_dir.join(format!("{:x}.html", random));
        fs::write(&path, html)?;

        tracing::debug!(editor = %self.command, path = %path.display(), "launching editor");
        let status = Command::new(program).args(parts).arg(&path).status();

        let result = match status {
            Ok(s) if s.success() => fs::read_to_string(&path).map_err(Error::from),
            Ok(s) => Err(Error::Editor(format!("{} exited with {}", program, s))),
            Err(e) => Err(Error::Editor(format!("failed to launch {}: {}", program, e))),
        };
        let _ = fs::remove_file(&path);
        result
    }
}
