// ABOUTME: Projects fetched documents into list rows with Download/Edit controls
// ABOUTME: Rows are stamped from a hidden template; the template never renders

use crate::model::{DEFAULT_SOURCE_LABEL, DEFAULT_TITLE};
use crate::{Document, DocumentId};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

pub const EMPTY_MESSAGE: &str = "No documents found or error loading.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Download,
    Edit,
}

impl Control {
    pub fn label(self) -> &'static str {
        match self {
            Control::Download => "Download",
            Control::Edit => "Edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub doc_id: Option<DocumentId>,
    pub title: String,
    pub source_label: String,
    pub visible: bool,
    pub controls: Vec<Control>,
}

impl ListItem {
    /// The hidden placeholder row every real row is cloned from.
    pub fn template() -> Self {
        ListItem {
            doc_id: None,
            title: DEFAULT_TITLE.into(),
            source_label: DEFAULT_SOURCE_LABEL.into(),
            visible: false,
            controls: Vec::new(),
        }
    }

    fn stamp(&self, doc: &Document) -> Self {
        let mut item = self.clone();
        item.visible = true;
        item.doc_id = Some(doc.id.clone());
        item.title = doc.display_title().to_string();
        item.source_label = doc.display_source().to_string();
        item.controls = vec![Control::Download, Control::Edit];
        item
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentList {
    Items(Vec<ListItem>),
    /// Shown both for "no documents" and for a failed fetch.
    Empty,
}

impl DocumentList {
    /// One row per document in fetch order.
    pub fn render(docs: &[Document]) -> Self {
        if docs.is_empty() {
            return DocumentList::Empty;
        }
        let template = ListItem::template();
        let items = docs.iter().map(|doc| template.stamp(doc)).collect();
        DocumentList::Items(items)
    }

    pub fn items(&self) -> &[ListItem] {
        match self {
            DocumentList::Items(items) => items,
            DocumentList::Empty => &[],
        }
    }

    pub fn item(&self, id: &DocumentId) -> Option<&ListItem> {
        self.items().iter().find(|i| i.doc_id.as_ref() == Some(id))
    }

    /// Updates the displayed title of the row for `id`. Returns false when no
    /// such row exists.
    pub fn set_title(&mut self, id: &DocumentId, title: &str) -> bool {
        let DocumentList::Items(items) = self else {
            return false;
        };
        match items.iter_mut().find(|i| i.doc_id.as_ref() == Some(id)) {
            Some(item) => {
                item.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn to_table(&self) -> String {
        let items = match self {
            DocumentList::Empty => return EMPTY_MESSAGE.to_string(),
            DocumentList::Items(items) => items,
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["ID", "Title", "Tool", "Actions"]);

        for item in items.iter().filter(|i| i.visible) {
            let actions: Vec<&str> = item.controls.iter().map(|c| c.label()).collect();
            table.add_row(vec![
                item.doc_id.as_ref().map(ToString::to_string).unwrap_or_default(),
                item.title.clone(),
                item.source_label.clone(),
                actions.join(" / "),
            ]);
        }
        table.to_string()
    }
}
