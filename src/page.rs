// ABOUTME: Page controller owning session-scoped state and every user action
// ABOUTME: Handlers take a document id and look it up at invocation time

use crate::api::DocumentStore;
use crate::auth::{require_session, Session};
use crate::docx::DocxConverter;
use crate::editor::{EditorHost, Toolbar};
use crate::export::{export_html, extract_title, ExportSource};
use crate::lightbox::Lightbox;
use crate::list::DocumentList;
use crate::platform::{Clipboard, DownloadSink, Notifier, Platform};
use crate::{Document, DocumentId, DocumentPatch, Error, Result};
use chrono::Utc;
use std::path::PathBuf;

pub const SAVE_FALLBACK_TITLE: &str = "Untitled";

/// Host services a page talks to.
pub struct Services {
    pub notifier: Box<dyn Notifier>,
    pub clipboard: Box<dyn Clipboard>,
    pub downloads: Box<dyn DownloadSink>,
    pub converter: Box<dyn DocxConverter>,
}

/// Follow-up actions for a document edited outside the lightbox.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditFollowUp {
    pub copy: bool,
    pub download: bool,
    pub discard: bool,
}

#[derive(Debug, Default)]
pub struct EditOutcome {
    pub downloaded: Option<PathBuf>,
    pub saved: bool,
}

pub struct Page<S: DocumentStore> {
    session: Session,
    store: S,
    documents: Vec<Document>,
    list: DocumentList,
    editor: EditorHost,
    lightbox: Lightbox,
    platform: Platform,
    services: Services,
}

impl<S: DocumentStore> Page<S> {
    /// Session guard in front of [`Page::load`]. Without a session the store is
    /// never built and nothing is fetched; the error points at the sign-in
    /// route.
    pub fn open<F>(
        session: Option<Session>,
        connect: F,
        platform: Platform,
        services: Services,
    ) -> Result<Self>
    where
        F: FnOnce(&Session) -> Result<S>,
    {
        let session = require_session(session)?;
        let store = connect(&session)?;
        Ok(Page::load(session, store, platform, services))
    }

    /// Builds the page for an authenticated session: fetches the user's
    /// documents once and renders the list. A failed fetch renders the same
    /// empty state as an empty collection.
    pub fn load(session: Session, store: S, platform: Platform, services: Services) -> Self {
        let documents = match store.list_for_user(&session.user_id) {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(user_id = %session.user_id, "failed to load documents: {}", e);
                Vec::new()
            }
        };
        tracing::info!(count = documents.len(), "documents loaded");

        let list = DocumentList::render(&documents);
        Page {
            session,
            store,
            documents,
            list,
            editor: EditorHost::new(Toolbar::standard()),
            lightbox: Lightbox::default(),
            platform,
            services,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| &d.id == id)
    }

    pub fn list(&self) -> &DocumentList {
        &self.list
    }

    pub fn editor(&self) -> &EditorHost {
        &self.editor
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    fn require(&self, id: &DocumentId) -> Result<&Document> {
        self.document(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn deliver(&self, html: &str, source: ExportSource) -> Result<Option<PathBuf>> {
        let file = match export_html(html, source, self.platform, self.services.converter.as_ref()) {
            Ok(file) => file,
            Err(Error::Export(message)) => {
                self.services.notifier.alert(&message);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(filename = %file.filename, mime = file.format.mime(), "export ready");
        let path = self.services.downloads.deliver(&file.filename, &file.bytes)?;
        Ok(Some(path))
    }

    /// Download button on a list row: exports the stored content.
    pub fn download(&self, id: &DocumentId) -> Result<Option<PathBuf>> {
        let doc = self.require(id)?;
        self.deliver(doc.content(), ExportSource::ListItem)
    }

    /// Edit button on a list row: opens the lightbox on `id`, replacing
    /// whatever was being edited.
    pub fn edit(&mut self, id: &DocumentId) -> Result<()> {
        let doc = self.require(id)?;
        let content = doc.content().to_string();
        let updated_at = doc.updated_at;

        self.editor.clear();
        self.editor.load(&content);
        self.lightbox.open(id.clone(), updated_at);
        tracing::debug!(%id, "lightbox opened");
        Ok(())
    }

    /// Replaces the editor contents while the lightbox is open.
    pub fn set_editor_html(&mut self, html: &str) {
        if self.lightbox.is_open() {
            self.editor.load(html);
        }
    }

    pub fn close(&mut self) {
        self.lightbox.close();
        self.editor.clear();
    }

    /// Writes the editor contents back and closes the lightbox. A rejected
    /// update is alerted and returned; the lightbox stays open for a retry.
    /// `Ok(false)` means nothing was open.
    pub fn save(&mut self) -> Result<bool> {
        let Some(id) = self.lightbox.current().cloned() else {
            self.services.notifier.alert("No document loaded.");
            return Ok(false);
        };

        let content = self.editor.get_html();
        let patch = DocumentPatch {
            title: extract_title(&content, SAVE_FALLBACK_TITLE),
            content,
            updated_at: Utc::now(),
        };

        if let Err(e) = self.store.update_by_id(&id, &patch) {
            tracing::warn!(%id, user_id = %self.session.user_id, "save failed: {}", e);
            self.services.notifier.alert("Error saving.");
            return Err(e);
        }

        self.list.set_title(&id, &patch.title);
        if let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) {
            doc.apply(&patch);
        }
        tracing::info!(%id, title = %patch.title, "document saved");
        self.services.notifier.alert("Document saved!");
        self.close();
        Ok(true)
    }

    /// Copies the editor text to the clipboard. The selection is cleared
    /// afterwards whether or not the copy worked.
    pub fn copy(&mut self) -> Result<bool> {
        if !self.lightbox.is_open() {
            self.services.notifier.alert("Nothing to copy.");
            return Ok(false);
        }

        self.editor.select_all();
        let text = self.editor.selected_text().unwrap_or_default();
        let result = self.services.clipboard.copy(&text);
        self.editor.clear_selection();

        match result {
            Ok(()) => {
                self.services.notifier.alert("Document copied!");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("copy failed: {}", e);
                self.services.notifier.alert("Copy failed.");
                Err(e)
            }
        }
    }

    /// Download button in the lightbox: exports the live editor contents.
    pub fn download_current(&self) -> Result<Option<PathBuf>> {
        let html = if self.lightbox.is_open() && !self.editor.is_empty() {
            self.editor.get_html()
        } else {
            String::new()
        };
        self.deliver(&html, ExportSource::Lightbox)
    }

    /// Runs the requested copy and download on the open document, then saves
    /// or discards it. A failed copy or download is reported and does not stop
    /// the save; only the save result is returned as an error.
    pub fn finish_edit(&mut self, follow_up: EditFollowUp) -> Result<EditOutcome> {
        let mut outcome = EditOutcome::default();

        if follow_up.copy {
            if let Err(e) = self.copy() {
                tracing::warn!("continuing after copy failure: {}", e);
            }
        }
        if follow_up.download {
            match self.download_current() {
                Ok(path) => outcome.downloaded = path,
                Err(e) => {
                    tracing::warn!("continuing after download failure: {}", e);
                    self.services.notifier.alert("Download failed.");
                }
            }
        }

        if follow_up.discard {
            self.close();
        } else {
            outcome.saved = self.save()?;
        }
        Ok(outcome)
    }
}
