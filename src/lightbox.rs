// ABOUTME: Modal editing surface state: Closed or editing one document
// ABOUTME: Tracks the current document and which lightbox controls are shown

use crate::DocumentId;
use chrono::{DateTime, Local, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Editing { doc_id: DocumentId },
}

/// Visibility of the lightbox action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightboxControls {
    pub save: bool,
    pub copy: bool,
    pub download: bool,
}

impl LightboxControls {
    fn all(shown: bool) -> Self {
        LightboxControls {
            save: shown,
            copy: shown,
            download: shown,
        }
    }
}

#[derive(Debug, Default)]
pub struct Lightbox {
    state: LightboxState,
    controls: LightboxControls,
    info: String,
}

impl Lightbox {
    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Editing { .. })
    }

    pub fn current(&self) -> Option<&DocumentId> {
        match &self.state {
            LightboxState::Editing { doc_id } => Some(doc_id),
            LightboxState::Closed => None,
        }
    }

    pub fn controls(&self) -> LightboxControls {
        self.controls
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    /// Opening while already open just retargets the lightbox.
    pub fn open(&mut self, doc_id: DocumentId, updated_at: Option<DateTime<Utc>>) {
        self.info = last_updated_line(updated_at);
        self.state = LightboxState::Editing { doc_id };
        self.controls = LightboxControls::all(true);
    }

    pub fn close(&mut self) {
        self.state = LightboxState::Closed;
        self.controls = LightboxControls::all(false);
        self.info.clear();
    }
}

pub fn last_updated_line(updated_at: Option<DateTime<Utc>>) -> String {
    match updated_at {
        Some(ts) => format!(
            "Last updated: {}",
            ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => "Last updated: unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let lightbox = Lightbox::default();
        assert_eq!(lightbox.state(), &LightboxState::Closed);
        assert!(lightbox.current().is_none());
        assert_eq!(lightbox.controls(), LightboxControls::default());
    }

    #[test]
    fn test_open_then_close() {
        let mut lightbox = Lightbox::default();
        lightbox.open(DocumentId::new("a"), None);

        assert!(lightbox.is_open());
        assert_eq!(lightbox.current(), Some(&DocumentId::new("a")));
        assert!(lightbox.controls().save && lightbox.controls().copy && lightbox.controls().download);
        assert_eq!(lightbox.info(), "Last updated: unknown");

        lightbox.close();
        assert!(!lightbox.is_open());
        assert!(lightbox.current().is_none());
        assert!(!lightbox.controls().save);
        assert!(lightbox.info().is_empty());
    }

    #[test]
    fn test_reopen_retargets() {
        let mut lightbox = Lightbox::default();
        lightbox.open(DocumentId::new("a"), None);
        lightbox.open(DocumentId::new("b"), None);
        assert_eq!(lightbox.current(), Some(&DocumentId::new("b")));
    }

    #[test]
    fn test_last_updated_line() {
        let line = last_updated_line(Some("2025-10-28T15:04:05Z".parse().unwrap()));
        assert!(line.starts_with("Last updated: 2025-10-2"));
    }
}
