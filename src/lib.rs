// ABOUTME: Public library API for the Little Plans document manager
// ABOUTME: Re-exports core modules for external use

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod docx;
pub mod editor;
pub mod error;
pub mod export;
pub mod html;
pub mod lightbox;
pub mod list;
pub mod model;
pub mod page;
pub mod platform;
pub mod storage;

pub use error::{Error, Result};
pub use model::{Document, DocumentId, DocumentPatch};
