//! Report generation: document model, PDF rendering, orchestration and the
//! HTTP handlers that expose it.

pub mod common;
pub mod document;
pub mod handlers;
pub mod layout;
pub mod renderer;
pub mod service;

pub use document::{build_rows, ReportDocument, Row, Section};
pub use renderer::{PdfRenderer, RenderError, ReportArtifact};
pub use service::ReportService;

use thiserror::Error;

use crate::student::FetchError;

/// Coarse failure classes used when answering clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Upstream,
    Transport,
    Io,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("report worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::Fetch(FetchError::NotFound(_)) => ErrorKind::NotFound,
            ReportError::Fetch(FetchError::Upstream { .. }) => ErrorKind::Upstream,
            ReportError::Fetch(FetchError::Transport(_)) => ErrorKind::Transport,
            ReportError::Render(_) | ReportError::Worker(_) => ErrorKind::Io,
        }
    }
}
