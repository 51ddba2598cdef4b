//! Report orchestration: fetch, build rows, render.

use std::sync::Arc;

use super::document::build_rows;
use super::renderer::{PdfRenderer, ReportArtifact};
use super::ReportError;
use crate::student::StudentSource;

/// Generates one report per call. Holds only read-only collaborators, so a
/// single instance is shared by all requests.
#[derive(Clone)]
pub struct ReportService {
    source: Arc<dyn StudentSource>,
    renderer: Arc<PdfRenderer>,
}

impl ReportService {
    pub fn new(source: Arc<dyn StudentSource>, renderer: PdfRenderer) -> Self {
        Self {
            source,
            renderer: Arc::new(renderer),
        }
    }

    /// Fetch the record for `id` and write a new report file for it.
    ///
    /// A fetch failure is returned as is and nothing is rendered. Rendering
    /// runs on the blocking pool.
    pub async fn generate_report(&self, id: u64) -> Result<ReportArtifact, ReportError> {
        let record = self.source.fetch(id).await?;
        log::info!("Generating PDF report for student: {}", record.id);

        let renderer = Arc::clone(&self.renderer);
        let artifact = tokio::task::spawn_blocking(move || {
            let doc = build_rows(&record);
            renderer.render(&doc)
        })
        .await??;

        Ok(artifact)
    }
}
