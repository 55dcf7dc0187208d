//! End-of-run accounting.

use tracing::info;

/// Counts reported once at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rasters_processed: usize,
    pub rasters_skipped: usize,
    pub images_rendered: usize,
    pub groups: usize,
    pub templates_matched: usize,
    pub templates_skipped: usize,
    pub files_published: usize,
    pub publish_failures: usize,
}

impl RunSummary {
    pub fn log_report(&self) {
        info!(
            rasters_processed = self.rasters_processed,
            rasters_skipped = self.rasters_skipped,
            images_rendered = self.images_rendered,
            groups = self.groups,
            templates_matched = self.templates_matched,
            templates_skipped = self.templates_skipped,
            files_published = self.files_published,
            publish_failures = self.publish_failures,
            "Run complete"
        );
    }
}
