//! Writing the results of a collection run.
//!
//! The manifest and the report are independent outputs: each is attempted
//! regardless of whether the other succeeded, and both results are handed
//! back so the caller can report every failure.

use camino::{Utf8Path, Utf8PathBuf};

use crate::collector::CollectionOutcome;
use crate::error::Result;
use crate::manifest::{CollectionManifest, MANIFEST_FILE_NAME};
use crate::report::CollectionReport;

/// Where a run's outputs went and whether writing them worked.
#[derive(Debug)]
pub struct PersistedRun {
    pub manifest_path: Utf8PathBuf,
    /// `Ok(false)` when the run collected nothing and the previous manifest
    /// was left untouched.
    pub manifest: Result<bool>,
    pub report_path: Utf8PathBuf,
    pub report: Result<()>,
    /// The rendered report, also available when writing it failed.
    pub report_text: String,
}

impl PersistedRun {
    pub fn is_ok(&self) -> bool {
        self.manifest.is_ok() && self.report.is_ok()
    }
}

/// Write `manifest.json` under `output_root` and the text report to `report_path`.
pub fn persist_run(
    outcome: &CollectionOutcome,
    output_root: &Utf8Path,
    report_path: &Utf8Path,
    generated_at: &str,
) -> PersistedRun {
    let manifest_path = output_root.join(MANIFEST_FILE_NAME);

    let manifest = if outcome.records.is_empty() {
        tracing::warn!("No maps collected; leaving {} untouched", manifest_path);
        Ok(false)
    } else {
        CollectionManifest::from_records(outcome.records.iter().cloned(), generated_at)
            .save(&manifest_path)
            .map(|()| true)
    };
    if let Err(e) = &manifest {
        tracing::error!("Failed to write {}: {}", manifest_path, e);
    }

    let report = CollectionReport::new(&outcome.records, &outcome.errors, output_root, generated_at);
    let report_text = report.render();
    let report_result = report.write(report_path);
    if let Err(e) = &report_result {
        tracing::error!("Failed to write {}: {}", report_path, e);
    }

    PersistedRun {
        manifest_path,
        manifest,
        report_path: report_path.to_path_buf(),
        report: report_result,
        report_text,
    }
}
