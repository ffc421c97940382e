//! Human-readable collection report.

use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::Result;
use crate::manifest::{CollectionStatus, MapRecord, MANIFEST_FILE_NAME};

/// Default file name of the report.
pub const REPORT_FILE_NAME: &str = "collection_report.txt";

const RULE_WIDTH: usize = 70;

/// Summary of one collection run.
///
/// Rendering is a pure function of its inputs: records are sorted by name,
/// errors keep run order, and the generation time is supplied by the caller.
pub struct CollectionReport<'a> {
    records: Vec<&'a MapRecord>,
    errors: &'a [String],
    output_root: Utf8PathBuf,
    generated_at: String,
}

impl<'a> CollectionReport<'a> {
    pub fn new(
        records: &'a [MapRecord],
        errors: &'a [String],
        output_root: impl Into<Utf8PathBuf>,
        generated_at: impl Into<String>,
    ) -> Self {
        let mut records: Vec<&MapRecord> = records.iter().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            records,
            errors,
            output_root: output_root.into(),
            generated_at: generated_at.into(),
        }
    }

    fn count(&self, status: CollectionStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "PROJECT REALITY MORTAR CALCULATOR - MAP COLLECTION REPORT");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Generated: {}", self.generated_at);
        let _ = writeln!(out);

        let heightmap_only = self.records.iter().filter(|r| !r.has_minimap()).count();

        let _ = writeln!(out, "SUMMARY:");
        let _ = writeln!(
            out,
            "  Total maps found: {}",
            self.records.len() + self.errors.len()
        );
        let _ = writeln!(out, "  ✓ Successfully collected: {}", self.records.len());
        let _ = writeln!(out, "    - New maps: {}", self.count(CollectionStatus::New));
        let _ = writeln!(
            out,
            "    - Updated maps: {}",
            self.count(CollectionStatus::Updated)
        );
        let _ = writeln!(
            out,
            "    - Unchanged (skipped): {}",
            self.count(CollectionStatus::Unchanged)
        );
        let _ = writeln!(out, "    - Heightmap only (no minimap): {}", heightmap_only);
        let _ = writeln!(out, "  ✗ Errors: {}", self.errors.len());
        let _ = writeln!(out);

        if !self.records.is_empty() {
            let _ = writeln!(out, "COLLECTED MAPS:");
            for record in &self.records {
                let hash_prefix: String = record.server_zip.content_hash.chars().take(8).collect();
                let minimap_flag = if record.has_minimap() {
                    ""
                } else {
                    "  [no minimap]"
                };
                let _ = writeln!(
                    out,
                    "  [{}] {:<30} {:>8.1} KB  {}{}",
                    record.status.glyph(),
                    record.name,
                    record.size_bytes() as f64 / 1024.0,
                    hash_prefix,
                    minimap_flag
                );
            }
            let _ = writeln!(out);
        }

        if !self.errors.is_empty() {
            let _ = writeln!(out, "ERRORS:");
            for error in self.errors {
                let _ = writeln!(out, "  ✗ {}", error);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "OUTPUT:");
        let _ = writeln!(out, "  Data directory: {}/", self.output_root);
        let _ = writeln!(
            out,
            "  Manifest: {}",
            self.output_root.join(MANIFEST_FILE_NAME)
        );
        let _ = write!(out, "{rule}");

        out
    }

    /// Write the rendered report, creating parent directories if needed.
    pub fn write(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        std::fs::write(path.as_std_path(), self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ArchiveRecord;

    fn record(name: &str, status: CollectionStatus, with_client: bool) -> MapRecord {
        MapRecord {
            name: name.to_string(),
            server_zip: ArchiveRecord {
                content_hash: "0123456789abcdef".to_string(),
                size_bytes: 2048,
                has_required_member: true,
            },
            client_zip: with_client.then(|| ArchiveRecord {
                content_hash: "fedcba9876543210".to_string(),
                size_bytes: 1024,
                has_required_member: true,
            }),
            collected_at: "2024-11-19T10:30:00Z".to_string(),
            source_path: format!("/pr/levels/{name}"),
            status,
        }
    }

    #[test]
    fn test_render_summary_and_sorted_entries() {
        let records = vec![
            record("muttrah_city_2", CollectionStatus::Updated, true),
            record("adak", CollectionStatus::New, false),
            record("kashan_desert", CollectionStatus::Unchanged, true),
        ];
        let errors = vec!["broken_map: server.zip validation failed: Not a valid zip file".to_string()];

        let report = CollectionReport::new(&records, &errors, "raw_map_data", "2024-11-19 10:30:00");
        let text = report.render();

        assert!(text.contains("Generated: 2024-11-19 10:30:00"));
        assert!(text.contains("  Total maps found: 4"));
        assert!(text.contains("  ✓ Successfully collected: 3"));
        assert!(text.contains("    - New maps: 1"));
        assert!(text.contains("    - Updated maps: 1"));
        assert!(text.contains("    - Unchanged (skipped): 1"));
        assert!(text.contains("    - Heightmap only (no minimap): 1"));
        assert!(text.contains("  ✗ Errors: 1"));
        assert!(text.contains("  ✗ broken_map: server.zip validation failed"));
        assert!(text.contains("  Manifest: raw_map_data/manifest.json"));

        let adak = text.find("[+] adak").unwrap();
        let kashan = text.find("[=] kashan_desert").unwrap();
        let muttrah = text.find("[↻] muttrah_city_2").unwrap();
        assert!(adak < kashan && kashan < muttrah);

        assert!(text.contains("     2.0 KB  01234567  [no minimap]"));
        assert!(text.contains("     3.0 KB  01234567\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let records = vec![record("adak", CollectionStatus::New, true)];
        let a = CollectionReport::new(&records, &[], "out", "t").render();
        let b = CollectionReport::new(&records, &[], "out", "t").render();
        assert_eq!(a, b);
        assert!(!a.contains("ERRORS:"));
    }
}
