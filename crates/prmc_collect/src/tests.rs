use std::fs;
use std::io::{Cursor, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{
    collect, persist_run, CollectionManifest, CollectionOutcome, CollectionStatus, Collector, Error,
    MANIFEST_FILE_NAME,
};

struct Fixture {
    _guard: TempDir,
    root: Utf8PathBuf,
    install: Utf8PathBuf,
    output: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let guard = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).unwrap();
        let install = root.join("pr");
        fs::create_dir_all(install.join("levels")).unwrap();

        Self {
            _guard: guard,
            install,
            output: root.join("raw_map_data"),
            root,
        }
    }

    fn map_dir(&self, name: &str) -> Utf8PathBuf {
        let dir = self.install.join("levels").join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_server(&self, name: &str, heightmap: &[u8]) {
        let data = zip_bytes(&[
            ("HeightmapPrimary.raw", heightmap),
            ("init.con", b"heightmapCluster.create 2048 2048 128 2"),
        ]);
        fs::write(self.map_dir(name).join("server.zip"), data).unwrap();
    }

    fn add_client(&self, name: &str, minimap: &[u8]) {
        let data = zip_bytes(&[("Info/Minimap.dds", minimap)]);
        fs::write(self.map_dir(name).join("client.zip"), data).unwrap();
    }

    fn add_raw_file(&self, name: &str, file: &str, bytes: &[u8]) {
        fs::write(self.map_dir(name).join(file), bytes).unwrap();
    }

    fn run(&self, previous: Option<&CollectionManifest>) -> CollectionOutcome {
        collect(&self.install, &self.output, previous).unwrap()
    }
}

fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::default());
    for (name, data) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn manifest_of(outcome: &CollectionOutcome, date: &str) -> CollectionManifest {
    CollectionManifest::from_records(outcome.records.clone(), date)
}

fn modified(path: &Utf8Path) -> std::time::SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

#[test]
fn test_fresh_collection_copies_archives() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_client("adak", b"DDS minimap");
    fx.add_server("kashan_desert", &[9, 0, 9, 0, 9, 0, 9, 0]);

    let outcome = fx.run(None);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.records.iter().all(|r| r.status == CollectionStatus::New));
    assert!(fx.output.join("adak/server.zip").is_file());
    assert!(fx.output.join("adak/client.zip").is_file());
    assert!(fx.output.join("kashan_desert/server.zip").is_file());

    let adak = &outcome.records[0];
    assert_eq!(adak.name, "adak");
    assert_eq!(
        adak.server_zip.size_bytes,
        fs::metadata(fx.output.join("adak/server.zip")).unwrap().len()
    );
    assert!(adak.has_minimap());
}

#[test]
fn test_second_run_is_idempotent() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_client("adak", b"DDS minimap");
    fx.add_server("kashan_desert", &[5, 0, 6, 0, 7, 0, 8, 0]);

    let first = manifest_of(&fx.run(None), "first");

    // Overwriting the copy proves the second run does not rewrite it.
    fs::write(fx.output.join("adak/server.zip"), b"sentinel").unwrap();
    let sentinel_at = modified(&fx.output.join("adak/server.zip"));

    let second_outcome = fx.run(Some(&first));
    assert!(second_outcome
        .records
        .iter()
        .all(|r| r.status == CollectionStatus::Unchanged));
    assert_eq!(fs::read(fx.output.join("adak/server.zip")).unwrap(), b"sentinel");
    assert_eq!(modified(&fx.output.join("adak/server.zip")), sentinel_at);

    let second = manifest_of(&second_outcome, "second");
    for (name, record) in &first.maps {
        let again = second.get(name).unwrap();
        assert_eq!(again.server_zip, record.server_zip);
        assert_eq!(again.client_zip, record.client_zip);
        assert_eq!(again.collected_at, record.collected_at);
    }

    // A third run reproduces the second byte-for-byte apart from the date.
    let third = manifest_of(&fx.run(Some(&second)), "second");
    assert_eq!(
        serde_json::to_string_pretty(&third).unwrap(),
        serde_json::to_string_pretty(&second).unwrap()
    );
}

#[test]
fn test_changed_archive_is_updated() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_client("adak", b"DDS minimap");

    let first = manifest_of(&fx.run(None), "first");

    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 1]);
    let outcome = fx.run(Some(&first));

    let record = &outcome.records[0];
    assert_eq!(record.status, CollectionStatus::Updated);
    assert_ne!(
        record.server_zip.content_hash,
        first.get("adak").unwrap().server_zip.content_hash
    );
    // The client archive did not change and keeps its previous record.
    assert_eq!(record.client_zip, first.get("adak").unwrap().client_zip);
    assert_eq!(
        prmc_archive::fingerprint_file(&fx.output.join("adak/server.zip")).unwrap(),
        record.server_zip.content_hash
    );
}

#[test]
fn test_identical_bytes_under_new_build_are_unchanged() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let first = manifest_of(&fx.run(None), "first");

    // Rewrite the same bytes; only the mtime changes.
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let outcome = fx.run(Some(&first));
    assert_eq!(outcome.records[0].status, CollectionStatus::Unchanged);
}

#[test]
fn test_map_without_client_is_heightmap_only() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);

    let outcome = fx.run(None);
    assert!(outcome.errors.is_empty());

    let manifest = manifest_of(&outcome, "now");
    let adak = manifest.get("adak").unwrap();
    assert!(adak.client_zip.is_none());
    assert_eq!(manifest.maps_heightmap_only, 1);
    assert_eq!(manifest.maps_with_minimaps, 0);

    let json = serde_json::to_value(&manifest).unwrap();
    assert!(json["maps"]["adak"]["client_zip"].is_null());
}

#[test]
fn test_invalid_client_is_degraded_not_error() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_raw_file("adak", "client.zip", b"definitely not a zip");

    let outcome = fx.run(None);
    assert!(outcome.errors.is_empty());
    assert!(outcome.records[0].client_zip.is_none());
    assert!(!fx.output.join("adak/client.zip").exists());
}

#[test]
fn test_removed_client_is_updated_and_stale_copy_deleted() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_client("adak", b"DDS minimap");
    let first = manifest_of(&fx.run(None), "first");

    fs::remove_file(fx.install.join("levels/adak/client.zip")).unwrap();
    let outcome = fx.run(Some(&first));

    let record = &outcome.records[0];
    assert_eq!(record.status, CollectionStatus::Updated);
    assert!(record.client_zip.is_none());
    assert_eq!(record.server_zip, first.get("adak").unwrap().server_zip);
    assert!(!fx.output.join("adak/client.zip").exists());
}

#[test]
fn test_corrupt_server_archive_is_soft_error() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_raw_file("broken", "server.zip", b"PK\x03\x04 truncated");
    fx.add_server("kashan_desert", &[5, 0, 6, 0, 7, 0, 8, 0]);

    let outcome = fx.run(None);

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("broken: server.zip validation failed"));
    assert!(outcome.has_errors());
    assert_eq!(outcome.maps_found(), 3);

    let manifest = manifest_of(&outcome, "now");
    assert!(manifest.get("broken").is_none());
    assert!(!fx.output.join("broken").exists());
}

#[test]
fn test_server_without_heightmap_is_soft_error() {
    let fx = Fixture::new();
    fx.add_raw_file("empty", "server.zip", &zip_bytes(&[("init.con", b"rem")]));
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);

    let outcome = fx.run(None);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.errors[0].contains("Missing HeightmapPrimary.raw"));
}

#[test]
fn test_no_candidates_is_fatal_and_writes_nothing() {
    let fx = Fixture::new();
    fx.map_dir("not_a_map");

    let result = collect(&fx.install, &fx.output, None);
    assert!(matches!(result, Err(Error::NoMapsFound(_))));
    assert!(!fx.output.exists());
}

#[test]
fn test_missing_levels_is_fatal() {
    let fx = Fixture::new();
    fs::remove_dir_all(fx.install.join("levels")).unwrap();

    let result = collect(&fx.install, &fx.output, None);
    assert!(matches!(result, Err(Error::LevelsDirMissing(_))));
}

#[test]
fn test_progress_reports_every_map_in_order() {
    let fx = Fixture::new();
    fx.add_server("b_map", &[1, 0, 2, 0, 3, 0, 4, 0]);
    fx.add_server("a_map", &[1, 0, 2, 0, 3, 0, 4, 0]);

    let mut seen = Vec::new();
    Collector::new(&fx.output)
        .with_progress(|p| seen.push((p.current, p.total, p.map_name)))
        .collect(&fx.install)
        .unwrap();

    assert_eq!(
        seen,
        vec![(1, 2, "a_map".to_string()), (2, 2, "b_map".to_string())]
    );
}

#[test]
fn test_persist_run_writes_manifest_and_report() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let outcome = fx.run(None);
    let report_path = fx.root.join("collection_report.txt");

    let persisted = persist_run(&outcome, &fx.output, &report_path, "2024-11-19T10:30:00Z");

    assert!(persisted.is_ok());
    assert!(matches!(persisted.manifest, Ok(true)));
    let manifest = CollectionManifest::load(&persisted.manifest_path).unwrap().unwrap();
    assert_eq!(manifest.collection_date, "2024-11-19T10:30:00Z");
    assert_eq!(fs::read_to_string(&report_path).unwrap(), persisted.report_text);
}

#[test]
fn test_unwritable_manifest_still_writes_report() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let outcome = fx.run(None);
    fs::create_dir_all(fx.output.join(MANIFEST_FILE_NAME)).unwrap();
    let report_path = fx.root.join("collection_report.txt");

    let persisted = persist_run(&outcome, &fx.output, &report_path, "now");

    assert!(persisted.manifest.is_err());
    assert!(persisted.report.is_ok());
    assert!(fs::read_to_string(&report_path).unwrap().contains("[+] adak"));
}

#[test]
fn test_unwritable_report_still_writes_manifest() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let outcome = fx.run(None);
    fs::write(fx.root.join("blocker"), b"a file, not a directory").unwrap();
    let report_path = fx.root.join("blocker/collection_report.txt");

    let persisted = persist_run(&outcome, &fx.output, &report_path, "now");

    assert!(persisted.report.is_err());
    assert!(matches!(persisted.manifest, Ok(true)));
    assert!(CollectionManifest::load(&persisted.manifest_path).unwrap().is_some());
    assert!(persisted.report_text.contains("[+] adak"));
}

#[test]
fn test_empty_run_keeps_previous_manifest() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let report_path = fx.root.join("collection_report.txt");
    persist_run(&fx.run(None), &fx.output, &report_path, "first");

    let failed = CollectionOutcome {
        records: Vec::new(),
        errors: vec!["adak: server.zip validation failed: Not a valid zip file".to_string()],
    };
    let persisted = persist_run(&failed, &fx.output, &report_path, "second");

    assert!(matches!(persisted.manifest, Ok(false)));
    let manifest = CollectionManifest::load(&persisted.manifest_path).unwrap().unwrap();
    assert_eq!(manifest.collection_date, "first");
    assert!(fs::read_to_string(&report_path).unwrap().contains("  ✗ Errors: 1"));
}

#[test]
fn test_corrupt_manifest_restarts_collection() {
    let fx = Fixture::new();
    fx.add_server("adak", &[1, 0, 2, 0, 3, 0, 4, 0]);
    let report_path = fx.root.join("collection_report.txt");
    let persisted = persist_run(&fx.run(None), &fx.output, &report_path, "first");

    fs::write(&persisted.manifest_path, b"{ \"maps\": truncated").unwrap();
    let previous = CollectionManifest::load_or_discard(&persisted.manifest_path);
    assert!(previous.is_none());

    let outcome = fx.run(previous.as_ref());
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.records[0].status, CollectionStatus::New);
}
