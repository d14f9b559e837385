/*!
 * Integration tests for rejected inputs and worker failures
 */

use seqsplit::error::{EXIT_FATAL, EXIT_PARTIAL};
use seqsplit::{split_file, SplitConfig, SplitError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GOOD: &str = "<?xml version=\"1.0\"?>\n<UniRef50>\n<entry id=\"1\">\n<name>a</name>\n</entry>\n<entry id=\"2\">\n<name>b</name>\n</entry>\n</UniRef50>\n";

fn config(outdir: &Path, num_chunks: usize) -> SplitConfig {
    SplitConfig {
        num_chunks,
        outdir: outdir.to_path_buf(),
        ..Default::default()
    }
}

fn source(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("db.xml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_source_not_found_produces_nothing() {
    let temp = TempDir::new().unwrap();
    let err = split_file(&temp.path().join("missing.xml"), &config(temp.path(), 2)).unwrap_err();
    assert!(matches!(err, SplitError::SourceNotFound(_)));
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_more_chunks_than_bytes() {
    let temp = TempDir::new().unwrap();
    let path = source(temp.path(), GOOD);
    let err = split_file(&path, &config(temp.path(), GOOD.len() + 1)).unwrap_err();
    assert!(matches!(err, SplitError::PlanDegenerate { .. }));
    assert!(!temp.path().join("cut_res_1.xml").exists());
}

#[test]
fn test_empty_source() {
    let temp = TempDir::new().unwrap();
    let path = source(temp.path(), "");
    let err = split_file(&path, &config(temp.path(), 1)).unwrap_err();
    assert!(matches!(err, SplitError::PlanDegenerate { size: 0, .. }));
}

#[test]
fn test_source_without_entries() {
    let temp = TempDir::new().unwrap();
    let path = source(temp.path(), "<?xml version=\"1.0\"?>\n<UniRef50>\n</UniRef50>\n");
    let err = split_file(&path, &config(temp.path(), 2)).unwrap_err();
    assert!(matches!(err, SplitError::NoEntries { .. }));
}

#[test]
fn test_truncated_source_rejected() {
    let temp = TempDir::new().unwrap();
    let truncated = GOOD.trim_end_matches("</UniRef50>\n");
    let path = source(temp.path(), truncated);
    let err = split_file(&path, &config(temp.path(), 2)).unwrap_err();
    match err {
        SplitError::MissingTrailer { expected } => assert_eq!(expected, "</UniRef50>"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!temp.path().join("cut_res_1.xml").exists());
}

#[test]
fn test_prolog_without_root() {
    let temp = TempDir::new().unwrap();
    let path = source(
        temp.path(),
        "<?xml version=\"1.0\"?>\n<entry id=\"1\">\n</entry>\n",
    );
    let err = split_file(&path, &config(temp.path(), 1)).unwrap_err();
    assert!(matches!(err, SplitError::MissingRootElement));
}

#[test]
fn test_missing_exclusion_file() {
    let temp = TempDir::new().unwrap();
    let path = source(temp.path(), GOOD);
    let mut cfg = config(temp.path(), 2);
    cfg.exclude_from = Some(temp.path().join("rules.txt"));
    let err = split_file(&path, &cfg).unwrap_err();
    assert!(matches!(err, SplitError::Filter(_)));
}

#[test]
fn test_unwritable_outdir_is_partial_failure() {
    let temp = TempDir::new().unwrap();
    let path = source(temp.path(), GOOD);
    // a regular file where the output directory should be
    let blocker = temp.path().join("out");
    fs::write(&blocker, "not a directory").unwrap();

    let err = split_file(&path, &config(&blocker, 2)).unwrap_err();
    assert!(matches!(err, SplitError::Worker { .. }), "got {:?}", err);
    assert_eq!(err.exit_code(), EXIT_PARTIAL);
}
