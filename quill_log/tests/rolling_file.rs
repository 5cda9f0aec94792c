use std::fs;

#[test]
fn init_writes_json_to_rolling_file() {
    let dir = tempfile::tempdir().unwrap();
    let handle = quill_log::init(Some(dir.path()), "info", true).unwrap();
    tracing::info!(answer = 42, "hello from the test");
    tracing::debug!("filtered out");

    handle.set_level("debug").unwrap();
    tracing::debug!("now visible");

    let files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(quill_log::FILE_NAME))
        .collect();
    assert_eq!(files.len(), 1);
    let content = fs::read_to_string(files[0].path()).unwrap();
    assert!(content.contains("hello from the test"));
    assert!(content.contains("now visible"));
    assert!(!content.contains("filtered out"));
    assert!(content.lines().all(|l| l.starts_with('{')));

    assert!(quill_log::init(None, "info", false).is_err());
}
