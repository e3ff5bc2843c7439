use super::*;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "brandwave-source-{tag}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn dir_source_reads_json_by_id() {
    let dir = temp_dir("read");
    std::fs::write(dir.join("wave-bars.json"), "{}").unwrap();
    std::fs::write(dir.join("notes.txt"), "x").unwrap();
    std::fs::write(dir.join("bad_name.json"), "{}").unwrap();

    let src = DirSource::new(&dir);
    let id = TemplateId::parse("wave-bars").unwrap();
    assert_eq!(src.fetch(&id).unwrap(), "{}");
    assert_eq!(src.list_ids(), vec!["wave-bars".to_owned()]);

    let missing = TemplateId::parse("nope").unwrap();
    assert_eq!(
        src.fetch(&missing),
        Err(SourceError::NotFound("nope".to_owned()))
    );
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dir_source_missing_root_lists_nothing() {
    let src = DirSource::new("/definitely/not/a/real/brandwave/dir");
    assert!(src.list_ids().is_empty());
}

#[test]
fn memory_source_round_trip() {
    let src = MemorySource::new();
    src.insert("b", "two");
    src.insert("a", "one");
    assert_eq!(src.list_ids(), vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(src.fetch(&TemplateId::parse("a").unwrap()).unwrap(), "one");
    assert!(src.remove("a"));
    assert!(src.fetch(&TemplateId::parse("a").unwrap()).is_err());
}
