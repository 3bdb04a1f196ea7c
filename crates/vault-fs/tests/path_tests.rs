use vault_fs::NormalizedPath;

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("notes\\daily\\today.md");
    assert_eq!(path.as_str(), "notes/daily/today.md");
}

#[test]
fn test_join_onto_empty_root() {
    let root = NormalizedPath::new("");
    assert_eq!(root.join("a.md").as_str(), "a.md");
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("vault/notes");
    assert_eq!(base.join("a.md").as_str(), "vault/notes/a.md");
    assert_eq!(NormalizedPath::new("vault/").join("a.md").as_str(), "vault/a.md");
}

#[test]
fn test_file_name_and_extension() {
    let path = NormalizedPath::new("assets/diagram.excalidraw.md");
    assert_eq!(path.file_name(), Some("diagram.excalidraw.md"));
    assert_eq!(path.extension(), Some("md"));
}

#[test]
fn test_dotfile_has_no_extension() {
    let path = NormalizedPath::new("notes/.hidden");
    assert_eq!(path.extension(), None);
    assert_eq!(path.file_name(), Some(".hidden"));
}
