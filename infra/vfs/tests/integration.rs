use fhub_domain::entry::EntryKind;
use fhub_vfs::{Vfs, VfsError, validate_fingerprint};
use tempfile::TempDir;

async fn vfs() -> (TempDir, Vfs) {
    let temp = TempDir::new().unwrap();
    let vfs = Vfs::builder().root(temp.path()).connect().await.unwrap();
    (temp, vfs)
}

#[tokio::test]
async fn path_traversal_blocked() {
    let (_temp, vfs) = vfs().await;

    assert!(matches!(vfs.resolve("/../etc/passwd"), Err(VfsError::PathEscaped { .. })));
    assert!(matches!(vfs.resolve("/foo/../../bar"), Err(VfsError::PathEscaped { .. })));
    assert!(vfs.resolve("/foo/../bar").is_ok());
}

#[tokio::test]
async fn traversal_attempt_has_no_side_effects() {
    let (temp, vfs) = vfs().await;

    assert!(vfs.mkdir("/../outside").await.is_err());
    assert!(!temp.path().parent().unwrap().join("outside").exists());
}

#[tokio::test]
async fn create_then_read_roundtrip() {
    let (_temp, vfs) = vfs().await;

    let (size, mtime) = vfs.create_file("/notes/hello.txt", b"hello").await.unwrap();
    assert_eq!(size, 5);
    assert!(mtime > 0);

    let (content, size, _) = vfs.read_text("/notes/hello.txt").await.unwrap();
    assert_eq!(content, "hello");
    assert_eq!(size, 5);
}

#[tokio::test]
async fn create_refuses_existing_target() {
    let (_temp, vfs) = vfs().await;

    vfs.create_file("/a.txt", b"x").await.unwrap();
    let err = vfs.create_file("/a.txt", b"y").await.unwrap_err();
    assert!(matches!(err, VfsError::AlreadyExists { .. }));

    // The original content survives the refused overwrite.
    let (content, _, _) = vfs.read_text("/a.txt").await.unwrap();
    assert_eq!(content, "x");
}

#[tokio::test]
async fn read_text_rejects_directories() {
    let (_temp, vfs) = vfs().await;

    vfs.mkdir("/docs").await.unwrap();
    assert!(matches!(
        vfs.read_text("/docs").await,
        Err(VfsError::IsADirectory { .. })
    ));
}

#[tokio::test]
async fn mkdir_then_remove_restores_state() {
    let (_temp, vfs) = vfs().await;

    vfs.mkdir("/a/b/c").await.unwrap();
    assert!(vfs.exists("/a/b/c").unwrap());

    vfs.remove("/a").await.unwrap();
    assert!(!vfs.exists("/a").unwrap());

    assert!(matches!(vfs.remove("/a").await, Err(VfsError::NotFound { .. })));
}

#[tokio::test]
async fn mkdir_conflicts() {
    let (_temp, vfs) = vfs().await;

    vfs.mkdir("/d").await.unwrap();
    assert!(matches!(vfs.mkdir("/d").await, Err(VfsError::AlreadyExists { .. })));

    vfs.create_file("/f", b"").await.unwrap();
    assert!(matches!(vfs.mkdir("/f").await, Err(VfsError::Conflict { .. })));
}

#[tokio::test]
async fn rename_moves_and_restores() {
    let (_temp, vfs) = vfs().await;

    vfs.create_file("/a.txt", b"payload").await.unwrap();
    vfs.rename("/a.txt", "/sub/b.txt").await.unwrap();
    assert!(!vfs.exists("/a.txt").unwrap());
    assert_eq!(vfs.read_text("/sub/b.txt").await.unwrap().0, "payload");

    // move(a, b) then move(b, a) restores
    vfs.rename("/sub/b.txt", "/a.txt").await.unwrap();
    assert_eq!(vfs.read_text("/a.txt").await.unwrap().0, "payload");
}

#[tokio::test]
async fn rename_rejects_missing_source_and_occupied_destination() {
    let (_temp, vfs) = vfs().await;

    assert!(matches!(
        vfs.rename("/ghost", "/dst").await,
        Err(VfsError::NotFound { .. })
    ));

    vfs.create_file("/src", b"1").await.unwrap();
    vfs.create_file("/dst", b"2").await.unwrap();
    assert!(matches!(
        vfs.rename("/src", "/dst").await,
        Err(VfsError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn copy_is_recursive() {
    let (_temp, vfs) = vfs().await;

    vfs.create_file("/tree/a.txt", b"A").await.unwrap();
    vfs.create_file("/tree/deep/b.txt", b"B").await.unwrap();

    vfs.copy("/tree", "/tree2").await.unwrap();

    assert_eq!(vfs.read_text("/tree2/a.txt").await.unwrap().0, "A");
    assert_eq!(vfs.read_text("/tree2/deep/b.txt").await.unwrap().0, "B");
    // Source intact.
    assert_eq!(vfs.read_text("/tree/a.txt").await.unwrap().0, "A");
}

#[tokio::test]
async fn list_sorts_dirs_first_then_natural() {
    let (_temp, vfs) = vfs().await;

    vfs.create_file("/dir/z.txt", b"z").await.unwrap();
    vfs.create_file("/dir/img10.png", b"0").await.unwrap();
    vfs.create_file("/dir/img2.png", b"0").await.unwrap();
    vfs.mkdir("/dir/beta").await.unwrap();
    vfs.mkdir("/dir/Alpha").await.unwrap();

    let entries = vfs.list("/dir").await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta", "img2.png", "img10.png", "z.txt"]);

    assert_eq!(entries[0].kind, EntryKind::Dir);
    assert_eq!(entries[0].size, None);
    assert_eq!(entries[2].kind, EntryKind::File);
    assert_eq!(entries[2].size, Some(1));

    // Listings are stable given identical contents.
    let again = vfs.list("/dir").await.unwrap();
    assert_eq!(entries, again);
}

#[tokio::test]
async fn list_rejects_files_and_missing_dirs() {
    let (_temp, vfs) = vfs().await;

    assert!(matches!(vfs.list("/missing").await, Err(VfsError::NotFound { .. })));

    vfs.create_file("/plain.txt", b"").await.unwrap();
    assert!(matches!(
        vfs.list("/plain.txt").await,
        Err(VfsError::NotADirectory { .. })
    ));
}

#[tokio::test]
async fn chunk_scratch_lifecycle() {
    let (_temp, vfs) = vfs().await;

    let dir = vfs.resolve("/incoming").unwrap();
    tokio::fs::create_dir_all(&dir).await.unwrap();

    vfs.write_chunk(&dir, "fp", 2, b"CC").await.unwrap();
    vfs.write_chunk(&dir, "fp", 0, b"AA").await.unwrap();
    vfs.write_chunk(&dir, "other", 0, b"XX").await.unwrap();

    assert_eq!(vfs.chunk_indices(&dir, "fp").await.unwrap(), vec![0, 2]);
    assert_eq!(vfs.read_chunk(&dir, "fp", 0).await.unwrap(), b"AA");

    // Overwriting a chunk is idempotent.
    vfs.write_chunk(&dir, "fp", 0, b"AA").await.unwrap();
    assert_eq!(vfs.chunk_indices(&dir, "fp").await.unwrap(), vec![0, 2]);

    vfs.purge_chunks(&dir, "fp").await.unwrap();
    assert_eq!(vfs.chunk_indices(&dir, "fp").await.unwrap(), Vec::<u32>::new());

    // Scratch survives because "other" still has a chunk in flight.
    assert!(dir.join(".upload-temp").exists());
    vfs.purge_chunks(&dir, "other").await.unwrap();
    assert!(!dir.join(".upload-temp").exists());
}

#[tokio::test]
async fn chunk_indices_ignore_foreign_names() {
    let (_temp, vfs) = vfs().await;

    let dir = vfs.resolve("/d").unwrap();
    tokio::fs::create_dir_all(dir.join(".upload-temp")).await.unwrap();
    tokio::fs::write(dir.join(".upload-temp/fp.0"), b"a").await.unwrap();
    tokio::fs::write(dir.join(".upload-temp/fp.junk"), b"b").await.unwrap();
    tokio::fs::write(dir.join(".upload-temp/fpx.1"), b"c").await.unwrap();

    assert_eq!(vfs.chunk_indices(&dir, "fp").await.unwrap(), vec![0]);
}

#[test]
fn fingerprint_validation_is_strict() {
    assert!(validate_fingerprint("ok-fingerprint_1.2").is_ok());
    assert!(validate_fingerprint("../escape").is_err());
    assert!(validate_fingerprint("").is_err());
}
