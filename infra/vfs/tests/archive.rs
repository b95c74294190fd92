use async_zip::base::read::seek::ZipFileReader;
use fhub_vfs::{ArchiveItem, Vfs, stream_archive};
use futures_util::StreamExt;
use tempfile::TempDir;

async fn collect_stream(
    mut stream: impl futures_util::Stream<Item = std::io::Result<bytes::Bytes>> + Unpin,
) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn directory_archive_contains_nested_files() {
    let temp = TempDir::new().unwrap();
    let vfs = Vfs::builder().root(temp.path()).connect().await.unwrap();
    vfs.create_file("/folder/a.txt", b"hi").await.unwrap();
    vfs.create_file("/folder/sub/b.txt", b"yo").await.unwrap();

    let items =
        vec![ArchiveItem { name: "folder".to_owned(), path: vfs.resolve("/folder").unwrap() }];
    let bytes = collect_stream(stream_archive(items)).await;

    let cursor = futures_util::io::Cursor::new(bytes);
    let mut zip = ZipFileReader::new(cursor).await.unwrap();

    let mut names: Vec<String> = zip
        .file()
        .entries()
        .iter()
        .map(|e| e.filename().as_str().unwrap().to_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["folder/a.txt", "folder/sub/b.txt"]);

    for index in 0..2 {
        let mut content = String::new();
        let mut reader = zip.reader_with_entry(index).await.unwrap();
        reader.read_to_string_checked(&mut content).await.unwrap();
        assert!(content == "hi" || content == "yo");
    }
}

#[tokio::test]
async fn multi_item_archive_mixes_files_and_trees() {
    let temp = TempDir::new().unwrap();
    let vfs = Vfs::builder().root(temp.path()).connect().await.unwrap();
    vfs.create_file("/one.txt", b"1").await.unwrap();
    vfs.create_file("/nested/two.txt", b"2").await.unwrap();

    let items = vec![
        ArchiveItem { name: "one.txt".to_owned(), path: vfs.resolve("/one.txt").unwrap() },
        ArchiveItem { name: "nested".to_owned(), path: vfs.resolve("/nested").unwrap() },
    ];
    let bytes = collect_stream(stream_archive(items)).await;

    let cursor = futures_util::io::Cursor::new(bytes);
    let zip = ZipFileReader::new(cursor).await.unwrap();
    let mut names: Vec<String> = zip
        .file()
        .entries()
        .iter()
        .map(|e| e.filename().as_str().unwrap().to_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["nested/two.txt", "one.txt"]);
}

#[tokio::test]
async fn missing_item_aborts_stream_early() {
    let temp = TempDir::new().unwrap();
    let _vfs = Vfs::builder().root(temp.path()).connect().await.unwrap();

    let items = vec![ArchiveItem {
        name: "ghost".to_owned(),
        path: temp.path().join("does-not-exist"),
    }];
    let bytes = collect_stream(stream_archive(items)).await;

    // Nothing useful was produced; a ZIP central directory never appeared.
    let cursor = futures_util::io::Cursor::new(bytes);
    assert!(ZipFileReader::new(cursor).await.is_err());
}
