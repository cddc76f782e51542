use crate::error::{ArchiveError, Error};
use crate::extraction::*;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a ZIP archive containing the given entries, in order
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    create_zip_archive_with(archive_path, files, ::zip::CompressionMethod::Stored);
}

fn create_zip_archive_with(
    archive_path: &Path,
    files: &[(&str, &[u8])],
    method: ::zip::CompressionMethod,
) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options = ::zip::write::FileOptions::default().compression_method(method);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn extracts_single_matching_entry_with_exact_bytes() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("test.zip");
    let content = b"<data>This is a test file.</data>";
    create_zip_archive(&archive, &[("test.xml", content)]);

    let out_dir = temp.path().join("out");
    let selection = extract_document(&archive, &out_dir, ".xml").unwrap();

    let path = selection.extracted.expect("entry should be extracted");
    assert_eq!(path, out_dir.join("test.xml"));
    assert_eq!(path.file_name().unwrap(), "test.xml");
    assert_eq!(std::fs::read(&path).unwrap(), content);
    assert_eq!(selection.match_count, 1);
}

#[test]
fn deflated_entries_are_decompressed() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("deflated.zip");
    let content = "<Document>".to_string() + &"<TermntdRcrd/>".repeat(500) + "</Document>";
    create_zip_archive_with(
        &archive,
        &[("DLTINS_20210117_01of01.xml", content.as_bytes())],
        ::zip::CompressionMethod::Deflated,
    );

    let selection = extract_document(&archive, temp.path(), ".xml").unwrap();
    let path = selection.extracted.unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), content);
}

#[test]
fn no_matching_entry_is_absent() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("test.zip");
    create_zip_archive(&archive, &[("readme.txt", b"hello"), ("data.json", b"{}")]);

    let selection = extract_document(&archive, temp.path(), ".xml").unwrap();
    assert_eq!(selection.extracted, None);
    assert_eq!(selection.match_count, 0);
    assert!(!temp.path().join("readme.txt").exists());
}

#[test]
fn first_matching_entry_in_archive_order_wins() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("multi.zip");
    create_zip_archive(
        &archive,
        &[
            ("notes.txt", b"skip me"),
            ("b_second.xml", b"<second/>"),
            ("a_third.xml", b"<third/>"),
        ],
    );

    let out_dir = temp.path().join("out");
    let selection = extract_document(&archive, &out_dir, ".xml").unwrap();

    assert_eq!(selection.match_count, 2);
    assert_eq!(selection.extracted, Some(out_dir.join("b_second.xml")));
    assert!(!out_dir.join("a_third.xml").exists());
    assert!(!out_dir.join("notes.txt").exists());
}

#[test]
fn nested_entry_keeps_relative_name() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("nested.zip");
    create_zip_archive(&archive, &[("inner/dir/records.xml", b"<r/>")]);

    let selection = extract_document(&archive, temp.path(), ".xml").unwrap();
    let expected = temp.path().join("inner").join("dir").join("records.xml");
    assert_eq!(selection.extracted, Some(expected.clone()));
    assert_eq!(std::fs::read(expected).unwrap(), b"<r/>");
}

#[test]
fn suffix_match_is_case_sensitive() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("upper.zip");
    create_zip_archive(&archive, &[("RECORDS.XML", b"<r/>")]);

    let selection = extract_document(&archive, temp.path(), ".xml").unwrap();
    assert_eq!(selection.extracted, None);
}

#[test]
fn directory_entries_never_match() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("dirs.zip");
    {
        let file = std::fs::File::create(&archive).unwrap();
        let mut writer = ::zip::ZipWriter::new(file);
        writer
            .add_directory("folder.xml/", ::zip::write::FileOptions::default())
            .unwrap();
        writer.finish().unwrap();
    }

    let selection = extract_document(&archive, temp.path(), ".xml/").unwrap();
    assert_eq!(selection.extracted, None);
    assert_eq!(selection.match_count, 0);
}

#[test]
fn empty_archive_is_archive_error() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("empty.zip");
    create_zip_archive(&archive, &[]);

    let err = extract_document(&archive, temp.path(), ".xml").unwrap_err();
    assert!(matches!(err, Error::Archive(ArchiveError::Empty { .. })));
}

#[test]
fn corrupt_archive_is_archive_error() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("corrupt.zip");
    std::fs::write(&archive, b"this is definitely not a zip archive").unwrap();

    let err = extract_document(&archive, temp.path(), ".xml").unwrap_err();
    match err {
        Error::Archive(ArchiveError::Unreadable { archive: path, .. }) => assert_eq!(path, archive),
        other => panic!("expected unreadable archive, got {other:?}"),
    }
}

#[test]
fn missing_archive_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = extract_document(&temp.path().join("absent.zip"), temp.path(), ".xml").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn matching_entries_lists_indices_in_order() {
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("list.zip");
    create_zip_archive(
        &archive_path,
        &[("a.xml", b"1"), ("b.txt", b"2"), ("c.xml", b"3")],
    );

    let file = std::fs::File::open(&archive_path).unwrap();
    let mut archive = ::zip::ZipArchive::new(file).unwrap();
    let matches = ZipExtractor::matching_entries(&mut archive, &archive_path, ".xml").unwrap();
    assert_eq!(matches, vec![(0, "a.xml".to_string()), (2, "c.xml".to_string())]);
}
