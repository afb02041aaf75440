use mapserve::http::source::FileSource;
use std::io::{ErrorKind, Write};

fn ten_byte_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"0123456789").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_len() {
    let file = ten_byte_file();
    let source = FileSource::new(file.path());

    assert_eq!(source.len().unwrap(), 10);
}

#[test]
fn test_map_whole_file() {
    let file = ten_byte_file();
    let region = FileSource::new(file.path()).map(0, 10).unwrap();

    assert_eq!(&region[..], b"0123456789");
    assert_eq!(region.start(), 0);
}

#[test]
fn test_map_unaligned_span() {
    let file = ten_byte_file();
    let region = FileSource::new(file.path()).map(2, 5).unwrap();

    assert_eq!(region.as_bytes(), b"234");
    assert_eq!(region.start(), 2);
}

#[test]
fn test_map_past_end_fails() {
    let file = ten_byte_file();
    let err = FileSource::new(file.path()).map(9999, 10005).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_map_reversed_span_fails() {
    let file = ten_byte_file();
    let err = FileSource::new(file.path()).map(5, 2).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_map_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileSource::new(dir.path().join("nope.bin"));

    assert_eq!(source.map(0, 1).unwrap_err().kind(), ErrorKind::NotFound);
    assert!(source.len().is_err());
}

#[test]
fn test_map_empty_span() {
    let file = ten_byte_file();
    let region = FileSource::new(file.path()).map(4, 4).unwrap();

    assert!(region.is_empty());
}

#[test]
fn test_region_clones_share_mapping() {
    let file = ten_byte_file();
    let region = FileSource::new(file.path()).map(1, 4).unwrap();
    let copy = region.clone();
    drop(region);

    assert_eq!(&copy[..], b"123");
}
