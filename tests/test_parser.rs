use mapserve::http::parser::{MAX_HEAD_LEN, MAX_LINE_LEN, ParseError, RequestReader};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn test_reader_lf_split_across_reads() {
    let (mut client, server) = tokio::io::duplex(1024);
    let mut reader = RequestReader::new(server);

    client.write_all(b"GET / HTTP/1.1\r").await.unwrap();
    assert_eq!(reader.next_line().await.unwrap().unwrap(), "GET / HTTP/1.1");

    client.write_all(b"\nHost: example.com\r\n\r\n").await.unwrap();
    assert_eq!(reader.next_line().await.unwrap().unwrap(), "Host: example.com");
    assert_eq!(reader.next_line().await.unwrap().unwrap(), "");
}

#[tokio::test]
async fn test_reader_bare_cr_lines() {
    let input: &[u8] = b"GET / HTTP/1.1\rRange: bytes=1-2\r\r";
    let mut reader = RequestReader::new(input);

    assert_eq!(reader.next_line().await.unwrap().unwrap(), "GET / HTTP/1.1");
    assert_eq!(reader.next_line().await.unwrap().unwrap(), "Range: bytes=1-2");
    assert_eq!(reader.next_line().await.unwrap().unwrap(), "");
}

#[tokio::test]
async fn test_reader_line_byte_at_a_time() {
    let (mut client, server) = tokio::io::duplex(16);
    let mut reader = RequestReader::new(server);

    let writer = tokio::spawn(async move {
        for byte in b"GET /x HTTP/1.1\r\n" {
            client.write_all(&[*byte]).await.unwrap();
        }
        client
    });

    assert_eq!(reader.next_line().await.unwrap().unwrap(), "GET /x HTTP/1.1");
    drop(writer.await.unwrap());
    assert!(reader.next_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reader_eof_mid_line() {
    let input: &[u8] = b"GET / HTT";
    let mut reader = RequestReader::new(input);

    assert!(reader.next_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reader_rejects_overlong_line() {
    let input = vec![b'a'; MAX_LINE_LEN + 2048];
    let mut reader = RequestReader::new(input.as_slice());

    let err = reader.next_line().await.unwrap_err();
    assert_eq!(err.downcast_ref::<ParseError>(), Some(&ParseError::LineTooLong));
}

#[tokio::test]
async fn test_reader_rejects_head_of_many_short_lines() {
    let mut input = b"GET / HTTP/1.1\r\n".to_vec();
    for i in 0..20_000 {
        input.extend_from_slice(format!("X-{i}: y\r\n").as_bytes());
    }
    input.extend_from_slice(b"\r\n");
    assert!(input.len() > MAX_HEAD_LEN);

    let mut reader = RequestReader::new(input.as_slice());
    let mut lines = 0;
    let err = loop {
        match reader.next_line().await {
            Ok(Some(_)) => lines += 1,
            Ok(None) => panic!("head of {} bytes was accepted", input.len()),
            Err(e) => break e,
        }
    };

    assert_eq!(err.downcast_ref::<ParseError>(), Some(&ParseError::HeadTooLarge));
    assert!(lines < 20_000);
}

#[tokio::test]
async fn test_reader_accepts_head_just_under_limit() {
    let mut input = b"GET / HTTP/1.1\r\n".to_vec();
    while input.len() < MAX_HEAD_LEN - 64 {
        input.extend_from_slice(b"X-Pad: yyyyyyyyyyyyyyyy\r\n");
    }
    input.extend_from_slice(b"\r\n");

    let mut reader = RequestReader::new(input.as_slice());
    let mut last = None;
    while let Some(line) = reader.next_line().await.unwrap() {
        last = Some(line);
    }

    assert_eq!(last.as_deref(), Some(""));
}
