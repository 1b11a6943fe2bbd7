use super::*;
use crate::test_support::zip_of;

#[test]
fn extracts_named_entries() {
    let bytes = zip_of(&[("000000.jpg", &b"first"[..]), ("000001.jpg", &b"second"[..])]);
    let mut bundle = FrameBundle::open(&bytes, 1024).unwrap();
    assert_eq!(bundle.len(), 2);
    assert!(!bundle.is_empty());
    assert_eq!(bundle.extract("000001.jpg").unwrap(), b"second");
    assert_eq!(bundle.extract("000000.jpg").unwrap(), b"first");
    // Entries can be read again in any order.
    assert_eq!(bundle.extract("000001.jpg").unwrap(), b"second");
}

#[test]
fn missing_entry_is_malformed_bundle() {
    let bytes = zip_of(&[("001.jpg", &b"x"[..])]);
    let mut bundle = FrameBundle::open(&bytes, 1024).unwrap();
    match bundle.extract("000.jpg").unwrap_err() {
        RelayError::MalformedBundle(msg) => assert!(msg.contains("000.jpg"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn garbage_is_not_a_bundle() {
    let err = FrameBundle::open(b"definitely not a zip", 1024)
        .err()
        .unwrap();
    assert!(matches!(err, RelayError::MalformedBundle(_)), "{err}");
}

#[test]
fn oversized_entry_hits_limit() {
    let big = vec![7u8; 64];
    let bytes = zip_of(&[("big.jpg", big.as_slice())]);
    let mut bundle = FrameBundle::open(&bytes, 16).unwrap();
    assert!(matches!(
        bundle.extract("big.jpg"),
        Err(RelayError::LimitExceeded(_))
    ));
}
