use super::*;

#[test]
fn work_id_accepts_digits_and_trims() {
    let id = WorkId::parse(" 555555 ").unwrap();
    assert_eq!(id.as_str(), "555555");
    assert_eq!(id.to_string(), "555555");
    assert_eq!(id.referer(), "https://www.pixiv.net/artworks/555555");
    assert_eq!("42".parse::<WorkId>().unwrap().as_str(), "42");
}

#[test]
fn work_id_rejects_non_numeric() {
    for raw in ["", "   ", "12ab", "-1", "1.5", "１２", "12 34"] {
        let err = WorkId::parse(raw).unwrap_err();
        assert!(
            matches!(err, RelayError::InvalidInput { field: InputField::Work, .. }),
            "{raw:?}: {err}"
        );
    }
}

#[test]
fn work_id_length_cap_stays_within_u64() {
    let longest = WorkId::parse(&"9".repeat(19)).unwrap();
    assert!(longest.as_str().parse::<u64>().is_ok());

    let err = WorkId::parse(&"9".repeat(20)).unwrap_err();
    assert!(err.to_string().contains("too long"), "{err}");
}

#[test]
fn page_defaults_to_zero() {
    assert_eq!(PageIndex::parse(None).unwrap(), PageIndex(0));
    assert_eq!(PageIndex::parse(Some("")).unwrap(), PageIndex(0));
    assert_eq!(PageIndex::parse(Some("  ")).unwrap(), PageIndex(0));
}

#[test]
fn page_rejects_negative_and_garbage() {
    for raw in ["-1", "x", "1.0", "2e3"] {
        let err = PageIndex::parse(Some(raw)).unwrap_err();
        assert!(
            matches!(err, RelayError::InvalidInput { field: InputField::Page, .. }),
            "{raw:?}: {err}"
        );
    }
}

#[test]
fn page_select_reports_bounds() {
    let pages = ["a", "b", "c"];
    assert_eq!(*PageIndex(2).select(&pages).unwrap(), "c");
    match PageIndex(3).select(&pages).unwrap_err() {
        RelayError::PageOutOfRange { page, len } => {
            assert_eq!(page, 3);
            assert_eq!(len, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(PageIndex(0).select::<&str>(&[]).is_err());
}
