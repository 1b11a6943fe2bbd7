use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RelayError::invalid_input(InputField::Page, "x")
            .to_string()
            .contains("invalid input (page):")
    );
    assert!(
        RelayError::upstream("x")
            .to_string()
            .contains("upstream unavailable:")
    );
    assert!(
        RelayError::malformed_bundle("x")
            .to_string()
            .contains("malformed bundle:")
    );
    assert!(
        RelayError::unsupported_frame("x")
            .to_string()
            .contains("unsupported frame:")
    );
    assert!(RelayError::limit("x").to_string().contains("limit exceeded:"));
    assert!(RelayError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn page_out_of_range_names_page_and_len() {
    let msg = RelayError::PageOutOfRange { page: 3, len: 3 }.to_string();
    assert!(msg.contains("page 3"));
    assert!(msg.contains("3 pages"));
}

#[test]
fn client_and_upstream_classes_do_not_overlap() {
    let client = [
        RelayError::invalid_input(InputField::Work, "x"),
        RelayError::PageOutOfRange { page: 1, len: 1 },
        RelayError::limit("x"),
    ];
    for err in &client {
        assert!(err.is_client_error(), "{err}");
        assert!(!err.is_upstream(), "{err}");
    }

    let upstream = [
        RelayError::upstream("x"),
        RelayError::UpstreamRejected("x".to_owned()),
        RelayError::UpstreamStatus {
            status: 404,
            url: "https://example.invalid".to_owned(),
        },
    ];
    for err in &upstream {
        assert!(err.is_upstream(), "{err}");
        assert!(!err.is_client_error(), "{err}");
    }

    assert!(!RelayError::malformed_bundle("x").is_client_error());
    assert!(!RelayError::Cancelled.is_upstream());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RelayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
