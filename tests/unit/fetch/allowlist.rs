use super::*;

#[test]
fn pixiv_defaults_accept_image_host() {
    let list = OutboundAllowlist::pixiv();
    let url = list
        .check("https://i.pximg.net/img-original/img/2024/01/01/00/00/00/999999_p0.png")
        .unwrap();
    assert_eq!(url.host_str(), Some("i.pximg.net"));
    assert!(list.check("https://I.PXIMG.NET/x.png").is_ok());
}

#[test]
fn rejects_foreign_hosts_and_schemes() {
    let list = OutboundAllowlist::pixiv();
    for url in [
        "https://evil.example/x.png",
        "http://i.pximg.net/x.png",
        "file:///etc/passwd",
        "https://i.pximg.net.evil.example/x.png",
        "not a url",
    ] {
        let err = list.check(url).unwrap_err();
        assert!(matches!(err, RelayError::UpstreamUnavailable(_)), "{url}: {err}");
    }
}

#[test]
fn wildcard_matches_subdomains_only() {
    let list = OutboundAllowlist::new().allow_host("*.pximg.net");
    assert!(list.check("https://i.pximg.net/a").is_ok());
    assert!(list.check("https://a.b.pximg.net/a").is_ok());
    assert!(list.check("https://pximg.net/a").is_err());
    assert!(list.check("https://xpximg.net/a").is_err());
}

#[test]
fn extra_scheme_for_local_servers() {
    let list = OutboundAllowlist::new()
        .allow_host("127.0.0.1")
        .allow_scheme("http");
    assert!(list.check("http://127.0.0.1:8080/bundle.zip").is_ok());
}
