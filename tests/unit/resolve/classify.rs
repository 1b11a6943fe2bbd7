use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::ugoira::frames::FrameDescriptor;

enum AnimAnswer {
    Meta(UgoiraMeta),
    Status(u16),
    Network,
}

struct Scripted {
    anim: AnimAnswer,
    pages: Option<Vec<String>>,
    calls: Mutex<Vec<&'static str>>,
}

impl Scripted {
    fn new(anim: AnimAnswer, pages: Option<Vec<String>>) -> Self {
        Self {
            anim,
            pages,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolver for Scripted {
    async fn resolve_static(&self, _work: &WorkId) -> RelayResult<Vec<String>> {
        self.calls.lock().unwrap().push("static");
        self.pages
            .clone()
            .ok_or_else(|| RelayError::upstream("pages down"))
    }

    async fn resolve_animation(&self, work: &WorkId) -> RelayResult<UgoiraMeta> {
        self.calls.lock().unwrap().push("animation");
        match &self.anim {
            AnimAnswer::Meta(meta) => Ok(meta.clone()),
            AnimAnswer::Status(status) => Err(RelayError::UpstreamStatus {
                status: *status,
                url: format!("https://www.pixiv.net/ajax/illust/{work}/ugoira_meta"),
            }),
            AnimAnswer::Network => Err(RelayError::upstream("connection refused")),
        }
    }
}

fn work() -> WorkId {
    WorkId::parse("555555").unwrap()
}

#[tokio::test]
async fn animated_work_skips_static_lookup() {
    let meta = UgoiraMeta {
        bundle_url: "https://i.pximg.net/a.zip".to_owned(),
        frames: vec![FrameDescriptor::new("a.jpg", 100)],
    };
    let resolver = Scripted::new(AnimAnswer::Meta(meta.clone()), None);
    let classified = classify(&resolver, &work()).await.unwrap();
    assert_eq!(classified, Classified::Animated(meta));
    assert_eq!(resolver.calls(), vec!["animation"]);
}

async fn outcome_for_status(status: u16) -> ProbeOutcome {
    let resolver = Scripted::new(AnimAnswer::Status(status), Some(vec!["p0".to_owned()]));
    match classify(&resolver, &work()).await.unwrap() {
        Classified::Static { probe, .. } => probe,
        other => panic!("unexpected classification: {other:?}"),
    }
}

#[tokio::test]
async fn declined_lookup_falls_through_as_not_animated() {
    let pages = vec!["p0".to_owned(), "p1".to_owned()];
    let resolver = Scripted::new(AnimAnswer::Status(400), Some(pages.clone()));
    match classify(&resolver, &work()).await.unwrap() {
        Classified::Static { pages: got, probe } => {
            assert_eq!(got, pages);
            assert_eq!(probe.label(), "not-animated");
        }
        other => panic!("unexpected classification: {other:?}"),
    }
    assert_eq!(resolver.calls(), vec!["animation", "static"]);
}

#[tokio::test]
async fn network_failure_still_falls_through_but_is_tagged() {
    let resolver = Scripted::new(AnimAnswer::Network, Some(vec!["p0".to_owned()]));
    match classify(&resolver, &work()).await.unwrap() {
        Classified::Static { probe, .. } => {
            assert_eq!(probe.label(), "resolution-failed");
            assert!(matches!(probe, ProbeOutcome::ResolutionFailed(ref m) if m.contains("connection refused")));
        }
        other => panic!("unexpected classification: {other:?}"),
    }
}

#[tokio::test]
async fn client_statuses_mean_not_animated() {
    for status in [400, 403, 404] {
        let outcome = outcome_for_status(status).await;
        assert_eq!(outcome.label(), "not-animated", "status {status}");
    }
}

#[tokio::test]
async fn server_and_throttle_statuses_mean_resolution_failed() {
    for status in [500, 503, 408, 429] {
        let outcome = outcome_for_status(status).await;
        assert_eq!(outcome.label(), "resolution-failed", "status {status}");
        assert!(
            matches!(outcome, ProbeOutcome::ResolutionFailed(ref m) if m.contains(&status.to_string())),
            "status {status}: {outcome:?}"
        );
    }
}

#[test]
fn api_rejection_means_not_animated() {
    let outcome = ProbeOutcome::from_error(&RelayError::UpstreamRejected(
        "ugoira meta: not an ugoira".to_owned(),
    ));
    assert_eq!(outcome.label(), "not-animated");
}

#[tokio::test]
async fn static_failure_is_returned() {
    let resolver = Scripted::new(AnimAnswer::Status(404), None);
    let err = classify(&resolver, &work()).await.unwrap_err();
    assert!(err.is_upstream(), "{err}");
    assert_eq!(resolver.calls(), vec!["animation", "static"]);
}
