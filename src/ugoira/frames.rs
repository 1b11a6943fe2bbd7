use serde::{Deserialize, Serialize};

/// One bundle member and how long it stays on screen.
///
/// Serialized with pixiv's field names (`file`, `delay`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Entry name inside the bundle.
    #[serde(rename = "file")]
    pub name: String,
    /// Display duration in milliseconds.
    #[serde(rename = "delay")]
    pub delay_ms: u32,
}

impl FrameDescriptor {
    /// Build a descriptor.
    pub fn new(name: impl Into<String>, delay_ms: u32) -> Self {
        Self {
            name: name.into(),
            delay_ms,
        }
    }
}

/// Everything needed to reconstruct one animated work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UgoiraMeta {
    /// URL of the zip bundle holding every frame.
    pub bundle_url: String,
    /// Frames in playback order.
    pub frames: Vec<FrameDescriptor>,
}
