/// Failure reported by an [`AudioHost`](super::AudioHost) while opening or wiring capture.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("microphone access denied")]
    PermissionDenied,

    #[error("no audio input device available")]
    NoDevice,

    #[error("audio device failure: {0}")]
    Device(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Permission denial, missing device or device failure. The host error is kept as-is.
    #[error(transparent)]
    CaptureUnavailable(#[from] CaptureError),

    #[error("capture session already active")]
    AlreadyActive,

    #[error("invalid analyser config: {0}")]
    InvalidConfig(String),
}
