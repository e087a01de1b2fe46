use thiserror::Error;
use url::Url;

pub const SCHEME: &str = "voicekey";
pub const DICTATION_HOST: &str = "dictation";
pub const SMART_MODE_PARAM: &str = "smartMode";

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("invalid activation url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unknown activation scheme: {0}")]
    UnknownScheme(String),
}

/// The one-shot launch message the extension sends the host. Carries the
/// session parameters and nothing else; it has no retention, so a launch
/// with no matching handoff record is a protocol error upstream, not
/// something this type can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationSignal {
    pub smart_mode: bool,
}

impl ActivationSignal {
    pub fn new(smart_mode: bool) -> Self {
        Self { smart_mode }
    }

    /// Any value other than the literal `true` (including a missing
    /// parameter) means smart mode off.
    pub fn parse(input: &str) -> Result<Self, SignalError> {
        let url = Url::parse(input)?;
        if url.scheme() != SCHEME {
            return Err(SignalError::UnknownScheme(url.scheme().to_string()));
        }

        let smart_mode = url
            .query_pairs()
            .find(|(name, _)| name == SMART_MODE_PARAM)
            .map(|(_, value)| value == "true")
            .unwrap_or(false);

        Ok(Self { smart_mode })
    }

    pub fn to_url(&self) -> String {
        format!(
            "{}://{}?{}={}",
            SCHEME, DICTATION_HOST, SMART_MODE_PARAM, self.smart_mode
        )
    }
}
