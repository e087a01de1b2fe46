use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RecognitionResponse {
    // The backend may answer without a transcript; callers decide what a
    // missing transcript means, decoding must not fail on it.
    #[serde(default)]
    pub transcript: Option<String>,
}

pub fn parse_recognition(body: &[u8]) -> anyhow::Result<Option<String>> {
    let resp: RecognitionResponse =
        serde_json::from_slice(body).context("decode recognition JSON")?;
    Ok(resp.transcript)
}
