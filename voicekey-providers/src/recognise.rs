use crate::request::{Body, HttpRequest};
use voicekey_core::types::AudioArtifact;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub base_url: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://rashchenko.xyz:443".into(),
        }
    }
}

/// Fresh dictation: uploads the audio plus the smart-mode flag as text.
pub fn build_recognise_request(
    cfg: &RecognitionConfig,
    artifact: &AudioArtifact,
    smart_mode: bool,
) -> HttpRequest {
    let boundary = format!("Boundary-{}", uuid::Uuid::new_v4());

    let mut body: Vec<u8> = Vec::new();
    append_file(
        &mut body,
        &boundary,
        "m4a_file",
        &artifact.upload_file_name(),
        artifact.format.codec.mime_type(),
        &artifact.bytes,
    );
    append_field(&mut body, &boundary, "smart_mode", bool_text(smart_mode));
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    multipart_post(join_url(&cfg.base_url, "/recognise"), boundary, body)
}

/// Voice-driven revision: uploads the audio plus the transcript to revise.
pub fn build_edit_request(
    cfg: &RecognitionConfig,
    artifact: &AudioArtifact,
    prior_text: &str,
) -> HttpRequest {
    let boundary = format!("Boundary-{}", uuid::Uuid::new_v4());

    let mut body: Vec<u8> = Vec::new();
    append_file(
        &mut body,
        &boundary,
        "m4a_file",
        &artifact.upload_file_name(),
        artifact.format.codec.mime_type(),
        &artifact.bytes,
    );
    append_field(&mut body, &boundary, "text", prior_text);
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    multipart_post(join_url(&cfg.base_url, "/edit"), boundary, body)
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn multipart_post(url: String, boundary: String, bytes: Vec<u8>) -> HttpRequest {
    HttpRequest {
        method: "POST".into(),
        url,
        headers: vec![
            (
                "Content-Type".into(),
                format!("multipart/form-data; boundary={}", boundary),
            ),
            ("Accept".into(), "application/json".into()),
        ],
        body: Body::MultipartFormData { boundary, bytes },
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

fn append_field(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

fn append_file(
    body: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    filename: &str,
    mime_type: &str,
    bytes: &[u8],
) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}
