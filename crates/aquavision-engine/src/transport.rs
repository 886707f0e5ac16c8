use aquavision_contracts::image::ImageData;
use aquavision_contracts::outcome::IdentifyError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    InlineImage(ImageData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    /// JSON text constrained by a response schema.
    Json { schema: Value },
    /// Image parts only.
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<RequestPart>,
    pub output: OutputMode,
}

impl GenerateRequest {
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                RequestPart::Text(text) => Some(text.as_str()),
                RequestPart::InlineImage(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    /// Concatenated text parts of the first candidate, `None` when blank.
    pub text: Option<String>,
    pub images: Vec<ImageData>,
    /// Candidate finish reason, or the prompt block reason when nothing was generated.
    pub finish_reason: Option<String>,
}

/// Seam over the hosted model. Implementations are untrusted text/image generators.
pub trait ModelTransport: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Marks a request that ran out of time after every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request timed out after {seconds}s")]
pub struct TransportTimeout {
    pub seconds: u64,
}

/// Maps a transport failure onto the identification error taxonomy.
pub fn classify_transport_error(err: &anyhow::Error, timeout_s: u64) -> IdentifyError {
    if let Some(timeout) = err.downcast_ref::<TransportTimeout>() {
        return IdentifyError::Timeout {
            seconds: timeout.seconds,
        };
    }
    for cause in err.chain() {
        if cause
            .downcast_ref::<reqwest::Error>()
            .map(reqwest::Error::is_timeout)
            .unwrap_or(false)
        {
            return IdentifyError::Timeout { seconds: timeout_s };
        }
    }
    IdentifyError::NetworkOrPlatform(error_chain_text(err, 400))
}

pub(crate) fn is_retryable_transport_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .map(|reqwest_err| {
                reqwest_err.is_timeout() || reqwest_err.is_connect() || reqwest_err.is_request()
            })
            .unwrap_or(false)
    })
}

pub(crate) fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts.last().map(|existing| existing == trimmed).unwrap_or(false) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
