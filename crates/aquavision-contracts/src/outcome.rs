use crate::report::IdentificationReport;

/// Failures surfaced by the identification layer.
///
/// `Display` is the message shown on the error screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifyError {
    #[error("Модель не повернула жодної відповіді.")]
    EmptyResponse,
    #[error("Отримана відповідь має невірний формат: {0}")]
    MalformedResponse(String),
    #[error("Не вдалося згенерувати зображення для цього виду.")]
    NoImageReturned,
    #[error("Час очікування відповіді вичерпано ({seconds} с).")]
    Timeout { seconds: u64 },
    #[error("{0}")]
    NetworkOrPlatform(String),
}

impl IdentifyError {
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::MalformedResponse(detail.to_string())
    }

    /// Stable tag written to the session journal.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty_response",
            Self::MalformedResponse(_) => "malformed_response",
            Self::NoImageReturned => "no_image_returned",
            Self::Timeout { .. } => "timeout",
            Self::NetworkOrPlatform(_) => "network_or_platform",
        }
    }
}

/// Result of one identification call, decided once at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifyOutcome {
    Identified(IdentificationReport),
    NotRecognized,
    Failed(IdentifyError),
}

impl IdentifyOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Identified(_) => "identified",
            Self::NotRecognized => "not_recognized",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<Result<IdentifyOutcome, IdentifyError>> for IdentifyOutcome {
    fn from(result: Result<IdentifyOutcome, IdentifyError>) -> Self {
        result.unwrap_or_else(IdentifyOutcome::Failed)
    }
}
