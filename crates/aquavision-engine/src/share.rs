use std::fs;
use std::path::PathBuf;

use aquavision_contracts::outcome::IdentifyError;
use aquavision_contracts::report::SharePayload;

pub const SHARE_UNSUPPORTED: &str = "Поширення не підтримується на цьому пристрої.";

/// Destination for the share affordance. Returns where the report went.
pub trait ShareSink {
    fn name(&self) -> &str;
    fn share(&self, payload: &SharePayload) -> Result<String, IdentifyError>;
}

/// Used when the platform has no share mechanism.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedShare;

impl ShareSink for UnsupportedShare {
    fn name(&self) -> &str {
        "unsupported"
    }

    fn share(&self, _payload: &SharePayload) -> Result<String, IdentifyError> {
        Err(IdentifyError::NetworkOrPlatform(SHARE_UNSUPPORTED.to_string()))
    }
}

/// Writes each shared report as a text file under `dir`.
#[derive(Debug, Clone)]
pub struct FileShareSink {
    dir: PathBuf,
}

impl FileShareSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ShareSink for FileShareSink {
    fn name(&self) -> &str {
        "file"
    }

    fn share(&self, payload: &SharePayload) -> Result<String, IdentifyError> {
        let platform = |err: std::io::Error| IdentifyError::NetworkOrPlatform(err.to_string());
        fs::create_dir_all(&self.dir).map_err(platform)?;
        let path = self.dir.join(format!("{}.txt", file_slug(&payload.title)));
        fs::write(&path, format!("{}\n\n{}\n", payload.title, payload.text)).map_err(platform)?;
        Ok(path.display().to_string())
    }
}

fn file_slug(title: &str) -> String {
    let slug = title
        .trim()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch.to_lowercase().next().unwrap_or(ch) } else { '-' })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        return "report".to_string();
    }
    slug
}
