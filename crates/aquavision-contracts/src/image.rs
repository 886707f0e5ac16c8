/// Raw image bytes plus the MIME type they were declared or detected with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the MIME type, `png` when unknown.
    pub fn extension(&self) -> &'static str {
        let lowered = self.mime_type.to_ascii_lowercase();
        if lowered.contains("jpeg") || lowered.contains("jpg") {
            return "jpg";
        }
        if lowered.contains("webp") {
            return "webp";
        }
        if lowered.contains("gif") {
            return "gif";
        }
        if lowered.contains("bmp") {
            return "bmp";
        }
        "png"
    }
}

/// Where the picture shown next to a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    Uploaded,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportImage {
    pub data: ImageData,
    pub origin: ImageOrigin,
}

#[cfg(test)]
mod tests {
    use super::ImageData;

    #[test]
    fn extension_follows_mime_type() {
        assert_eq!(ImageData::new(vec![1], "image/jpeg").extension(), "jpg");
        assert_eq!(ImageData::new(vec![1], "IMAGE/WEBP").extension(), "webp");
        assert_eq!(ImageData::new(vec![1], "image/png").extension(), "png");
        assert_eq!(
            ImageData::new(vec![1], "application/octet-stream").extension(),
            "png"
        );
    }
}
