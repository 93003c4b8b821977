//! Editor tunables.

use std::time::Duration;

pub const IMAGES_ENDPOINT: &str = "/images";
pub const UPLOAD_ENDPOINT: &str = "/uploads";
/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "upload";
pub const STORAGE_KEY: &str = "canvasObjects";
pub const AUTOSAVE_INTERVAL_MS: u32 = 2_000;
pub const TEXT_FONT_SIZE_PX: f64 = 20.0;
pub const DEFAULT_TEXT: &str = "Lorem ipsum...";

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    pub images_endpoint: String,
    pub upload_endpoint: String,
    pub upload_field: String,
    /// localStorage key holding the object snapshot
    pub storage_key: String,
    pub autosave_interval_ms: u32,
    pub text_font_size_px: f64,
    /// Pre-filled answer of the "add text" prompt
    pub default_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            images_endpoint: IMAGES_ENDPOINT.to_string(),
            upload_endpoint: UPLOAD_ENDPOINT.to_string(),
            upload_field: UPLOAD_FIELD.to_string(),
            storage_key: STORAGE_KEY.to_string(),
            autosave_interval_ms: AUTOSAVE_INTERVAL_MS,
            text_font_size_px: TEXT_FONT_SIZE_PX,
            default_text: DEFAULT_TEXT.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.autosave_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.storage_key, "canvasObjects");
        assert_eq!(config.upload_field, "upload");
        assert_eq!(config.autosave_interval(), Duration::from_secs(2));
    }
}
