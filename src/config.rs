//! Gallery manifest configuration
//!
//! The viewer consumes a JSON manifest describing one gallery: title, the
//! ordered image list, and the protection settings the photographer stored
//! for it. Settings are defaulted field-by-field so a minimal manifest stays
//! minimal, then validated and clamped after load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::constants::watermark::{DEFAULT_OPACITY, DEFAULT_TEXT};
use crate::watermark::WatermarkPosition;

/// One gallery as supplied by the host: configuration plus an ordered list
/// of image sources.
#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryManifest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: ProtectionSettings,
    pub images: Vec<ImageEntry>,
}

/// A single image source. The URL is read once per load and not retained
/// after the composited surface is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Per-gallery protection settings, immutable per render pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionSettings {
    #[serde(default = "default_true")]
    pub watermark_enabled: bool,
    #[serde(default = "default_watermark_text")]
    pub watermark_text: String,
    #[serde(default = "default_watermark_opacity")]
    pub watermark_opacity: f32,
    #[serde(
        default,
        deserialize_with = "deserialize_watermark_position"
    )]
    pub watermark_position: WatermarkPosition,
    #[serde(default = "default_true")]
    pub print_screen_detection_enabled: bool,
    #[serde(default = "default_true")]
    pub right_click_disabled: bool,
    #[serde(default = "default_true")]
    pub download_disabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_watermark_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_watermark_opacity() -> f32 {
    DEFAULT_OPACITY
}

/// Accepts the seven recognized anchor names; anything else falls back to
/// the default anchor rather than failing the whole manifest.
fn deserialize_watermark_position<'de, D>(deserializer: D) -> Result<WatermarkPosition, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(WatermarkPosition::from_str(&raw).unwrap_or_else(|_| {
        warn!(
            position = %raw,
            fallback = WatermarkPosition::default().as_str(),
            "Unrecognized watermark position, using fallback"
        );
        WatermarkPosition::default()
    }))
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            watermark_enabled: true,
            watermark_text: default_watermark_text(),
            watermark_opacity: default_watermark_opacity(),
            watermark_position: WatermarkPosition::default(),
            print_screen_detection_enabled: true,
            right_click_disabled: true,
            download_disabled: true,
        }
    }
}

impl ProtectionSettings {
    /// Watermark text that actually gets composited: empty when the
    /// watermark is switched off for the gallery.
    pub fn effective_watermark_text(&self) -> &str {
        if self.watermark_enabled {
            &self.watermark_text
        } else {
            ""
        }
    }

    /// Clamp values to their valid ranges, warning about corrections
    fn validate_and_clamp(&mut self) {
        if !self.watermark_opacity.is_finite() {
            warn!(
                opacity = self.watermark_opacity,
                using = DEFAULT_OPACITY,
                "watermark_opacity is not a finite number, using default"
            );
            self.watermark_opacity = DEFAULT_OPACITY;
        } else if self.watermark_opacity < 0.0 {
            warn!(opacity = self.watermark_opacity, "watermark_opacity below 0, clamping");
            self.watermark_opacity = 0.0;
        } else if self.watermark_opacity > 1.0 {
            warn!(opacity = self.watermark_opacity, "watermark_opacity above 1, clamping");
            self.watermark_opacity = 1.0;
        }
    }
}

impl GalleryManifest {
    /// Default manifest location under the user config directory
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gallery manifest: {}", path.display()))?;
        let mut manifest: GalleryManifest = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid gallery manifest: {}", path.display()))?;

        manifest.settings.validate_and_clamp();
        if manifest.images.is_empty() {
            warn!(path = %path.display(), "Gallery manifest contains no images");
        }
        info!(
            title = %manifest.title,
            images = manifest.images.len(),
            "Loaded gallery manifest"
        );
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_settings(json: &str) -> ProtectionSettings {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minimal_settings_take_documented_defaults() {
        let settings = parse_settings("{}");
        assert!(settings.watermark_enabled);
        assert_eq!(settings.watermark_text, "\u{a9} Protected");
        assert_eq!(settings.watermark_opacity, 0.3);
        assert_eq!(settings.watermark_position, WatermarkPosition::BottomRight);
        assert!(settings.print_screen_detection_enabled);
        assert!(settings.right_click_disabled);
        assert!(settings.download_disabled);
    }

    #[test]
    fn unknown_position_falls_back_to_bottom_right() {
        let settings = parse_settings(r#"{"watermark_position": "upper-middle"}"#);
        assert_eq!(settings.watermark_position, WatermarkPosition::BottomRight);
    }

    #[test]
    fn recognized_positions_parse() {
        let settings = parse_settings(r#"{"watermark_position": "top-center"}"#);
        assert_eq!(settings.watermark_position, WatermarkPosition::TopCenter);
    }

    #[test]
    fn opacity_is_clamped_to_unit_interval() {
        let mut settings = parse_settings(r#"{"watermark_opacity": 1.7}"#);
        settings.validate_and_clamp();
        assert_eq!(settings.watermark_opacity, 1.0);

        let mut settings = parse_settings(r#"{"watermark_opacity": -0.4}"#);
        settings.validate_and_clamp();
        assert_eq!(settings.watermark_opacity, 0.0);
    }

    #[test]
    fn disabled_watermark_yields_empty_effective_text() {
        let settings = parse_settings(
            r#"{"watermark_enabled": false, "watermark_text": "Studio Name"}"#,
        );
        assert_eq!(settings.effective_watermark_text(), "");

        let settings = parse_settings(r#"{"watermark_text": "Studio Name"}"#);
        assert_eq!(settings.effective_watermark_text(), "Studio Name");
    }

    #[test]
    fn full_manifest_parses() {
        let manifest: GalleryManifest = serde_json::from_str(
            r#"{
                "title": "Wedding Proofs",
                "description": "Client selection set",
                "settings": {
                    "watermark_text": "© Jane Doe Photography",
                    "watermark_opacity": 0.5,
                    "watermark_position": "center",
                    "download_disabled": false
                },
                "images": [
                    {"url": "https://example.com/img/001.jpg", "alt": "First look"},
                    {"url": "/srv/galleries/abc/002.jpg"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.title, "Wedding Proofs");
        assert_eq!(manifest.images.len(), 2);
        assert_eq!(manifest.images[1].alt, "");
        assert_eq!(
            manifest.settings.watermark_position,
            WatermarkPosition::Center
        );
        assert!(!manifest.settings.download_disabled);
        assert!(manifest.settings.right_click_disabled);
    }
}
