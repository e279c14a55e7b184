use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub glyph: GlyphConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    /// Load configuration from `path`, writing defaults there on first run.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config = toml::from_str(&content)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum hand-tip-to-shoulder depth separation, meters, strict.
    #[serde(default = "default_extend_threshold")]
    pub extend_threshold: f32,
}

fn default_extend_threshold() -> f32 {
    0.4
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            extend_threshold: default_extend_threshold(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_trigger_word")]
    pub trigger_word: String,
    /// Utterances below this engine confidence are ignored.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_trigger_word() -> String {
    "translate".to_string()
}

fn default_min_confidence() -> f32 {
    0.7
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            trigger_word: default_trigger_word(),
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub subscription_key: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

fn default_token_endpoint() -> String {
    "https://api.cognitive.microsoft.com/sts/v1.0/issueToken".to_string()
}

fn default_translate_endpoint() -> String {
    "https://api.cognitive.microsofttranslator.com/translate".to_string()
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "zh-Hans".to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            token_endpoint: default_token_endpoint(),
            endpoint: default_translate_endpoint(),
            subscription_key: String::new(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlyphConfig {
    /// TTF/OTF file used to rasterize translated text. Empty disables
    /// rasterization; the glyph then carries text only.
    #[serde(default)]
    pub font_path: String,
    #[serde(default = "default_glyph_px")]
    pub size_px: f32,
    /// Seconds a glyph stays on screen before the compositor clears it.
    #[serde(default = "default_display_secs")]
    pub display_secs: u64,
}

fn default_glyph_px() -> f32 {
    220.0
}

fn default_display_secs() -> u64 {
    5
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            font_path: String::new(),
            size_px: default_glyph_px(),
            display_secs: default_display_secs(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_dir")]
    pub dir: String,
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
        }
    }
}
