use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

/// Command used to turn a `.puml` file into an image beside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub command: String,
    /// Output format, passed as `-t<format>`.
    pub format: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            command: "plantuml".to_string(),
            format: "png".to_string(),
        }
    }
}

/// Bounds for the reference images embedded in example turns. An explicit
/// `null` clears a bound; an absent key keeps the default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleSettings {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            max_width: Some(800),
            max_height: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(flatten)]
    pub ai: AiSettings,
    pub render: RenderSettings,
    pub scale: ScaleSettings,
}

/// Resolve the settings directory (~/.stategen/).
pub fn stategen_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stategen")
}

pub fn settings_path() -> PathBuf {
    stategen_dir().join("settings.json")
}

pub fn read_settings() -> Result<Settings> {
    read_settings_from(&settings_path())
}

/// Missing file yields the defaults; a malformed one is an error.
pub fn read_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_settings(settings: &Settings) -> Result<()> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = read_settings_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.render.command, "plantuml");
        assert_eq!(s.scale.max_width, Some(800));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"provider":"openai","model":"gpt-4o","render":{"command":"/opt/plantuml"}}"#)
            .unwrap();
        let s = read_settings_from(&path).unwrap();
        assert_eq!(s.ai.provider, "openai");
        assert_eq!(s.ai.model, "gpt-4o");
        assert!(s.ai.api_key.is_empty());
        assert_eq!(s.render.command, "/opt/plantuml");
        assert_eq!(s.render.format, "png");
        assert_eq!(s.scale, ScaleSettings::default());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = Settings::default();
        s.ai.provider = "ollama".into();
        s.ai.model = "llama3".into();
        s.scale = ScaleSettings {
            max_width: None,
            max_height: Some(600),
        };
        write_settings_to(&path, &s).unwrap();
        assert_eq!(read_settings_from(&path).unwrap(), s);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_settings_from(&path), Err(Error::Json(_))));
    }

    #[test]
    fn ollama_needs_no_key() {
        let mut ai = AiSettings {
            provider: "ollama".into(),
            model: "llama3".into(),
            ..Default::default()
        };
        assert!(ai_configured(&ai));
        ai.provider = "openai".into();
        assert!(!ai_configured(&ai));
        ai.api_key = "sk-test".into();
        assert!(ai_configured(&ai));
    }
}
