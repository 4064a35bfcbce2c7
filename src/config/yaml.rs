use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// api_key: "your-zhipu-key"
///
/// realtime:
///   url: "wss://open.bigmodel.cn/api/paas/v4/realtime"
///   read_timeout_secs: 15
///   session_deadline_secs: 0
///   wait_timeout_secs: 30
///
/// video:
///   fps: 2
///   decoder: "/usr/bin/ffmpeg"
///   quality: 2
///   sps: "Z0LADJoFAAABMA=="
///   pps: "aM48gA=="
///
/// vision:
///   url: "https://open.bigmodel.cn/api/paas/v4/chat/completions"
///   model: "glm-4.5v"
///   timeout_secs: 60
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub api_key: Option<String>,
    pub realtime: Option<RealtimeYaml>,
    pub video: Option<VideoYaml>,
    pub vision: Option<VisionYaml>,
}

/// Realtime connection configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RealtimeYaml {
    pub url: Option<String>,
    pub read_timeout_secs: Option<u64>,
    pub session_deadline_secs: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
}

/// Video framing configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VideoYaml {
    pub fps: Option<u32>,
    pub decoder: Option<String>,
    pub quality: Option<u8>,
    /// Base64 SPS payload
    pub sps: Option<String>,
    /// Base64 PPS payload
    pub pps: Option<String>,
}

/// Vision API configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VisionYaml {
    pub url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_full_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
api_key: "yaml-key"
realtime:
  url: "ws://localhost:9000/realtime"
  read_timeout_secs: 5
video:
  fps: 4
  decoder: "/opt/ffmpeg"
vision:
  model: "glm-4.5v-plus"
"#,
        )
        .unwrap();

        let config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("yaml-key"));
        let realtime = config.realtime.unwrap();
        assert_eq!(realtime.url.as_deref(), Some("ws://localhost:9000/realtime"));
        assert_eq!(realtime.read_timeout_secs, Some(5));
        assert_eq!(realtime.wait_timeout_secs, None);
        let video = config.video.unwrap();
        assert_eq!(video.fps, Some(4));
        assert_eq!(video.decoder.as_deref(), Some("/opt/ffmpeg"));
        assert_eq!(config.vision.unwrap().model.as_deref(), Some("glm-4.5v-plus"));
    }

    #[test]
    fn test_empty_yaml() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.api_key.is_none());
        assert!(config.realtime.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "realtime: [not: a: map").unwrap();
        assert!(matches!(
            YamlConfig::from_file(&path),
            Err(ConfigError::Yaml(_))
        ));
    }
}
