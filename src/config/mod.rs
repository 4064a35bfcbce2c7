//! Configuration module for the GLM realtime SDK
//!
//! Configuration is read from environment variables (after `.env` has been
//! loaded by the binary) and optionally overlaid with a YAML file.
//! Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Environment Variables
//! - `GLM_REALTIME_URL`: realtime WebSocket endpoint
//! - `ZHIPU_API_KEY`: API key for both realtime and vision endpoints
//! - `GLM_READ_TIMEOUT_SECS`: idle read deadline, `0` disables
//! - `GLM_SESSION_DEADLINE_SECS`: absolute receive loop lifetime, `0` disables
//! - `GLM_WAIT_TIMEOUT_SECS`: bound for waiting on loop shutdown
//! - `GLM_VIDEO_FPS`: video sampling rate
//! - `GLM_FFMPEG_PATH`: decoder program
//! - `GLM_VISION_URL`, `GLM_VISION_MODEL`: vision chat completion endpoint and model
//!
//! # Example
//! ```rust,no_run
//! use glm_realtime_sdk::config::SdkConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SdkConfig::from_file(Path::new("config.yaml"))?;
//! let options = config.client_options();
//! println!("Connecting to {}", options.url);
//! # Ok(())
//! # }
//! ```

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::core::media::{
    DEFAULT_DECODER, DEFAULT_QUALITY, DEFAULT_VIDEO_FPS, MediaError, ParameterSets,
    VideoFramingOptions,
};
use crate::core::realtime::{ClientOptions, DEFAULT_READ_TIMEOUT, DEFAULT_WAIT_TIMEOUT, GLM_REALTIME_URL};
use crate::core::vision::{DEFAULT_VISION_TIMEOUT, GLM_VISION_MODEL, GLM_VISION_URL, VisionConfig};

mod yaml;

pub use yaml::{RealtimeYaml, VideoYaml, VisionYaml, YamlConfig};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid video parameter sets: {0}")]
    Media(#[from] MediaError),
}

/// Resolved SDK configuration.
#[derive(Clone)]
pub struct SdkConfig {
    pub realtime_url: String,
    pub api_key: Option<Zeroizing<String>>,
    pub read_timeout: Option<Duration>,
    pub session_deadline: Option<Duration>,
    pub wait_timeout: Duration,
    pub video: VideoFramingOptions,
    pub vision_url: String,
    pub vision_model: String,
    pub vision_timeout: Duration,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            realtime_url: GLM_REALTIME_URL.to_string(),
            api_key: None,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            session_deadline: None,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            video: VideoFramingOptions {
                fps: DEFAULT_VIDEO_FPS,
                decoder: DEFAULT_DECODER.to_string(),
                quality: DEFAULT_QUALITY,
                parameter_sets: ParameterSets::default(),
            },
            vision_url: GLM_VISION_URL.to_string(),
            vision_model: GLM_VISION_MODEL.to_string(),
            vision_timeout: DEFAULT_VISION_TIMEOUT,
        }
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("realtime_url", &self.realtime_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("read_timeout", &self.read_timeout)
            .field("session_deadline", &self.session_deadline)
            .field("wait_timeout", &self.wait_timeout)
            .field("video", &self.video)
            .field("vision_url", &self.vision_url)
            .field("vision_model", &self.vision_model)
            .field("vision_timeout", &self.vision_timeout)
            .finish()
    }
}

/// Seconds to an optional duration where zero means "disabled".
fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

impl SdkConfig {
    /// Load configuration from environment variables over defaults.
    ///
    /// `.env` is expected to have been loaded already.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env_string("GLM_REALTIME_URL") {
            config.realtime_url = url;
        }
        config.api_key = env_string("ZHIPU_API_KEY").map(Zeroizing::new);
        if let Some(secs) = env_parse::<u64>("GLM_READ_TIMEOUT_SECS")? {
            config.read_timeout = optional_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("GLM_SESSION_DEADLINE_SECS")? {
            config.session_deadline = optional_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("GLM_WAIT_TIMEOUT_SECS")? {
            config.wait_timeout = Duration::from_secs(secs);
        }
        if let Some(fps) = env_parse::<u32>("GLM_VIDEO_FPS")? {
            config.video.fps = fps;
        }
        if let Some(path) = env_string("GLM_FFMPEG_PATH") {
            config.video.decoder = path;
        }
        if let Some(url) = env_string("GLM_VISION_URL") {
            config.vision_url = url;
        }
        if let Some(model) = env_string("GLM_VISION_MODEL") {
            config.vision_model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = YamlConfig::from_file(path)?;
        let mut config = Self::from_env()?;
        config.apply_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) -> Result<(), ConfigError> {
        if let Some(key) = yaml.api_key.filter(|k| !k.is_empty()) {
            self.api_key = Some(Zeroizing::new(key));
        }

        if let Some(realtime) = yaml.realtime {
            if let Some(url) = realtime.url {
                self.realtime_url = url;
            }
            if let Some(secs) = realtime.read_timeout_secs {
                self.read_timeout = optional_secs(secs);
            }
            if let Some(secs) = realtime.session_deadline_secs {
                self.session_deadline = optional_secs(secs);
            }
            if let Some(secs) = realtime.wait_timeout_secs {
                self.wait_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(video) = yaml.video {
            if let Some(fps) = video.fps {
                self.video.fps = fps;
            }
            if let Some(decoder) = video.decoder {
                self.video.decoder = decoder;
            }
            if let Some(quality) = video.quality {
                self.video.quality = quality;
            }
            match (video.sps, video.pps) {
                (Some(sps), Some(pps)) => {
                    self.video.parameter_sets = ParameterSets::from_base64(&sps, &pps)?;
                }
                (None, None) => {}
                (sps, _) => {
                    let name = if sps.is_some() { "video.pps" } else { "video.sps" };
                    return Err(ConfigError::InvalidValue {
                        name: name.to_string(),
                        value: String::new(),
                    });
                }
            }
        }

        if let Some(vision) = yaml.vision {
            if let Some(url) = vision.url {
                self.vision_url = url;
            }
            if let Some(model) = vision.model {
                self.vision_model = model;
            }
            if let Some(secs) = vision.timeout_secs {
                self.vision_timeout = Duration::from_secs(secs);
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.video.fps == 0 {
            return Err(ConfigError::InvalidValue {
                name: "video fps".to_string(),
                value: "0".to_string(),
            });
        }
        if self.realtime_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "realtime url".to_string(),
                value: String::new(),
            });
        }
        Ok(())
    }

    /// Options for constructing a [`crate::core::realtime::RealtimeClient`].
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            url: self.realtime_url.clone(),
            api_key: self.api_key.clone(),
            read_timeout: self.read_timeout,
            session_deadline: self.session_deadline,
            wait_timeout: self.wait_timeout,
            video: self.video.clone(),
        }
    }

    /// Configuration for a [`crate::core::vision::VisionClient`].
    pub fn vision_config(&self) -> VisionConfig {
        VisionConfig {
            url: self.vision_url.clone(),
            model: self.vision_model.clone(),
            api_key: self.api_key.clone(),
            timeout: self.vision_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const VARS: [&str; 9] = [
        "GLM_REALTIME_URL",
        "ZHIPU_API_KEY",
        "GLM_READ_TIMEOUT_SECS",
        "GLM_SESSION_DEADLINE_SECS",
        "GLM_WAIT_TIMEOUT_SECS",
        "GLM_VIDEO_FPS",
        "GLM_FFMPEG_PATH",
        "GLM_VISION_URL",
        "GLM_VISION_MODEL",
    ];

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        for name in VARS {
            unsafe {
                env::remove_var(name);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        cleanup_env_vars();

        let config = SdkConfig::from_env().unwrap();
        assert_eq!(config.realtime_url, GLM_REALTIME_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.read_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.session_deadline, None);
        assert_eq!(config.wait_timeout, Duration::from_secs(30));
        assert_eq!(config.video.fps, 2);
        assert_eq!(config.video.decoder, "ffmpeg");
        assert_eq!(config.vision_model, "glm-4.5v");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        cleanup_env_vars();
        unsafe {
            env::set_var("GLM_REALTIME_URL", "ws://localhost:8080/rt");
            env::set_var("ZHIPU_API_KEY", "env-key");
            env::set_var("GLM_READ_TIMEOUT_SECS", "0");
            env::set_var("GLM_SESSION_DEADLINE_SECS", "120");
            env::set_var("GLM_VIDEO_FPS", "5");
        }

        let config = SdkConfig::from_env().unwrap();
        assert_eq!(config.realtime_url, "ws://localhost:8080/rt");
        assert_eq!(config.api_key.as_deref().map(String::as_str), Some("env-key"));
        assert_eq!(config.read_timeout, None);
        assert_eq!(config.session_deadline, Some(Duration::from_secs(120)));
        assert_eq!(config.video.fps, 5);

        let options = config.client_options();
        assert_eq!(options.url, "ws://localhost:8080/rt");
        assert_eq!(options.read_timeout, None);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        cleanup_env_vars();
        unsafe {
            env::set_var("GLM_WAIT_TIMEOUT_SECS", "soon");
        }

        match SdkConfig::from_env() {
            Err(ConfigError::InvalidValue { name, value }) => {
                assert_eq!(name, "GLM_WAIT_TIMEOUT_SECS");
                assert_eq!(value, "soon");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();
        unsafe {
            env::set_var("ZHIPU_API_KEY", "env-key");
            env::set_var("GLM_VIDEO_FPS", "5");
            env::set_var("GLM_VISION_MODEL", "env-model");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
api_key: "yaml-key"
video:
  fps: 1
  sps: "AQI="
  pps: "Aw=="
"#,
        )
        .unwrap();

        let config = SdkConfig::from_file(&config_path).unwrap();
        assert_eq!(config.api_key.as_deref().map(String::as_str), Some("yaml-key"));
        assert_eq!(config.video.fps, 1);
        assert_eq!(config.video.parameter_sets, ParameterSets::new(vec![1, 2], vec![3]));
        // Not in YAML, env wins over default
        assert_eq!(config.vision_model, "env-model");
        assert_eq!(
            config.vision_config().api_key.as_deref().map(String::as_str),
            Some("yaml-key")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_requires_both_parameter_sets() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "video:\n  sps: \"AQI=\"\n").unwrap();

        assert!(matches!(
            SdkConfig::from_file(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();
        let result = SdkConfig::from_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    #[serial]
    fn test_zero_fps_rejected() {
        cleanup_env_vars();
        unsafe {
            env::set_var("GLM_VIDEO_FPS", "0");
        }
        assert!(SdkConfig::from_env().is_err());
        cleanup_env_vars();
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = SdkConfig {
            api_key: Some(Zeroizing::new("super-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
