//! Window construction configuration
//!
//! Loaded from TOML; every field has a default so a partial (or missing) file
//! is enough.
//!
//! ```toml
//! size = [800, 600]
//! title = "inputforge"
//! gl_version = "3.3"
//! backend = "poll_diff"
//! axis_tolerance = 0.01
//! log_skipped_events = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::backend::{BackendKind, SurfaceSettings, Verbosity};
use crate::input::{InputSettings, DEFAULT_AXIS_TOLERANCE};

pub const CONFIG_DIR_NAME: &str = "inputforge";
pub const CONFIG_FILE_NAME: &str = "window.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Invalid context version: {0}")]
    ContextVersion(String),
}

/// Requested rendering context version
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContextVersion {
    pub major: u32,
    pub minor: u32,
}

impl ContextVersion {
    /// Reads the numeric groups of a version string as `major.minor`
    ///
    /// Missing groups are zero, groups past the second are ignored:
    /// `"4"` is 4.0 and `"4.1.2"` is 4.1.
    pub fn parse(version: &str) -> Result<Self, ConfigError> {
        let mut groups = version
            .split(|c: char| !c.is_ascii_digit())
            .filter(|group| !group.is_empty())
            .map(|group| {
                group
                    .parse::<u32>()
                    .map_err(|e| ConfigError::ContextVersion(format!("{}: {}", version, e)))
            });

        let major = match groups.next() {
            Some(group) => group?,
            None => {
                return Err(ConfigError::ContextVersion(format!(
                    "no version number in {:?}",
                    version
                )))
            }
        };
        let minor = groups.next().transpose()?.unwrap_or(0);
        Ok(Self { major, minor })
    }
}

impl fmt::Display for ContextVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub size: [u32; 2],
    pub resizable: bool,
    pub title: String,
    pub multisample: bool,
    pub samples: u8,
    pub depth_buffer: u8,
    pub gl_version: Option<String>,
    pub backend: BackendKind,

    /// Axis changes smaller than this are treated as noise
    pub axis_tolerance: f32,
    /// Axes inside this magnitude are not reported as active
    pub deadzone: f32,

    pub log_skipped_events: bool,
    pub log_caught_events: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: [512, 512],
            resizable: true,
            title: "inputforge".to_string(),
            multisample: true,
            samples: 4,
            depth_buffer: 24,
            gl_version: None,
            backend: BackendKind::default(),
            axis_tolerance: DEFAULT_AXIS_TOLERANCE,
            deadzone: 0.1,
            log_skipped_events: false,
            log_caught_events: false,
        }
    }
}

impl WindowConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WindowConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading window config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Like [`WindowConfig::load`], but a missing file yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// `<config_dir>/inputforge/window.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size[0] == 0 || self.size[1] == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.size[0], self.size[1]
            )));
        }
        if self.multisample && self.samples == 0 {
            return Err(ConfigError::Invalid(
                "multisampling needs at least one sample".to_string(),
            ));
        }
        if !self.axis_tolerance.is_finite() || self.axis_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "axis tolerance {} must be a non-negative number",
                self.axis_tolerance
            )));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(ConfigError::Invalid(format!(
                "deadzone {} must be in [0, 1)",
                self.deadzone
            )));
        }
        self.context_version()?;
        Ok(())
    }

    pub fn context_version(&self) -> Result<Option<ContextVersion>, ConfigError> {
        self.gl_version
            .as_deref()
            .map(ContextVersion::parse)
            .transpose()
    }

    pub fn surface_settings(&self) -> Result<SurfaceSettings, ConfigError> {
        Ok(SurfaceSettings {
            size: (self.size[0], self.size[1]),
            resizable: self.resizable,
            title: self.title.clone(),
            multisample: self.multisample,
            samples: self.samples,
            depth_buffer: self.depth_buffer,
            context_version: self.context_version()?,
        })
    }

    pub fn input_settings(&self) -> InputSettings {
        InputSettings {
            axis_tolerance: self.axis_tolerance,
            deadzone: self.deadzone,
            log_skipped_events: self.log_skipped_events,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity {
            log_skipped_events: self.log_skipped_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_context_version_parse() {
        assert_eq!(
            ContextVersion::parse("3.3").unwrap(),
            ContextVersion { major: 3, minor: 3 }
        );
        assert_eq!(
            ContextVersion::parse("4").unwrap(),
            ContextVersion { major: 4, minor: 0 }
        );
        assert_eq!(
            ContextVersion::parse("4.1.2").unwrap(),
            ContextVersion { major: 4, minor: 1 }
        );
        assert_eq!(
            ContextVersion::parse("OpenGL 4.6 core").unwrap().to_string(),
            "4.6"
        );
        assert!(matches!(
            ContextVersion::parse("core"),
            Err(ConfigError::ContextVersion(_))
        ));
        assert!(ContextVersion::parse("").is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WindowConfig::from_toml_str(
            r#"
            size = [800, 600]
            backend = "poll_diff"
            gl_version = "3.3"
            "#,
        )
        .unwrap();

        assert_eq!(config.size, [800, 600]);
        assert_eq!(config.backend, BackendKind::PollDiff);
        assert_eq!(config.samples, 4);
        assert_eq!(config.axis_tolerance, DEFAULT_AXIS_TOLERANCE);

        let surface = config.surface_settings().unwrap();
        assert_eq!(surface.size, (800, 600));
        assert_eq!(
            surface.context_version,
            Some(ContextVersion { major: 3, minor: 3 })
        );
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        assert!(matches!(
            WindowConfig::from_toml_str("backend = \"vulkan\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(WindowConfig::default().validate().is_ok());

        let cases = [
            WindowConfig {
                size: [0, 100],
                ..WindowConfig::default()
            },
            WindowConfig {
                samples: 0,
                ..WindowConfig::default()
            },
            WindowConfig {
                axis_tolerance: -0.1,
                ..WindowConfig::default()
            },
            WindowConfig {
                axis_tolerance: f32::NAN,
                ..WindowConfig::default()
            },
            WindowConfig {
                deadzone: 1.0,
                ..WindowConfig::default()
            },
            WindowConfig {
                gl_version: Some("latest".to_string()),
                ..WindowConfig::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be invalid", config);
        }

        let no_msaa = WindowConfig {
            multisample: false,
            samples: 0,
            ..WindowConfig::default()
        };
        assert!(no_msaa.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "title = \"demo\"\nlog_caught_events = true\n").unwrap();

        let config = WindowConfig::load(&path).unwrap();
        assert_eq!(config.title, "demo");
        assert!(config.log_caught_events);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            WindowConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(
            WindowConfig::load_or_default(&path).unwrap(),
            WindowConfig::default()
        );
    }

    #[test]
    fn test_load_or_default_keeps_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "size = \"big\"").unwrap();

        assert!(matches!(
            WindowConfig::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = WindowConfig::default_path() {
            assert!(path.ends_with("inputforge/window.toml"));
        }
    }

    #[test]
    fn test_input_settings_and_verbosity() {
        let config = WindowConfig {
            deadzone: 0.25,
            log_skipped_events: true,
            ..WindowConfig::default()
        };
        let input = config.input_settings();
        assert_eq!(input.deadzone, 0.25);
        assert!(input.log_skipped_events);
        assert!(config.verbosity().log_skipped_events);
    }
}
