//! Site configuration (site.cfg)

use std::fs;
use std::path::{Path, PathBuf};

use super::ini::parse_sections;
use crate::Metadata;

/// Section holding engine settings
const SETTINGS_SECTION: &str = "config";

/// Section holding metadata injected into every page
const METADATA_SECTION: &str = "metadata";

/// Port used when `port` is missing or out of range
pub const DEFAULT_PORT: u16 = 5555;

/// Errors raised while loading `site.cfg`
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed line {line} in {path}")]
    Parse { path: PathBuf, line: usize },

    #[error("key '{key}' in {path} is outside of any section")]
    Unsectioned { path: PathBuf, key: String },
}

/// Site configuration: the `[config]` settings plus `[metadata]` values
/// shared by every page.
///
/// `SiteConfig::default()` is an empty configuration: every setting is
/// absent and global metadata is empty.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    settings: Metadata,
    metadata: Metadata,
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content).map_err(|err| match err {
            ConfigError::Parse { line, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                line,
            },
            ConfigError::Unsectioned { key, .. } => ConfigError::Unsectioned {
                path: path.to_path_buf(),
                key,
            },
            other => other,
        })?;

        tracing::debug!(
            "Loaded {:?}: {} settings, {} metadata keys",
            path,
            config.settings.len(),
            config.metadata.len()
        );

        Ok(config)
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let (mut sections, malformed) = parse_sections(content);

        if let Some(&line) = malformed.first() {
            return Err(ConfigError::Parse {
                path: PathBuf::new(),
                line,
            });
        }

        if let Some(key) = sections.get("").and_then(|loose| loose.keys().next()) {
            return Err(ConfigError::Unsectioned {
                path: PathBuf::new(),
                key: key.clone(),
            });
        }

        Ok(Self {
            settings: sections.shift_remove(SETTINGS_SECTION).unwrap_or_default(),
            metadata: sections.shift_remove(METADATA_SECTION).unwrap_or_default(),
        })
    }

    /// Whether the settings section contains `key`
    pub fn has(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    /// Get a value from the settings section
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Global metadata. These values take precedence over post metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Development server port
    pub fn port(&self) -> u16 {
        match self.get("port").map(str::parse::<u16>) {
            Some(Ok(port)) if port >= 1 => port,
            Some(_) => {
                tracing::warn!("Ignoring invalid port setting, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        }
    }

    /// Id of the element wrapping the generated index, also the metadata key
    /// the index template uses for it
    pub fn index_div_id(&self) -> &str {
        self.get("index_div_id").unwrap_or("index")
    }

    /// Id of the element wrapping a rendered post, also the metadata key the
    /// post template uses for it
    pub fn post_div_id(&self) -> &str {
        self.get("post_div_id").unwrap_or("post")
    }

    /// Syntect theme used for fenced code blocks
    pub fn highlight_theme(&self) -> &str {
        self.get("highlight_theme").unwrap_or("base16-ocean.dark")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"; Site configuration.
[config]
port = 8080
index_div_id = listing
post_div_id = article

; Globally scoped metadata.
[metadata]
site_name = My Blog
"#;

    #[test]
    fn test_default_config_is_empty() {
        let config = SiteConfig::default();
        assert!(!config.has("port"));
        assert_eq!(config.get("port"), None);
        assert!(config.metadata().is_empty());
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.index_div_id(), "index");
        assert_eq!(config.post_div_id(), "post");
    }

    #[test]
    fn test_parse_config() {
        let config = SiteConfig::parse(SAMPLE).unwrap();
        assert!(config.has("port"));
        assert_eq!(config.get("port"), Some("8080"));
        assert_eq!(config.port(), 8080);
        assert_eq!(config.index_div_id(), "listing");
        assert_eq!(config.post_div_id(), "article");
        assert_eq!(config.metadata()["site_name"], "My Blog");
        // Settings queries never see metadata keys
        assert!(!config.has("site_name"));
    }

    #[test]
    fn test_invalid_port_falls_back() {
        for port in ["0", "65536", "abc", "-1"] {
            let config = SiteConfig::parse(&format!("[config]\nport = {}\n", port)).unwrap();
            assert_eq!(config.port(), DEFAULT_PORT, "port {}", port);
        }
        let config = SiteConfig::parse("[config]\nport = 65535\n").unwrap();
        assert_eq!(config.port(), 65535);
    }

    #[test]
    fn test_missing_metadata_section() {
        let config = SiteConfig::parse("[config]\nport = 1\n").unwrap();
        assert!(config.metadata().is_empty());
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        let err = SiteConfig::parse("[config]\nport 5555\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));

        let err = SiteConfig::parse("port = 5555\n[config]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Unsectioned { ref key, .. } if key == "port"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiteConfig::load(dir.path().join("site.cfg")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.cfg");
        fs::write(&path, SAMPLE).unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.metadata()["site_name"], "My Blog");

        fs::write(&path, "[config]\nbroken\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, line: 2 } if path.ends_with("site.cfg")));
    }
}
