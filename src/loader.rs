//! Reading `config.toml` from disk.
//!
//! The simulation core never touches the filesystem; this is the one place
//! configuration text is read and turned into an [`AppConfig`].

use std::path::Path;
use terrarium_core::config::AppConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The file is not valid TOML or has mistyped keys.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    /// Parsed, but a value is out of range.
    #[error("Invalid configuration in {path}: {reason}")]
    Invalid { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Read, parse, and validate the configuration at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    parse(&content, &display)
}

/// Like [`load`], but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    load(path)
}

fn parse(content: &str, path: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content).map_err(|source| LoadError::Parse {
        path: path.to_string(),
        source,
    })?;
    config.validate().map_err(|e| LoadError::Invalid {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("terrarium_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file("partial.toml", "[world]\nwidth = 12\nseed = 3\n");
        let config = load(&path).unwrap();
        assert_eq!(config.world.width, 12);
        assert_eq!(config.world.height, 30);
        assert_eq!(config.world.seed, Some(3));
        assert_eq!(config.hydrology.dryness_threshold, 5.0);
    }

    #[test]
    fn test_missing_file_defaults() {
        let config = load_or_default("/nonexistent/terrarium/config.toml").unwrap();
        assert_eq!(config.world.width, 30);
        assert!(matches!(
            load("/nonexistent/terrarium/config.toml"),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let path = temp_file("broken.toml", "[world\nwidth = ");
        assert!(matches!(load(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let path = temp_file("invalid.toml", "[hydrology]\nmomentum = 2.0\n");
        match load(&path) {
            Err(LoadError::Invalid { reason, .. }) => assert!(reason.contains("Momentum")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
