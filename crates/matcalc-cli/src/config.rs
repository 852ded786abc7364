//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$MATCALC_CONFIG` environment variable
//! 2. `~/.config/matcalc/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use matcalc_core::Tolerance;
use matcalc_web::ApiOptions;

pub const DEFAULT_PORT: u16 = 5000;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// Overridden by `--port` and `$PORT`.
    pub port: Option<u16>,
    pub cors: bool,
}

/// `/calculate` behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Return booleans as JSON booleans under a `scalar` tag.
    pub native_scalars: bool,
    /// Report unknown operation codes as errors.
    pub strict_operations: bool,
    /// Orthogonality tolerance.
    pub rtol: f64,
    pub atol: f64,
}

// --- Defaults ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: None,
            cors: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        let tol = Tolerance::default();
        Self {
            native_scalars: false,
            strict_operations: false,
            rtol: tol.rtol,
            atol: tol.atol,
        }
    }
}

impl ApiConfig {
    pub fn options(&self) -> ApiOptions {
        ApiOptions {
            native_scalars: self.native_scalars,
            strict_operations: self.strict_operations,
            tolerance: Tolerance {
                rtol: self.rtol,
                atol: self.atol,
            },
        }
    }
}

/// Pick the listening port: `--port`, then `$PORT`, then the config file,
/// then 5000.
pub fn resolve_port(flag: Option<u16>, env: Option<&str>, server: &ServerConfig) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }
    if let Some(raw) = env {
        return raw
            .trim()
            .parse()
            .with_context(|| format!("invalid PORT value: {raw:?}"));
    }
    Ok(server.port.unwrap_or(DEFAULT_PORT))
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => read_config(&path),
        _ => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("malformed config {}", path.display()))
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("MATCALC_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("matcalc")
            .join("config.toml")
    })
}

/// Show the active config path (for `matcalc config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.port.is_none());
        assert!(!config.api.native_scalars);
        assert_eq!(config.api.options(), ApiOptions::default());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[api]
native_scalars = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.api.native_scalars);
        // Other fields should be defaults
        assert!(!config.api.strict_operations);
        assert_eq!(config.api.rtol, 1e-5);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[server]
host = "127.0.0.1"
port = 8080
cors = true

[api]
native_scalars = true
strict_operations = true
rtol = 1e-3
atol = 1e-6
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, Some(8080));
        assert!(config.server.cors);
        let options = config.api.options();
        assert!(options.strict_operations);
        assert_eq!(options.tolerance.rtol, 1e-3);
        assert_eq!(options.tolerance.atol, 1e-6);
    }

    #[test]
    fn test_read_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 6000\n").unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.server.port, Some(6000));
        assert!(!config.api.native_scalars);

        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = read_config(&path).unwrap_err();
        assert!(err.to_string().starts_with("malformed config"));
    }

    #[test]
    fn test_port_precedence() {
        let mut server = ServerConfig::default();
        assert_eq!(resolve_port(None, None, &server).unwrap(), 5000);

        server.port = Some(8000);
        assert_eq!(resolve_port(None, None, &server).unwrap(), 8000);
        assert_eq!(resolve_port(None, Some("9000"), &server).unwrap(), 9000);
        assert_eq!(resolve_port(Some(7000), Some("9000"), &server).unwrap(), 7000);
    }

    #[test]
    fn test_invalid_port_env() {
        let server = ServerConfig::default();
        assert!(resolve_port(None, Some("http"), &server).is_err());
        assert!(resolve_port(None, Some("70000"), &server).is_err());
    }
}
