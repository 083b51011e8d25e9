//! Configuration management for proctor.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use proctor::InspectorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROCFS: &str = proctor::inspector::DEFAULT_PROCFS;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Enhanced configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Process store
    #[serde(alias = "procfs", alias = "procfs-path")]
    pub procfs_path: Option<PathBuf>,
    #[serde(alias = "cache-dir")]
    pub cache_dir: Option<PathBuf>,
    #[serde(alias = "ignore-cache")]
    pub ignore_cache: Option<bool>,

    // Load-time filters
    #[serde(alias = "include-kernel")]
    pub include_kernel: Option<bool>,
    #[serde(alias = "include-permission-issues")]
    pub include_permission_issues: Option<bool>,

    // Performance tuning
    pub parallelism: Option<usize>,
    #[serde(alias = "scan-timeout-secs")]
    pub scan_timeout_secs: Option<u64>,

    // Web UI
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            procfs_path: Some(PathBuf::from(DEFAULT_PROCFS)),
            cache_dir: None,
            ignore_cache: Some(false),
            include_kernel: Some(false),
            include_permission_issues: Some(false),
            parallelism: None,
            scan_timeout_secs: None,
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
        }
    }
}

impl Config {
    /// Builds the process store settings. Unset values fall back to the
    /// store defaults.
    pub fn inspector_config(&self) -> InspectorConfig {
        let defaults = InspectorConfig::default();
        InspectorConfig {
            procfs_path: self.procfs_path.clone().unwrap_or(defaults.procfs_path),
            cache_dir: self.cache_dir.clone().unwrap_or(defaults.cache_dir),
            ignore_cache: self.ignore_cache.unwrap_or(false),
            include_kernel: self.include_kernel.unwrap_or(false),
            include_permission_issues: self.include_permission_issues.unwrap_or(false),
            // 0 = auto (global rayon pool)
            parallelism: self.parallelism.filter(|&n| n > 0),
            scan_timeout: self.scan_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Effective log level from the config file.
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
            .as_deref()
            .and_then(|s| LogLevel::from_str(s, true).ok())
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}', expected one of off/error/warn/info/debug/trace",
                level
            )
            .into());
        }
    }

    if let Some(procfs) = cfg.procfs_path.as_deref() {
        if procfs.as_os_str().is_empty() {
            return Err("procfs_path must not be empty".into());
        }
    }

    if let Some(dir) = cfg.cache_dir.as_deref() {
        if dir.as_os_str().is_empty() {
            return Err("cache_dir must not be empty".into());
        }
        if dir.exists() && !dir.is_dir() {
            return Err(format!("cache_dir is not a directory: {}", dir.display()).into());
        }
    }

    if cfg.scan_timeout_secs == Some(0) {
        return Err("scan_timeout_secs must be greater than 0".into());
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", bind).into());
        }
    }

    if cfg.port == Some(0) {
        return Err("port must be greater than 0".into());
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(procfs) = &args.procfs {
        config.procfs_path = Some(procfs.clone());
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = Some(dir.clone());
    }

    // Flags only switch features on; the config file may too.
    if args.ignore_cache {
        config.ignore_cache = Some(true);
    }
    if args.include_kernel {
        config.include_kernel = Some(true);
    }
    if args.include_permission_issues {
        config.include_permission_issues = Some(true);
    }

    if args.parallelism.is_some() {
        config.parallelism = args.parallelism;
    }
    if args.scan_timeout_secs.is_some() {
        config.scan_timeout_secs = args.scan_timeout_secs;
    }

    if let Some(level) = args.log_level {
        if let Some(value) = level.to_possible_value() {
            config.log_level = Some(value.get_name().to_string());
        }
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            // Try default locations
            let defaults = [
                "/etc/proctor/proctor.yaml",
                "/etc/proctor/proctor.yml",
                "/etc/proctor/proctor.json",
                "/etc/proctor/proctor.toml",
                "./proctor.yaml",
                "./proctor.yml",
                "./proctor.json",
                "./proctor.toml",
            ];

            match defaults.iter().map(Path::new).find(|p| p.exists()) {
                Some(p) => p.to_path_buf(),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config `content` according to the file extension. YAML is the default.
pub fn parse_config(
    content: &str,
    extension: Option<&str>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

/// Serializes the configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    // -------------------------------------------------------------------------
    // Tests for parse_config
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_yaml_with_aliases() {
        let yaml = "procfs: /host/proc\ncache-dir: /var/cache/proctor\ninclude-kernel: true\nscan_timeout_secs: 30\n";
        let config = parse_config(yaml, Some("yaml")).expect("valid yaml");

        assert_eq!(config.procfs_path, Some(PathBuf::from("/host/proc")));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/proctor")));
        assert_eq!(config.include_kernel, Some(true));
        assert_eq!(config.scan_timeout_secs, Some(30));
        assert!(config.port.is_none());
    }

    #[test]
    fn test_parse_json_and_toml() {
        let json = r#"{"parallelism": 4, "ignore_cache": true}"#;
        let config = parse_config(json, Some("json")).expect("valid json");
        assert_eq!(config.parallelism, Some(4));
        assert_eq!(config.ignore_cache, Some(true));

        let toml = "port = 9000\nbind = \"0.0.0.0\"\n";
        let config = parse_config(toml, Some("toml")).expect("valid toml");
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_render_config_round_trip() {
        let config = Config::default();
        for (format, ext) in [
            (ConfigFormat::Yaml, "yaml"),
            (ConfigFormat::Json, "json"),
            (ConfigFormat::Toml, "toml"),
        ] {
            let text = render_config(&config, format).expect("render");
            let parsed = parse_config(&text, Some(ext)).expect("parse");
            assert_eq!(parsed, config);
        }
    }

    // -------------------------------------------------------------------------
    // Tests for validate_effective_config
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_effective_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            Config {
                log_level: Some("loud".into()),
                ..Config::default()
            },
            Config {
                scan_timeout_secs: Some(0),
                ..Config::default()
            },
            Config {
                bind: Some("not-an-ip".into()),
                ..Config::default()
            },
            Config {
                port: Some(0),
                ..Config::default()
            },
        ];
        for cfg in cases {
            assert!(validate_effective_config(&cfg).is_err(), "{:?}", cfg);
        }
    }

    #[test]
    fn test_cache_dir_must_be_directory() {
        let dir = tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("file");
        fs::write(&file, b"x").expect("Failed to write file");

        let cfg = Config {
            cache_dir: Some(file),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    // -------------------------------------------------------------------------
    // Tests for resolve_config
    // -------------------------------------------------------------------------

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("proctor.yaml");
        fs::write(&path, "procfs_path: /from/file\nparallelism: 2\nlog_level: info\n")
            .expect("Failed to write config");

        let args = Args::parse_from([
            "proctor",
            "-c",
            path.to_str().expect("utf-8 path"),
            "--procfs",
            "/from/cli",
            "--log-level",
            "debug",
            "list",
        ]);
        let config = resolve_config(&args).expect("config should resolve");

        assert_eq!(config.procfs_path, Some(PathBuf::from("/from/cli")));
        assert_eq!(config.parallelism, Some(2));
        assert_eq!(config.log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let args = Args::parse_from(["proctor", "-c", "/nonexistent/proctor.yaml", "list"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_inspector_config_mapping() {
        let config = Config {
            procfs_path: Some(PathBuf::from("/host/proc")),
            cache_dir: Some(PathBuf::from("/tmp/proctor")),
            include_permission_issues: Some(true),
            parallelism: Some(0),
            scan_timeout_secs: Some(5),
            ..Config::default()
        };
        let ic = config.inspector_config();

        assert_eq!(ic.procfs_path, PathBuf::from("/host/proc"));
        assert_eq!(ic.cache_dir, PathBuf::from("/tmp/proctor"));
        assert!(ic.include_permission_issues);
        assert!(!ic.include_kernel);
        assert_eq!(ic.parallelism, None);
        assert_eq!(ic.scan_timeout, Some(Duration::from_secs(5)));
    }
}
