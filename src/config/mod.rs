//! Configuration from .mailcompatrc and the environment
//!
//! Recognised keys (file lines or environment variables):
//! - MAILCOMPAT_CRITICAL_BELOW (score threshold for critical issues)
//! - MAILCOMPAT_WARNING_BELOW (score threshold for warnings)
//! - MAILCOMPAT_MAX_TEXT_LENGTH (characters)
//! - MAILCOMPAT_SAFE_MIN_SCORE, MAILCOMPAT_PROBLEMATIC_MAX_SCORE
//! - MAILCOMPAT_COLOR (auto, always, never)
//! - MAILCOMPAT_FORMAT (text, json)
//!
//! Environment variables override the file.

use crate::compat::analyzer::CheckerConfig;
use crate::compat::database::{DEFAULT_PROBLEMATIC_MAX_SCORE, DEFAULT_SAFE_MIN_SCORE};
use crate::error::CompatError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const RC_FILE: &str = ".mailcompatrc";

/// When to colour terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Complete mailcompat configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub checker: CheckerConfig,
    pub safe_min_score: u8,
    pub problematic_max_score: u8,
    pub color: ColorMode,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checker: CheckerConfig::default(),
            safe_min_score: DEFAULT_SAFE_MIN_SCORE,
            problematic_max_score: DEFAULT_PROBLEMATIC_MAX_SCORE,
            color: ColorMode::default(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load ~/.mailcompatrc (if present), then apply environment overrides
    pub fn load() -> Result<Self, CompatError> {
        let path = Self::rc_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!(path = %path.display(), "no rc file");
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Get the path to .mailcompatrc
    pub fn rc_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(RC_FILE)
    }

    /// Parse configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self, CompatError> {
        let content = fs::read_to_string(path).map_err(|source| CompatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from content string
    pub fn parse(content: &str) -> Result<Self, CompatError> {
        let mut config = Config::default();
        let mut threshold_line = 0;

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = parse_assignment(line) else {
                return Err(CompatError::Config {
                    line: index + 1,
                    message: format!("expected KEY=VALUE, found '{}'", line),
                });
            };

            config
                .set(&key, &unquote(&value))
                .map_err(|message| CompatError::Config {
                    line: index + 1,
                    message,
                })?;
            if matches!(key.as_str(), "MAILCOMPAT_CRITICAL_BELOW" | "MAILCOMPAT_WARNING_BELOW") {
                threshold_line = index + 1;
            }
        }

        config
            .checker
            .validate()
            .map_err(|message| CompatError::Config {
                line: threshold_line,
                message,
            })?;

        Ok(config)
    }

    /// Apply MAILCOMPAT_* environment variables; invalid values are skipped
    pub fn apply_env(&mut self) {
        self.apply_vars(env::vars());
    }

    fn apply_vars(&mut self, vars: impl Iterator<Item = (String, String)>) {
        let (critical_below, warning_below) = (self.checker.critical_below, self.checker.warning_below);
        for (key, value) in vars {
            if !key.starts_with("MAILCOMPAT_") {
                continue;
            }
            if let Err(message) = self.set(&key, value.trim()) {
                warn!(key = %key, "ignoring environment override: {}", message);
            }
        }
        if let Err(message) = self.checker.validate() {
            warn!("ignoring threshold overrides: {}", message);
            self.checker.critical_below = critical_below;
            self.checker.warning_below = warning_below;
        }
    }

    /// Set one key. Unknown keys are ignored with a warning.
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "MAILCOMPAT_CRITICAL_BELOW" => self.checker.critical_below = parse_score(value)?,
            "MAILCOMPAT_WARNING_BELOW" => self.checker.warning_below = parse_score(value)?,
            "MAILCOMPAT_MAX_TEXT_LENGTH" => {
                self.checker.max_text_length = value
                    .parse::<usize>()
                    .map_err(|_| format!("expected a character count, found '{}'", value))?;
            }
            "MAILCOMPAT_SAFE_MIN_SCORE" => self.safe_min_score = parse_score(value)?,
            "MAILCOMPAT_PROBLEMATIC_MAX_SCORE" => self.problematic_max_score = parse_score(value)?,
            "MAILCOMPAT_COLOR" => {
                self.color = ColorMode::parse(value)
                    .ok_or_else(|| format!("expected auto, always or never, found '{}'", value))?;
            }
            "MAILCOMPAT_FORMAT" => {
                self.format = OutputFormat::parse(value)
                    .ok_or_else(|| format!("expected text or json, found '{}'", value))?;
            }
            _ => warn!(key, "unknown configuration key"),
        }
        Ok(())
    }

    /// Whether terminal output should be coloured
    pub fn use_colors(&self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                atty::is(atty::Stream::Stdout) && env::var_os("NO_COLOR").is_none()
            }
        }
    }
}

fn parse_score(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(score) if score <= 100 => Ok(score),
        _ => Err(format!("expected a score between 0 and 100, found '{}'", value)),
    }
}

/// Parse a shell variable assignment (KEY=value or KEY="value")
fn parse_assignment(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Remove surrounding quotes from a value
fn unquote(s: &str) -> String {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.checker.critical_below, 50);
        assert_eq!(config.safe_min_score, 75);
        assert_eq!(config.problematic_max_score, 40);
    }

    #[test]
    fn test_parse_all_keys() {
        let content = r#"
# thresholds
MAILCOMPAT_CRITICAL_BELOW=40
export MAILCOMPAT_WARNING_BELOW="80"
MAILCOMPAT_MAX_TEXT_LENGTH='500'
MAILCOMPAT_SAFE_MIN_SCORE=85
MAILCOMPAT_PROBLEMATIC_MAX_SCORE=30
MAILCOMPAT_COLOR=never
MAILCOMPAT_FORMAT=JSON
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.checker.critical_below, 40);
        assert_eq!(config.checker.warning_below, 80);
        assert_eq!(config.checker.max_text_length, 500);
        assert_eq!(config.safe_min_score, 85);
        assert_eq!(config.problematic_max_score, 30);
        assert_eq!(config.color, ColorMode::Never);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.use_colors());
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = Config::parse("# comment\nMAILCOMPAT_CRITICAL_BELOW=high\n").unwrap_err();
        match err {
            CompatError::Config { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("high"));
            }
            other => panic!("unexpected error: {}", other),
        }

        let err = Config::parse("not an assignment").unwrap_err();
        assert!(matches!(err, CompatError::Config { line: 1, .. }));
    }

    #[test]
    fn test_score_out_of_range() {
        assert!(Config::parse("MAILCOMPAT_SAFE_MIN_SCORE=101").is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = Config::parse("MAILCOMPAT_THEME=dark\nEDITOR=vim").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::parse("MAILCOMPAT_CRITICAL_BELOW=40\nMAILCOMPAT_COLOR=never").unwrap();
        config.apply_vars(vars(&[
            ("MAILCOMPAT_CRITICAL_BELOW", "60"),
            ("MAILCOMPAT_COLOR", "rainbow"),
            ("HOME", "/root"),
        ]));
        assert_eq!(config.checker.critical_below, 60);
        // invalid override keeps the file value
        assert_eq!(config.color, ColorMode::Never);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let content = "MAILCOMPAT_CRITICAL_BELOW=80\n# band\nMAILCOMPAT_WARNING_BELOW=60\n";
        match Config::parse(content).unwrap_err() {
            CompatError::Config { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("80"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(Config::parse("MAILCOMPAT_CRITICAL_BELOW=90\nMAILCOMPAT_WARNING_BELOW=90").is_ok());
    }

    #[test]
    fn test_inverted_env_thresholds_are_dropped() {
        let mut config = Config::parse("MAILCOMPAT_CRITICAL_BELOW=40").unwrap();
        config.apply_vars(vars(&[
            ("MAILCOMPAT_CRITICAL_BELOW", "70"),
            ("MAILCOMPAT_WARNING_BELOW", "50"),
            ("MAILCOMPAT_MAX_TEXT_LENGTH", "300"),
        ]));
        assert_eq!(config.checker.critical_below, 40);
        assert_eq!(config.checker.warning_below, 90);
        assert_eq!(config.checker.max_text_length, 300);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "MAILCOMPAT_MAX_TEXT_LENGTH=2000").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.checker.max_text_length, 2000);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"json\""), "json");
        assert_eq!(unquote("'json'"), "json");
        assert_eq!(unquote("json"), "json");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_always_colors() {
        let config = Config {
            color: ColorMode::Always,
            ..Config::default()
        };
        assert!(config.use_colors());
    }
}
