use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::browser::{SessionOptions, DEFAULT_BLOCKED_DOMAINS};
use crate::evaluator::EvaluationPolicy;
use crate::guide::{FallbackGuide, DEFAULT_FALLBACK_SELECTORS};
use crate::overlay::PlacementConfig;
use crate::report::DedupPolicy;
use crate::Viewport;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub browser: BrowserConfig,
    pub timeouts: Timeouts,
    pub evaluation: EvaluationConfig,
    pub overlay: PlacementConfig,
    pub capture: CaptureConfig,
    pub output: OutputConfig,
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    pub node_command: String,
    pub headless: bool,
    pub blocked_domains: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            headless: true,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    /// Wait after load before sampling
    #[serde(with = "humantime_serde")]
    pub settle: Duration,
    /// Wait after each scroll before a capture
    #[serde(with = "humantime_serde")]
    pub capture_settle: Duration,
    /// Budget for each browser helper command
    #[serde(with = "humantime_serde")]
    pub process: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            settle: Duration::from_millis(1500),
            capture_settle: Duration::from_millis(300),
            process: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EvaluationConfig {
    #[serde(flatten)]
    pub policy: EvaluationPolicy,
    pub dedup: DedupPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CaptureConfig {
    pub enabled: bool,
    /// Share of the viewport height repeated between consecutive captures
    pub overlap_ratio: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overlap_ratio: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub results_dir: PathBuf,
    pub screenshots_dir: PathBuf,
    /// Scratch directory for raw captures; defaults to `<screenshots_dir>/.capture`
    pub temp_dir: Option<PathBuf>,
    pub highlight_placeholder_weight: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            screenshots_dir: PathBuf::from("screenshots"),
            temp_dir: None,
            highlight_placeholder_weight: false,
        }
    }
}

impl OutputConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| self.screenshots_dir.join(".capture"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FallbackConfig {
    pub selectors: Vec<String>,
    pub viewport_widths: Vec<u32>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_FALLBACK_SELECTORS.iter().map(|s| s.to_string()).collect(),
            viewport_widths: vec![1920, 768, 375],
        }
    }
}

impl FallbackConfig {
    pub fn guide(&self) -> FallbackGuide {
        FallbackGuide {
            selectors: self.selectors.clone(),
            viewports: self
                .viewport_widths
                .iter()
                .filter_map(|w| Viewport::from_label(&format!("{w}px")))
                .collect(),
        }
    }
}

impl Config {
    /// `~/.config/fontaudit/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(|home| PathBuf::from(home).join(".config/fontaudit/config.toml"))
    }

    /// Loads `path`, else the central config if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if !p.exists() => Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Self::from_file(p),
            None => match Self::central_config_path().filter(|p| p.is_file()) {
                Some(central) => Self::from_file(&central),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.browser.node_command.trim().is_empty() {
            return invalid("browser.node-command must not be empty");
        }
        if self.timeouts.navigation.is_zero() || self.timeouts.process.is_zero() {
            return invalid("timeouts.navigation and timeouts.process must be greater than zero");
        }
        if !(0.0..1.0).contains(&self.capture.overlap_ratio) {
            return invalid("capture.overlap-ratio must be in [0, 1)");
        }
        if self.evaluation.policy.text_preview_chars == 0 {
            return invalid("evaluation.text-preview-chars must be positive");
        }
        let metrics = &self.overlay.metrics;
        if metrics.max_width <= 0.0 || metrics.line_height <= 0.0 || metrics.char_width <= 0.0 {
            return invalid("overlay.metrics max-width, line-height and char-width must be positive");
        }
        if self.overlay.step <= 0.0 {
            return invalid("overlay.step must be positive");
        }
        if self.fallback.selectors.iter().all(|s| s.trim().is_empty()) {
            return invalid("fallback.selectors must name at least one selector");
        }
        if self.fallback.viewport_widths.is_empty() || self.fallback.viewport_widths.contains(&0) {
            return invalid("fallback.viewport-widths must list positive widths");
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            node_command: self.browser.node_command.clone(),
            headless: self.browser.headless,
            navigation_timeout: self.timeouts.navigation,
            settle: self.timeouts.settle,
            capture_settle: self.timeouts.capture_settle,
            process_timeout: self.timeouts.process,
            blocked_domains: self.browser.blocked_domains.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::LineHeightPolicy;
    use tempfile::TempDir;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(30));
        assert_eq!(cfg.capture.overlap_ratio, 0.15);
        assert!(!cfg.evaluation.policy.flag_missing_line_height);
        assert_eq!(cfg.evaluation.dedup, DedupPolicy::None);
        assert!(!cfg.output.highlight_placeholder_weight);
        assert_eq!(cfg.output.temp_dir(), PathBuf::from("screenshots/.capture"));
        assert!(cfg.fallback.selectors.contains(&".subtitle".to_string()));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [timeouts]
            navigation = "45s"
            settle = "2s 500ms"

            [evaluation]
            line-height = "evaluate-time"
            dedup = "selector-text-variant"

            [overlay]
            step = 60.0

            [overlay.metrics]
            max-width = 380.0

            [fallback]
            viewport-widths = [1440]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(45));
        assert_eq!(cfg.timeouts.settle, Duration::from_millis(2500));
        assert_eq!(cfg.timeouts.process, Duration::from_secs(60));
        assert_eq!(cfg.evaluation.policy.line_height, LineHeightPolicy::EvaluateTime);
        assert_eq!(cfg.evaluation.policy.text_preview_chars, 100);
        assert_eq!(cfg.evaluation.dedup, DedupPolicy::SelectorTextVariant);
        assert_eq!(cfg.overlay.step, 60.0);
        assert_eq!(cfg.overlay.metrics.max_width, 380.0);
        assert_eq!(cfg.overlay.metrics.line_height, 16.0);

        let fallback = cfg.fallback.guide();
        assert_eq!(fallback.viewports, vec![Viewport::new("1440px", 1440, 1080)]);
    }

    #[test]
    fn validate_rejects_bad_overlap() {
        let mut cfg = Config::default();
        cfg.capture.overlap_ratio = 1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("overlap-ratio"));
    }

    #[test]
    fn validate_rejects_empty_fallback() {
        let mut cfg = Config::default();
        cfg.fallback.viewport_widths.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/no/such/fontaudit.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("fontaudit.toml");
        fs::write(&path, "[browser]\nheadless = false\n").expect("write config");
        let cfg = Config::load(Some(&path)).expect("load");
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.session_options().node_command, "node");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[timeouts]\nnavigation = 5\n").expect("write config");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
