use std::path::{Path, PathBuf};
use std::time::Duration;

use fontaudit_lib::report::DedupPolicy;
use fontaudit_lib::{AuditError, Config};

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct AuditFlagSources {
    pub nav_timeout: bool,
    pub settle_ms: bool,
}

impl AuditFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            nav_timeout: flag_present(args, "--nav-timeout"),
            settle_ms: flag_present(args, "--settle-ms"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Audit flags that can override the config file.
#[derive(Debug, Clone, Default)]
pub struct AuditOverrides {
    pub results_dir: Option<PathBuf>,
    pub screenshots_dir: Option<PathBuf>,
    pub nav_timeout: u64,
    pub settle_ms: u64,
    pub dedup: bool,
    pub no_screenshots: bool,
    pub headed: bool,
}

/// Merge CLI arguments into the config, preferring CLI when flags are present.
pub fn apply_audit_overrides(config: &mut Config, cli: &AuditOverrides, flags: &AuditFlagSources) {
    if flags.nav_timeout {
        config.timeouts.navigation = Duration::from_secs(cli.nav_timeout);
    }
    if flags.settle_ms {
        config.timeouts.settle = Duration::from_millis(cli.settle_ms);
    }
    if let Some(dir) = &cli.results_dir {
        config.output.results_dir = dir.clone();
    }
    if let Some(dir) = &cli.screenshots_dir {
        config.output.screenshots_dir = dir.clone();
    }
    if cli.dedup {
        config.evaluation.dedup = DedupPolicy::SelectorTextVariant;
    }
    if cli.no_screenshots {
        config.capture.enabled = false;
    }
    if cli.headed {
        config.browser.headless = false;
    }
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/fontaudit/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, AuditError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        AuditError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        AuditError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: timeouts: nav={}, settle={}, process={}, line-height={:?}, dedup={:?}, screenshots={}, results={}, screenshots-dir={}",
        humantime_serde::re::humantime::format_duration(config.timeouts.navigation),
        humantime_serde::re::humantime::format_duration(config.timeouts.settle),
        humantime_serde::re::humantime::format_duration(config.timeouts.process),
        config.evaluation.policy.line_height,
        config.evaluation.dedup,
        config.capture.enabled,
        config.output.results_dir.display(),
        config.output.screenshots_dir.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_present_handles_equals_form() {
        let raw = args(&["fontaudit", "audit", "--nav-timeout=10"]);
        assert!(flag_present(&raw, "--nav-timeout"));
        assert!(!flag_present(&raw, "--settle-ms"));
    }

    #[test]
    fn config_wins_when_flags_absent() {
        let mut config = Config::default();
        config.timeouts.navigation = Duration::from_secs(90);
        let cli = AuditOverrides {
            nav_timeout: 30,
            settle_ms: 1500,
            ..AuditOverrides::default()
        };
        apply_audit_overrides(&mut config, &cli, &AuditFlagSources::default());
        assert_eq!(config.timeouts.navigation, Duration::from_secs(90));
        assert!(config.capture.enabled);
    }

    #[test]
    fn cli_wins_when_flags_present() {
        let mut config = Config::default();
        config.timeouts.navigation = Duration::from_secs(90);
        let cli = AuditOverrides {
            results_dir: Some(PathBuf::from("out")),
            nav_timeout: 12,
            settle_ms: 250,
            dedup: true,
            no_screenshots: true,
            ..AuditOverrides::default()
        };
        let flags = AuditFlagSources::from_args(&args(&[
            "fontaudit",
            "audit",
            "--nav-timeout",
            "12",
            "--settle-ms=250",
        ]));
        apply_audit_overrides(&mut config, &cli, &flags);

        assert_eq!(config.timeouts.navigation, Duration::from_secs(12));
        assert_eq!(config.timeouts.settle, Duration::from_millis(250));
        assert_eq!(config.output.results_dir, PathBuf::from("out"));
        assert_eq!(config.evaluation.dedup, DedupPolicy::SelectorTextVariant);
        assert!(!config.capture.enabled);
    }

    #[test]
    fn format_effective_config_includes_fields() {
        let text = format_effective_config(&Config::default(), None);
        assert!(text.contains("[defaults]"));
        assert!(text.contains("nav=30s"));
        assert!(text.contains("results=results"));
    }

    #[test]
    fn load_config_reports_missing_explicit_file() {
        let err = load_config(Some(Path::new("/no/such/fontaudit.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
