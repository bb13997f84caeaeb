use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fontaudit")]
#[command(
    version,
    about = "Typography auditor - check rendered fonts against a style guide across viewports",
    long_about = "fontaudit\n\nModes:\n- audit: visit every URL at every style-guide viewport, compare rendered typography against the guide, write a workbook per URL and annotated screenshots of mismatches.\n- guide: parse a style guide and print the resulting rules and viewports.\n- check: evaluate a saved DOM snapshot (JSON) against a style guide without a browser.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with defaults for timeouts, evaluation, overlay and output; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit pages against a style guide
    Audit {
        #[arg(long, help = "Style guide workbook (xlsx/xls/xlsb/ods) or JSON rows")]
        guide: PathBuf,

        #[arg(long, help = "URL list (JSON or YAML): {\"urls\": [...]} or {\"homepage\": ...}")]
        urls: PathBuf,

        #[arg(long, value_name = "PATH", help = "Directory for result workbooks")]
        results_dir: Option<PathBuf>,

        #[arg(long, value_name = "PATH", help = "Directory for annotated screenshots")]
        screenshots_dir: Option<PathBuf>,

        #[arg(
            long,
            value_name = "NAME",
            help = "Only audit these style-guide viewports (repeatable, e.g. --viewport 1920px)"
        )]
        viewport: Vec<String>,

        #[arg(
            long,
            default_value = "30",
            help = "Navigation timeout (seconds) for each page load"
        )]
        nav_timeout: u64,

        #[arg(
            long,
            default_value = "1500",
            help = "Wait (milliseconds) after load before sampling"
        )]
        settle_ms: u64,

        #[arg(
            long,
            help = "Drop repeated (selector, text, variant) rows within a viewport"
        )]
        dedup: bool,

        #[arg(long, help = "Skip annotated screenshots")]
        no_screenshots: bool,

        #[arg(long, help = "Show the browser window")]
        headed: bool,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Parse a style guide and print its rules
    Guide {
        #[arg(long, help = "Style guide workbook (xlsx/xls/xlsb/ods) or JSON rows")]
        guide: PathBuf,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Evaluate a saved DOM snapshot against a style guide
    Check {
        #[arg(long, help = "Style guide workbook (xlsx/xls/xlsb/ods) or JSON rows")]
        guide: PathBuf,

        #[arg(long, help = "DOM snapshot JSON captured by the browser helper")]
        snapshot: PathBuf,

        #[arg(long, value_name = "NAME", help = "Style-guide viewport the snapshot was taken at")]
        viewport: String,

        #[arg(long, value_name = "PATH", help = "Also write the rows to this workbook")]
        results: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn audit_command_uses_defaults() {
        let cli = Cli::parse_from([
            "fontaudit",
            "audit",
            "--guide",
            "guide.xlsx",
            "--urls",
            "urls.json",
        ]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Audit {
                guide,
                urls,
                results_dir,
                screenshots_dir,
                viewport,
                nav_timeout,
                settle_ms,
                dedup,
                no_screenshots,
                headed,
                format,
                output,
            } => {
                assert_eq!(guide, Path::new("guide.xlsx"));
                assert_eq!(urls, Path::new("urls.json"));
                assert!(results_dir.is_none());
                assert!(screenshots_dir.is_none());
                assert!(viewport.is_empty());
                assert_eq!(nav_timeout, 30);
                assert_eq!(settle_ms, 1500);
                assert!(!dedup);
                assert!(!no_screenshots);
                assert!(!headed);
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected audit command"),
        }
    }

    #[test]
    fn audit_command_respects_overrides() {
        let cli = Cli::parse_from([
            "fontaudit",
            "--verbose",
            "audit",
            "--guide",
            "guide.xlsx",
            "--urls",
            "urls.yaml",
            "--results-dir",
            "out/results",
            "--screenshots-dir",
            "out/shots",
            "--viewport",
            "1920px",
            "--viewport",
            "375px",
            "--nav-timeout",
            "45",
            "--settle-ms",
            "500",
            "--dedup",
            "--no-screenshots",
            "--format",
            "pretty",
            "--output",
            "summary.json",
            "--config",
            "fontaudit.toml",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(Path::new("fontaudit.toml")));
        match cli.command {
            Commands::Audit {
                results_dir,
                screenshots_dir,
                viewport,
                nav_timeout,
                settle_ms,
                dedup,
                no_screenshots,
                format,
                output,
                ..
            } => {
                assert_eq!(results_dir.as_deref(), Some(Path::new("out/results")));
                assert_eq!(screenshots_dir.as_deref(), Some(Path::new("out/shots")));
                assert_eq!(viewport, vec!["1920px".to_string(), "375px".to_string()]);
                assert_eq!(nav_timeout, 45);
                assert_eq!(settle_ms, 500);
                assert!(dedup);
                assert!(no_screenshots);
                assert!(matches!(format, OutputFormat::Pretty));
                assert_eq!(output.as_deref(), Some(Path::new("summary.json")));
            }
            _ => panic!("expected audit command with overrides"),
        }
    }

    #[test]
    fn check_command_requires_viewport() {
        let result = Cli::try_parse_from([
            "fontaudit",
            "check",
            "--guide",
            "guide.json",
            "--snapshot",
            "snap.json",
        ]);
        assert!(result.is_err());

        let cli = Cli::parse_from([
            "fontaudit",
            "check",
            "--guide",
            "guide.json",
            "--snapshot",
            "snap.json",
            "--viewport",
            "768px",
            "--results",
            "check.xlsx",
        ]);
        match cli.command {
            Commands::Check {
                viewport, results, ..
            } => {
                assert_eq!(viewport, "768px");
                assert_eq!(results.as_deref(), Some(Path::new("check.xlsx")));
            }
            _ => panic!("expected check command"),
        }
    }
}
