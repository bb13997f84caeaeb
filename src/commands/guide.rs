use std::path::PathBuf;
use std::process::ExitCode;

use fontaudit_lib::output::{GuideOutput, OUTPUT_VERSION};
use fontaudit_lib::{guide, AuditError, AuditOutput};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

/// Run the guide command.
pub async fn run_guide(
    config_path: Option<PathBuf>,
    verbose: bool,
    guide_path: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    if verbose {
        eprintln!("Reading style guide {}\u{2026}", guide_path.display());
    }

    let loaded = match guide::load(
        &guide_path,
        config.evaluation.policy.line_height,
        &config.fallback.guide(),
    ) {
        Ok(loaded) => loaded,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let rules = loaded.guide.rules;
    let body = AuditOutput::Guide(GuideOutput {
        version: OUTPUT_VERSION.to_string(),
        path: guide_path,
        status: loaded.status,
        viewports: loaded.guide.viewports,
        selector_count: rules.selector_count(),
        rule_count: rules.rule_count(),
        rules,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
