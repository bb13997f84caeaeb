use std::path::PathBuf;
use std::process::ExitCode;

use fontaudit_lib::output::AuditRunOutput;
use fontaudit_lib::{
    guide, load_url_list, AuditError, AuditOptions, AuditOutput, Auditor, CaptureSettings,
    Config, PageSession, RunContext,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::progress::stderr_progress;
use crate::settings::{
    apply_audit_overrides, format_effective_config, load_config, AuditFlagSources,
    AuditOverrides,
};

/// Run the audit command.
#[allow(clippy::too_many_arguments)]
pub async fn run_audit(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    guide_path: PathBuf,
    urls: PathBuf,
    viewports: Vec<String>,
    overrides: AuditOverrides,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let flag_sources = AuditFlagSources::from_args(raw_args);
    apply_audit_overrides(&mut config, &overrides, &flag_sources);
    if verbose {
        eprintln!("{}", format_effective_config(&config, config_path.as_deref()));
        eprintln!("Reading style guide\u{2026}");
    }

    let loaded = match guide::load(
        &guide_path,
        config.evaluation.policy.line_height,
        &config.fallback.guide(),
    ) {
        Ok(loaded) => loaded,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let mut ctx = RunContext::new(loaded);
    if let Err(err) = ctx.restrict_viewports(&viewports) {
        return render_error(err, format, output.clone());
    }

    let targets = match load_url_list(&urls) {
        Ok(targets) => targets,
        Err(err) => return render_error(AuditError::from(err), format, output.clone()),
    };
    if verbose {
        eprintln!(
            "Auditing {} page(s) at {} viewport(s) for {} selector(s)",
            targets.len(),
            ctx.viewports.len(),
            ctx.rules.selector_count()
        );
        eprintln!("Launching browser\u{2026}");
    }

    let session = match PageSession::launch(config.session_options()).await {
        Ok(session) => session,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let mut auditor = Auditor::new(session, audit_options(&config)).with_progress(stderr_progress(verbose));
    let result = auditor.run(&ctx, &targets).await;
    if let Err(err) = auditor.into_driver().close().await {
        log::warn!("Browser helper did not shut down cleanly: {err}");
    }

    let report = match result {
        Ok(report) => report,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let body = AuditOutput::Audit(AuditRunOutput::new(report, ctx.viewports.clone()));
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}

fn audit_options(config: &Config) -> AuditOptions {
    AuditOptions {
        policy: config.evaluation.policy.clone(),
        placement: config.overlay,
        dedup: config.evaluation.dedup,
        highlight_placeholder_weight: config.output.highlight_placeholder_weight,
        results_dir: config.output.results_dir.clone(),
        screenshots_dir: config.output.screenshots_dir.clone(),
        capture: config.capture.enabled.then(|| CaptureSettings {
            overlap_ratio: config.capture.overlap_ratio,
            temp_dir: config.output.temp_dir(),
        }),
    }
}
