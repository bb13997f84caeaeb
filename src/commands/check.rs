use std::path::PathBuf;
use std::process::ExitCode;

use fontaudit_lib::output::{CheckOutput, OUTPUT_VERSION};
use fontaudit_lib::{
    evaluate_snapshot, guide, load_snapshot, write_workbook, AuditError, AuditOutput,
    ResultAggregator, RunContext,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

/// Run the check command.
#[allow(clippy::too_many_arguments)]
pub async fn run_check(
    config_path: Option<PathBuf>,
    verbose: bool,
    guide_path: PathBuf,
    snapshot_path: PathBuf,
    viewport: String,
    results: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let loaded = match guide::load(
        &guide_path,
        config.evaluation.policy.line_height,
        &config.fallback.guide(),
    ) {
        Ok(loaded) => loaded,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let ctx = RunContext::new(loaded);
    let viewport = match ctx.viewport(&viewport) {
        Some(vp) => vp.clone(),
        None => {
            let known: Vec<&str> = ctx.viewports.iter().map(|v| v.name.as_str()).collect();
            let err = AuditError::Config(format!(
                "Unknown viewport '{}' (guide defines: {})",
                viewport,
                known.join(", ")
            ));
            return render_error(err, format, output.clone());
        }
    };

    let snapshot = match load_snapshot(&snapshot_path) {
        Ok(snapshot) => snapshot,
        Err(err) => return render_error(err, format, output.clone()),
    };
    if verbose {
        eprintln!(
            "Evaluating {} selector(s) against {} snapshot node(s) at {}",
            ctx.rules.selector_count(),
            snapshot.nodes.len(),
            viewport
        );
    }

    let policy = &config.evaluation.policy;
    let evaluation = evaluate_snapshot(&ctx, &snapshot, &viewport, policy);
    let mut aggregator = ResultAggregator::new(
        config.evaluation.dedup,
        config.output.highlight_placeholder_weight,
    );
    aggregator.add(&viewport, evaluation.results.clone());
    let counts = aggregator.counts();

    let workbook = match results {
        Some(path) => match write_workbook(&path, &aggregator.finish()) {
            Ok(true) => Some(path),
            Ok(false) => None,
            Err(err) => return render_error(err, format, output.clone()),
        },
        None => None,
    };

    let body = AuditOutput::Check(CheckOutput {
        version: OUTPUT_VERSION.to_string(),
        guide: ctx.guide_status.clone(),
        viewport,
        counts,
        results: evaluation.results,
        workbook,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
