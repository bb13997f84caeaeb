use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fontaudit_lib::output::{ErrorOutput, OUTPUT_VERSION};
use fontaudit_lib::{AuditError, AuditOutput, GuideStatus, StatusCounts};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &AuditOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: AuditError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    log::debug!("fatal: {err:?}");
    let error_payload = err.to_payload();
    let payload = AuditOutput::Error(ErrorOutput {
        version: OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Mismatches never fail a run; 2 is reserved for fatal errors.
    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(body: &AuditOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &AuditOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &AuditOutput, colorize: bool) -> String {
    match body {
        AuditOutput::Audit(out) => {
            let mut buf = String::new();
            let header = status_header(&out.counts, colorize);
            writeln!(buf, "{} Typography audit", header).ok();
            write_guide_status(&mut buf, &out.guide, colorize);
            let names: Vec<&str> = out.viewports.iter().map(|v| v.name.as_str()).collect();
            writeln!(buf, "Viewports: {}", names.join(", ")).ok();
            writeln!(buf, "Totals: {}", format_counts(&out.counts)).ok();

            for page in &out.pages {
                writeln!(buf, "- {} ({})", page.name, page.url).ok();
                for vp in &page.viewports {
                    let load = if vp.loaded {
                        String::new()
                    } else {
                        color(" [load failed]", "33", colorize)
                    };
                    writeln!(
                        buf,
                        "    {:8} {}{}",
                        vp.viewport.name,
                        format_counts(&vp.counts),
                        load
                    )
                    .ok();
                    if let Some(shot) = &vp.screenshot {
                        writeln!(buf, "    {:8} {}", "", shot.display()).ok();
                    }
                }
                if let Some(path) = &page.workbook {
                    writeln!(buf, "    workbook {}", path.display()).ok();
                }
            }
            buf
        }
        AuditOutput::Guide(out) => {
            let mut buf = String::new();
            let header = color("[GUIDE]", "36", colorize);
            writeln!(
                buf,
                "{} {}: {} selectors, {} rules",
                header,
                out.path.display(),
                out.selector_count,
                out.rule_count
            )
            .ok();
            write_guide_status(&mut buf, &out.status, colorize);
            let names: Vec<&str> = out.viewports.iter().map(|v| v.name.as_str()).collect();
            writeln!(buf, "Viewports: {}", names.join(", ")).ok();
            for (selector, rules) in out.rules.iter() {
                for rule in rules {
                    let sizes: Vec<String> = out
                        .viewports
                        .iter()
                        .map(|v| format!("{}={}", v.name, rule.font_size_for(&v.name)))
                        .collect();
                    writeln!(
                        buf,
                        "- {} ({}) family {} weight {} line-height {} | {}",
                        selector,
                        rule.variant,
                        rule.font_family,
                        rule.font_weight,
                        rule.line_height,
                        sizes.join(" ")
                    )
                    .ok();
                }
            }
            buf
        }
        AuditOutput::Check(out) => {
            let mut buf = String::new();
            let header = status_header(&out.counts, colorize);
            writeln!(buf, "{} Snapshot check at {}", header, out.viewport).ok();
            write_guide_status(&mut buf, &out.guide, colorize);
            writeln!(buf, "Totals: {}", format_counts(&out.counts)).ok();
            let mismatches: Vec<_> = out.results.iter().filter(|r| r.status.is_mismatch()).collect();
            if !mismatches.is_empty() {
                writeln!(buf, "Mismatches:").ok();
                for result in mismatches {
                    let details: Vec<String> = result
                        .mismatch_details
                        .iter()
                        .map(|d| format!("{} expected {}, actual {}", d.property, d.expected, d.actual))
                        .collect();
                    writeln!(buf, "- {} ({}): {}", result.selector, result.variant, details.join("; ")).ok();
                }
            }
            if let Some(path) = &out.workbook {
                writeln!(buf, "Workbook: {}", path.display()).ok();
            }
            buf
        }
        AuditOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn status_header(counts: &StatusCounts, colorize: bool) -> String {
    if counts.mismatched == 0 {
        color("CLEAN", "32", colorize)
    } else {
        color("MISMATCHES", "31", colorize)
    }
}

fn write_guide_status(buf: &mut String, status: &GuideStatus, colorize: bool) {
    if let GuideStatus::Fallback { reason } = status {
        let tag = color("Fallback guide:", "33", colorize);
        writeln!(buf, "{} {}", tag, reason).ok();
    }
}

fn format_counts(counts: &StatusCounts) -> String {
    format!(
        "{} match, {} mismatch, {} not found, {} informational",
        counts.matched, counts.mismatched, counts.not_found, counts.informational
    )
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
