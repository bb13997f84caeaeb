use std::sync::Arc;

pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Stderr progress when `verbose` is set.
pub fn stderr_progress(verbose: bool) -> Option<ProgressCallback> {
    if verbose {
        Some(Arc::new(|msg: &str| eprintln!("{msg}")))
    } else {
        None
    }
}
