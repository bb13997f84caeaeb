mod audit;
mod check;
mod guide;

pub use audit::run_audit;
pub use check::run_check;
pub use guide::run_guide;
