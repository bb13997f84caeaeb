//! Core data types shared across the auditor.
//!
//! - [`BoundingBox`] - page-absolute geometry
//! - [`DomSnapshot`] - the captured parts of a rendered page
//! - [`ComparisonResult`] - evaluator output

mod core;
mod dom;
mod results;

pub use self::core::BoundingBox;
pub use dom::{ComputedStyle, DomNode, DomSnapshot, SelectorMatch};
pub use results::{
    ComparisonResult, MismatchDetail, Property, ResultStatus, TypographyValues, NOT_FOUND,
};
pub use crate::viewport::Viewport;
