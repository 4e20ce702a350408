//! Rendering of analysis reports.

pub mod json;
pub mod terminal;
