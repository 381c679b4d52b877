//! Presentation layer: filter widgets and chart rendering.

pub mod panels;
pub mod plot;
