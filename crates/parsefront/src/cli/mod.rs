//! CLI command implementations.

mod display;

pub mod fragment;
pub mod parse;
pub mod select;
