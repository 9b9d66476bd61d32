//! XBoard protocol surface: command construction and output-line parsing.

pub mod commands;
pub mod parser;

pub use parser::{parse_output_line, OutputLine, ThinkingLine};
