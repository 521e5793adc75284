//! Unified diff parsing and context windowing.

pub mod parser;
pub mod window;

pub use parser::parse;
pub use window::changed_lines_with_context;
