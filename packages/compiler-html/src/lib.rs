//! # Blockmail HTML Compiler
//!
//! Renders a block tree as a static HTML document. Read-only: the tree is
//! borrowed immutably and visited once, in child order.

mod compiler;

pub use compiler::{compile_to_html, export_file_name, CompileOptions};
