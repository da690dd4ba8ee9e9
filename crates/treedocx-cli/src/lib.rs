//! treedocx CLI - Command-line interface library
//!
//! This library provides the CLI functionality for treedocx:
//! - Build: Translate every configured output document into a `.docx`
//! - Assemble: Print the merged tree of one document
//!
//! # Library Usage
//!
//! ```ignore
//! use treedocx_cli::{build_command, OutputFormat};
//!
//! let report = build_command(Path::new("docs/_doctrees"), None, None, false, OutputFormat::Text)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Build into docs/_doctrees/_build
//! treedocx build docs/_doctrees
//!
//! # Show which documents the manual is made of
//! treedocx assemble docs/_doctrees index --list
//! ```

pub mod app;

pub use app::{assemble_command, build_command, load_config, run_cli, OutputFormat};
