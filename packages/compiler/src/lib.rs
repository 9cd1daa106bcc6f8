#![deny(clippy::all)]

/**
 * Isomer Compiler
 *
 * Compiles declarative web component templates into client construction
 * code, server render chunks and a reactive data mapping tree.
 */

// Core modules
pub mod component;
pub mod error;
pub mod settings;

// Parser modules
pub mod expression_parser;
pub mod html;
pub mod js;
pub mod template;

// Compilation modules
pub mod build;
pub mod runtime;

// Re-exports
pub use component::{compile_template, CompiledTemplate, Component, ComponentRegistry};
pub use error::{CompileError, Result};
pub use runtime::{assemble_runtime, RuntimeFeatures};
pub use settings::{CompileSettings, Context};
pub use template::{parse_shell, ShellData, TypeSignature};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
