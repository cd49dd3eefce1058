//! Application-level utilities for the Mobility CLI.
//!
//! This module provides:
//! - Lazy config loading and vault opening
//! - Login of the acting operator
//! - Password prompts with environment overrides

mod context;
mod prompt;

pub use context::AppContext;
pub use prompt::{prompt_new_password, prompt_password};
