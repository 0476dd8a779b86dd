pub mod config;
pub mod delegate;
pub mod error;
pub mod git;
pub mod manifest;
pub mod pipeline;
pub mod publish;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{RelkitError, Result};
