pub mod action;
pub mod allowlist;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod io;
pub mod paths;
pub mod pipeline;
pub mod resolve;

pub use error::{ActpinError, Result};
