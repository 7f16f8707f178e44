//! Revenuebase MCP server - the Revenuebase email verification API exposed as agent tools

pub mod config;
pub mod error;
pub mod types;

pub mod client;
pub mod mcp;

pub use client::RevenuebaseClient;
pub use config::Config;
pub use error::{Error, Result};
pub use types::Operation;
