//! MCP tool surface

pub mod server;

pub use server::RevenuebaseServer;
