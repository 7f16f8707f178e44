//! Authenticated HTTP client for the Revenuebase API

mod invoker;

pub use invoker::RevenuebaseClient;
