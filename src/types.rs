//! Core types for the Revenuebase MCP server

use reqwest::Method;
use serde_json::{json, Value};

/// Fixed description of one upstream endpoint
#[derive(Debug)]
pub struct Endpoint {
    /// Tool name exposed over MCP
    pub name: &'static str,
    pub method: Method,
    /// Path relative to the versioned base URL
    pub path: &'static str,
}

/// Every endpoint, in the order tools are advertised
pub static ENDPOINTS: [Endpoint; 7] = [
    Endpoint {
        name: "batch_process_email_status",
        method: Method::POST,
        path: "batch-process-email-status",
    },
    Endpoint {
        name: "queued_process",
        method: Method::GET,
        path: "queued-process",
    },
    Endpoint {
        name: "get_credits",
        method: Method::GET,
        path: "credits",
    },
    Endpoint {
        name: "new_api_key",
        method: Method::GET,
        path: "new-api-key",
    },
    Endpoint {
        name: "real_time_email_verification",
        method: Method::POST,
        path: "process-email",
    },
    Endpoint {
        name: "batch_email_submission",
        method: Method::POST,
        path: "batch-process-email",
    },
    Endpoint {
        name: "cancel_process",
        method: Method::POST,
        path: "cancel-process",
    },
];

/// One upstream call: which endpoint, and the argument it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    BatchProcessEmailStatus { process_id: i64 },
    QueuedProcess,
    GetCredits,
    NewApiKey,
    RealTimeEmailVerification { email: String },
    BatchEmailSubmission { filename: String },
    CancelProcess { process_id: i64 },
}

impl Operation {
    pub fn endpoint(&self) -> &'static Endpoint {
        let index = match self {
            Operation::BatchProcessEmailStatus { .. } => 0,
            Operation::QueuedProcess => 1,
            Operation::GetCredits => 2,
            Operation::NewApiKey => 3,
            Operation::RealTimeEmailVerification { .. } => 4,
            Operation::BatchEmailSubmission { .. } => 5,
            Operation::CancelProcess { .. } => 6,
        };
        &ENDPOINTS[index]
    }

    pub fn name(&self) -> &'static str {
        self.endpoint().name
    }

    pub fn method(&self) -> Method {
        self.endpoint().method.clone()
    }

    pub fn path(&self) -> &'static str {
        self.endpoint().path
    }

    /// JSON body sent with the request, if the endpoint takes one
    pub fn payload(&self) -> Option<Value> {
        match self {
            Operation::BatchProcessEmailStatus { process_id }
            | Operation::CancelProcess { process_id } => Some(json!({ "process_id": process_id })),
            Operation::RealTimeEmailVerification { email } => Some(json!({ "email": email })),
            Operation::BatchEmailSubmission { filename } => Some(json!({ "filename": filename })),
            Operation::QueuedProcess | Operation::GetCredits | Operation::NewApiKey => None,
        }
    }
}
