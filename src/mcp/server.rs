//! MCP server implementation

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::client::RevenuebaseClient;

/// MCP server exposing the Revenuebase API as tools
#[derive(Clone)]
pub struct RevenuebaseServer {
    pub client: Arc<RevenuebaseClient>,
    tool_router: ToolRouter<Self>,
}

// Tool parameter types

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProcessIdParams {
    /// Identifier of the batch processing job
    pub process_id: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmailParams {
    /// Email address to verify
    pub email: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilenameParams {
    /// Name of the previously uploaded file to process
    pub filename: String,
}

/// Upstream JSON goes back as-is; failures become error results the agent can read.
fn into_tool_result(operation: &str, result: crate::Result<Value>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(e) => {
            tracing::warn!(operation, "Tool call failed: {}", e);
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

// Server implementation

#[tool_router]
impl RevenuebaseServer {
    pub fn new(client: Arc<RevenuebaseClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Names of all registered tools
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    #[tool(description = "Retrieves status of batch email processing job.")]
    pub async fn batch_process_email_status(
        &self,
        Parameters(params): Parameters<ProcessIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.batch_process_email_status(params.process_id).await;
        into_tool_result("batch_process_email_status", result)
    }

    #[tool(description = "Lists all queued email batch processing jobs.")]
    pub async fn queued_process(&self) -> Result<CallToolResult, McpError> {
        into_tool_result("queued_process", self.client.queued_process().await)
    }

    #[tool(description = "Retrieves the number of remaining credits for the authenticated user.")]
    pub async fn get_credits(&self) -> Result<CallToolResult, McpError> {
        into_tool_result("get_credits", self.client.get_credits().await)
    }

    #[tool(description = "Generates and returns a new API key for the user.")]
    pub async fn new_api_key(&self) -> Result<CallToolResult, McpError> {
        into_tool_result("new_api_key", self.client.new_api_key().await)
    }

    #[tool(description = "Verifies a single email address using the Revenuebase API.")]
    pub async fn real_time_email_verification(
        &self,
        Parameters(params): Parameters<EmailParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.real_time_email_verification(&params.email).await;
        into_tool_result("real_time_email_verification", result)
    }

    #[tool(description = "Submits a file reference for batch email processing using the Revenuebase API.")]
    pub async fn batch_email_submission(
        &self,
        Parameters(params): Parameters<FilenameParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.batch_email_submission(&params.filename).await;
        into_tool_result("batch_email_submission", result)
    }

    #[tool(description = "Cancels an ongoing or queued batch email processing job using the Revenuebase API.")]
    pub async fn cancel_process(
        &self,
        Parameters(params): Parameters<ProcessIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.client.cancel_process(params.process_id).await;
        into_tool_result("cancel_process", result)
    }
}

#[tool_handler]
impl ServerHandler for RevenuebaseServer {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::default(),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: rmcp::model::Implementation {
                name: "revenuebase-mcp".into(),
                title: Some("Revenuebase MCP server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some("Revenuebase email verification. Use real_time_email_verification for single addresses, batch_email_submission to start a batch job, batch_process_email_status or queued_process to track jobs, and get_credits to check the remaining balance.".into()),
        }
    }
}

/// Run the MCP server on stdio
pub async fn serve_stdio(server: RevenuebaseServer) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server on stdio...");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Run the MCP server on HTTP
pub async fn serve_http(server: RevenuebaseServer, port: u16) -> anyhow::Result<()> {
    use axum::routing::get;
    use axum::Router;
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService, StreamableHttpServerConfig,
    };
    use tokio_util::sync::CancellationToken;
    use tower_http::trace::TraceLayer;

    let client = server.client.clone();
    let ct = CancellationToken::new();

    let config = StreamableHttpServerConfig {
        cancellation_token: ct.clone(),
        ..Default::default()
    };

    let mcp_service = StreamableHttpService::new(
        move || Ok(RevenuebaseServer::new(client.clone())),
        Arc::new(LocalSessionManager::default()),
        config,
    );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", mcp_service)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Revenuebase MCP server running at http://{}/mcp", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down...");
            ct.cancel();
        })
        .await?;

    Ok(())
}
