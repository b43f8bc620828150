use anyhow::anyhow;
use deep_search::lifecycle::{Lifecycle, Phase};
use deep_search_core::{Dispatcher, FormattedOutput, ModelClass, Provider, Surface};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ListResourcesResult, PaginatedRequestParam,
        ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServiceExt,
};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod errors;
use errors::to_mcp_error;

// provider/maxResults/modelClass are checked by the dispatcher, not by serde.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeepSearchArgs {
    /// The search query
    query: String,
    /// Search provider to use (default: brave)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "provider_schema")]
    provider: Option<String>,
    /// Maximum number of results to return (default: 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "number_schema")]
    max_results: Option<serde_json::Number>,
    /// Include AI-generated answer for the query, if supported by the provider (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include_answer: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ComprehensiveResearchArgs {
    /// The research topic or question to investigate comprehensively
    query: String,
    /// AI model class to use for research (default: reasoning_mini)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "model_class_schema")]
    model_class: Option<String>,
}

fn provider_schema(generator: &mut SchemaGenerator) -> Schema {
    Provider::json_schema(generator)
}

fn model_class_schema(generator: &mut SchemaGenerator) -> Schema {
    ModelClass::json_schema(generator)
}

fn number_schema(_: &mut SchemaGenerator) -> Schema {
    schemars::json_schema!({ "type": "number" })
}

#[derive(Clone)]
pub(crate) struct DeepSearchMcp {
    tool_router: ToolRouter<Self>,
    dispatcher: Arc<Dispatcher>,
}

#[tool_router]
impl DeepSearchMcp {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dispatcher,
        }
    }

    async fn run<A: Serialize>(&self, tool: &str, args: &A) -> Result<CallToolResult, McpError> {
        let bag = match serde_json::to_value(args) {
            Ok(serde_json::Value::Object(m)) => m,
            Ok(_) => serde_json::Map::new(),
            Err(e) => return Err(McpError::internal_error(e.to_string(), None)),
        };
        match self
            .dispatcher
            .dispatch_for(Surface::Protocol, tool, &bag)
            .await
        {
            Ok(FormattedOutput::Blocks(blocks)) => Ok(CallToolResult::success(
                blocks.into_iter().map(Content::text).collect(),
            )),
            Ok(FormattedOutput::Console { stdout, .. }) => {
                Ok(CallToolResult::success(vec![Content::text(stdout)]))
            }
            Err(e) => {
                tracing::error!(tool, error = %e, "tool call failed");
                Err(to_mcp_error(&e))
            }
        }
    }

    #[tool(description = "Perform deep web searches using multiple search providers")]
    async fn deep_search(
        &self,
        Parameters(args): Parameters<DeepSearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run("deep_search", &args).await
    }

    #[tool(
        description = "Perform comprehensive research using multiple search engines automatically with AI agents"
    )]
    async fn comprehensive_research(
        &self,
        Parameters(args): Parameters<ComprehensiveResearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run("comprehensive_research", &args).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for DeepSearchMcp {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::default();
        server_info.name = "deep-search".to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();
        ServerInfo {
            instructions: Some(
                "Web search (deep_search) and multi-step research (comprehensive_research) over an external engine. Research calls can take several minutes."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info,
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(Vec::new()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        Err(McpError::resource_not_found(
            "No resources available",
            Some(serde_json::json!({ "uri": request.uri })),
        ))
    }
}

pub(crate) async fn serve_stdio(dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let mut lifecycle = Lifecycle::new();
    tracing::info!(pid = std::process::id(), "starting deep-search MCP server");

    let running = match DeepSearchMcp::new(dispatcher).serve(stdio()).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            lifecycle.advance(Phase::ShuttingDown)?;
            lifecycle.advance(Phase::Stopped)?;
            return Err(anyhow!("failed to start MCP server: {e}"));
        }
    };
    lifecycle.advance(Phase::Ready)?;
    tracing::info!("deep-search MCP server ready on stdio");

    // Dropping the running service (signal branch) cancels it.
    let outcome = tokio::select! {
        quit = running.waiting() => {
            lifecycle.advance(Phase::ShuttingDown)?;
            match quit {
                Ok(reason) => {
                    tracing::info!(?reason, "client disconnected, shutting down");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, "server task failed");
                    Err(anyhow!("MCP server task failed: {e}"))
                }
            }
        }
        signal = shutdown_signal() => {
            lifecycle.advance(Phase::ShuttingDown)?;
            tracing::info!(signal, "received signal, shutting down");
            Ok(())
        }
    };

    lifecycle.advance(Phase::Stopped)?;
    tracing::info!("server stopped");
    outcome
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler could be installed; never resolve rather than shut down spuriously.
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = term.recv() => "SIGTERM",
        },
        Err(_) => {
            ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await;
    "ctrl-c"
}
