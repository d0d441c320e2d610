//! Server initialization for the stdio MCP transport and the HTTP server.
//!
//! [`serve_stdio`] runs the MCP tools alone. [`serve_http`] runs the REST API
//! and nests the MCP tools at `/mcp` (Streamable HTTP) on the same listener.

use crate::api::{self, AppState, SharedState};
use crate::config::LevelupConfig;
use crate::db;
use crate::suggest::{OllamaGenerator, Suggester, TextGenerator};
use crate::tools::LevelupTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open DB, build the Ollama-backed suggester.
pub fn setup_shared_state(config: LevelupConfig) -> Result<SharedState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let generator: Arc<dyn TextGenerator> = Arc::new(OllamaGenerator::new(&config.llm)?);
    tracing::info!(base_url = %config.llm.base_url, "ollama client ready");

    Ok(build_state(conn, config, generator))
}

/// Assemble the state from parts. Tests pass an in-memory connection and a stub generator.
pub fn build_state(
    conn: rusqlite::Connection,
    config: LevelupConfig,
    generator: Arc<dyn TextGenerator>,
) -> SharedState {
    let suggester = Suggester::new(
        generator,
        config.llm.clone(),
        config.progression.reward_policy,
    );
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: Arc::new(config),
        suggester: Arc::new(suggester),
    })
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: LevelupConfig) -> Result<()> {
    tracing::info!("starting levelup MCP server on stdio");

    let state = setup_shared_state(config)?;

    let tools = LevelupTools::new(state);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the REST API with the MCP tools nested at `/mcp`.
pub async fn serve_http(config: LevelupConfig) -> Result<()> {
    let bind_addr = config.bind_addr();

    tracing::info!(addr = %bind_addr, "starting levelup HTTP server");

    let state = setup_shared_state(config)?;

    let mcp_state = Arc::clone(&state);
    let mcp = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(LevelupTools::new(Arc::clone(&mcp_state))),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = api::router(state).nest_service("/mcp", mcp);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "REST at http://{bind_addr}/, MCP at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
