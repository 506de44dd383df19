//! MCP server initialization for stdio and Streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that open the database
//! and wire it into the MCP tool handler.

use crate::config::ScriptoriumConfig;
use crate::db;
use crate::tools::KnowledgeTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open DB and wrap state in Arc for sharing across sessions.
fn setup_shared_state(
    config: ScriptoriumConfig,
) -> Result<(Arc<Mutex<rusqlite::Connection>>, Arc<ScriptoriumConfig>)> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    Ok((Arc::new(Mutex::new(conn)), Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: ScriptoriumConfig) -> Result<()> {
    tracing::info!("starting Scriptorium MCP server on stdio");

    let (db, config) = setup_shared_state(config)?;

    let tools = KnowledgeTools::new(db, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP, mounted at `/mcp`.
pub async fn serve_http(config: ScriptoriumConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting Scriptorium MCP server on HTTP");

    let (db, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(KnowledgeTools::new(db.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

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
