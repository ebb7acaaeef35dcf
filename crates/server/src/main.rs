//! Grounded answer server
//!
//! Fuses local semantic retrieval with live web search and streams
//! grounded, source-attributed answers over SSE.

mod events;
mod routes;
mod state;
mod stream;

use clap::Parser;
use grounded_core::{config, logging, AppResult, ServerConfig};
use state::AppState;

/// Grounded - retrieval-fusion answer server with streaming output
#[derive(Parser, Debug)]
#[command(name = "grounded")]
#[command(about = "Retrieval-fusion answer server with streaming output", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "GROUNDED_BIND", default_value = config::DEFAULT_BIND)]
    bind: String,

    /// Generation model identifier
    #[arg(short, long, env = "GROUNDED_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Embedding model identifier
    #[arg(
        long,
        env = "GROUNDED_EMBEDDING_MODEL",
        default_value = config::DEFAULT_EMBEDDING_MODEL
    )]
    embedding_model: String,

    /// Ollama runtime endpoint
    #[arg(long, env = "OLLAMA_URL", default_value = config::DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Relevance gate cutoff for local retrieval (cosine similarity)
    #[arg(
        long,
        env = "GROUNDED_RELEVANCE_THRESHOLD",
        default_value_t = config::DEFAULT_RELEVANCE_THRESHOLD
    )]
    relevance_threshold: f32,

    /// Maximum chunk length in characters
    #[arg(long, env = "GROUNDED_CHUNK_SIZE", default_value_t = config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    #[arg(
        long,
        env = "GROUNDED_CHUNK_OVERLAP",
        default_value_t = config::DEFAULT_CHUNK_OVERLAP
    )]
    chunk_overlap: usize,

    /// Number of chunks retrieved per query
    #[arg(long, env = "GROUNDED_RETRIEVAL_K", default_value_t = config::DEFAULT_RETRIEVAL_K)]
    retrieval_k: usize,

    /// Web search timeout in seconds
    #[arg(
        long,
        env = "GROUNDED_SEARCH_TIMEOUT_SECS",
        default_value_t = config::DEFAULT_SEARCH_TIMEOUT_SECS
    )]
    search_timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            model: self.model,
            embedding_model: self.embedding_model,
            ollama_url: self.ollama_url,
            relevance_threshold: self.relevance_threshold,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            retrieval_k: self.retrieval_k,
            search_timeout_secs: self.search_timeout_secs,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let no_color = cli.no_color;
    let config = cli.into_config();

    logging::init_logging(config.log_level.as_deref(), no_color)?;

    tracing::info!("Grounded answer server starting");
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Embedding model: {}", config.embedding_model);
    tracing::debug!("Relevance threshold: {}", config.relevance_threshold);

    let bind = config.bind.clone();

    // Generator unreachability is fatal here; everything else degrades
    // per request.
    let state = AppState::initialize(config).await?;
    state.seed_demo_documents().await;

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("Listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
    } else {
        tracing::info!("Shutdown signal received");
    }
}
