//! HTTP surface for the chat service
//!
//! - `GET /welcome` - static greeting
//! - `POST /chat` - `{"message": ...}` -> `{"response": ...}` or `{"error": ...}`
//! - `GET /health` - liveness probe

pub mod handlers;

use crate::chat::ChatDispatcher;
use crate::config::ServerSection;
use crate::server_span;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, Instrument};
use warp::{Filter, Rejection, Reply};

/// Server startup errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind HTTP listener: {0}")]
    Bind(#[from] warp::Error),
}

/// Shared, read-only state handed to every handler
pub struct ServerState {
    pub dispatcher: ChatDispatcher,
    pub welcome_message: String,
}

/// The HTTP server
pub struct ChatServer {
    state: Arc<ServerState>,
    settings: ServerSection,
}

impl ChatServer {
    pub fn new(
        dispatcher: ChatDispatcher,
        welcome_message: impl Into<String>,
        settings: ServerSection,
    ) -> Self {
        Self {
            state: Arc::new(ServerState {
                dispatcher,
                welcome_message: welcome_message.into(),
            }),
            settings,
        }
    }

    /// All routes with CORS, rejection handling and request logging applied
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static
    {
        let state = self.state.clone();
        let with_state = warp::any().map(move || state.clone());

        let welcome = warp::path("welcome")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_state.clone())
            .and_then(handlers::welcome);

        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_state.clone())
            .and_then(handlers::health);

        let chat = warp::path("chat")
            .and(warp::path::end())
            .and(warp::post())
            .and(limited_body(self.settings.max_body_bytes))
            .and(with_state)
            .and_then(handlers::chat);

        // The outer recover turns CORS rejections into JSON as well; route
        // errors are recovered inside CORS so their bodies stay readable
        welcome
            .or(chat)
            .or(health)
            .recover(handlers::handle_rejection)
            .with(self.cors())
            .recover(handlers::handle_rejection)
            .with(warp::log::custom(log_request))
    }

    fn cors(&self) -> warp::cors::Builder {
        let cors = warp::cors()
            .allow_methods(vec!["GET", "POST", "OPTIONS"])
            .allow_headers(vec!["content-type"]);

        if self.settings.allowed_origins.is_empty() {
            cors.allow_any_origin()
        } else {
            cors.allow_origins(self.settings.allowed_origins.iter().map(String::as_str))
        }
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<S>(self, addr: SocketAddr, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let (bound, server) =
            warp::serve(self.routes()).try_bind_with_graceful_shutdown(addr, shutdown)?;

        info!("Chat server listening on {}", bound);
        server.instrument(server_span!(addr = %bound)).await;
        info!("Chat server stopped");

        Ok(())
    }
}

/// Body bytes capped at `limit`, with or without a `Content-Length` header
fn limited_body(
    limit: u64,
) -> impl Filter<Extract = (bytes::Bytes,), Error = Rejection> + Clone + Send + Sync + 'static {
    warp::header::optional::<u64>("content-length")
        .and(warp::body::stream())
        .and_then(move |declared_len, body| handlers::read_body_limited(declared_len, body, limit))
}

fn log_request(info: warp::log::Info<'_>) {
    info!(
        method = %info.method(),
        path = info.path(),
        status = info.status().as_u16(),
        elapsed_ms = info.elapsed().as_millis() as u64,
        "HTTP request"
    );
}
