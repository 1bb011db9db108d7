//! Request handlers and JSON bodies for the HTTP surface

use super::ServerState;
use crate::chat::ChatRequest;
use bytes::{Buf, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error};
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// Request body exceeded `server.max_body_bytes`
#[derive(Debug)]
pub struct BodyTooLarge {
    pub limit: u64,
}

impl Reject for BodyTooLarge {}

/// The connection failed while the body was being read
#[derive(Debug)]
pub struct UnreadableBody;

impl Reject for UnreadableBody {}

/// Successful text reply, shared by `/welcome` and `/chat`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TextResponse {
    pub response: String,
}

/// Error reply body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Liveness reply
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub alive: bool,
    pub provider: String,
    pub timestamp: i64,
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn error_reply(message: &str, status: StatusCode) -> Response {
    json_reply(
        &ErrorResponse {
            error: message.to_string(),
        },
        status,
    )
}

/// GET /welcome
pub async fn welcome(state: Arc<ServerState>) -> Result<Response, Infallible> {
    Ok(json_reply(
        &TextResponse {
            response: state.welcome_message.clone(),
        },
        StatusCode::OK,
    ))
}

/// GET /health
pub async fn health(state: Arc<ServerState>) -> Result<Response, Infallible> {
    Ok(json_reply(
        &HealthResponse {
            alive: true,
            provider: state.dispatcher.agent_name().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        },
        StatusCode::OK,
    ))
}

/// Collect a request body of at most `limit` bytes.
///
/// Works for both `Content-Length` and chunked bodies; a declared length over
/// the limit is refused before anything is read.
pub async fn read_body_limited<S, B>(
    declared_len: Option<u64>,
    body: S,
    limit: u64,
) -> Result<Bytes, Rejection>
where
    S: Stream<Item = Result<B, warp::Error>> + Send,
    B: Buf + Send,
{
    if declared_len.is_some_and(|len| len > limit) {
        return Err(warp::reject::custom(BodyTooLarge { limit }));
    }

    futures::pin_mut!(body);
    let mut collected = BytesMut::new();
    while let Some(chunk) = body.next().await {
        let mut chunk = chunk.map_err(|e| {
            debug!("Failed to read chat body: {}", e);
            warp::reject::custom(UnreadableBody)
        })?;

        if (collected.len() + chunk.remaining()) as u64 > limit {
            return Err(warp::reject::custom(BodyTooLarge { limit }));
        }
        while chunk.has_remaining() {
            let slice = chunk.chunk();
            let read = slice.len();
            collected.extend_from_slice(slice);
            chunk.advance(read);
        }
    }

    Ok(collected.freeze())
}

/// POST /chat
pub async fn chat(body: Bytes, state: Arc<ServerState>) -> Result<Response, Infallible> {
    // Anything that is not an object with a string "message" counts as missing
    let request = serde_json::from_slice::<ChatRequest>(&body).unwrap_or_else(|e| {
        debug!("Unreadable chat body: {}", e);
        ChatRequest::default()
    });

    let response = match state.dispatcher.handle(request).await {
        Ok(reply) => json_reply(
            &TextResponse {
                response: reply.response,
            },
            StatusCode::OK,
        ),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_reply(e.public_message(), status)
        }
    };

    Ok(response)
}

/// Turn warp rejections into JSON error bodies
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<BodyTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<UnreadableBody>().is_some() {
        (StatusCode::BAD_REQUEST, "Request body could not be read")
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "Origin not allowed")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(error_reply(message, status))
}
