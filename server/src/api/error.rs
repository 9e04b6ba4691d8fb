use log::error;
use scancore::ScanError;
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use warp::filters::body::BodyDeserializeError;
use warp::filters::cors::CorsForbidden;
use warp::http::StatusCode;
use warp::reject::{
    InvalidQuery, LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType,
};
use warp::reply::{Json, WithStatus};
use warp::Rejection;

pub type JsonReply = WithStatus<Json>;

pub fn success<T: Serialize>(body: &T) -> JsonReply {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

pub fn failure(status: StatusCode, message: &str) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&json!({"success": false, "error": message})),
        status,
    )
}

fn internal(details: &str) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&json!({
            "success": false,
            "error": "Internal server error",
            "details": details
        })),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

/// Maps the store's error taxonomy onto HTTP.
pub fn scan_error_reply(err: &ScanError) -> JsonReply {
    match err {
        ScanError::Validation(reason) => failure(StatusCode::BAD_REQUEST, reason),
        ScanError::NotFound { .. } => failure(StatusCode::NOT_FOUND, &err.to_string()),
        ScanError::Internal(reason) => internal(reason),
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<JsonReply, Infallible> {
    let reply = if err.is_not_found() {
        failure(StatusCode::NOT_FOUND, "Route not found")
    } else if let Some(cause) = err.find::<BodyDeserializeError>() {
        failure(
            StatusCode::BAD_REQUEST,
            &format!("Invalid scan body: {}", cause),
        )
    } else if err.find::<InvalidQuery>().is_some() {
        failure(StatusCode::BAD_REQUEST, "Invalid query string")
    } else if err.find::<PayloadTooLarge>().is_some() {
        failure(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<LengthRequired>().is_some() {
        failure(StatusCode::LENGTH_REQUIRED, "Content-Length required")
    } else if err.find::<UnsupportedMediaType>().is_some() {
        failure(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected an application/json body",
        )
    } else if err.find::<CorsForbidden>().is_some() {
        failure(StatusCode::FORBIDDEN, "CORS request forbidden")
    } else if err.find::<MethodNotAllowed>().is_some() {
        failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        error!("Unhandled rejection: {:?}", err);
        internal(&format!("{:?}", err))
    };
    Ok(reply)
}
