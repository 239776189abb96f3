//! Local HTTP front door.
//!
//! Turns plain HTTP requests into [`RequestEvent`]s so the dispatcher can be
//! exercised without API Gateway. Routing stays in the dispatcher: the router
//! forwards everything through a single fallback handler.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response as HttpResponse},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use itemgate_core::event::{RequestEvent, Response};

use crate::dispatcher::Dispatcher;

/// Create the application router.
pub fn create_app(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .fallback(forward)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(dispatcher)
}

async fn forward(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> HttpResponse {
    let event = to_event(&method, &uri, body);
    into_http(dispatcher.dispatch(&event).await)
}

/// Builds a proxy-style event from the parts of an HTTP request.
///
/// Bodies that are not UTF-8 are forwarded base64-encoded.
fn to_event(method: &Method, uri: &Uri, body: Bytes) -> RequestEvent {
    let mut event = RequestEvent::new(method.as_str(), uri.path());

    let query = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default();
    if !query.is_empty() {
        event.query_string_parameters = Some(query);
    }

    if body.is_empty() {
        return event;
    }
    match String::from_utf8(body.to_vec()) {
        Ok(text) => event.with_body(text),
        Err(_) => event.with_base64_body(STANDARD.encode(&body)),
    }
}

fn into_http(response: Response) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut http = (status, response.body).into_response();

    for (name, value) in &response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropped invalid response header"),
        }
    }

    http
}
