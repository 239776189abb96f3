//! AWS Lambda entry point.
//!
//! Each invocation carries an API Gateway proxy event. The event is read as an
//! [`ApiGatewayProxyRequest`], turned into a [`RequestEvent`] and handed to the
//! shared [`Dispatcher`].

use std::collections::HashMap;
use std::sync::Arc;

use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use itemgate_core::event::{RequestEvent, Response};

use crate::dispatcher::Dispatcher;

/// Runs the Lambda event loop until the runtime shuts down.
pub async fn run(dispatcher: Arc<Dispatcher>) -> Result<(), Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { handle(&dispatcher, event).await }
    }))
    .await
}

/// Handles one invocation. Always produces an envelope.
pub(crate) async fn handle(
    dispatcher: &Dispatcher,
    event: LambdaEvent<Value>,
) -> Result<Response, Error> {
    let request_id = event.context.request_id.clone();
    tracing::debug!(%request_id, "Handler invoked");

    let request = match to_request(event.payload) {
        Ok(request) => request,
        Err(err) => {
            tracing::error!(%request_id, error = %err, "Malformed proxy event");
            return Ok(Response::internal_error(format!("Error: {err}")));
        }
    };

    Ok(dispatcher.dispatch(&request).await)
}

/// Reads a proxy event.
///
/// Payloads missing parts of the proxy shape (no `requestContext`, no
/// `httpMethod`) are read field by field instead, so they still reach the
/// dispatcher and come back as unmatched.
fn to_request(payload: Value) -> Result<RequestEvent, serde_json::Error> {
    match serde_json::from_value::<ApiGatewayProxyRequest>(payload.clone()) {
        Ok(proxy) => Ok(from_proxy(proxy)),
        Err(err) => {
            tracing::debug!(error = %err, "Event is not a complete proxy request");
            serde_json::from_value(payload)
        }
    }
}

fn from_proxy(proxy: ApiGatewayProxyRequest) -> RequestEvent {
    let mut query: HashMap<String, String> = HashMap::new();
    for (name, value) in proxy.query_string_parameters.iter() {
        query
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }

    RequestEvent {
        http_method: proxy.http_method.as_str().into(),
        path: proxy.path.unwrap_or_default(),
        query_string_parameters: (!query.is_empty()).then_some(query),
        body: proxy.body,
        is_base64_encoded: proxy.is_base64_encoded,
    }
}
