//! Wire shapes exchanged with the HTTP front door.
//!
//! Inbound events use the API Gateway proxy integration field names; outbound
//! envelopes carry a JSON-encoded body with a fixed `{message, details, data}`
//! shape.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of an inbound event.
///
/// Methods the gateway does not route are kept verbatim so they can be
/// reported back as unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

impl From<String> for HttpMethod {
    fn from(method: String) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            _ => Self::Other(method),
        }
    }
}

/// An event without a method never matches a route.
impl Default for HttpMethod {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        Self::from(method.to_string())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
            Self::Put => f.write_str("PUT"),
            Self::Patch => f.write_str("PATCH"),
            Self::Delete => f.write_str("DELETE"),
            Self::Other(method) => f.write_str(method),
        }
    }
}

/// An inbound request, as produced by the HTTP front door.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    #[serde(default)]
    pub http_method: HttpMethod,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl RequestEvent {
    /// Creates an event with no query parameters and no body.
    pub fn new(method: impl Into<HttpMethod>, path: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            path: path.into(),
            query_string_parameters: None,
            body: None,
            is_base64_encoded: false,
        }
    }

    /// Adds a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets a plain-text body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Sets a base64-encoded body.
    pub fn with_base64_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = true;
        self
    }

    /// Looks up a query parameter, treating an empty value as absent.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

/// Payload carried in every response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub message: String,
    pub details: String,
    pub data: Option<Value>,
}

/// The envelope returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    /// Builds an envelope with the standard JSON and CORS headers.
    pub fn new(status_code: u16, body: &ResponseBody) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN.to_string(), "*".to_string());

        // A struct of strings and `Value`s always serializes.
        let body = serde_json::to_string(body).unwrap_or_default();

        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Successful response with a data payload.
    pub fn success(status_code: u16, details: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(
            status_code,
            &ResponseBody {
                message: "success".to_string(),
                details: details.into(),
                data,
            },
        )
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(
            404,
            &ResponseBody {
                message: "Not Found".to_string(),
                details: details.into(),
                data: None,
            },
        )
    }

    pub fn internal_error(details: impl Into<String>) -> Self {
        Self::new(
            500,
            &ResponseBody {
                message: "Internal Server Error".to_string(),
                details: details.into(),
                data: None,
            },
        )
    }

    /// Parses the JSON body back into its payload shape.
    pub fn payload(&self) -> serde_json::Result<ResponseBody> {
        serde_json::from_str(&self.body)
    }
}
