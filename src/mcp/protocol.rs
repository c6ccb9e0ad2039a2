//! Message types for the lamp MCP protocol.
//!
//! The wire format is a small JSON request/response protocol modelled on
//! JSON-RPC:
//!
//! - **Request**: `{"id": <any>, "method": "<string>", "params": {...}}`
//! - **Success**: `{"id": <echoed>, "result": {...}}`
//! - **Failure**: `{"id": <echoed|null>, "error": {"code": "<string>", "message": "<string>"}}`
//!
//! The `id` is opaque. It is echoed back unchanged and never interpreted;
//! an absent `id` is echoed as `null`. Error codes are short snake-case
//! strings (see [`ErrorCode`]); clients branch on the code, never on the
//! message text.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::lamp::PinError;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "lamp-mcp";

/// Error codes carried in the `error.code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The message was not valid JSON.
    InvalidJson,
    /// The message was JSON but not a usable request.
    InvalidRequest,
    /// A required parameter was missing or empty.
    InvalidParams,
    /// The method is not supported.
    MethodNotFound,
    /// The method requires an active session.
    NotInitialized,
    /// `tools/call` named an unknown tool.
    ToolNotFound,
    /// `resources/read` named an unknown URI.
    ResourceNotFound,
    /// The operation failed while executing.
    InternalError,
}

impl ErrorCode {
    /// Returns the wire representation of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::InvalidRequest => "invalid_request",
            Self::InvalidParams => "invalid_params",
            Self::MethodNotFound => "method_not_found",
            Self::NotInitialized => "not_initialized",
            Self::ToolNotFound => "tool_not_found",
            Self::ResourceNotFound => "resource_not_found",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol-level failure, serialised as the `error` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct McpError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Free-text diagnostic.
    pub message: String,
}

impl McpError {
    /// Creates an error with a custom message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The raw message could not be parsed as JSON.
    #[must_use]
    pub fn invalid_json(detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidJson, format!("Invalid JSON: {detail}"))
    }

    /// The message is not a well-formed request.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// A required parameter is missing or empty.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// The method is not supported.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not supported: {method}"),
        )
    }

    /// The method was called before `initialize`.
    #[must_use]
    pub fn not_initialized(method: &str) -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            format!("Call 'initialize' before '{method}'"),
        )
    }

    /// No tool with this name exists.
    #[must_use]
    pub fn tool_not_found(name: &str) -> Self {
        Self::new(ErrorCode::ToolNotFound, format!("Unknown tool: {name}"))
    }

    /// No resource with this URI exists.
    #[must_use]
    pub fn resource_not_found(uri: &str) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("Unknown resource: {uri}"),
        )
    }

    /// The operation failed while executing.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<PinError> for McpError {
    fn from(err: PinError) -> Self {
        Self::internal(err.to_string())
    }
}

/// The supported methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `initialize`
    Initialize,
    /// `tools/list`
    ToolsList,
    /// `tools/call`
    ToolsCall,
    /// `resources/list`
    ResourcesList,
    /// `resources/read`
    ResourcesRead,
    /// Anything else, kept verbatim for the error message.
    Unsupported(String),
}

impl Method {
    /// Maps a method name onto the closed set of supported methods.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "initialize" => Self::Initialize,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            "resources/list" => Self::ResourcesList,
            "resources/read" => Self::ResourcesRead,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Returns the wire name of this method.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initialize => "initialize",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::ResourcesList => "resources/list",
            Self::ResourcesRead => "resources/read",
            Self::Unsupported(name) => name,
        }
    }
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Correlation id, `Value::Null` when absent.
    pub id: Value,
    /// The method to invoke.
    pub method: Method,
    /// Method parameters, empty when absent or not an object.
    pub params: Map<String, Value>,
}

/// Outcome carried by a [`Response`]: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Successful result object.
    Result(Value),
    /// Failure description.
    Error(McpError),
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// The echoed request id.
    pub id: Value,

    /// Result or error.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    /// Creates a success response.
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Creates an error response.
    #[must_use]
    pub const fn failure(id: Value, error: McpError) -> Self {
        Self {
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// Returns the result object for a success response.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    /// Returns the error for a failure response.
    #[must_use]
    pub const fn error(&self) -> Option<&McpError> {
        match &self.outcome {
            Outcome::Result(_) => None,
            Outcome::Error(err) => Some(err),
        }
    }
}

/// Parses a raw message into a [`Request`].
///
/// # Errors
///
/// Returns a ready-to-send error [`Response`] if the message is not JSON,
/// is not an object, or has no usable `method`.
pub fn parse_request(raw: &str) -> Result<Request, Response> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Response::failure(Value::Null, McpError::invalid_json(e)))?;

    let Value::Object(mut obj) = value else {
        return Err(Response::failure(
            Value::Null,
            McpError::invalid_request("Request must be a JSON object"),
        ));
    };

    let id = obj.remove("id").unwrap_or(Value::Null);

    // Names are matched exactly; a padded name is an unknown method.
    let method = match obj.get("method").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => Method::parse(name),
        _ => {
            return Err(Response::failure(
                id,
                McpError::invalid_request("Field 'method' is required"),
            ));
        }
    };

    let params = match obj.remove("params") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    Ok(Request { id, method, params })
}

/// Reads a required, non-blank string parameter.
fn required_str(params: &Map<String, Value>, key: &str) -> Result<String, McpError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| McpError::invalid_params(format!("Parameter '{key}' is required")))
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
}

impl ToolCallParams {
    /// Validates the raw parameter map.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` if `name` is missing or blank.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, McpError> {
        Ok(Self {
            name: required_str(params, "name")?,
        })
    }
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReadParams {
    /// URI of the resource to read.
    pub uri: String,
}

impl ResourceReadParams {
    /// Validates the raw parameter map.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` if `uri` is missing or blank.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, McpError> {
        Ok(Self {
            uri: required_str(params, "uri")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_request() {
        let json = r#"{"id": 1, "method": "initialize", "params": {}}"#;
        let req = parse_request(json).unwrap();

        assert_eq!(req.id, json!(1));
        assert_eq!(req.method, Method::Initialize);
        assert!(req.params.is_empty());
    }

    #[test]
    fn parse_keeps_opaque_id() {
        let json = r#"{"id": {"nested": [1, "a"]}, "method": "tools/list"}"#;
        let req = parse_request(json).unwrap();
        assert_eq!(req.id, json!({"nested": [1, "a"]}));
    }

    #[test]
    fn parse_missing_id_is_null() {
        let req = parse_request(r#"{"method": "tools/list"}"#).unwrap();
        assert_eq!(req.id, Value::Null);
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_request(r#"{"id": 7, "method": "#).unwrap_err();
        assert_eq!(err.id, Value::Null);
        assert_eq!(err.error().unwrap().code, ErrorCode::InvalidJson);
    }

    #[test]
    fn parse_non_object() {
        let err = parse_request("[1, 2, 3]").unwrap_err();
        assert_eq!(err.id, Value::Null);
        assert_eq!(err.error().unwrap().code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn parse_missing_method_echoes_id() {
        let err = parse_request(r#"{"id": "abc"}"#).unwrap_err();
        assert_eq!(err.id, json!("abc"));
        assert_eq!(err.error().unwrap().code, ErrorCode::InvalidRequest);

        let err = parse_request(r#"{"id": 2, "method": "   "}"#).unwrap_err();
        assert_eq!(err.error().unwrap().code, ErrorCode::InvalidRequest);

        let err = parse_request(r#"{"id": 3, "method": 42}"#).unwrap_err();
        assert_eq!(err.error().unwrap().code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn parse_padded_method_is_not_normalised() {
        let req = parse_request(r#"{"id": 1, "method": " initialize "}"#).unwrap();
        assert_eq!(req.method, Method::Unsupported(" initialize ".to_string()));

        let req = parse_request(r#"{"id": 2, "method": "tools/list\n"}"#).unwrap();
        assert_eq!(req.method, Method::Unsupported("tools/list\n".to_string()));
    }

    #[test]
    fn parse_non_object_params_defaults_to_empty() {
        let req = parse_request(r#"{"id": 1, "method": "tools/call", "params": [1]}"#).unwrap();
        assert!(req.params.is_empty());
    }

    #[test]
    fn method_round_trip_names() {
        for name in [
            "initialize",
            "tools/list",
            "tools/call",
            "resources/list",
            "resources/read",
        ] {
            let method = Method::parse(name);
            assert!(!matches!(method, Method::Unsupported(_)));
            assert_eq!(method.as_str(), name);
        }
        assert_eq!(
            Method::parse("ping"),
            Method::Unsupported("ping".to_string())
        );
    }

    #[test]
    fn tool_call_params_validation() {
        let params = json!({"name": "ligar_lampada"});
        let parsed = ToolCallParams::from_params(params.as_object().unwrap()).unwrap();
        assert_eq!(parsed.name, "ligar_lampada");

        for bad in [json!({}), json!({"name": ""}), json!({"name": "  "}), json!({"name": 5})] {
            let err = ToolCallParams::from_params(bad.as_object().unwrap()).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidParams);
        }
    }

    #[test]
    fn resource_read_params_validation() {
        let err = ResourceReadParams::from_params(&Map::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("uri"));
    }

    #[test]
    fn serialise_success_response() {
        let response = Response::success(json!(1), json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"id":1,"result":{"ok":true}}"#);
    }

    #[test]
    fn serialise_error_response() {
        let response = Response::failure(Value::Null, McpError::method_not_found("unknown/method"));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], "method_not_found");
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unknown/method"));
        assert!(value.get("result").is_none());
    }

    #[test]
    fn error_code_strings() {
        assert_eq!(ErrorCode::NotInitialized.as_str(), "not_initialized");
        assert_eq!(
            serde_json::to_value(ErrorCode::ResourceNotFound).unwrap(),
            json!("resource_not_found")
        );
    }

    #[test]
    fn pin_error_becomes_internal_error() {
        let err: McpError = PinError::fault(2, "stuck").into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(err.message.contains("stuck"));
    }
}
