//! Session engine: protocol state and request dispatch.
//!
//! The engine owns the single lamp and the single session. Every call to
//! [`SessionEngine::handle`] runs to completion before the next one, and
//! every failure is turned into an error response, so the engine is always
//! able to serve the next message.
//!
//! # Lifecycle
//!
//! 1. `initialize` opens a session and mints a fresh session id. Calling it
//!    again replaces the previous session.
//! 2. `tools/*` and `resources/*` are rejected with `not_initialized` until
//!    a session is open.
//! 3. [`SessionEngine::close_session`] with the current id ends the session
//!    and switches the lamp off.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::lamp::Lamp;
use crate::mcp::protocol::{
    parse_request, ErrorCode, McpError, Method, Request, ResourceReadParams, Response,
    ToolCallParams, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::resources::{resource_definitions, LampResource};
use crate::mcp::tools::{tool_definitions, LampTool};

/// Sent if a response cannot be serialised.
const FALLBACK_RESPONSE: &str =
    r#"{"id":null,"error":{"code":"internal_error","message":"failed to serialise response"}}"#;

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
    /// Resource-related capabilities.
    pub resources: ResourceCapabilities,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: ToolCapabilities { list_changed: true },
            resources: ResourceCapabilities::default(),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    pub list_changed: bool,
}

/// Resource-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    /// Whether clients may subscribe to resource updates.
    pub subscribe: bool,
    /// Whether the resource list can change during the session.
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Protocol session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Whether `initialize` has been called since the last close.
    pub initialized: bool,
    /// Identifier of the live session.
    pub session_id: Option<String>,
}

/// The protocol session engine.
#[derive(Debug)]
pub struct SessionEngine {
    lamp: Lamp,
    session: Session,
}

impl SessionEngine {
    /// Creates an engine with no open session.
    #[must_use]
    pub fn new(lamp: Lamp) -> Self {
        Self {
            lamp,
            session: Session::default(),
        }
    }

    /// Returns the current session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the id of the live session, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id.as_deref()
    }

    /// Returns the lamp.
    #[must_use]
    pub const fn lamp(&self) -> &Lamp {
        &self.lamp
    }

    /// Handles one serialised request and returns the serialised response.
    pub fn handle(&mut self, raw: &str) -> String {
        let response = self.handle_message(raw);
        serde_json::to_string(&response).unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialise response");
            FALLBACK_RESPONSE.to_string()
        })
    }

    /// Handles one serialised request and returns the response envelope.
    pub fn handle_message(&mut self, raw: &str) -> Response {
        let request = match parse_request(raw) {
            Ok(request) => request,
            Err(response) => {
                if let Some(err) = response.error() {
                    warn!(code = %err.code, "Rejected malformed message");
                }
                return response;
            }
        };

        debug!(method = request.method.as_str(), "Dispatching request");

        match self.dispatch(&request) {
            Ok(result) => Response::success(request.id, result),
            Err(err) => {
                if err.code == ErrorCode::InternalError {
                    error!(method = request.method.as_str(), error = %err.message, "Request failed");
                } else {
                    debug!(method = request.method.as_str(), code = %err.code, "Request rejected");
                }
                Response::failure(request.id, err)
            }
        }
    }

    fn dispatch(&mut self, request: &Request) -> Result<Value, McpError> {
        match &request.method {
            Method::Initialize => Ok(self.initialize()),
            Method::ToolsList => {
                self.require_session(&request.method)?;
                Ok(json!({ "tools": tool_definitions() }))
            }
            Method::ToolsCall => {
                self.require_session(&request.method)?;
                let params = ToolCallParams::from_params(&request.params)?;
                self.call_tool(&params)
            }
            Method::ResourcesList => {
                self.require_session(&request.method)?;
                Ok(json!({ "resources": resource_definitions() }))
            }
            Method::ResourcesRead => {
                self.require_session(&request.method)?;
                let params = ResourceReadParams::from_params(&request.params)?;
                self.read_resource(&params)
            }
            Method::Unsupported(name) => Err(McpError::method_not_found(name)),
        }
    }

    /// Opens a new session, replacing any existing one.
    fn initialize(&mut self) -> Value {
        let session_id = Uuid::new_v4().to_string();

        if let Some(previous) = self.session.session_id.replace(session_id.clone()) {
            debug!(previous = %previous, "Replacing existing session");
        }
        self.session.initialized = true;

        info!(session_id = %session_id, "Session initialised");

        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        })
    }

    fn call_tool(&mut self, params: &ToolCallParams) -> Result<Value, McpError> {
        let tool =
            LampTool::from_name(&params.name).ok_or_else(|| McpError::tool_not_found(&params.name))?;

        info!(tool = tool.name(), "Calling tool");
        let result = tool.invoke(&mut self.lamp)?;
        to_result(&result)
    }

    fn read_resource(&self, params: &ResourceReadParams) -> Result<Value, McpError> {
        let resource = LampResource::from_uri(&params.uri)
            .ok_or_else(|| McpError::resource_not_found(&params.uri))?;

        to_result(&resource.read(&self.lamp))
    }

    /// Ensures a session is open.
    fn require_session(&self, method: &Method) -> Result<(), McpError> {
        if !self.session.initialized {
            return Err(McpError::not_initialized(method.as_str()));
        }
        Ok(())
    }

    /// Ends the session if `session_id` matches the live one.
    ///
    /// A matching close resets the session and switches the lamp off. A
    /// mismatched or absent id is ignored. Returns whether a session was
    /// closed.
    pub fn close_session(&mut self, session_id: Option<&str>) -> bool {
        let matches = session_id.is_some() && session_id == self.session_id();
        if !matches {
            debug!(session_id = ?session_id, "Ignoring close for unknown session");
            return false;
        }

        self.session = Session::default();

        if let Err(e) = self.lamp.turn_off() {
            warn!(error = %e, "Failed to switch lamp off while closing session");
        }

        info!(session_id = ?session_id, "Session closed");
        true
    }

    /// Closes whichever session is live.
    pub fn close_current(&mut self) -> bool {
        let current = self.session.session_id.clone();
        self.close_session(current.as_deref())
    }
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| {
        error!(error = %e, "Failed to serialise result");
        McpError::internal("Internal error: failed to serialise result")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lamp::MemoryPin;

    fn engine() -> (SessionEngine, MemoryPin) {
        let pin = MemoryPin::new(2);
        let lamp = Lamp::new(pin.clone(), true).unwrap();
        (SessionEngine::new(lamp), pin)
    }

    fn call(engine: &mut SessionEngine, raw: &str) -> Value {
        serde_json::from_str(&engine.handle(raw)).unwrap()
    }

    #[test]
    fn engine_initial_state() {
        let (engine, _) = engine();
        assert_eq!(engine.session(), &Session::default());
        assert!(!engine.lamp().status());
    }

    #[test]
    fn initialize_sets_session() {
        let (mut engine, _) = engine();
        let response = call(&mut engine, r#"{"id": 1, "method": "initialize"}"#);

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(
            response["result"]["capabilities"]["tools"]["listChanged"],
            true
        );
        assert_eq!(
            response["result"]["capabilities"]["resources"]["subscribe"],
            false
        );
        assert!(engine.session().initialized);
        assert!(engine.session_id().is_some());
    }

    #[test]
    fn tools_list_requires_session() {
        let (mut engine, _) = engine();
        let response = call(&mut engine, r#"{"id": 1, "method": "tools/list"}"#);
        assert_eq!(response["error"]["code"], "not_initialized");
    }

    #[test]
    fn not_initialized_checked_before_params() {
        let (mut engine, _) = engine();
        let response = call(&mut engine, r#"{"id": 1, "method": "tools/call"}"#);
        assert_eq!(response["error"]["code"], "not_initialized");
    }

    #[test]
    fn failed_tool_becomes_internal_error() {
        let (mut engine, pin) = engine();
        call(&mut engine, r#"{"id": 1, "method": "initialize"}"#);
        let session_before = engine.session().clone();

        pin.set_faulted(true);
        let response = call(
            &mut engine,
            r#"{"id": 2, "method": "tools/call", "params": {"name": "ligar_lampada"}}"#,
        );

        assert_eq!(response["id"], 2);
        assert_eq!(response["error"]["code"], "internal_error");
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("simulated output fault"));
        assert!(!engine.lamp().status());
        assert_eq!(engine.session(), &session_before);

        pin.set_faulted(false);
        let response = call(
            &mut engine,
            r#"{"id": 3, "method": "tools/call", "params": {"name": "ligar_lampada"}}"#,
        );
        assert!(response.get("result").is_some());
        assert!(engine.lamp().status());
    }

    #[test]
    fn close_with_fault_still_resets_session() {
        let (mut engine, pin) = engine();
        call(&mut engine, r#"{"id": 1, "method": "initialize"}"#);

        pin.set_faulted(true);
        assert!(engine.close_current());
        assert_eq!(engine.session(), &Session::default());
    }

    #[test]
    fn close_without_session_is_noop() {
        let (mut engine, pin) = engine();
        assert!(!engine.close_current());
        assert!(!engine.close_session(None));
        assert!(!engine.close_session(Some("anything")));
        assert_eq!(pin.write_count(), 1);
    }
}
