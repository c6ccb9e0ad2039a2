//! Lamp tools exposed through `tools/list` and `tools/call`.
//!
//! None of the tools take arguments; each input schema is an empty,
//! closed object.

use serde::Serialize;
use serde_json::{json, Value};

use crate::lamp::{Lamp, PinResult};

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }
}

/// The lamp tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampTool {
    /// `ligar_lampada`: switch the lamp on.
    TurnOn,
    /// `desligar_lampada`: switch the lamp off.
    TurnOff,
    /// `status_lampada`: report whether the lamp is on.
    Status,
}

impl LampTool {
    /// Every tool, in listing order.
    pub const ALL: [Self; 3] = [Self::TurnOn, Self::TurnOff, Self::Status];

    /// Returns the tool name as exposed on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TurnOn => "ligar_lampada",
            Self::TurnOff => "desligar_lampada",
            Self::Status => "status_lampada",
        }
    }

    /// Looks up a tool by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    const fn description(self) -> &'static str {
        match self {
            Self::TurnOn => "Turn on the lamp connected to the configured GPIO pin.",
            Self::TurnOff => "Turn off the lamp connected to the configured GPIO pin.",
            Self::Status => "Report whether the lamp is currently on or off.",
        }
    }

    /// Returns the `tools/list` entry for this tool.
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: no_arguments_schema(),
        }
    }

    /// Runs the tool against the lamp and returns its status line.
    ///
    /// # Errors
    ///
    /// Returns an error if the lamp output cannot be written.
    pub fn invoke(self, lamp: &mut Lamp) -> PinResult<ToolCallResult> {
        let text = match self {
            Self::TurnOn => {
                lamp.turn_on()?;
                "Lamp turned on."
            }
            Self::TurnOff => {
                lamp.turn_off()?;
                "Lamp turned off."
            }
            Self::Status => {
                if lamp.status() {
                    "Lamp is on."
                } else {
                    "Lamp is off."
                }
            }
        };
        Ok(ToolCallResult::text(text))
    }
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    LampTool::ALL.into_iter().map(LampTool::definition).collect()
}

fn no_arguments_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": [],
        "additionalProperties": false
    })
}
