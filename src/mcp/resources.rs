//! Read-only resources exposed through `resources/list` and `resources/read`.

use serde::Serialize;

use crate::lamp::Lamp;

/// URI of the lamp status resource.
pub const STATUS_URI: &str = "lamp://status";

/// A resource definition for the `resources/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: &'static str,
    /// Short name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// MIME type of the content.
    pub mime_type: &'static str,
}

/// One content entry in a `resources/read` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// URI that was read.
    pub uri: &'static str,
    /// MIME type of `text`.
    pub mime_type: &'static str,
    /// The content.
    pub text: String,
}

/// Result of `resources/read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReadResult {
    /// Content entries.
    pub contents: Vec<ResourceContents>,
}

/// The lamp resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampResource {
    /// Current on/off state as plain text.
    Status,
}

impl LampResource {
    /// Every resource, in listing order.
    pub const ALL: [Self; 1] = [Self::Status];

    /// Returns the resource URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Status => STATUS_URI,
        }
    }

    /// Looks up a resource by URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|res| res.uri() == uri)
    }

    /// Returns the `resources/list` entry for this resource.
    #[must_use]
    pub const fn definition(self) -> ResourceDefinition {
        match self {
            Self::Status => ResourceDefinition {
                uri: STATUS_URI,
                name: "lamp_status",
                description: "Current lamp state: 'on' or 'off'.",
                mime_type: "text/plain",
            },
        }
    }

    /// Reads the resource. Never touches the hardware.
    #[must_use]
    pub fn read(self, lamp: &Lamp) -> ResourceReadResult {
        let definition = self.definition();
        let text = match self {
            Self::Status => {
                if lamp.status() {
                    "on"
                } else {
                    "off"
                }
            }
        };
        ResourceReadResult {
            contents: vec![ResourceContents {
                uri: definition.uri,
                mime_type: definition.mime_type,
                text: text.to_string(),
            }],
        }
    }
}

/// Returns the list of available resources.
#[must_use]
pub fn resource_definitions() -> Vec<ResourceDefinition> {
    LampResource::ALL
        .into_iter()
        .map(LampResource::definition)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lamp::MemoryPin;
    use serde_json::json;

    #[test]
    fn single_status_resource() {
        let resources = resource_definitions();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, "lamp://status");
        assert_eq!(resources[0].mime_type, "text/plain");
    }

    #[test]
    fn lookup_by_uri() {
        assert_eq!(LampResource::from_uri(STATUS_URI), Some(LampResource::Status));
        assert_eq!(LampResource::from_uri("lamp://other"), None);
    }

    #[test]
    fn read_reflects_lamp_state() {
        let pin = MemoryPin::new(2);
        let mut lamp = Lamp::new(pin.clone(), true).unwrap();

        let value = serde_json::to_value(LampResource::Status.read(&lamp)).unwrap();
        assert_eq!(
            value,
            json!({"contents": [{"uri": "lamp://status", "mimeType": "text/plain", "text": "off"}]})
        );

        lamp.turn_on().unwrap();
        let result = LampResource::Status.read(&lamp);
        assert_eq!(result.contents[0].text, "on");
        assert_eq!(pin.write_count(), 2);
    }
}
