//! Declarative UI specification envelope.
//!
//! The provider produces a component tree as tool-call arguments. The
//! server wraps those arguments, untouched, in a versioned envelope before
//! emitting them in a `ui.spec` event.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current envelope version.
pub const SPEC_VERSION: &str = "1.0";

/// Versioned wrapper around a raw specification.
///
/// On the wire: `{ "version": "1.0", "component": ..., "props": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecEnvelope {
    /// Envelope version tag.
    pub version: String,
    /// The raw specification fields (`component`, `props`, `children`,
    /// `layout`, `style`).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SpecEnvelope {
    /// Wrap raw specification fields.
    ///
    /// A non-object specification is kept under `component` so that the
    /// interpreter can report it instead of it disappearing here.
    #[must_use]
    pub fn wrap(raw: Value) -> Self {
        let mut fields = match raw {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("component".to_string(), other);
                map
            }
        };
        // A provider-supplied version never overrides ours.
        fields.remove("version");
        Self {
            version: SPEC_VERSION.to_string(),
            fields,
        }
    }

    /// The component tag, if present and a string.
    #[must_use]
    pub fn component(&self) -> Option<&str> {
        self.fields.get("component").and_then(Value::as_str)
    }

    /// Convert into the JSON carried by a `ui.spec` event.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = self.fields;
        map.insert("version".to_string(), Value::String(self.version));
        Value::Object(map)
    }
}
