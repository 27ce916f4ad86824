//! The two generation strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the assistant produces UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The provider picks from a fixed tool catalog (AG-UI).
    #[serde(alias = "agui")]
    Catalog,
    /// The provider emits an open-ended component tree (A2UI).
    #[serde(alias = "a2ui")]
    Declarative,
}

impl Variant {
    /// Both variants.
    pub const ALL: [Variant; 2] = [Variant::Catalog, Variant::Declarative];

    /// Short protocol name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Catalog => "agui",
            Variant::Declarative => "a2ui",
        }
    }

    /// HTTP path of the streaming endpoint.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Variant::Catalog => "/api/agui",
            Variant::Declarative => "/api/a2ui",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agui" | "catalog" => Ok(Variant::Catalog),
            "a2ui" | "declarative" => Ok(Variant::Declarative),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Variant::Catalog.path(), "/api/agui");
        assert_eq!(Variant::Declarative.path(), "/api/a2ui");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("AGUI".parse::<Variant>(), Ok(Variant::Catalog));
        assert_eq!("declarative".parse::<Variant>(), Ok(Variant::Declarative));
        assert!("html".parse::<Variant>().is_err());
    }
}
