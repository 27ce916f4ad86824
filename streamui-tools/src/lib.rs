//! # streamui-tools
//!
//! Tool definitions advertised to the completion provider.
//!
//! Two strategies are supported:
//!
//! - **Fixed catalog**: a closed set of UI-producing tools ([`CatalogTool`]),
//!   each mapped to one presentation component on the client.
//! - **Declarative**: a single [`render_ui_tool`] whose arguments are an
//!   open-ended component tree.
//!
//! ## Example
//!
//! ```rust
//! use streamui_tools::{catalog_definitions, validate_catalog, CatalogTool};
//!
//! validate_catalog().unwrap();
//! assert_eq!(catalog_definitions().len(), CatalogTool::ALL.len());
//! assert_eq!(CatalogTool::from_name("show_chart"), Some(CatalogTool::ShowChart));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod declarative;
pub mod definition;
pub mod errors;
pub mod schema;

pub use catalog::{
    catalog_definitions, sample_arguments, validate_catalog, CatalogTool, CATALOG_SYSTEM_PROMPT,
};
pub use declarative::{
    render_ui_tool, COMPONENT_TAGS, DECLARATIVE_SYSTEM_PROMPT, RENDER_UI_TOOL,
};
pub use definition::ToolDefinition;
pub use errors::{CatalogError, CatalogResult};
pub use schema::SchemaBuilder;
