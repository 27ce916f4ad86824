//! # streamui-ui
//!
//! Interpreter for declarative UI specifications and renderers for the
//! fixed tool catalog.
//!
//! Specifications come from a generative model and are treated as
//! untrusted. A specification is parsed once into a typed [`UiNode`] tree
//! with bounded depth and breadth, then rendered to escaped HTML. Parsing
//! never fails: malformed, unknown or too-deep nodes become visible
//! placeholders while the rest of the tree renders normally.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use streamui_ui::Interpreter;
//!
//! let spec = json!({
//!     "version": "1.0",
//!     "component": "card",
//!     "props": {"title": "Hello"},
//!     "children": [{"component": "text", "props": {"content": "<b>safe</b>"}}]
//! });
//!
//! let html = Interpreter::default().render(&spec);
//! assert!(html.as_str().contains("&lt;b&gt;safe&lt;/b&gt;"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod markup;
pub mod node;
pub mod render;
pub mod sanitize;

pub use catalog::{render_named_tool, render_tool_call};
pub use config::{InterpreterConfig, DEFAULT_MAX_CHILDREN, DEFAULT_MAX_DEPTH, MAX_SUPPORTED_DEPTH};
pub use markup::{escape_html, Html, Markup};
pub use node::{Component, ComponentKind, InvalidReason, Props, UiNode};
pub use render::{raw_preview, render, render_with, Interpreter};
pub use sanitize::{sanitize_url, UrlPolicy};
