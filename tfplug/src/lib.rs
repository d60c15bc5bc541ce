//! tfplug - provider-side surface of the Terraform plugin protocol
//!
//! Providers implement the async traits in [`provider`], [`resource`] and
//! [`data_source`]; the host owns the wire protocol and drives them. The
//! [`plan`] module holds the schema-driven planning the host delegates to
//! the provider (defaults, plan modifiers, requires-replace).

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod plan;
pub mod plan_modifier;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::{import_state_compound_id, import_state_passthrough_id};
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
