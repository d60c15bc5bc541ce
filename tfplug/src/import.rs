//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID to a specific attribute in state
///
/// This is useful for simple resources where the import ID maps directly to
/// a single attribute in the resource state.
///
/// Example: ID "w-123" -> state.cluster_id = "w-123"
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.trim().is_empty() {
        response.diagnostics.push(Diagnostic::error(
            "Invalid import ID",
            "The import ID must not be empty",
        ));
        return;
    }

    let mut state = DynamicValue::object();
    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!("Could not set '{}' to '{}'", attr_path, request.id),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
        private: Vec::new(),
    });
}

/// Splits a `/`-separated import ID across several attributes
///
/// Example: ID "r-1/r-2" with ["role_id", "granted_role_id"]
/// -> state.role_id = "r-1", state.granted_role_id = "r-2"
///
/// The part count must match exactly and no part may be empty.
pub fn import_state_compound_id(
    _ctx: &Context,
    attrs: &[&str],
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) -> Option<DynamicValue> {
    let parts: Vec<&str> = request.id.split('/').collect();
    if parts.len() != attrs.len() || parts.iter().any(|p| p.trim().is_empty()) {
        response.diagnostics.push(Diagnostic::error(
            "Invalid import ID",
            format!(
                "Expected import ID in the format '{}', got '{}'",
                attrs.join("/"),
                request.id
            ),
        ));
        return None;
    }

    let mut state = DynamicValue::object();
    for (attr, part) in attrs.iter().zip(parts) {
        let path = AttributePath::new(attr);
        if let Err(e) = state.set_string(&path, part.to_string()) {
            response.diagnostics.push(
                Diagnostic::error(format!("Failed to set import ID: {}", e), request.id.clone())
                    .with_attribute(path),
            );
            return None;
        }
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state: state.clone(),
        private: Vec::new(),
    });
    Some(state)
}
