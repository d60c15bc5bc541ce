//! Schema-driven planning
//!
//! The host proposes a new state (configuration merged over prior state);
//! this module turns it into the planned state the provider commits to:
//!
//! 1. optional+computed attributes left null in configuration take their
//!    schema default;
//! 2. if anything changed, computed attributes left null in configuration
//!    become unknown;
//! 3. each attribute's plan modifiers run in declaration order, collecting
//!    requires-replace paths.

use crate::schema::{DefaultRequest, PlanModifierRequest, Schema, ValidatorRequest};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::trace;

/// What applying the plan will do to the remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Create,
    Update,
    Replace,
    Delete,
    NoOp,
}

#[derive(Debug)]
pub struct PlanResult {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub action: PlanAction,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &DynamicValue,
    proposed_new_state: &DynamicValue,
    config: &DynamicValue,
) -> PlanResult {
    if proposed_new_state.is_null() {
        return PlanResult {
            planned_state: DynamicValue::null(),
            requires_replace: vec![],
            action: if prior_state.is_null() {
                PlanAction::NoOp
            } else {
                PlanAction::Delete
            },
            diagnostics: vec![],
        };
    }

    let prior_exists = !prior_state.is_null();
    let mut planned = proposed_new_state.clone();
    let mut diagnostics = vec![];

    if !matches!(planned.value, Dynamic::Map(_)) {
        planned = DynamicValue::object();
    }

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        if !(attr.optional && attr.computed) || !config.get_or_null(&path).is_null() {
            continue;
        }
        if let Some(default) = &attr.default {
            let value = default
                .default_value(DefaultRequest { path: path.clone() })
                .value;
            set_attr(&mut planned, &path, value.value, &mut diagnostics);
        }
    }

    let changed = !prior_exists || planned != *prior_state;

    if changed {
        for attr in &schema.block.attributes {
            let path = AttributePath::new(&attr.name);
            if !attr.computed || !config.get_or_null(&path).is_null() {
                continue;
            }
            // defaults already produced a known value
            if attr.optional && attr.default.is_some() {
                continue;
            }
            set_attr(&mut planned, &path, Dynamic::Unknown, &mut diagnostics);
        }
    }

    let mut requires_replace = vec![];
    for attr in &schema.block.attributes {
        if attr.plan_modifiers.is_empty() {
            continue;
        }
        let path = AttributePath::new(&attr.name);
        let state_value = DynamicValue::new(prior_state.get_or_null(&path));
        let config_value = DynamicValue::new(config.get_or_null(&path));
        let mut plan_value = DynamicValue::new(planned.get_or_null(&path));
        let mut replace = false;

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: config_value.clone(),
                state_value: state_value.clone(),
                plan_value,
                path: path.clone(),
                prior_exists,
            });
            plan_value = response.plan_value;
            replace |= response.requires_replace;
            diagnostics.extend(response.diagnostics);
        }

        if replace {
            trace!(attribute = %path, "attribute forces replacement");
            requires_replace.push(path.clone());
        }
        set_attr(&mut planned, &path, plan_value.value, &mut diagnostics);
    }

    let action = if !prior_exists {
        PlanAction::Create
    } else if !requires_replace.is_empty() {
        PlanAction::Replace
    } else if planned == *prior_state {
        PlanAction::NoOp
    } else {
        PlanAction::Update
    };

    PlanResult {
        planned_state: planned,
        requires_replace,
        action,
        diagnostics,
    }
}

/// Checks configuration against the schema: unknown attributes, missing
/// required attributes, values set on computed-only attributes, and every
/// attribute's validators.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    if let Some(map) = config.value.as_map() {
        let mut names: Vec<&String> = map
            .keys()
            .filter(|name| schema.attribute(name).is_none())
            .collect();
        names.sort();
        for name in names {
            diagnostics.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named '{}' is not expected here", name),
                )
                .with_attribute(AttributePath::new(name)),
            );
        }
    }

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let value = config.get_or_null(&path);

        if attr.required && value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing required argument",
                    format!("The argument '{}' is required", attr.name),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        if attr.computed && !attr.optional && !attr.required && !value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid configuration",
                    format!("'{}' is computed by the provider and cannot be set", attr.name),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        if !value.is_known() {
            continue;
        }
        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(value.clone()),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    diagnostics
}

fn set_attr(
    planned: &mut DynamicValue,
    path: &AttributePath,
    value: Dynamic,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Err(e) = planned.set(path, value) {
        diagnostics.push(
            Diagnostic::error("Failed to plan attribute", e.to_string())
                .with_attribute(path.clone()),
        );
    }
}
