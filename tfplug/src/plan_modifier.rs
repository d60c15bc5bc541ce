//! Built-in plan modifiers
//!
//! Plan modifiers run per attribute after defaults and unknown-marking. They
//! can rewrite the planned value and flag the attribute as forcing a
//! replacement of the whole resource.

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::{Diagnostic, Dynamic};

/// Marks an attribute as requiring replacement when it changes
pub struct RequiresReplace;

impl RequiresReplace {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this value forces a new resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let requires_replace = request.prior_exists
            && !request.plan_value.is_unknown()
            && request.state_value.value != request.plan_value.value;

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Keeps the prior state value when the planned value is unknown
///
/// Use on computed identifiers and other values the server never changes
/// once assigned, so updates do not show them as "known after apply".
pub struct UseStateForUnknown;

impl UseStateForUnknown {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "once set, the value is carried over from prior state".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let plan_value = if request.plan_value.is_unknown() && !request.state_value.is_null() {
            request.state_value
        } else {
            request.plan_value
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

/// Requires replacement when the predicate holds for a changed value
pub struct RequiresReplaceIf<F>
where
    F: Fn(&Dynamic, &Dynamic) -> bool + Send + Sync,
{
    predicate: F,
    description: String,
}

impl<F> RequiresReplaceIf<F>
where
    F: Fn(&Dynamic, &Dynamic) -> bool + Send + Sync + 'static,
{
    /// `predicate(prior, planned)` is only consulted when the values differ
    pub fn create(predicate: F, description: impl Into<String>) -> Box<dyn PlanModifier> {
        Box::new(Self {
            predicate,
            description: description.into(),
        })
    }
}

impl<F> PlanModifier for RequiresReplaceIf<F>
where
    F: Fn(&Dynamic, &Dynamic) -> bool + Send + Sync,
{
    fn description(&self) -> String {
        self.description.clone()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let changed = request.prior_exists
            && !request.plan_value.is_unknown()
            && request.state_value.value != request.plan_value.value;
        let requires_replace =
            changed && (self.predicate)(&request.state_value.value, &request.plan_value.value);

        let mut diagnostics = vec![];
        if requires_replace {
            diagnostics.push(Diagnostic::warning(
                format!("Attribute '{}' requires resource replacement", request.path),
                self.description.clone(),
            ));
        }

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics,
        }
    }
}
