// Persisted form draft
//
// Wire format is a flat JSON object: every control name mapped to its string value, plus an
// integer `currentStep`.

use crate::models::form::RegistrationForm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CURRENT_STEP_KEY: &str = "currentStep";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    #[serde(
        rename = "currentStep",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_step: Option<u32>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl FormDraft {
    /// Snapshot every named control of `form` together with `step`.
    pub fn capture(form: &RegistrationForm, step: u32) -> Self {
        Self {
            current_step: Some(step),
            fields: form.entries().into_iter().collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
