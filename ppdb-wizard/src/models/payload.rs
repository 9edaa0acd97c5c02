// Submission payload + confirmation summary

use crate::models::form::RegistrationForm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON body sent to `/api/submit`: control name -> string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionPayload {
    pub fields: BTreeMap<String, String>,
}

impl SubmissionPayload {
    pub fn from_form(form: &RegistrationForm) -> Self {
        Self {
            fields: form.entries().into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Fields shown in the confirmation modal, in display order.
pub const SUMMARY_FIELDS: [(&str, &str); 6] = [
    ("nama_lengkap", "Nama Santri"),
    ("tanggal_lahir", "Tanggal Lahir"),
    ("nama_ayah", "Nama Ayah"),
    ("telepon_ortu", "No. Telp Ortu"),
    ("file_kk", "KK"),
    ("file_foto", "Foto"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub rows: Vec<SummaryRow>,
}

impl SubmissionSummary {
    pub fn from_payload(payload: &SubmissionPayload) -> Self {
        let rows = SUMMARY_FIELDS
            .iter()
            .map(|(name, label)| SummaryRow {
                label: label.to_string(),
                value: payload.get(name).to_string(),
            })
            .collect();
        Self { rows }
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| format!("{}: {}", r.label, r.value))
            .collect()
    }
}
