// Logging utilities
// Structured logging with JSON and human-readable formats, plus masking of applicant data

use crate::models::payload::SubmissionPayload;
use log::Level;
use serde_json::json;
use std::collections::BTreeMap;

/// Payload keys that hold personal data and are masked before they reach a log file.
const SENSITIVE_FIELDS: [&str; 9] = [
    "nama_lengkap",
    "nisn",
    "tempat_lahir",
    "tanggal_lahir",
    "alamat",
    "nama_ayah",
    "nama_ibu",
    "telepon_ortu",
    "email_ortu",
];

/// Mask sensitive data in logs
pub fn mask_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let visible = 4;
    let start: String = chars[..visible].iter().collect();
    let end: String = chars[chars.len() - visible..].iter().collect();

    format!("{}...{}", start, end)
}

/// Mask a phone number, keeping the operator prefix and the last three digits.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() <= 7 {
        return "***".to_string();
    }
    let head: String = digits[..4].iter().collect();
    let tail: String = digits[digits.len() - 3..].iter().collect();
    format!("{}{}{}", head, "*".repeat(digits.len() - 7), tail)
}

/// Render a payload as JSON with personal fields masked. File names stay visible for support.
pub fn mask_payload(payload: &SubmissionPayload) -> String {
    let masked: BTreeMap<&str, String> = payload
        .fields
        .iter()
        .map(|(k, v)| {
            let value = if v.is_empty() {
                String::new()
            } else if k == "telepon_ortu" {
                mask_phone(v)
            } else if SENSITIVE_FIELDS.contains(&k.as_str()) {
                mask_sensitive(v)
            } else {
                v.clone()
            };
            (k.as_str(), value)
        })
        .collect();
    serde_json::to_string(&masked).unwrap_or_else(|_| "{}".to_string())
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let (phase, rest) = extract_tag(message, "[PHASE:");
    let (step, cleaned) = extract_tag(&rest, "[STEP:");
    (phase, step, cleaned)
}

fn extract_tag(message: &str, tag: &str) -> (Option<String>, String) {
    let Some(start) = message.find(tag) else {
        return (None, message.to_string());
    };
    let Some(end) = message[start..].find(']') else {
        return (None, message.to_string());
    };
    let value = message[start + tag.len()..start + end].trim().to_string();
    let cleaned = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    (Some(value), cleaned)
}

/// Format log entry as JSON for structured logging
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(phase) = phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}
