// Per-step validation rules

use crate::models::form::{Control, ControlKind, StepPanel};

/// Notice shown once whenever a step fails validation.
pub const AGGREGATE_INVALID_MESSAGE: &str =
    "Harap lengkapi semua bidang yang ditandai * dan perhatikan format/ukuran file.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCheck {
    Valid,
    /// Empty value, no file selected, or unchecked checkbox.
    Missing,
    /// File larger than the control's limit.
    Oversized,
}

pub fn check_control(control: &Control) -> ControlCheck {
    match control.kind {
        ControlKind::Checkbox => {
            if control.checked {
                ControlCheck::Valid
            } else {
                ControlCheck::Missing
            }
        }
        ControlKind::File => match (&control.file, control.max_size) {
            (None, _) => ControlCheck::Missing,
            (Some(f), _) if f.name.is_empty() => ControlCheck::Missing,
            (Some(f), Some(max)) if f.size > max => ControlCheck::Oversized,
            _ => ControlCheck::Valid,
        },
        _ => {
            if control.value.is_empty() {
                ControlCheck::Missing
            } else {
                ControlCheck::Valid
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub invalid: Vec<String>,
    pub oversized: Vec<String>,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Check every required control of `panel`, updating its invalid marker.
pub fn validate_panel(panel: &mut StepPanel) -> StepReport {
    let mut report = StepReport::default();
    for control in panel.controls.iter_mut().filter(|c| c.required) {
        let check = check_control(control);
        control.invalid = check != ControlCheck::Valid;
        if check == ControlCheck::Oversized {
            report.oversized.push(control.name.clone());
        }
        if control.invalid {
            report.invalid.push(control.name.clone());
        }
    }
    report
}

pub fn oversized_message(control_name: &str) -> String {
    format!("Ukuran file {} melebihi batas 2MB.", control_name)
}
