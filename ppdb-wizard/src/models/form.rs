// Registration form model
//
// Typed stand-in for the page markup the wizard consumes: step panels tagged with a 1-based index,
// named controls, `required` flags, per-file byte limits, the invalid marker and the notice line
// rendered next to a control.

use std::path::Path;

/// Upload limit used by every file control on the PPDB form (2MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Value a checked checkbox contributes to drafts and payloads.
pub const CHECKBOX_ON: &str = "on";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Date,
    Tel,
    Email,
    TextArea,
    Select,
    File,
    Checkbox,
}

/// Metadata of a file picked for a file control. Contents are never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Resolve a path on disk to display name + byte size.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, meta.len()))
    }
}

#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    pub required: bool,
    /// Maximum accepted file size in bytes (file controls only).
    pub max_size: Option<u64>,
    /// `(value, label)` pairs for select controls.
    pub options: Vec<(String, String)>,
    pub value: String,
    pub checked: bool,
    pub file: Option<SelectedFile>,
    pub invalid: bool,
    pub notice: Option<String>,
}

impl Control {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: ControlKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            max_size: None,
            options: Vec::new(),
            value: String::new(),
            checked: false,
            file: None,
            invalid: false,
            notice: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    pub fn options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(v, l)| (v.to_string(), l.to_string()))
            .collect();
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == ControlKind::File
    }

    pub fn is_checkbox(&self) -> bool {
        self.kind == ControlKind::Checkbox
    }

    /// String this control contributes to a draft or a submission payload.
    /// File controls contribute the display name only; an empty selection is `""`.
    pub fn submitted_value(&self) -> String {
        match self.kind {
            ControlKind::File => self
                .file
                .as_ref()
                .map(|f| f.name.clone())
                .unwrap_or_default(),
            ControlKind::Checkbox => {
                if self.checked {
                    CHECKBOX_ON.to_string()
                } else {
                    String::new()
                }
            }
            _ => self.value.clone(),
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.notice = None;
    }

    /// Cycle a select control to the next (or previous) option.
    pub fn cycle_option(&mut self, forward: bool) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len();
        let current = self.options.iter().position(|(v, _)| *v == self.value);
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.value = self.options[next].0.clone();
    }

    /// Label of the currently selected option, falling back to the raw value.
    pub fn display_value(&self) -> String {
        match self.kind {
            ControlKind::Select => self
                .options
                .iter()
                .find(|(v, _)| *v == self.value)
                .map(|(_, l)| l.clone())
                .unwrap_or_else(|| self.value.clone()),
            ControlKind::Checkbox => if self.checked { "[x]" } else { "[ ]" }.to_string(),
            ControlKind::File => self
                .file
                .as_ref()
                .map(|f| format!("{} ({} KB)", f.name, f.size.div_ceil(1024)))
                .unwrap_or_default(),
            _ => self.value.clone(),
        }
    }

    /// Return the control to its empty state (form reset).
    pub fn clear(&mut self) {
        self.value.clear();
        self.checked = false;
        self.file = None;
        self.invalid = false;
        self.notice = None;
    }
}

#[derive(Debug, Clone)]
pub struct StepPanel {
    /// 1-based step index.
    pub index: u32,
    pub title: String,
    pub controls: Vec<Control>,
    pub active: bool,
}

impl StepPanel {
    pub fn new(index: u32, title: impl Into<String>, controls: Vec<Control>) -> Self {
        Self {
            index,
            title: title.into(),
            controls,
            active: false,
        }
    }

    pub fn required_controls(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter().filter(|c| c.required)
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    steps: Vec<StepPanel>,
}

impl RegistrationForm {
    pub fn new(steps: Vec<StepPanel>) -> Self {
        Self { steps }
    }

    /// The PPDB Darussalam 2026 registration form.
    pub fn ppdb() -> Self {
        Self::new(vec![
            StepPanel::new(
                1,
                "Data Calon Santri",
                vec![
                    Control::new("nama_lengkap", "Nama Lengkap", ControlKind::Text).required(),
                    Control::new("nisn", "NISN", ControlKind::Text),
                    Control::new("tempat_lahir", "Tempat Lahir", ControlKind::Text).required(),
                    Control::new("tanggal_lahir", "Tanggal Lahir (YYYY-MM-DD)", ControlKind::Date)
                        .required(),
                    Control::new("jenis_kelamin", "Jenis Kelamin", ControlKind::Select)
                        .required()
                        .options(&[("L", "Laki-laki"), ("P", "Perempuan")]),
                    Control::new("alamat", "Alamat Lengkap", ControlKind::TextArea).required(),
                ],
            ),
            StepPanel::new(
                2,
                "Data Orang Tua",
                vec![
                    Control::new("nama_ayah", "Nama Ayah", ControlKind::Text).required(),
                    Control::new("nama_ibu", "Nama Ibu", ControlKind::Text).required(),
                    Control::new("pekerjaan_ortu", "Pekerjaan Orang Tua", ControlKind::Text),
                    Control::new("telepon_ortu", "No. Telepon/WA Orang Tua", ControlKind::Tel)
                        .required(),
                    Control::new("email_ortu", "Email Orang Tua", ControlKind::Email),
                ],
            ),
            StepPanel::new(
                3,
                "Berkas & Persetujuan",
                vec![
                    Control::new("file_kk", "Kartu Keluarga (maks. 2MB)", ControlKind::File)
                        .required()
                        .max_size(DEFAULT_MAX_UPLOAD_BYTES),
                    Control::new("file_foto", "Pas Foto 3x4 (maks. 2MB)", ControlKind::File)
                        .required()
                        .max_size(DEFAULT_MAX_UPLOAD_BYTES),
                    Control::new(
                        "persetujuan",
                        "Saya menyatakan data yang diisi benar",
                        ControlKind::Checkbox,
                    )
                    .required(),
                ],
            ),
        ])
    }

    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn steps(&self) -> &[StepPanel] {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut [StepPanel] {
        &mut self.steps
    }

    pub fn panel(&self, step: u32) -> Option<&StepPanel> {
        self.steps.iter().find(|s| s.index == step)
    }

    pub fn panel_mut(&mut self, step: u32) -> Option<&mut StepPanel> {
        self.steps.iter_mut().find(|s| s.index == step)
    }

    pub fn active_panels(&self) -> Vec<u32> {
        self.steps
            .iter()
            .filter(|s| s.active)
            .map(|s| s.index)
            .collect()
    }

    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.steps.iter().flat_map(|s| s.controls.iter())
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls().find(|c| c.name == name)
    }

    pub fn control_mut(&mut self, name: &str) -> Option<&mut Control> {
        self.steps
            .iter_mut()
            .flat_map(|s| s.controls.iter_mut())
            .find(|c| c.name == name)
    }

    /// `(name, value)` for every named control in document order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.controls()
            .map(|c| (c.name.clone(), c.submitted_value()))
            .collect()
    }

    /// Equivalent of `form.reset()`: every control back to empty.
    pub fn reset(&mut self) {
        for control in self.steps.iter_mut().flat_map(|s| s.controls.iter_mut()) {
            control.clear();
        }
    }
}
