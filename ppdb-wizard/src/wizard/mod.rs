//! Form wizard controller.
//!
//! Owns the step state machine of the registration form:
//! - `Next` (validated, +1), `Previous` (unvalidated, -1), reset to step 1 after a successful
//!   submission or when no draft exists.
//! - Navigation is clamped: `Next` on the last step and `Previous` on step 1 are no-ops.
//! - A draft is written on every successful navigation, read once on `LoadDraft`, and removed
//!   after a successful submission.
//!
//! Collaborators (draft store, submission boundary, page surface) are injected at construction.

pub mod validation;

use crate::models::draft::FormDraft;
use crate::models::form::{ControlKind, RegistrationForm};
use crate::models::payload::{SubmissionPayload, SubmissionSummary};
use crate::storage::{DraftStore, StoreError};
use crate::submission::{submit_with_deadline, SubmissionBoundary, SubmitError};
use crate::surface::PageSurface;
use crate::utils::logging::mask_payload;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use validation::{oversized_message, validate_panel, AGGREGATE_INVALID_MESSAGE};

/// Versioned localStorage key the draft lives under.
pub const DRAFT_STORAGE_KEY: &str = "ppdb_darussalam_2026_draft";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    LoadDraft,
    Next,
    Previous,
    Submit,
    CloseConfirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Draft (or a fresh start) applied; the wizard now shows `step`.
    Restored { step: u32, from_draft: bool },
    Moved { from: u32, to: u32 },
    /// Step validation failed; nothing changed except invalid markers.
    Blocked,
    /// Clamped navigation request at the first/last step.
    AtBoundary,
    /// A submission is in flight.
    Busy,
    /// A submission outcome arrived with no submission pending; nothing changed.
    Ignored,
    /// Validation passed; the payload must now go to the submission boundary.
    Submitting(SubmissionPayload),
    Submitted,
    SubmitFailed,
    ConfirmationClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmissionState {
    Idle,
    Pending(SubmissionPayload),
}

#[derive(Debug, Clone)]
struct WizardState {
    current_step: u32,
    submission: SubmissionState,
}

pub struct WizardController<S, B, P>
where
    S: DraftStore,
    B: SubmissionBoundary + ?Sized,
    P: PageSurface,
{
    form: RegistrationForm,
    state: WizardState,
    store: S,
    boundary: Arc<B>,
    surface: P,
    storage_key: String,
}

impl<S, B, P> WizardController<S, B, P>
where
    S: DraftStore,
    B: SubmissionBoundary + ?Sized,
    P: PageSurface,
{
    /// The new controller already shows step 1; `LoadDraft` then moves it to the restored step.
    pub fn new(form: RegistrationForm, store: S, boundary: Arc<B>, surface: P) -> Self {
        let mut controller = Self {
            form,
            state: WizardState {
                current_step: 1,
                submission: SubmissionState::Idle,
            },
            store,
            boundary,
            surface,
            storage_key: DRAFT_STORAGE_KEY.to_string(),
        };
        controller.show_step(1);
        controller
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    /// User edits go straight to the form, like typing into the page.
    pub fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut P {
        &mut self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn boundary(&self) -> Arc<B> {
        Arc::clone(&self.boundary)
    }

    pub fn current_step(&self) -> u32 {
        self.state.current_step
    }

    pub fn total_steps(&self) -> u32 {
        self.form.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step >= self.total_steps()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state.submission, SubmissionState::Pending(_))
    }

    /// Apply a command synchronously. `Submit` stops at [`Transition::Submitting`]; the caller
    /// delivers the payload and reports back through [`Self::finish_submit`].
    pub fn apply(&mut self, command: WizardCommand) -> Transition {
        debug!("[PHASE: wizard] [STEP: command] {:?}", command);
        if command == WizardCommand::CloseConfirmation {
            return self.close_confirmation();
        }
        if self.is_submitting() {
            debug!(
                "[PHASE: wizard] [STEP: command] Ignoring {:?} while a submission is pending",
                command
            );
            return Transition::Busy;
        }
        match command {
            WizardCommand::LoadDraft => self.load_draft(),
            WizardCommand::Next => self.next(),
            WizardCommand::Previous => self.previous(),
            WizardCommand::Submit => self.begin_submit(),
            WizardCommand::CloseConfirmation => self.close_confirmation(),
        }
    }

    /// Apply a command, running any resulting submission to completion.
    pub async fn dispatch(&mut self, command: WizardCommand) -> Transition {
        self.dispatch_with_cancel(command, &CancellationToken::new())
            .await
    }

    pub async fn dispatch_with_cancel(
        &mut self,
        command: WizardCommand,
        cancel: &CancellationToken,
    ) -> Transition {
        match self.apply(command) {
            Transition::Submitting(payload) => {
                let outcome = submit_with_deadline(self.boundary.as_ref(), &payload, cancel).await;
                self.finish_submit(outcome)
            }
            other => other,
        }
    }

    /// Mark step `n` as the only active panel. An out-of-range `n` deactivates every panel and
    /// leaves the current step and progress untouched.
    pub fn show_step(&mut self, n: u32) -> bool {
        let mut found = false;
        for panel in self.form.steps_mut() {
            panel.active = panel.index == n;
            found |= panel.active;
        }
        if found {
            self.state.current_step = n;
            let percent = f64::from(n) / f64::from(self.total_steps()) * 100.0;
            self.surface.set_progress(percent);
        } else {
            warn!(
                "[PHASE: wizard] [STEP: show] Step {} is outside 1..={}; no panel active",
                n,
                self.total_steps()
            );
        }
        found
    }

    /// Validate every required control in step `n`, updating markers and surfacing notices.
    pub fn validate_step(&mut self, n: u32) -> bool {
        let Some(panel) = self.form.panel_mut(n) else {
            warn!("[PHASE: wizard] [STEP: validate] No panel for step {}", n);
            return false;
        };
        let report = validate_panel(panel);
        for name in &report.oversized {
            self.surface.alert(&oversized_message(name));
        }
        if !report.is_valid() {
            info!(
                "[PHASE: wizard] [STEP: validate] Step {} invalid: {}",
                n,
                report.invalid.join(", ")
            );
            self.surface.alert(AGGREGATE_INVALID_MESSAGE);
        }
        report.is_valid()
    }

    pub fn save_draft(&self) -> Result<(), StoreError> {
        self.write_draft(self.state.current_step)
    }

    fn write_draft(&self, step: u32) -> Result<(), StoreError> {
        let draft = FormDraft::capture(&self.form, step);
        let body = draft.to_json().map_err(StoreError::Serialize)?;
        self.store.set_item(&self.storage_key, &body)?;
        debug!("[PHASE: draft] [STEP: save] Draft saved at step {}", step);
        Ok(())
    }

    fn clamp_step(&self, step: u32) -> u32 {
        step.clamp(1, self.total_steps().max(1))
    }

    pub fn load_draft(&mut self) -> Transition {
        let raw = match self.store.get_item(&self.storage_key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[PHASE: draft] [STEP: load] Draft store unreadable: {}", e);
                None
            }
        };

        let draft = match raw.map(|r| FormDraft::from_json(&r)) {
            Some(Ok(d)) => d,
            Some(Err(e)) => {
                warn!(
                    "[PHASE: draft] [STEP: load] Discarding unreadable draft: {}",
                    e
                );
                if let Err(e) = self.store.remove_item(&self.storage_key) {
                    warn!("[PHASE: draft] [STEP: load] Failed to remove draft: {}", e);
                }
                self.show_step(1);
                return Transition::Restored {
                    step: 1,
                    from_draft: false,
                };
            }
            None => {
                info!("[PHASE: draft] [STEP: load] No draft found; starting at step 1");
                self.show_step(1);
                return Transition::Restored {
                    step: 1,
                    from_draft: false,
                };
            }
        };

        for (name, value) in &draft.fields {
            let Some(control) = self.form.control_mut(name) else {
                continue;
            };
            match control.kind {
                // File contents cannot be restored; tell the applicant which file to pick again.
                ControlKind::File => {
                    if !value.is_empty() {
                        control.notice =
                            Some(format!("File terakhir: {} (Harap unggah ulang)", value));
                    }
                }
                ControlKind::Checkbox => control.set_checked(value == "on"),
                _ => control.set_value(value.clone()),
            }
        }

        let step = self.clamp_step(draft.current_step.unwrap_or(1));
        self.show_step(step);
        info!("[PHASE: draft] [STEP: load] Draft restored at step {}", step);
        Transition::Restored {
            step,
            from_draft: true,
        }
    }

    pub fn next(&mut self) -> Transition {
        let from = self.state.current_step;
        if from >= self.total_steps() {
            debug!("[PHASE: wizard] [STEP: next] Already on the last step");
            return Transition::AtBoundary;
        }
        if !self.validate_step(from) {
            return Transition::Blocked;
        }
        self.move_to(from, from + 1)
    }

    pub fn previous(&mut self) -> Transition {
        let from = self.state.current_step;
        if from <= 1 {
            debug!("[PHASE: wizard] [STEP: previous] Already on the first step");
            return Transition::AtBoundary;
        }
        self.move_to(from, from - 1)
    }

    fn move_to(&mut self, from: u32, to: u32) -> Transition {
        // The draft records the destination so a reload resumes where the applicant is looking.
        if let Err(e) = self.write_draft(to) {
            warn!("[PHASE: draft] [STEP: save] Draft not saved: {}", e);
        }
        self.show_step(to);
        info!("[PHASE: wizard] [STEP: navigate] Step {} -> {}", from, to);
        Transition::Moved { from, to }
    }

    pub fn begin_submit(&mut self) -> Transition {
        if self.is_submitting() {
            return Transition::Busy;
        }
        if !self.validate_step(self.state.current_step) {
            return Transition::Blocked;
        }
        let payload = SubmissionPayload::from_form(&self.form);
        info!(
            "[PHASE: submit] [STEP: begin] Submitting registration: {}",
            mask_payload(&payload)
        );
        self.state.submission = SubmissionState::Pending(payload.clone());
        Transition::Submitting(payload)
    }

    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>) -> Transition {
        let payload = match std::mem::replace(&mut self.state.submission, SubmissionState::Idle) {
            SubmissionState::Pending(p) => p,
            SubmissionState::Idle => {
                warn!("[PHASE: submit] [STEP: finish] No submission was pending");
                return Transition::Ignored;
            }
        };

        match outcome {
            Ok(()) => {
                let summary = SubmissionSummary::from_payload(&payload);
                self.surface.render_summary(&summary);
                self.surface.set_confirmation_visible(true);
                if let Err(e) = self.store.remove_item(&self.storage_key) {
                    warn!("[PHASE: submit] [STEP: finish] Draft not cleared: {}", e);
                }
                self.form.reset();
                self.show_step(1);
                info!("[PHASE: submit] [STEP: finish] Registration acknowledged");
                Transition::Submitted
            }
            Err(e) => {
                warn!("[PHASE: submit] [STEP: finish] Submission failed: {}", e);
                self.surface.alert(e.user_message());
                Transition::SubmitFailed
            }
        }
    }

    pub fn close_confirmation(&mut self) -> Transition {
        self.surface.set_confirmation_visible(false);
        Transition::ConfirmationClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::SelectedFile;
    use crate::storage::MemoryDraftStore;
    use crate::submission::stubs::{AcceptingStub, FailingStub, HangingStub};
    use crate::surface::BufferedSurface;
    use std::collections::BTreeMap;

    type TestWizard<B> = WizardController<MemoryDraftStore, B, BufferedSurface>;

    fn wizard<B: SubmissionBoundary>(store: &MemoryDraftStore, boundary: B) -> TestWizard<B> {
        WizardController::new(
            RegistrationForm::ppdb(),
            store.clone(),
            Arc::new(boundary),
            BufferedSurface::new(),
        )
    }

    fn set(w: &mut TestWizard<impl SubmissionBoundary>, name: &str, value: &str) {
        w.form_mut().control_mut(name).unwrap().set_value(value);
    }

    fn fill_step1(w: &mut TestWizard<impl SubmissionBoundary>) {
        set(w, "nama_lengkap", "Ahmad");
        set(w, "tempat_lahir", "Semarang");
        set(w, "tanggal_lahir", "2015-01-01");
        set(w, "jenis_kelamin", "L");
        set(w, "alamat", "Bermi, Mijen");
    }

    fn fill_step2(w: &mut TestWizard<impl SubmissionBoundary>) {
        set(w, "nama_ayah", "Budi");
        set(w, "nama_ibu", "Siti");
        set(w, "telepon_ortu", "08123456789");
    }

    fn fill_step3(w: &mut TestWizard<impl SubmissionBoundary>) {
        let form = w.form_mut();
        form.control_mut("file_kk")
            .unwrap()
            .select_file(SelectedFile::new("kk.pdf", 300_000));
        form.control_mut("file_foto")
            .unwrap()
            .select_file(SelectedFile::new("foto.jpg", 150_000));
        form.control_mut("persetujuan").unwrap().set_checked(true);
    }

    fn stored_draft(store: &MemoryDraftStore) -> Option<FormDraft> {
        store
            .get_item(DRAFT_STORAGE_KEY)
            .unwrap()
            .map(|raw| FormDraft::from_json(&raw).unwrap())
    }

    #[test]
    fn show_step_activates_exactly_one_panel_and_sets_progress() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        let total = w.total_steps();
        for n in 1..=total {
            assert!(w.show_step(n));
            assert_eq!(w.form().active_panels(), vec![n]);
            assert_eq!(w.current_step(), n);
            let expected = f64::from(n) / f64::from(total) * 100.0;
            assert!((w.surface().progress.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn new_controller_shows_step_one_before_any_command() {
        let store = MemoryDraftStore::new();
        let w = wizard(&store, AcceptingStub::default());
        assert_eq!(w.current_step(), 1);
        assert_eq!(w.form().active_panels(), vec![1]);
        let expected = 100.0 / f64::from(w.total_steps());
        assert!((w.surface().progress.unwrap() - expected).abs() < 1e-9);
        assert!(store.is_empty());
    }

    #[test]
    fn show_step_out_of_range_activates_nothing() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.show_step(2);
        assert!(!w.show_step(4));
        assert!(w.form().active_panels().is_empty());
        assert_eq!(w.current_step(), 2);
        assert!(!w.show_step(0));
        assert_eq!(w.current_step(), 2);
    }

    #[test]
    fn load_without_draft_starts_at_step_one() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        assert_eq!(
            w.apply(WizardCommand::LoadDraft),
            Transition::Restored {
                step: 1,
                from_draft: false
            }
        );
        assert_eq!(w.form().active_panels(), vec![1]);
    }

    #[test]
    fn next_is_blocked_by_invalid_step() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);

        assert_eq!(w.apply(WizardCommand::Next), Transition::Blocked);
        assert_eq!(w.current_step(), 1);
        assert!(w.form().control("nama_lengkap").unwrap().invalid);
        assert_eq!(w.surface().alerts, vec![AGGREGATE_INVALID_MESSAGE]);
        assert!(store.is_empty());
    }

    #[test]
    fn next_saves_draft_with_destination_step_and_reload_restores_it() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);
        fill_step1(&mut w);

        assert_eq!(
            w.apply(WizardCommand::Next),
            Transition::Moved { from: 1, to: 2 }
        );
        let draft = stored_draft(&store).expect("draft written");
        assert_eq!(draft.current_step, Some(2));
        assert_eq!(draft.fields["nama_lengkap"], "Ahmad");

        // Reload: a fresh controller over the same store.
        let mut reloaded = wizard(&store, AcceptingStub::default());
        assert_eq!(
            reloaded.apply(WizardCommand::LoadDraft),
            Transition::Restored {
                step: 2,
                from_draft: true
            }
        );
        assert_eq!(reloaded.form().active_panels(), vec![2]);
        let form = reloaded.form();
        assert_eq!(form.control("nama_lengkap").unwrap().value, "Ahmad");
        assert_eq!(form.control("tanggal_lahir").unwrap().value, "2015-01-01");
        assert_eq!(form.control("jenis_kelamin").unwrap().value, "L");
    }

    #[test]
    fn draft_keys_cover_every_control() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);
        fill_step1(&mut w);
        w.apply(WizardCommand::Next);

        let draft = stored_draft(&store).unwrap();
        let mut expected: Vec<String> = w.form().controls().map(|c| c.name.clone()).collect();
        expected.sort();
        let keys: Vec<String> = draft.fields.keys().cloned().collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn save_then_load_round_trips_every_non_file_value() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);
        fill_step1(&mut w);
        fill_step2(&mut w);
        set(&mut w, "email_ortu", "budi@example.com");
        w.form_mut()
            .control_mut("persetujuan")
            .unwrap()
            .set_checked(true);
        w.show_step(3);
        w.save_draft().unwrap();

        let mut reloaded = wizard(&store, AcceptingStub::default());
        reloaded.apply(WizardCommand::LoadDraft);
        assert_eq!(reloaded.current_step(), 3);
        for original in w.form().controls().filter(|c| !c.is_file()) {
            let restored = reloaded.form().control(&original.name).unwrap();
            assert_eq!(restored.value, original.value, "{}", original.name);
            assert_eq!(restored.checked, original.checked, "{}", original.name);
        }
    }

    #[test]
    fn restored_file_controls_get_reupload_notice() {
        let store = MemoryDraftStore::new();
        let mut fields = BTreeMap::new();
        fields.insert("file_kk".to_string(), "kk.pdf".to_string());
        fields.insert("file_foto".to_string(), String::new());
        fields.insert("unknown_field".to_string(), "ignored".to_string());
        let draft = FormDraft {
            current_step: Some(3),
            fields,
        };
        store
            .set_item(DRAFT_STORAGE_KEY, &draft.to_json().unwrap())
            .unwrap();

        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);

        let kk = w.form().control("file_kk").unwrap();
        assert_eq!(
            kk.notice.as_deref(),
            Some("File terakhir: kk.pdf (Harap unggah ulang)")
        );
        assert!(kk.file.is_none());
        assert!(w.form().control("file_foto").unwrap().notice.is_none());
        assert_eq!(w.current_step(), 3);
    }

    #[test]
    fn restored_step_is_clamped_into_range() {
        for (stored, expected) in [(Some(0), 1), (Some(9), 3), (None, 1)] {
            let store = MemoryDraftStore::new();
            let draft = FormDraft {
                current_step: stored,
                fields: BTreeMap::new(),
            };
            store
                .set_item(DRAFT_STORAGE_KEY, &draft.to_json().unwrap())
                .unwrap();
            let mut w = wizard(&store, AcceptingStub::default());
            w.apply(WizardCommand::LoadDraft);
            assert_eq!(w.current_step(), expected);
            assert_eq!(w.form().active_panels(), vec![expected]);
        }
    }

    #[test]
    fn corrupt_draft_is_discarded() {
        let store = MemoryDraftStore::new();
        store.set_item(DRAFT_STORAGE_KEY, "{not json").unwrap();
        let mut w = wizard(&store, AcceptingStub::default());
        assert_eq!(
            w.apply(WizardCommand::LoadDraft),
            Transition::Restored {
                step: 1,
                from_draft: false
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn previous_is_unvalidated_and_saves_draft() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);
        fill_step1(&mut w);
        w.apply(WizardCommand::Next);
        set(&mut w, "nama_ayah", "Budi");

        assert_eq!(
            w.apply(WizardCommand::Previous),
            Transition::Moved { from: 2, to: 1 }
        );
        let draft = stored_draft(&store).unwrap();
        assert_eq!(draft.current_step, Some(1));
        assert_eq!(draft.fields["nama_ayah"], "Budi");
        assert!(w.surface().alerts.is_empty());
    }

    #[test]
    fn navigation_is_clamped_at_both_ends() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);

        assert_eq!(w.apply(WizardCommand::Previous), Transition::AtBoundary);
        assert_eq!(w.current_step(), 1);
        assert_eq!(w.form().active_panels(), vec![1]);
        assert!(store.is_empty());

        w.show_step(3);
        assert_eq!(w.apply(WizardCommand::Next), Transition::AtBoundary);
        assert_eq!(w.current_step(), 3);
        assert_eq!(w.form().active_panels(), vec![3]);
        assert!(w.surface().alerts.is_empty());
    }

    #[test]
    fn oversized_file_blocks_with_field_and_aggregate_notice() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.show_step(3);
        fill_step3(&mut w);
        w.form_mut()
            .control_mut("file_kk")
            .unwrap()
            .select_file(SelectedFile::new("kk.pdf", 3 * 1024 * 1024));

        assert!(!w.validate_step(3));
        assert!(w.form().control("file_kk").unwrap().invalid);
        assert!(!w.form().control("file_foto").unwrap().invalid);
        assert_eq!(
            w.surface().alerts,
            vec![
                "Ukuran file file_kk melebihi batas 2MB.".to_string(),
                AGGREGATE_INVALID_MESSAGE.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn full_submission_shows_summary_and_resets() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.apply(WizardCommand::LoadDraft);
        fill_step1(&mut w);
        w.apply(WizardCommand::Next);
        fill_step2(&mut w);
        w.apply(WizardCommand::Next);
        fill_step3(&mut w);
        assert!(stored_draft(&store).is_some());

        assert_eq!(w.dispatch(WizardCommand::Submit).await, Transition::Submitted);

        let surface = w.surface();
        assert!(surface.confirmation_visible);
        assert_eq!(
            surface.summary.as_ref().unwrap().lines(),
            vec![
                "Nama Santri: Ahmad",
                "Tanggal Lahir: 2015-01-01",
                "Nama Ayah: Budi",
                "No. Telp Ortu: 08123456789",
                "KK: kk.pdf",
                "Foto: foto.jpg",
            ]
        );
        assert!(store.is_empty());
        assert!(w.form().controls().all(|c| c.submitted_value().is_empty()));
        assert_eq!(w.current_step(), 1);
        assert_eq!(w.form().active_panels(), vec![1]);

        let received = w.boundary().received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].get("file_kk"), "kk.pdf");
        assert_eq!(received[0].get("persetujuan"), "on");

        assert_eq!(
            w.apply(WizardCommand::CloseConfirmation),
            Transition::ConfirmationClosed
        );
        assert!(!w.surface().confirmation_visible);
    }

    #[tokio::test]
    async fn invalid_submit_changes_nothing() {
        let store = MemoryDraftStore::new();
        let boundary = Arc::new(FailingStub::default());
        let mut w = WizardController::new(
            RegistrationForm::ppdb(),
            store.clone(),
            Arc::clone(&boundary),
            BufferedSurface::new(),
        );
        w.show_step(3);

        assert_eq!(w.dispatch(WizardCommand::Submit).await, Transition::Blocked);
        assert_eq!(
            boundary
                .call_count
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
        assert_eq!(w.current_step(), 3);
    }

    #[tokio::test]
    async fn boundary_failure_preserves_state_for_retry() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, FailingStub::default());
        w.apply(WizardCommand::LoadDraft);
        fill_step1(&mut w);
        w.apply(WizardCommand::Next);
        fill_step2(&mut w);
        w.apply(WizardCommand::Next);
        fill_step3(&mut w);

        assert_eq!(
            w.dispatch(WizardCommand::Submit).await,
            Transition::SubmitFailed
        );
        assert_eq!(w.current_step(), 3);
        assert_eq!(w.form().control("nama_lengkap").unwrap().value, "Ahmad");
        assert_eq!(
            w.surface().alerts.last().map(String::as_str),
            Some("Pendaftaran Gagal. Silakan coba lagi.")
        );
        assert!(!w.surface().confirmation_visible);
        assert!(stored_draft(&store).is_some());
        assert!(!w.is_submitting());
    }

    #[tokio::test]
    async fn hanging_boundary_times_out_into_failure_path() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, HangingStub);
        w.show_step(3);
        fill_step3(&mut w);

        assert_eq!(
            w.dispatch(WizardCommand::Submit).await,
            Transition::SubmitFailed
        );
        assert_eq!(w.current_step(), 3);
        assert!(!w.is_submitting());
    }

    #[test]
    fn commands_are_rejected_while_submission_pending() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        w.show_step(3);
        fill_step3(&mut w);

        assert!(matches!(
            w.apply(WizardCommand::Submit),
            Transition::Submitting(_)
        ));
        assert!(w.is_submitting());
        assert_eq!(w.apply(WizardCommand::Previous), Transition::Busy);
        assert_eq!(w.apply(WizardCommand::Submit), Transition::Busy);
        assert_eq!(w.current_step(), 3);

        assert_eq!(
            w.finish_submit(Err(SubmitError::Cancelled)),
            Transition::SubmitFailed
        );
        assert_eq!(w.apply(WizardCommand::Previous), Transition::Moved { from: 3, to: 2 });
    }

    #[test]
    fn finish_without_pending_submission_is_ignored() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default());
        assert_eq!(w.finish_submit(Ok(())), Transition::Ignored);
        assert!(!w.surface().confirmation_visible);
    }

    #[test]
    fn custom_storage_key_is_used() {
        let store = MemoryDraftStore::new();
        let mut w = wizard(&store, AcceptingStub::default()).with_storage_key("ppdb_test_key");
        w.show_step(1);
        w.save_draft().unwrap();
        assert!(store.get_item("ppdb_test_key").unwrap().is_some());
        assert!(store.get_item(DRAFT_STORAGE_KEY).unwrap().is_none());
    }
}
