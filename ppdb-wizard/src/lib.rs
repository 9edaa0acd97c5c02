// PPDB Darussalam registration wizard
// Main library entry point

pub mod config;
pub mod models;
pub mod storage;
pub mod submission;
pub mod surface;
pub mod tui;
pub mod utils;
pub mod wizard;

use anyhow::{Context, Result};
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::WizardConfig;
use crate::models::form::{RegistrationForm, SelectedFile};
use crate::storage::{DraftStore, FileDraftStore};
use crate::submission::SimulatedSubmission;
use crate::surface::BufferedSurface;
use crate::wizard::{Transition, WizardCommand, WizardController};

/// Initialize logging system with dual format (JSON + human-readable)
fn init_logging(cfg: &WizardConfig, with_stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder(cfg.logging.dir.as_deref())?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("ppdb-wizard-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("ppdb-wizard-{}.txt", timestamp));

    // stdout is skipped in TUI mode so log lines never corrupt the terminal UI.
    let mut dispatch = fern::Dispatch::new().level(cfg.log_level());

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!("{}", human_line(message, record)));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!("{}", human_line(message, record)));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

fn human_line(message: &std::fmt::Arguments, record: &log::Record) -> String {
    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let message_str = format!("{}", message);
    let (phase, step, cleaned_message) = utils::logging::parse_log_metadata(&message_str);
    utils::logging::format_human_readable_log(
        &timestamp_local.to_string(),
        record.level(),
        record.target(),
        &cleaned_message,
        phase.as_deref(),
        step.as_deref(),
    )
}

fn load_config() -> WizardConfig {
    match WizardConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("PPDB Wizard: {}", e);
            std::process::exit(2);
        }
    }
}

/// Interactive terminal wizard.
pub fn run_tui() {
    let cfg = load_config();
    if let Err(e) = init_logging(&cfg, false) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(
        "[PHASE: initialization] PPDB wizard starting at {}",
        chrono::Utc::now()
    );

    if let Err(e) = tui::run(&cfg) {
        error!("[PHASE: tui] TUI wizard failed: {:#}", e);
        eprintln!("PPDB Wizard failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Non-interactive TUI smoke: render one frame and exit.
pub fn run_tui_smoke(target: Option<String>) {
    let target = target.unwrap_or_else(|| "1".to_string());
    match tui::smoke(&target) {
        Ok(()) => println!("TUI smoke OK (target={})", target),
        Err(e) => {
            eprintln!("TUI smoke failed (target={}): {:#}", target, e);
            std::process::exit(1);
        }
    }
}

/// Delete the persisted draft and exit.
pub fn run_clear_draft() {
    let cfg = load_config();
    let store = FileDraftStore::new(&cfg.draft.store_path);
    match store.remove_item(&cfg.draft.storage_key) {
        Ok(()) => println!("Draft cleared ({:?})", store.path()),
        Err(e) => {
            eprintln!("Failed to clear draft: {}", e);
            std::process::exit(1);
        }
    }
}

/// Scripted fill -> next -> next -> submit run against the simulated boundary and a throwaway
/// file store. Prints a transcript and exits 0/1.
pub fn run_submit_smoke() {
    let store_path =
        std::env::temp_dir().join(format!("ppdb-submit-smoke-{}.json", uuid::Uuid::new_v4()));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build();
    let result = match rt {
        Ok(rt) => rt.block_on(submit_smoke(&store_path)),
        Err(e) => Err(anyhow::anyhow!("Failed to start runtime: {}", e)),
    };
    let _ = std::fs::remove_file(&store_path);

    match result {
        Ok(transcript) => {
            for line in transcript {
                println!("{}", line);
            }
            println!("SUBMIT SMOKE: PASS");
        }
        Err(e) => {
            eprintln!("SUBMIT SMOKE: FAIL: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn submit_smoke(store_path: &Path) -> Result<Vec<String>> {
    let store = FileDraftStore::new(store_path);
    let boundary = Arc::new(SimulatedSubmission::new(
        Duration::from_millis(10),
        Duration::from_secs(5),
    ));
    let mut wizard = WizardController::new(
        RegistrationForm::ppdb(),
        store.clone(),
        boundary,
        BufferedSurface::new(),
    );
    let mut transcript = Vec::new();

    let mut step = |wizard: &mut WizardController<_, _, _>, cmd: WizardCommand| {
        let t = wizard.apply(cmd.clone());
        transcript.push(format!("{:?} -> {:?}", cmd, t));
        t
    };

    step(&mut wizard, WizardCommand::LoadDraft);
    for (name, value) in [
        ("nama_lengkap", "Ahmad"),
        ("tempat_lahir", "Semarang"),
        ("tanggal_lahir", "2015-01-01"),
        ("jenis_kelamin", "L"),
        ("alamat", "Bermi, Mijen, Demak"),
        ("nama_ayah", "Budi"),
        ("nama_ibu", "Siti"),
        ("telepon_ortu", "08123456789"),
    ] {
        if let Some(c) = wizard.form_mut().control_mut(name) {
            c.set_value(value);
        }
    }
    if step(&mut wizard, WizardCommand::Next) != (Transition::Moved { from: 1, to: 2 }) {
        anyhow::bail!("step 1 did not advance");
    }
    if step(&mut wizard, WizardCommand::Next) != (Transition::Moved { from: 2, to: 3 }) {
        anyhow::bail!("step 2 did not advance");
    }
    if store
        .get_item(wizard::DRAFT_STORAGE_KEY)
        .context("draft store unreadable")?
        .is_none()
    {
        anyhow::bail!("draft was not persisted during navigation");
    }

    let form = wizard.form_mut();
    if let Some(c) = form.control_mut("file_kk") {
        c.select_file(SelectedFile::new("kk.pdf", 250_000));
    }
    if let Some(c) = form.control_mut("file_foto") {
        c.select_file(SelectedFile::new("foto.jpg", 120_000));
    }
    if let Some(c) = form.control_mut("persetujuan") {
        c.set_checked(true);
    }

    let outcome = wizard.dispatch(WizardCommand::Submit).await;
    transcript.push(format!("Submit -> {:?}", outcome));
    if outcome != Transition::Submitted {
        anyhow::bail!("submission was not acknowledged: {:?}", outcome);
    }
    if let Some(summary) = &wizard.surface().summary {
        transcript.extend(summary.lines().into_iter().map(|l| format!("  {}", l)));
    }
    if store.get_item(wizard::DRAFT_STORAGE_KEY)?.is_some() {
        anyhow::bail!("draft still present after submission");
    }
    if wizard.current_step() != 1 {
        anyhow::bail!("wizard did not return to step 1");
    }
    Ok(transcript)
}
