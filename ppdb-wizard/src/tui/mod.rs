//! Terminal UI for the registration wizard.
//!
//! Layout:
//! - Centered window titled "PPDB Darussalam 2026"
//! - Left panel: step list + progress gauge
//! - Main panel: controls of the active step
//! - Bottom button row: [ Kembali ] [ Lanjut | Kirim ] [ Keluar ]
//! - Modals for alerts, the confirmation summary and the quit prompt
//!
//! Every user action is turned into a `WizardCommand`; the controller stays the single source of
//! truth for step state. Submissions run on a worker thread so the UI keeps drawing, and Esc
//! cancels them.
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to avoid corrupting the
//! terminal UI.

use crate::config::WizardConfig;
use crate::models::form::{Control, ControlKind, RegistrationForm, SelectedFile};
use crate::models::payload::{SubmissionPayload, SubmissionSummary};
use crate::storage::{DraftStore, FileDraftStore, MemoryDraftStore};
use crate::submission::{
    build_boundary, submit_with_deadline, SimulatedSubmission, SubmissionBoundary, SubmitError,
};
use crate::surface::{BufferedSurface, PageSurface};
use crate::wizard::{Transition, WizardCommand, WizardController};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::Terminal;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const WINDOW_TITLE: &str = "PPDB Darussalam 2026 - Pendaftaran Santri Baru";

const BANNER: &str = r#" ___ ___ ___  ___
| _ \ _ \ _ \| _ )
|  _/  _/  _/| _ \
|_| |_| |_|  |___/
Darussalam Bermi Mijen"#;

type TuiWizard = WizardController<Box<dyn DraftStore>, dyn SubmissionBoundary, BufferedSurface>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    Message { title: String, body: String },
    ConfirmQuit,
}

enum UiMsg {
    SubmitFinished(Result<(), SubmitError>),
}

struct TuiState {
    wizard: TuiWizard,
    focus: Focus,
    /// Cursor (in chars) inside the focused text value.
    cursor: usize,
    /// Paths typed into file controls, keyed by control name.
    file_paths: HashMap<String, String>,
    modals: VecDeque<Modal>,
    pending: Option<CancellationToken>,
    quit: bool,
}

impl TuiState {
    fn new(wizard: TuiWizard) -> Self {
        Self {
            wizard,
            focus: Focus::Field(0),
            cursor: 0,
            file_paths: HashMap::new(),
            modals: VecDeque::new(),
            pending: None,
            quit: false,
        }
    }

    fn step_controls(&self) -> &[Control] {
        self.wizard
            .form()
            .panel(self.wizard.current_step())
            .map(|p| p.controls.as_slice())
            .unwrap_or(&[])
    }

    fn focused_control_name(&self) -> Option<String> {
        match self.focus {
            Focus::Field(i) => self.step_controls().get(i).map(|c| c.name.clone()),
            Focus::Button(_) => None,
        }
    }

    /// Run a command and surface whatever the controller reported.
    fn command(&mut self, command: WizardCommand) -> Transition {
        let before = self.wizard.current_step();
        let transition = self.wizard.apply(command);
        if self.wizard.current_step() != before || transition == Transition::Submitted {
            self.set_focus(Focus::Field(0));
        }
        self.collect_alerts();
        transition
    }

    fn collect_alerts(&mut self) {
        for body in self.wizard.surface_mut().take_alerts() {
            self.modals.push_back(Modal::Message {
                title: "Perhatian".to_string(),
                body,
            });
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        // File controls edit the typed path, not the control value.
        self.cursor = self
            .focused_control_name()
            .and_then(|name| {
                let control = self.wizard.form().control(&name)?;
                let text = if control.is_file() {
                    self.file_paths.get(&name).map(String::as_str).unwrap_or("")
                } else {
                    control.value.as_str()
                };
                Some(text.chars().count())
            })
            .unwrap_or(0);
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order: Vec<Focus> = (0..self.step_controls().len()).map(Focus::Field).collect();
        order.push(Focus::Button(ButtonFocus::Back));
        order.push(Focus::Button(ButtonFocus::Next));
        order.push(Focus::Button(ButtonFocus::Quit));
        order
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % order.len()
        } else {
            (idx + order.len() - 1) % order.len()
        };
        self.set_focus(order[next]);
    }
}

pub fn run(cfg: &WizardConfig) -> Result<()> {
    info!("[PHASE: tui] [STEP: start] Starting TUI wizard");

    let store: Box<dyn DraftStore> = Box::new(FileDraftStore::new(&cfg.draft.store_path));
    let boundary = build_boundary(&cfg.submission)?;
    let wizard = WizardController::new(
        RegistrationForm::ppdb(),
        store,
        boundary,
        BufferedSurface::new(),
    )
    .with_storage_key(cfg.draft.storage_key.clone());

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, TuiState::new(wizard));
    restore_terminal(&mut terminal)?;

    result
}

/// Non-interactive smoke mode: render a single frame and exit.
/// Targets: 1|2|3 (step pages, seeded values) or confirm (confirmation modal).
pub fn smoke(target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );
    let state = new_smoke_state(target.trim())?;

    // In-memory backend: no raw mode, no alternate screen.
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &state))?;
    Ok(())
}

fn new_smoke_state(target: &str) -> Result<TuiState> {
    let store: Box<dyn DraftStore> = Box::new(MemoryDraftStore::new());
    let boundary: Arc<dyn SubmissionBoundary> = Arc::new(SimulatedSubmission::new(
        Duration::from_millis(0),
        Duration::from_secs(1),
    ));
    let wizard = WizardController::new(
        RegistrationForm::ppdb(),
        store,
        boundary,
        BufferedSurface::new(),
    );
    let mut state = TuiState::new(wizard);
    state.command(WizardCommand::LoadDraft);

    // Smoke-only sample data.
    for (name, value) in [
        ("nama_lengkap", "Ahmad"),
        ("tanggal_lahir", "2015-01-01"),
        ("jenis_kelamin", "L"),
        ("nama_ayah", "Budi"),
        ("telepon_ortu", "08123456789"),
    ] {
        if let Some(c) = state.wizard.form_mut().control_mut(name) {
            c.set_value(value);
        }
    }
    if let Some(c) = state.wizard.form_mut().control_mut("file_kk") {
        c.select_file(SelectedFile::new("kk.pdf", 250_000));
    }
    if let Some(c) = state.wizard.form_mut().control_mut("file_foto") {
        c.notice = Some("File terakhir: foto.jpg (Harap unggah ulang)".to_string());
    }

    match target {
        "1" | "2" | "3" => {
            let step: u32 = target.parse()?;
            state.wizard.show_step(step);
        }
        "confirm" => {
            let payload = SubmissionPayload::from_form(state.wizard.form());
            let summary = SubmissionSummary::from_payload(&payload);
            let surface = state.wizard.surface_mut();
            surface.render_summary(&summary);
            surface.set_confirmation_visible(true);
        }
        other => anyhow::bail!("Unknown smoke target '{}'", other),
    }
    state.set_focus(Focus::Field(0));
    Ok(state)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, mut state: TuiState) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let (tx, rx) = mpsc::channel::<UiMsg>();

    state.command(WizardCommand::LoadDraft);
    state.set_focus(Focus::Field(0));

    while !state.quit {
        drain_messages(&mut state, &rx);
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut state, key.code, &tx);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn drain_messages(state: &mut TuiState, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::SubmitFinished(outcome) => {
                state.pending = None;
                let transition = state.wizard.finish_submit(outcome);
                if transition == Transition::Submitted {
                    state.file_paths.clear();
                    state.set_focus(Focus::Field(0));
                }
                state.collect_alerts();
            }
        }
    }
}

fn start_submit(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    let payload = match state.command(WizardCommand::Submit) {
        Transition::Submitting(payload) => payload,
        _ => return,
    };

    let cancel = CancellationToken::new();
    state.pending = Some(cancel.clone());
    let boundary = state.wizard.boundary();
    let tx = tx.clone();

    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let outcome = match rt {
            Ok(rt) => rt.block_on(submit_with_deadline(boundary.as_ref(), &payload, &cancel)),
            Err(e) => Err(SubmitError::Transport(format!(
                "Failed to start runtime: {}",
                e
            ))),
        };
        let _ = tx.send(UiMsg::SubmitFinished(outcome));
    });
}

fn choose_file(state: &mut TuiState, name: &str) {
    let typed = state.file_paths.get(name).cloned().unwrap_or_default();
    let typed = typed.trim();
    if typed.is_empty() {
        return;
    }
    match SelectedFile::from_path(&PathBuf::from(typed)) {
        Ok(file) => {
            info!(
                "[PHASE: tui] [STEP: file] {} selected ({} bytes)",
                name, file.size
            );
            if let Some(c) = state.wizard.form_mut().control_mut(name) {
                c.select_file(file);
            }
        }
        Err(e) => {
            warn!("[PHASE: tui] [STEP: file] Cannot use {:?}: {}", typed, e);
            state.modals.push_back(Modal::Message {
                title: "Berkas tidak dapat dibaca".to_string(),
                body: format!("{}\n\n{}", typed, e),
            });
        }
    }
}

fn handle_key(state: &mut TuiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    if let Some(cancel) = &state.pending {
        if code == KeyCode::Esc {
            cancel.cancel();
        }
        return;
    }

    if let Some(modal) = state.modals.front().cloned() {
        match (modal, code) {
            (Modal::ConfirmQuit, KeyCode::Enter) | (Modal::ConfirmQuit, KeyCode::Char('y')) => {
                state.quit = true;
            }
            (_, KeyCode::Enter) | (_, KeyCode::Esc) => {
                state.modals.pop_front();
            }
            _ => {}
        }
        return;
    }

    if state.wizard.surface().confirmation_visible {
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            state.command(WizardCommand::CloseConfirmation);
        }
        return;
    }

    match code {
        KeyCode::Tab | KeyCode::Down => return state.move_focus(true),
        KeyCode::BackTab | KeyCode::Up => return state.move_focus(false),
        KeyCode::Esc => return state.modals.push_back(Modal::ConfirmQuit),
        _ => {}
    }

    match state.focus {
        Focus::Button(button) => handle_button_key(state, button, code, tx),
        Focus::Field(_) => handle_field_key(state, code),
    }
}

fn handle_button_key(
    state: &mut TuiState,
    button: ButtonFocus,
    code: KeyCode,
    tx: &mpsc::Sender<UiMsg>,
) {
    match code {
        KeyCode::Left => {
            let b = match button {
                ButtonFocus::Back => ButtonFocus::Back,
                ButtonFocus::Next => ButtonFocus::Back,
                ButtonFocus::Quit => ButtonFocus::Next,
            };
            state.set_focus(Focus::Button(b));
        }
        KeyCode::Right => {
            let b = match button {
                ButtonFocus::Back => ButtonFocus::Next,
                ButtonFocus::Next => ButtonFocus::Quit,
                ButtonFocus::Quit => ButtonFocus::Quit,
            };
            state.set_focus(Focus::Button(b));
        }
        KeyCode::Enter => match button {
            ButtonFocus::Back => {
                state.command(WizardCommand::Previous);
            }
            ButtonFocus::Next => {
                if state.wizard.is_last_step() {
                    start_submit(state, tx);
                } else {
                    state.command(WizardCommand::Next);
                }
            }
            ButtonFocus::Quit => state.modals.push_back(Modal::ConfirmQuit),
        },
        _ => {}
    }
}

fn handle_field_key(state: &mut TuiState, code: KeyCode) {
    let Some(name) = state.focused_control_name() else {
        return;
    };
    let Some(kind) = state.wizard.form().control(&name).map(|c| c.kind) else {
        return;
    };

    match kind {
        ControlKind::Select => match code {
            KeyCode::Left => cycle(state, &name, false),
            KeyCode::Right | KeyCode::Char(' ') => cycle(state, &name, true),
            KeyCode::Enter => state.move_focus(true),
            _ => {}
        },
        ControlKind::Checkbox => match code {
            KeyCode::Char(' ') => {
                if let Some(c) = state.wizard.form_mut().control_mut(&name) {
                    c.set_checked(!c.checked);
                }
            }
            KeyCode::Enter => state.move_focus(true),
            _ => {}
        },
        ControlKind::File => {
            if code == KeyCode::Enter {
                choose_file(state, &name);
                return;
            }
            let path = state.file_paths.entry(name).or_default();
            edit_text(path, &mut state.cursor, code);
        }
        _ => {
            if code == KeyCode::Enter {
                state.move_focus(true);
                return;
            }
            if let Some(c) = state.wizard.form_mut().control_mut(&name) {
                edit_text(&mut c.value, &mut state.cursor, code);
            }
        }
    }
}

fn cycle(state: &mut TuiState, name: &str, forward: bool) {
    if let Some(c) = state.wizard.form_mut().control_mut(name) {
        c.cycle_option(forward);
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Line editing on a char cursor. Returns false for keys it does not handle.
fn edit_text(value: &mut String, cursor: &mut usize, code: KeyCode) -> bool {
    let len = value.chars().count();
    *cursor = (*cursor).min(len);
    match code {
        KeyCode::Char(c) => {
            let at = byte_index(value, *cursor);
            value.insert(at, c);
            *cursor += 1;
            true
        }
        KeyCode::Backspace => {
            if *cursor > 0 {
                let at = byte_index(value, *cursor - 1);
                value.remove(at);
                *cursor -= 1;
            }
            true
        }
        KeyCode::Delete => {
            if *cursor < len {
                let at = byte_index(value, *cursor);
                value.remove(at);
            }
            true
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
            true
        }
        KeyCode::Right => {
            *cursor = (*cursor + 1).min(len);
            true
        }
        KeyCode::Home => {
            *cursor = 0;
            true
        }
        KeyCode::End => {
            *cursor = len;
            true
        }
        _ => false,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &TuiState) {
    let window_area = centered_window(area, 100, 30);

    let outer_block = Block::default().borders(Borders::ALL).title(WINDOW_TITLE);
    f.render_widget(outer_block, window_area);

    let inner = window_area.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)].as_ref())
        .split(rows[0]);

    draw_sidebar(f, cols[0], state);
    draw_step(f, cols[1], state);
    draw_buttons(f, rows[1], state);

    if state.wizard.surface().confirmation_visible {
        draw_confirmation_modal(f, window_area, state);
    }
    match state.modals.front() {
        Some(Modal::Message { title, body }) => draw_message_modal(f, window_area, title, body),
        Some(Modal::ConfirmQuit) => draw_quit_modal(f, window_area),
        None => {}
    }
}

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

fn draw_sidebar(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let mut lines: Vec<Line> = BANNER.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    for panel in state.wizard.form().steps() {
        let marker = if panel.active { "> " } else { "  " };
        let style = if panel.active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}. {}", marker, panel.index, panel.title),
            style,
        )));
    }
    let list = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(list, parts[0]);

    let percent = state.wizard.surface().progress.unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progres"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(percent.round().clamp(0.0, 100.0) as u16);
    f.render_widget(gauge, parts[1]);
}

fn control_lines(state: &TuiState, index: usize, control: &Control) -> Vec<Line<'static>> {
    let focused = state.focus == Focus::Field(index);
    let marker = if focused { "> " } else { "  " };
    let required = if control.required { " *" } else { "" };
    let label_style = if control.invalid {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let value = match control.kind {
        ControlKind::File if control.file.is_none() => {
            let typed = state.file_paths.get(&control.name).cloned().unwrap_or_default();
            if typed.is_empty() && !focused {
                "(belum ada berkas)".to_string()
            } else {
                typed
            }
        }
        _ => control.display_value(),
    };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(marker.to_string()),
        Span::styled(format!("{}{}: ", control.label, required), label_style),
        Span::styled(format!("{} ", value), value_style),
    ])];
    if control.invalid {
        lines.push(Line::from(Span::styled(
            "    ! Bidang ini wajib/tidak valid".to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(notice) = &control.notice {
        lines.push(Line::from(Span::styled(
            format!("    {}", notice),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn draw_step(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let step = state.wizard.current_step();
    let title = state
        .wizard
        .form()
        .panel(step)
        .map(|p| format!("Langkah {}/{}: {}", step, state.wizard.total_steps(), p.title))
        .unwrap_or_else(|| "Pendaftaran".to_string());

    let mut lines: Vec<Line> = Vec::new();
    for (i, control) in state.step_controls().iter().enumerate() {
        lines.extend(control_lines(state, i, control));
        lines.push(Line::from(""));
    }

    let focused_kind = state
        .focused_control_name()
        .and_then(|n| state.wizard.form().control(&n).map(|c| c.kind));
    let hint = match focused_kind {
        Some(ControlKind::Select) => "Kiri/Kanan memilih opsi.",
        Some(ControlKind::Checkbox) => "Spasi mencentang.",
        Some(ControlKind::File) => "Ketik path berkas lalu Enter untuk memilih.",
        Some(_) => "Ketik untuk mengisi. Tab/Panah pindah bidang.",
        None => "Enter menekan tombol. Esc keluar.",
    };
    lines.push(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(Color::DarkGray),
    )));
    if state.pending.is_some() {
        lines.push(Line::from(Span::styled(
            "Mengirim pendaftaran... (Esc untuk membatalkan)".to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let p = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let idle = state.pending.is_none();
    let back_enabled = idle && state.wizard.current_step() > 1;
    let next_label = if state.wizard.is_last_step() {
        "Kirim"
    } else {
        "Lanjut"
    };

    let line = Line::from(vec![
        button_text(
            "Kembali",
            state.focus == Focus::Button(ButtonFocus::Back),
            back_enabled,
        ),
        Span::raw(" "),
        button_text(
            next_label,
            state.focus == Focus::Button(ButtonFocus::Next),
            idle,
        ),
        Span::raw(" "),
        button_text(
            "Keluar",
            state.focus == Focus::Button(ButtonFocus::Quit),
            idle,
        ),
    ]);
    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn modal_area(window_area: Rect, width: u16, height: u16) -> Rect {
    let modal_w = width.min(window_area.width.saturating_sub(4)).max(40);
    let modal_h = height.min(window_area.height.saturating_sub(4)).max(7);
    Rect {
        x: window_area.x + (window_area.width.saturating_sub(modal_w)) / 2,
        y: window_area.y + (window_area.height.saturating_sub(modal_h)) / 2,
        width: modal_w,
        height: modal_h,
    }
}

fn draw_modal_body(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    body: Text<'static>,
    buttons: Line<'static>,
) {
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let p = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
    f.render_widget(p, area);

    let buttons_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    };
    let p = Paragraph::new(Text::from(buttons)).alignment(Alignment::Right);
    f.render_widget(p, buttons_area);
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, title: &str, body: &str) {
    let area = modal_area(window_area, 70, 10);
    draw_modal_body(
        f,
        area,
        title,
        Text::from(body.to_string()),
        Line::from(button_text("OK", true, true)),
    );
}

fn draw_quit_modal(f: &mut ratatui::Frame<'_>, window_area: Rect) {
    let area = modal_area(window_area, 56, 8);
    draw_modal_body(
        f,
        area,
        "Keluar dari pendaftaran?",
        Text::from(vec![
            Line::from("Draf tersimpan setiap kali berpindah langkah."),
            Line::from("Isian yang belum disimpan akan hilang."),
        ]),
        Line::from(vec![
            button_text("Ya, keluar (Enter)", true, true),
            Span::raw(" "),
            button_text("Tidak (Esc)", false, true),
        ]),
    );
}

fn draw_confirmation_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, state: &TuiState) {
    let area = modal_area(window_area, 70, 14);
    let mut lines = vec![
        Line::from("Terima kasih, data pendaftaran telah kami terima."),
        Line::from(""),
    ];
    if let Some(summary) = &state.wizard.surface().summary {
        lines.extend(summary.lines().into_iter().map(Line::from));
    }
    draw_modal_body(
        f,
        area,
        "Pendaftaran Berhasil",
        Text::from(lines),
        Line::from(button_text("Tutup", true, true)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(state: &TuiState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f.size(), f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn press(state: &mut TuiState, codes: &[KeyCode]) {
        let (tx, _rx) = mpsc::channel();
        for code in codes {
            handle_key(state, *code, &tx);
        }
    }

    fn type_text(state: &mut TuiState, text: &str) {
        let codes: Vec<KeyCode> = text.chars().map(KeyCode::Char).collect();
        press(state, &codes);
    }

    #[test]
    fn smoke_targets_render() {
        for target in ["1", "2", "3", "confirm"] {
            smoke(target).unwrap();
        }
        assert!(smoke("nope").is_err());
    }

    #[test]
    fn step_page_shows_title_controls_and_progress() {
        let state = new_smoke_state("1").unwrap();
        let screen = render(&state);
        assert!(screen.contains("Langkah 1/3: Data Calon Santri"), "{}", screen);
        assert!(screen.contains("Nama Lengkap *: Ahmad"), "{}", screen);
        assert!(screen.contains("[ Lanjut ]"), "{}", screen);
        assert!(screen.contains("33%"), "{}", screen);
    }

    #[test]
    fn last_step_offers_submit_and_shows_file_notice() {
        let state = new_smoke_state("3").unwrap();
        let screen = render(&state);
        assert!(screen.contains("[ Kirim ]"), "{}", screen);
        assert!(screen.contains("kk.pdf"), "{}", screen);
        assert!(screen.contains("Harap unggah ulang"), "{}", screen);
    }

    #[test]
    fn confirmation_modal_lists_summary() {
        let state = new_smoke_state("confirm").unwrap();
        let screen = render(&state);
        assert!(screen.contains("Pendaftaran Berhasil"), "{}", screen);
        assert!(screen.contains("Nama Santri: Ahmad"), "{}", screen);
        assert!(screen.contains("KK: kk.pdf"), "{}", screen);
    }

    #[test]
    fn typing_edits_the_focused_control() {
        let mut state = new_smoke_state("2").unwrap();
        // Focus starts on nama_ayah ("Budi"), cursor at end.
        type_text(&mut state, " Santoso");
        press(&mut state, &[KeyCode::Home, KeyCode::Delete]);
        assert_eq!(
            state.wizard.form().control("nama_ayah").unwrap().value,
            "udi Santoso"
        );
    }

    #[test]
    fn next_button_with_missing_fields_raises_alert_modal() {
        let mut state = new_smoke_state("2").unwrap();
        state.set_focus(Focus::Button(ButtonFocus::Next));
        press(&mut state, &[KeyCode::Enter]);

        assert_eq!(state.wizard.current_step(), 2);
        assert!(matches!(state.modals.front(), Some(Modal::Message { .. })));
        assert!(render(&state).contains("Harap lengkapi"));

        press(&mut state, &[KeyCode::Enter]);
        assert!(state.modals.is_empty());
    }

    #[test]
    fn back_button_moves_to_previous_step() {
        let mut state = new_smoke_state("2").unwrap();
        state.set_focus(Focus::Button(ButtonFocus::Back));
        press(&mut state, &[KeyCode::Enter]);
        assert_eq!(state.wizard.current_step(), 1);
        assert_eq!(state.focus, Focus::Field(0));
    }

    #[test]
    fn select_and_checkbox_keys() {
        let mut state = new_smoke_state("3").unwrap();
        state.set_focus(Focus::Field(2));
        press(&mut state, &[KeyCode::Char(' ')]);
        assert!(state.wizard.form().control("persetujuan").unwrap().checked);

        let mut state = new_smoke_state("1").unwrap();
        state.set_focus(Focus::Field(4));
        press(&mut state, &[KeyCode::Right]);
        assert_eq!(state.wizard.form().control("jenis_kelamin").unwrap().value, "P");
    }

    #[test]
    fn file_path_cursor_survives_focus_round_trip() {
        let mut state = new_smoke_state("3").unwrap();
        state.set_focus(Focus::Field(1));
        type_text(&mut state, "/tmp/a");
        press(&mut state, &[KeyCode::Tab, KeyCode::BackTab]);
        assert_eq!(state.focus, Focus::Field(1));
        assert_eq!(state.cursor, 6);

        type_text(&mut state, "b");
        assert_eq!(
            state.file_paths.get("file_foto").map(String::as_str),
            Some("/tmp/ab")
        );
    }

    #[test]
    fn file_path_is_resolved_on_enter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foto.jpg");
        std::fs::write(&path, vec![1u8; 2048]).unwrap();

        let mut state = new_smoke_state("3").unwrap();
        state.set_focus(Focus::Field(1));
        type_text(&mut state, &path.to_string_lossy());
        press(&mut state, &[KeyCode::Enter]);

        let foto = state.wizard.form().control("file_foto").unwrap();
        assert_eq!(foto.file.as_ref().map(|f| f.size), Some(2048));
        assert!(foto.notice.is_none());

        state.set_focus(Focus::Field(0));
        state.file_paths.insert("file_kk".to_string(), "/definitely/missing.pdf".to_string());
        press(&mut state, &[KeyCode::Enter]);
        assert!(matches!(state.modals.front(), Some(Modal::Message { .. })));
    }

    #[test]
    fn submit_runs_on_worker_and_finishes_through_channel() {
        let mut state = new_smoke_state("3").unwrap();
        if let Some(c) = state.wizard.form_mut().control_mut("file_foto") {
            c.select_file(SelectedFile::new("foto.jpg", 10));
        }
        if let Some(c) = state.wizard.form_mut().control_mut("persetujuan") {
            c.set_checked(true);
        }
        state.set_focus(Focus::Button(ButtonFocus::Next));

        let (tx, rx) = mpsc::channel();
        handle_key(&mut state, KeyCode::Enter, &tx);
        assert!(state.pending.is_some());
        assert!(state.wizard.is_submitting());

        let msg = rx.recv_timeout(Duration::from_secs(5)).expect("worker reply");
        let UiMsg::SubmitFinished(outcome) = msg;
        assert_eq!(outcome, Ok(()));

        let (tx2, rx2) = mpsc::channel();
        tx2.send(UiMsg::SubmitFinished(outcome)).unwrap();
        drain_messages(&mut state, &rx2);
        assert!(state.pending.is_none());
        assert!(state.wizard.surface().confirmation_visible);
        assert_eq!(state.wizard.current_step(), 1);

        press(&mut state, &[KeyCode::Enter]);
        assert!(!state.wizard.surface().confirmation_visible);
    }

    #[test]
    fn esc_cancels_pending_submission() {
        let mut state = new_smoke_state("3").unwrap();
        let cancel = CancellationToken::new();
        state.pending = Some(cancel.clone());
        press(&mut state, &[KeyCode::Esc]);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn quit_prompt_requires_confirmation() {
        let mut state = new_smoke_state("1").unwrap();
        press(&mut state, &[KeyCode::Esc]);
        assert_eq!(state.modals.front(), Some(&Modal::ConfirmQuit));
        press(&mut state, &[KeyCode::Esc]);
        assert!(!state.quit);
        press(&mut state, &[KeyCode::Esc, KeyCode::Enter]);
        assert!(state.quit);
    }

    #[test]
    fn edit_text_handles_multibyte_chars() {
        let mut value = String::from("\u{100}mir");
        let mut cursor = 1;
        assert!(edit_text(&mut value, &mut cursor, KeyCode::Backspace));
        assert_eq!(value, "mir");
        assert!(edit_text(&mut value, &mut cursor, KeyCode::Char('\u{c9}')));
        assert_eq!(value, "\u{c9}mir");
        assert_eq!(cursor, 1);
        assert!(!edit_text(&mut value, &mut cursor, KeyCode::F(1)));
    }
}
