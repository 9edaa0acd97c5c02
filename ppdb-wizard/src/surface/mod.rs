// Page surfaces
//
// Everything outside the form the wizard writes to: the progress indicator, alert notices, the
// confirmation summary container and the confirmation modal. Resolved once by the front-end and
// injected into the controller.

use crate::models::payload::SubmissionSummary;

pub trait PageSurface {
    /// Progress indicator width, in percent.
    fn set_progress(&mut self, percent: f64);
    fn alert(&mut self, message: &str);
    fn render_summary(&mut self, summary: &SubmissionSummary);
    fn set_confirmation_visible(&mut self, visible: bool);
}

/// Surface that keeps the latest state and queues alerts until a front-end drains them.
#[derive(Debug, Clone, Default)]
pub struct BufferedSurface {
    pub progress: Option<f64>,
    pub alerts: Vec<String>,
    pub summary: Option<SubmissionSummary>,
    pub confirmation_visible: bool,
}

impl BufferedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}

impl PageSurface for BufferedSurface {
    fn set_progress(&mut self, percent: f64) {
        self.progress = Some(percent);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn render_summary(&mut self, summary: &SubmissionSummary) {
        self.summary = Some(summary.clone());
    }

    fn set_confirmation_visible(&mut self, visible: bool) {
        self.confirmation_visible = visible;
    }
}
