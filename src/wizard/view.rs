//! Read-only projection of a session for rendering.

use serde::Serialize;
use uuid::Uuid;

use super::controller::Questionnaire;
use super::state::{Answer, SessionState};

/// Probability shown to three decimals, e.g. `0.700`.
pub fn format_probability(probability: f64) -> String {
    format!("{probability:.3}")
}

/// Probability scaled to a 0–100 progress value (truncated).
pub fn probability_percent(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 100.0) as u8
}

/// Everything a surface needs to draw the current question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub index: usize,
    pub total: usize,
    /// "Question i / N"
    pub progress: String,
    pub progress_fraction: f64,
    pub feature: String,
    pub question: String,
    pub answer: Answer,
    pub answered: usize,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub is_last: bool,
    /// `asking`, `ready_to_submit` or `result`.
    pub phase: String,
    pub probability: Option<f64>,
    pub probability_display: Option<String>,
    pub probability_percent: Option<u8>,
}

impl WizardView {
    pub fn project(questionnaire: &Questionnaire, state: &SessionState) -> Self {
        let total = questionnaire.len();
        let feature = questionnaire.current_feature(state);
        let index = state.index.min(total - 1);
        let is_last = questionnaire.is_last(state);

        Self {
            session_id: None,
            index,
            total,
            progress: format!("Question {} / {}", index + 1, total),
            progress_fraction: (index + 1) as f64 / total as f64,
            feature: feature.clone(),
            question: questionnaire.questions().text(feature).to_string(),
            answer: state.answer(feature),
            answered: state.answered_count(),
            can_go_previous: index > 0,
            can_go_next: !is_last,
            is_last,
            phase: questionnaire.phase(state).to_string(),
            probability: state.last_probability,
            probability_display: state.last_probability.map(format_probability),
            probability_percent: state.last_probability.map(probability_percent),
        }
    }

    pub fn with_session(mut self, id: Uuid) -> Self {
        self.session_id = Some(id);
        self
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.progress);
        out.push('\n');
        out.push_str(&self.question);
        out.push('\n');
        let mark = |a: Answer| if self.answer == a { "(x)" } else { "( )" };
        out.push_str(&format!(
            "  {} Select   {} Yes   {} No\n",
            mark(Answer::Unanswered),
            mark(Answer::Yes),
            mark(Answer::No)
        ));

        let mut controls = Vec::new();
        if self.can_go_previous {
            controls.push("prev");
        }
        if self.is_last {
            controls.push("submit");
        } else {
            controls.push("next");
        }
        controls.push("restart");
        controls.push("quit");
        out.push_str(&format!("  [y/n/-]  {}\n", controls.join(" | ")));

        if let (Some(display), Some(percent)) =
            (&self.probability_display, self.probability_percent)
        {
            let filled = usize::from(percent) / 5;
            out.push_str(&format!(
                "\nPredicted probability of attending the clinic: {display}\n[{}{}] {percent}%\n",
                "#".repeat(filled),
                "-".repeat(20 - filled)
            ));
        }
        out
    }
}
