//! Wizard session state and the actions that drive it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::FeatureId;

/// Tri-state answer to a Yes/No question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    #[default]
    Unanswered,
    Yes,
    No,
}

impl Answer {
    /// Model encoding: Yes = 1.0, No = 0.0.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Unanswered => None,
            Self::Yes => Some(1.0),
            Self::No => Some(0.0),
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unanswered => write!(f, "unanswered"),
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
        }
    }
}

impl std::str::FromStr for Answer {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Self::Yes),
            "n" | "no" => Ok(Self::No),
            "-" | "" | "clear" | "unanswered" => Ok(Self::Unanswered),
            other => Err(format!("Unknown answer: {other}")),
        }
    }
}

/// User actions accepted by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction {
    SelectAnswer { feature: FeatureId, answer: Answer },
    Next,
    Previous,
    Submit,
    Restart,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectAnswer { .. } => "select_answer",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Submit => "submit",
            Self::Restart => "restart",
        }
    }
}

/// Coarse position in the wizard, derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    /// Showing question `index` (not the last one, or the last one unanswered).
    Asking { index: usize },
    /// On the last question with every answer filled in.
    ReadyToSubmit,
    /// A probability has been computed.
    Result,
}

impl std::fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asking { .. } => write!(f, "asking"),
            Self::ReadyToSubmit => write!(f, "ready_to_submit"),
            Self::Result => write!(f, "result"),
        }
    }
}

/// Per-session wizard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Index into the display order.
    pub index: usize,
    /// Answer per feature.
    pub answers: HashMap<FeatureId, Answer>,
    /// Positive-class probability from the last successful submit.
    pub last_probability: Option<f64>,
}

impl SessionState {
    /// Fresh state: first question, nothing answered, no result.
    pub fn new<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureId>,
    {
        Self {
            index: 0,
            answers: features
                .into_iter()
                .map(|f| (f.clone(), Answer::Unanswered))
                .collect(),
            last_probability: None,
        }
    }

    pub fn answer(&self, feature: &str) -> Answer {
        self.answers.get(feature).copied().unwrap_or_default()
    }

    /// Number of features with a Yes/No answer.
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| a.is_answered()).count()
    }

    /// Reset in place to the initial values, keeping the feature set.
    pub fn reset(&mut self) {
        self.index = 0;
        self.last_probability = None;
        for answer in self.answers.values_mut() {
            *answer = Answer::Unanswered;
        }
    }
}
