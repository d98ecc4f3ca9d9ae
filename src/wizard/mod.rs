//! Questionnaire wizard — a linear, one-question-at-a-time state machine.
//!
//! `Questionnaire` holds the read-only pieces resolved at startup (training
//! order, display order, question wording, classifier). `SessionState` is the
//! caller-owned mutable part; every transition takes the current state and
//! returns the next one.

pub mod controller;
pub mod state;
pub mod view;

pub use controller::Questionnaire;
pub use state::{Answer, SessionState, WizardAction, WizardPhase};
pub use view::{format_probability, probability_percent, WizardView};
