//! Wizard transitions: select, next, previous, submit, restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::state::{Answer, SessionState, WizardAction, WizardPhase};
use crate::error::{ArtifactError, ValidationError, WizardError};
use crate::model::{positive_probability, Classifier};
use crate::schema::{reconcile, FeatureId, QuestionBook};

/// Read-only questionnaire definition shared by every session.
pub struct Questionnaire {
    train_order: Vec<FeatureId>,
    display_order: Vec<FeatureId>,
    questions: QuestionBook,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Questionnaire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Questionnaire")
            .field("train_order", &self.train_order)
            .field("display_order", &self.display_order)
            .finish_non_exhaustive()
    }
}

impl Questionnaire {
    /// Build from a preferred display order and the authoritative training order.
    pub fn new<P: AsRef<str>>(
        preferred: &[P],
        train_order: Vec<FeatureId>,
        questions: QuestionBook,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        let display_order = reconcile(preferred, &train_order);
        Self::from_parts(train_order, display_order, questions, classifier)
    }

    /// Build from already-resolved orders without reconciling them.
    ///
    /// The two orders are not required to agree; a disagreement surfaces as a
    /// schema mismatch at submit time.
    pub fn from_parts(
        train_order: Vec<FeatureId>,
        display_order: Vec<FeatureId>,
        questions: QuestionBook,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if display_order.is_empty() {
            return Err(ArtifactError::Invalid("questionnaire has no features".into()));
        }
        Ok(Self {
            train_order,
            display_order,
            questions,
            classifier,
        })
    }

    pub fn train_order(&self) -> &[FeatureId] {
        &self.train_order
    }

    pub fn display_order(&self) -> &[FeatureId] {
        &self.display_order
    }

    pub fn questions(&self) -> &QuestionBook {
        &self.questions
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.display_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_order.is_empty()
    }

    /// Initial session state.
    pub fn start(&self) -> SessionState {
        SessionState::new(&self.display_order)
    }

    /// Feature shown at the state's current index.
    pub fn current_feature<'a>(&'a self, state: &SessionState) -> &'a FeatureId {
        &self.display_order[self.clamp(state.index)]
    }

    pub fn is_last(&self, state: &SessionState) -> bool {
        state.index + 1 >= self.len()
    }

    /// Coarse phase for display.
    pub fn phase(&self, state: &SessionState) -> WizardPhase {
        if state.last_probability.is_some() {
            WizardPhase::Result
        } else if self.is_last(state) && self.unanswered(state).is_empty() {
            WizardPhase::ReadyToSubmit
        } else {
            WizardPhase::Asking {
                index: state.index,
            }
        }
    }

    /// Apply one action. On error the caller keeps its current state.
    pub fn apply(
        &self,
        state: &SessionState,
        action: &WizardAction,
    ) -> Result<SessionState, WizardError> {
        match action {
            WizardAction::SelectAnswer { feature, answer } => {
                self.select_answer(state, feature, *answer)
            }
            WizardAction::Next => self.next(state),
            WizardAction::Previous => self.previous(state),
            WizardAction::Submit => self.submit(state),
            WizardAction::Restart => Ok(self.restart(state)),
        }
    }

    /// Record an answer for the current question. No validation; `Unanswered`
    /// clears it again.
    pub fn select_answer(
        &self,
        state: &SessionState,
        feature: &str,
        answer: Answer,
    ) -> Result<SessionState, WizardError> {
        let expected = self.current_feature(state);
        if expected != feature {
            return Err(WizardError::WrongQuestion {
                expected: expected.clone(),
                got: feature.to_string(),
            });
        }

        let mut next = state.clone();
        next.answers.insert(expected.clone(), answer);
        debug!(feature = %expected, %answer, "Answer selected");
        Ok(next)
    }

    /// Advance one question. The current question must be answered.
    pub fn next(&self, state: &SessionState) -> Result<SessionState, WizardError> {
        if self.is_last(state) {
            return Err(self.not_available("next", state));
        }

        let feature = self.current_feature(state);
        if !state.answer(feature).is_answered() {
            return Err(ValidationError::Unanswered {
                feature: feature.clone(),
            }
            .into());
        }

        let mut next = state.clone();
        next.index += 1;
        Ok(next)
    }

    /// Go back one question. Never validates.
    pub fn previous(&self, state: &SessionState) -> Result<SessionState, WizardError> {
        if state.index == 0 {
            return Err(self.not_available("previous", state));
        }
        let mut next = state.clone();
        next.index -= 1;
        Ok(next)
    }

    /// Score the completed questionnaire. Only available on the last
    /// question, and only when every question is answered.
    pub fn submit(&self, state: &SessionState) -> Result<SessionState, WizardError> {
        if !self.is_last(state) {
            return Err(self.not_available("submit", state));
        }

        let unanswered = self.unanswered(state);
        if !unanswered.is_empty() {
            return Err(ValidationError::Incomplete { unanswered }.into());
        }

        let row: Vec<(&str, f64)> = self
            .display_order
            .iter()
            .map(|f| (f.as_str(), state.answer(f).value().unwrap_or_default()))
            .collect();
        let vector = self.reindex(&row)?;

        let probability = positive_probability(self.classifier.as_ref(), &vector)?;
        info!(probability, features = vector.len(), "Questionnaire scored");

        let mut next = state.clone();
        next.last_probability = Some(probability);
        Ok(next)
    }

    /// Back to the first question with every answer cleared.
    pub fn restart(&self, state: &SessionState) -> SessionState {
        let mut next = state.clone();
        next.reset();
        next
    }

    /// Reorder `(feature, value)` pairs into the training order.
    ///
    /// Every training feature must be present and nothing else may be.
    pub fn reindex(&self, row: &[(&str, f64)]) -> Result<Vec<f64>, WizardError> {
        let values: HashMap<&str, f64> = row.iter().copied().collect();
        let expected: HashSet<&str> = self.train_order.iter().map(String::as_str).collect();

        let missing: Vec<String> = self
            .train_order
            .iter()
            .filter(|f| !values.contains_key(f.as_str()))
            .cloned()
            .collect();
        let unexpected: Vec<String> = row
            .iter()
            .map(|(f, _)| *f)
            .filter(|f| !expected.contains(f))
            .map(String::from)
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            warn!(?missing, ?unexpected, "Feature mismatch with the trained model");
            return Err(WizardError::SchemaMismatch {
                missing,
                unexpected,
            });
        }

        Ok(self
            .train_order
            .iter()
            .map(|f| values[f.as_str()])
            .collect())
    }

    fn unanswered(&self, state: &SessionState) -> Vec<FeatureId> {
        self.display_order
            .iter()
            .filter(|f| !state.answer(f).is_answered())
            .cloned()
            .collect()
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.len() - 1)
    }

    fn not_available(&self, action: &str, state: &SessionState) -> WizardError {
        WizardError::NotAvailable {
            action: action.to_string(),
            index: state.index,
            total: self.len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::InferenceError;

    /// Stub model returning fixed probabilities and recording its inputs.
    pub(crate) struct StubClassifier {
        proba: [f64; 2],
        pub calls: Mutex<Vec<Vec<f64>>>,
    }

    impl StubClassifier {
        pub(crate) fn new(proba: [f64; 2]) -> Arc<Self> {
            Arc::new(Self {
                proba,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Classifier for StubClassifier {
        fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
            self.calls.lock().unwrap().push(features.to_vec());
            Ok(self.proba)
        }
    }

    fn ids(items: &[&str]) -> Vec<FeatureId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) fn abc(model: Arc<StubClassifier>) -> Questionnaire {
        Questionnaire::new(
            &["A", "B", "C"],
            ids(&["A", "B", "C"]),
            QuestionBook::new([("A", "Is it A?"), ("B", "Is it B?"), ("C", "Is it C?")]),
            model,
        )
        .unwrap()
    }

    fn select(q: &Questionnaire, s: &SessionState, f: &str, a: Answer) -> SessionState {
        q.select_answer(s, f, a).unwrap()
    }

    fn answer_all(q: &Questionnaire, answers: &[Answer]) -> SessionState {
        let mut state = q.start();
        for (i, answer) in answers.iter().enumerate() {
            let feature = q.display_order()[i].clone();
            state = select(q, &state, &feature, *answer);
            if i + 1 < answers.len() {
                state = q.next(&state).unwrap();
            }
        }
        state
    }

    #[test]
    fn starts_on_first_question() {
        let q = abc(StubClassifier::new([0.5, 0.5]));
        let state = q.start();
        assert_eq!(state.index, 0);
        assert_eq!(q.current_feature(&state), "A");
        assert_eq!(q.phase(&state), WizardPhase::Asking { index: 0 });
    }

    #[test]
    fn next_after_answering_advances() {
        let q = abc(StubClassifier::new([0.5, 0.5]));
        let state = select(&q, &q.start(), "A", Answer::Yes);

        // B is not the current question, so its answer is rejected.
        let err = q.select_answer(&state, "B", Answer::No).unwrap_err();
        assert!(matches!(err, WizardError::WrongQuestion { .. }));

        let state = q.next(&state).unwrap();
        assert_eq!(state.index, 1);
        assert_eq!(state.answer("A"), Answer::Yes);
        assert_eq!(state.answer("B"), Answer::Unanswered);
        assert_eq!(state.answer("C"), Answer::Unanswered);
    }

    #[test]
    fn next_without_answer_is_rejected() {
        let q = abc(StubClassifier::new([0.5, 0.5]));
        let state = q.start();
        let err = q.next(&state).unwrap_err();
        assert!(err.is_warning());
        assert_eq!(
            err,
            WizardError::Validation(ValidationError::Unanswered {
                feature: "A".into()
            })
        );
        assert_eq!(err.to_string(), "Please select Yes or No before continuing.");
    }

    #[test]
    fn clearing_an_answer_blocks_next_again() {
        let q = abc(StubClassifier::new([0.5, 0.5]));
        let state = select(&q, &q.start(), "A", Answer::No);
        let state = select(&q, &state, "A", Answer::Unanswered);
        assert!(q.next(&state).unwrap_err().is_warning());
    }

    #[test]
    fn next_is_unavailable_on_last_question() {
        let q = abc(StubClassifier::new([0.5, 0.5]));
        let state = answer_all(&q, &[Answer::Yes, Answer::Yes, Answer::Yes]);
        assert!(matches!(
            q.next(&state),
            Err(WizardError::NotAvailable { .. })
        ));
    }

    #[test]
    fn previous_does_not_validate() {
        let q = abc(StubClassifier::new([0.5, 0.5]));
        let state = select(&q, &q.start(), "A", Answer::Yes);
        let state = q.next(&state).unwrap();
        assert_eq!(state.answer("B"), Answer::Unanswered);

        let back = q.previous(&state).unwrap();
        assert_eq!(back.index, 0);
        assert_eq!(back.answer("A"), Answer::Yes);

        assert!(matches!(
            q.previous(&back),
            Err(WizardError::NotAvailable { .. })
        ));
    }

    #[test]
    fn submit_requires_last_question() {
        let model = StubClassifier::new([0.3, 0.7]);
        let q = abc(model.clone());
        let state = select(&q, &q.start(), "A", Answer::Yes);
        assert!(matches!(
            q.submit(&state),
            Err(WizardError::NotAvailable { .. })
        ));
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn submit_with_gap_is_rejected() {
        let model = StubClassifier::new([0.3, 0.7]);
        let q = abc(model.clone());
        let state = answer_all(&q, &[Answer::Yes, Answer::No, Answer::Yes]);
        // Walk back and clear B, then return to the end.
        let state = q.previous(&state).unwrap();
        let state = select(&q, &state, "B", Answer::Unanswered);
        let mut state = state;
        state.index = 2;

        let err = q.submit(&state).unwrap_err();
        assert!(err.is_warning());
        assert_eq!(
            err,
            WizardError::Validation(ValidationError::Incomplete {
                unanswered: vec!["B".into()]
            })
        );
        assert_eq!(err.to_string(), "Please answer all questions first.");
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn submit_scores_positive_class() {
        let model = StubClassifier::new([0.3, 0.7]);
        let q = abc(model.clone());
        let state = answer_all(&q, &[Answer::Yes, Answer::No, Answer::Yes]);
        assert_eq!(q.phase(&state), WizardPhase::ReadyToSubmit);

        let scored = q.submit(&state).unwrap();
        assert_eq!(scored.last_probability, Some(0.7));
        assert_eq!(scored.index, 2);
        assert_eq!(q.phase(&scored), WizardPhase::Result);
        assert_eq!(*model.calls.lock().unwrap(), vec![vec![1.0, 0.0, 1.0]]);
    }

    #[test]
    fn submit_reorders_into_training_order() {
        let model = StubClassifier::new([0.1, 0.9]);
        let q = Questionnaire::new(
            &["C", "A"],
            ids(&["A", "B", "C"]),
            QuestionBook::default(),
            model.clone(),
        )
        .unwrap();
        assert_eq!(q.display_order(), ids(&["C", "A", "B"]));

        // C = Yes, A = No, B = Yes
        let state = answer_all(&q, &[Answer::Yes, Answer::No, Answer::Yes]);
        q.submit(&state).unwrap();
        assert_eq!(*model.calls.lock().unwrap(), vec![vec![0.0, 1.0, 1.0]]);
    }

    #[test]
    fn schema_mismatch_blocks_model() {
        let model = StubClassifier::new([0.3, 0.7]);
        let q = Questionnaire::from_parts(
            ids(&["A", "B", "D"]),
            ids(&["A", "B", "C"]),
            QuestionBook::default(),
            model.clone(),
        )
        .unwrap();
        let state = answer_all(&q, &[Answer::Yes, Answer::Yes, Answer::No]);

        let err = q.submit(&state).unwrap_err();
        assert!(!err.is_warning());
        assert_eq!(
            err,
            WizardError::SchemaMismatch {
                missing: vec!["D".into()],
                unexpected: vec!["C".into()],
            }
        );
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn restart_resets_from_any_state() {
        let q = abc(StubClassifier::new([0.3, 0.7]));
        let state = answer_all(&q, &[Answer::Yes, Answer::No, Answer::Yes]);
        let scored = q.submit(&state).unwrap();

        for s in [q.start(), state, scored] {
            let fresh = q.apply(&s, &WizardAction::Restart).unwrap();
            assert_eq!(fresh, q.start());
            assert_eq!(fresh.index, 0);
            assert!(fresh.last_probability.is_none());
            assert_eq!(fresh.answered_count(), 0);
        }
    }

    #[test]
    fn apply_dispatches_actions() {
        let q = abc(StubClassifier::new([0.3, 0.7]));
        let state = q
            .apply(
                &q.start(),
                &WizardAction::SelectAnswer {
                    feature: "A".into(),
                    answer: Answer::Yes,
                },
            )
            .unwrap();
        let state = q.apply(&state, &WizardAction::Next).unwrap();
        assert_eq!(state.index, 1);
        let state = q.apply(&state, &WizardAction::Previous).unwrap();
        assert_eq!(state.index, 0);
    }

    #[test]
    fn empty_questionnaire_is_rejected() {
        let err = Questionnaire::from_parts(
            vec![],
            vec![],
            QuestionBook::default(),
            StubClassifier::new([0.5, 0.5]),
        )
        .unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }
}
