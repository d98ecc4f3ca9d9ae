//! Survey items: the preferred display order and the Yes/No wording for each
//! feature.

use std::collections::HashMap;

use super::FeatureId;

/// Preferred order in which survey items are asked.
pub const DEFAULT_DISPLAY_ORDER: &[&str] = &[
    "C2_HLMC_heard_1.0",
    "C1_HLM_heard_4.0",
    "B19_SupportHSLS_4.0",
    "B19_SupportHSLS_5.0",
    "B18_SupportHS_5.0",
    "C5_HLMC_whyinterest_Toimprovemyhealthandwellbeing",
    "C5_HLMC_whyinterest_Toaddressaspecificmedicalconcern",
    "C6_HLMC_intervention_Dietaryadvice",
    "C6_HLMC_intervention_Supplements",
    "C6_HLMC_intervention_Mentalhealthinterventions",
    "C8_HLMC_drug_4.0",
    "C7_HLMC_supplements_5.0",
    "C4_HLMC_barrier_Ithinkthecostwouldbetoohigh",
    "C4_HLMC_barrier_Iworrythatthewaitinglistwouldbetoolong",
    "C4_HLMC_barrier_Idon'tseethemasahighpriority",
    "C4_HLMC_barrier_Idon'thaveenoughinformationaboutthem",
    "D5_Health_pay_1.0",
    "C15_Patience_5.0",
    "D9_Aspirations_5_3.0",
];

const DEFAULT_QUESTIONS: &[(&str, &str)] = &[
    (
        "C2_HLMC_heard_1.0",
        "Have you heard of HLMC (Healthy Longevity Medicine Clinic)?",
    ),
    (
        "C1_HLM_heard_4.0",
        "Do you believe Healthy Longevity Medicine is very effective?",
    ),
    (
        "B19_SupportHSLS_4.0",
        "Are you likely to support extending both healthspan and lifespan?",
    ),
    (
        "B19_SupportHSLS_5.0",
        "Do you definitely support extending both healthspan and lifespan?",
    ),
    (
        "B18_SupportHS_5.0",
        "Do you support interventions that extend healthspan but not lifespan?",
    ),
    (
        "C5_HLMC_whyinterest_Toimprovemyhealthandwellbeing",
        "Is this a reason for your HLMC interest: to improve your health and wellbeing?",
    ),
    (
        "C5_HLMC_whyinterest_Toaddressaspecificmedicalconcern",
        "Is this a reason for your HLMC interest: to address a specific medical concern?",
    ),
    (
        "C6_HLMC_intervention_Dietaryadvice",
        "Would you want HLMC to provide dietary advice?",
    ),
    (
        "C6_HLMC_intervention_Supplements",
        "Would you want HLMC to provide supplement-based interventions?",
    ),
    (
        "C6_HLMC_intervention_Mentalhealthinterventions",
        "Would you want HLMC to provide mental-health interventions?",
    ),
    (
        "C8_HLMC_drug_4.0",
        "Are you somewhat comfortable with taking prescription medication as an HLMC intervention?",
    ),
    (
        "C7_HLMC_supplements_5.0",
        "Are you extremely comfortable with taking supplements as an HLMC intervention?",
    ),
    (
        "C4_HLMC_barrier_Ithinkthecostwouldbetoohigh",
        "Is this a barrier for you: the cost would be too high?",
    ),
    (
        "C4_HLMC_barrier_Iworrythatthewaitinglistwouldbetoolong",
        "Is this a barrier for you: worrying that the waiting list would be too long?",
    ),
    (
        "C4_HLMC_barrier_Idon'tseethemasahighpriority",
        "Is this a barrier for you: you do not see HLMC as a high priority?",
    ),
    (
        "C4_HLMC_barrier_Idon'thaveenoughinformationaboutthem",
        "Is this a barrier for you: not having enough information about them?",
    ),
    (
        "D5_Health_pay_1.0",
        "Do you pay out-of-pocket for health services?",
    ),
    (
        "C15_Patience_5.0",
        "Are you definitely willing to give up short-term benefits for greater future gains?",
    ),
    (
        "D9_Aspirations_5_3.0",
        "Do you strongly agree with the aspiration to keep yourself healthy and well?",
    ),
];

/// Read-only lookup from feature id to question text.
#[derive(Debug, Clone, Default)]
pub struct QuestionBook {
    texts: HashMap<FeatureId, String>,
}

impl QuestionBook {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FeatureId>,
        V: Into<String>,
    {
        Self {
            texts: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The built-in HLMC survey wording.
    pub fn hlmc() -> Self {
        Self::new(DEFAULT_QUESTIONS.iter().copied())
    }

    /// Question text for `feature`, or the raw id when there is none.
    pub fn text<'a>(&'a self, feature: &'a str) -> &'a str {
        self.texts.get(feature).map(String::as_str).unwrap_or(feature)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
