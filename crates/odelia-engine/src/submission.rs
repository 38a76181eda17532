//! Payloads handed to the response and date-selection endpoints, plus the
//! `{success, message}` envelope both sides speak.
//!
//! Requests are deserialized loosely (every field optional) and then
//! validated, so a bad body becomes a `ValidationError` with the exact
//! message the page shows rather than a serde error.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::Answer;
use crate::core::rng::RandomSource;

pub const RESPONSE_ENDPOINT: &str = "/api/response";
pub const DATE_SELECTION_ENDPOINT: &str = "/api/date-selection";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid answer. Must be \"yes\" or \"no\".")]
    InvalidAnswer,
    #[error("Invalid request. Restaurants and activities are required.")]
    MissingRankings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dodge_count: Option<u32>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_decide: Option<u64>,
}

/// A decision body as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<DecisionMetadata>,
}

impl DecisionRequest {
    pub fn validate(self) -> Result<DecisionSubmission, ValidationError> {
        let answer = self
            .answer
            .as_deref()
            .and_then(|a| a.parse::<Answer>().ok())
            .ok_or(ValidationError::InvalidAnswer)?;
        Ok(DecisionSubmission {
            answer,
            session_id: self.session_id.filter(|s| !s.is_empty()),
            metadata: self.metadata,
        })
    }
}

/// A validated yes/no decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSubmission {
    pub answer: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DecisionMetadata>,
}

/// Free-text meals for a stay-at-home date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub dinner: String,
}

impl Meals {
    pub fn is_blank(&self) -> bool {
        [&self.breakfast, &self.lunch, &self.dinner]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

/// A date-selection body as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateSelectionRequest {
    #[serde(default)]
    pub restaurants: Option<Vec<String>>,
    #[serde(default)]
    pub activities: Option<Vec<String>>,
    #[serde(default)]
    pub meals: Option<Meals>,
}

impl DateSelectionRequest {
    pub fn validate(self) -> Result<DateSelectionSubmission, ValidationError> {
        match (self.restaurants, self.activities) {
            (Some(restaurants), Some(activities))
                if !restaurants.is_empty() && !activities.is_empty() =>
            {
                Ok(DateSelectionSubmission {
                    restaurants,
                    activities,
                    meals: self.meals.filter(|m| !m.is_blank()),
                })
            }
            _ => Err(ValidationError::MissingRankings),
        }
    }
}

/// Validated rankings, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSelectionSubmission {
    pub restaurants: Vec<String>,
    pub activities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals: Option<Meals>,
}

impl DateSelectionSubmission {
    pub fn top_restaurant(&self) -> &str {
        self.restaurants.first().map_or("", String::as_str)
    }

    pub fn top_activity(&self) -> &str {
        self.activities.first().map_or("", String::as_str)
    }
}

/// Reply envelope for every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<i64>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            response_id: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            response_id: None,
        }
    }

    pub fn with_response_id(mut self, id: i64) -> Self {
        self.response_id = Some(id);
        self
    }
}

/// Something the shell should POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Decision(DecisionSubmission),
    DateSelection(DateSelectionSubmission),
}

impl Submission {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Submission::Decision(_) => RESPONSE_ENDPOINT,
            Submission::DateSelection(_) => DATE_SELECTION_ENDPOINT,
        }
    }

    pub fn body_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Submission::Decision(d) => serde_json::to_string(d),
            Submission::DateSelection(d) => serde_json::to_string(d),
        }
    }
}

/// Submissions waiting for delivery. Delivery is fire-and-forget: nothing
/// waits on it and nothing is retried.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<Submission>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, submission: Submission) {
        self.queue.push_back(submission);
    }

    pub fn pop(&mut self) -> Option<Submission> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `"{unix_millis}-{7 base36 chars}"`.
pub fn generate_session_id(now_millis: i64, rng: &mut dyn RandomSource) -> String {
    let suffix: String = (0..7)
        .map(|_| BASE36[rng.next_int(36) as usize] as char)
        .collect();
    format!("{now_millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedRng;

    #[test]
    fn decision_requires_yes_or_no() {
        let missing: DecisionRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.validate(), Err(ValidationError::InvalidAnswer));

        let maybe: DecisionRequest = serde_json::from_str(r#"{"answer":"maybe"}"#).unwrap();
        assert_eq!(maybe.validate(), Err(ValidationError::InvalidAnswer));

        let yes: DecisionRequest = serde_json::from_str(
            r#"{"answer":"yes","sessionId":"s1","metadata":{"dodgeCount":3,"timeToDecide":4200}}"#,
        )
        .unwrap();
        let d = yes.validate().unwrap();
        assert_eq!(d.answer, Answer::Yes);
        assert_eq!(d.session_id.as_deref(), Some("s1"));
        assert_eq!(d.metadata.unwrap().dodge_count, Some(3));
    }

    #[test]
    fn validation_message_matches_page_copy() {
        assert_eq!(
            ValidationError::InvalidAnswer.to_string(),
            "Invalid answer. Must be \"yes\" or \"no\"."
        );
    }

    #[test]
    fn date_selection_needs_both_rankings() {
        let empty: DateSelectionRequest =
            serde_json::from_str(r#"{"restaurants":[],"activities":["picnic"]}"#).unwrap();
        assert_eq!(empty.validate(), Err(ValidationError::MissingRankings));

        let ok: DateSelectionRequest = serde_json::from_str(
            r#"{"restaurants":["sushi"],"activities":["picnic","movie"],"meals":{"breakfast":"","lunch":" ","dinner":""}}"#,
        )
        .unwrap();
        let s = ok.validate().unwrap();
        assert_eq!(s.top_restaurant(), "sushi");
        assert_eq!(s.top_activity(), "picnic");
        assert_eq!(s.meals, None);
    }

    #[test]
    fn decision_body_is_camel_case() {
        let s = Submission::Decision(DecisionSubmission {
            answer: Answer::Yes,
            session_id: None,
            metadata: Some(DecisionMetadata {
                dodge_count: Some(2),
                time_to_decide: Some(1500),
            }),
        });
        assert_eq!(s.endpoint(), "/api/response");
        assert_eq!(
            s.body_json().unwrap(),
            r#"{"answer":"yes","metadata":{"dodgeCount":2,"timeToDecide":1500}}"#
        );
    }

    #[test]
    fn envelope_omits_missing_response_id() {
        let json = serde_json::to_string(&Envelope::fail("nope")).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"nope"}"#);
        let json = serde_json::to_string(&Envelope::ok("saved").with_response_id(7)).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"saved","responseId":7}"#);
    }

    #[test]
    fn outbox_is_fifo() {
        let mut outbox = Outbox::new();
        let d = |a| {
            Submission::Decision(DecisionSubmission {
                answer: a,
                session_id: None,
                metadata: None,
            })
        };
        outbox.push(d(Answer::Yes));
        outbox.push(d(Answer::No));
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.pop(), Some(d(Answer::Yes)));
        assert_eq!(outbox.pop(), Some(d(Answer::No)));
        assert!(outbox.is_empty());
    }

    #[test]
    fn session_id_shape() {
        let mut rng = ScriptedRng::new(vec![0, 10, 35]);
        let id = generate_session_id(1_771_093_800_000, &mut rng);
        assert_eq!(id, "1771093800000-0az0az0");
    }
}
