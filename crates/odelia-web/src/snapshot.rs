//! JSON snapshots of flow state for the page shell to draw from.

use serde::Serialize;

use odelia_engine::challenges::pairs::CardFace;
use odelia_engine::{
    timeline, Challenge, ChapterProgress, DatePlanFlow, DateStep, KeyValueStore, MasteryController,
    MasteryStage, Meals, Riddle, SequencePhase, ValentineFlow, View,
};

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChallengeSnapshot {
    Trace {
        waypoints: Vec<[f32; 2]>,
        reached: usize,
    },
    Sequence {
        pads: Vec<[f32; 2]>,
        phase: &'static str,
        lit: Option<u32>,
        round: u32,
        rounds: u32,
    },
    Match {
        cards: Vec<CardSnapshot>,
    },
    Catch {
        spirits: Vec<SpiritSnapshot>,
        caught: u32,
        target: u32,
    },
}

#[derive(Debug, Serialize)]
pub struct CardSnapshot {
    pub x: f32,
    pub y: f32,
    /// Symbol name when face up or matched.
    pub symbol: Option<&'static str>,
    pub matched: bool,
}

#[derive(Debug, Serialize)]
pub struct SpiritSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl ChallengeSnapshot {
    pub fn of(challenge: &Challenge) -> Self {
        match challenge {
            Challenge::Trace(t) => ChallengeSnapshot::Trace {
                waypoints: t.waypoints().iter().map(|p| p.to_array()).collect(),
                reached: t.reached(),
            },
            Challenge::Sequence(s) => ChallengeSnapshot::Sequence {
                pads: (0..s.symbol_count()).map(|i| s.pad_position(i).to_array()).collect(),
                phase: match s.phase() {
                    SequencePhase::Watching => "watching",
                    SequencePhase::Input => "input",
                    SequencePhase::Failed => "failed",
                    SequencePhase::RoundCleared => "roundCleared",
                    SequencePhase::Won => "won",
                },
                lit: s.lit_symbol(),
                round: s.round(),
                rounds: s.round_count(),
            },
            Challenge::Match(m) => ChallengeSnapshot::Match {
                cards: m
                    .deck()
                    .iter()
                    .enumerate()
                    .map(|(i, card)| {
                        let origin = m.card_origin(i);
                        CardSnapshot {
                            x: origin.x,
                            y: origin.y,
                            symbol: (card.face != CardFace::Down)
                                .then(|| m.symbol_name(i))
                                .flatten(),
                            matched: card.face == CardFace::Matched,
                        }
                    })
                    .collect(),
            },
            Challenge::Catch(c) => ChallengeSnapshot::Catch {
                spirits: c
                    .spirits()
                    .iter()
                    .map(|s| SpiritSnapshot {
                        id: s.id,
                        x: s.pos.x,
                        y: s.pos.y,
                    })
                    .collect(),
                caught: c.caught(),
                target: c.target(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterySnapshot {
    pub category: &'static str,
    pub name: &'static str,
    pub stage: &'static str,
    pub lore: &'static [&'static str],
    pub mastery_message: &'static str,
    pub challenge: Option<ChallengeSnapshot>,
}

impl MasterySnapshot {
    pub fn of(controller: &MasteryController) -> Self {
        let config = controller.config();
        Self {
            category: controller.category().as_str(),
            name: config.name,
            stage: match controller.stage() {
                MasteryStage::Intro => "intro",
                MasteryStage::Challenge => "challenge",
                MasteryStage::Success => "success",
            },
            lore: config.lore,
            mastery_message: config.mastery_message,
            challenge: controller.challenge().map(ChallengeSnapshot::of),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSnapshot {
    /// `[x, y, w, h]`
    pub yes_button: [f32; 4],
    pub no_button: [f32; 4],
    pub dodge_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ValentineSnapshot {
    pub view: &'static str,
    pub mastered: Vec<&'static str>,
    pub mastery: Option<MasterySnapshot>,
    pub question: Option<QuestionSnapshot>,
}

pub fn view_name(view: View) -> &'static str {
    match view {
        View::Hub => "hub",
        View::Mastery => "mastery",
        View::Transition => "transition",
        View::Question => "question",
        View::Complete => "complete",
    }
}

impl ValentineSnapshot {
    pub fn of<S: KeyValueStore>(flow: &ValentineFlow<S>) -> Self {
        let rect = |r: odelia_engine::Rect| [r.min.x, r.min.y, r.size.x, r.size.y];
        Self {
            view: view_name(flow.view()),
            mastered: flow.mastered().iter().map(|c| c.as_str()).collect(),
            mastery: flow.controller().map(MasterySnapshot::of),
            question: flow.question().map(|q| QuestionSnapshot {
                yes_button: rect(q.yes_button()),
                no_button: rect(q.no_button().rect()),
                dodge_count: q.no_button().dodge_count(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OptionSnapshot {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// 1-based rank when picked.
    pub rank: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePlanSnapshot {
    pub step: &'static str,
    pub can_advance: bool,
    pub options: Vec<OptionSnapshot>,
    pub restaurants: Vec<&'static str>,
    pub activities: Vec<&'static str>,
    pub meals: Option<Meals>,
}

pub fn step_name(step: DateStep) -> &'static str {
    match step {
        DateStep::Locked => "locked",
        DateStep::Restaurants => "restaurants",
        DateStep::Activities => "activities",
        DateStep::Meals => "meals",
        DateStep::Review => "review",
        DateStep::Complete => "complete",
    }
}

impl DatePlanSnapshot {
    pub fn of<S: KeyValueStore>(flow: &DatePlanFlow<S>) -> Self {
        let ranking = match flow.step() {
            DateStep::Activities => flow.activities(),
            _ => flow.restaurants(),
        };
        Self {
            step: step_name(flow.step()),
            can_advance: flow.can_advance(),
            options: flow
                .catalog()
                .iter()
                .map(|o| OptionSnapshot {
                    id: o.id,
                    title: o.title,
                    description: o.description,
                    rank: ranking.iter().position(|id| *id == o.id).map(|p| p + 1),
                })
                .collect(),
            restaurants: flow.restaurants().to_vec(),
            activities: flow.activities().to_vec(),
            meals: flow.meals().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChoiceSnapshot {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RiddleSnapshot {
    pub question: &'static str,
    pub choices: Vec<ChoiceSnapshot>,
}

impl RiddleSnapshot {
    pub fn of(riddle: &Riddle) -> Self {
        Self {
            question: riddle.question,
            choices: riddle
                .choices
                .iter()
                .map(|c| ChoiceSnapshot { id: c.id, label: c.label })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub route: &'static str,
    pub status: &'static str,
}

pub fn timeline_entries(progress: &ChapterProgress) -> Vec<TimelineEntry> {
    timeline(progress)
        .into_iter()
        .map(|(chapter, status)| TimelineEntry {
            id: chapter.id.as_str(),
            title: chapter.title,
            description: chapter.description,
            route: chapter.route,
            status: status.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use odelia_engine::{Category, FixedClock, FlowConfig, MemoryStore, ProgressStore, Rng};

    #[test]
    fn timeline_reports_lock_state() {
        let json = serde_json::to_value(timeline_entries(&ChapterProgress::default())).unwrap();
        assert_eq!(json[0]["id"], "valentine");
        assert_eq!(json[0]["status"], "available");
        assert_eq!(json[1]["route"], "/date-plan");
        assert_eq!(json[1]["status"], "locked");
    }

    #[test]
    fn riddle_lists_its_choices() {
        let story = odelia_engine::StoryIntro::default();
        let riddle = Category::Fire.config().riddle.as_ref().unwrap();
        let json = serde_json::to_value(RiddleSnapshot::of(riddle)).unwrap();
        assert_eq!(json["question"], riddle.question);
        assert!(json["choices"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["id"] == "courage"));
        assert!(story.riddle().is_some());
    }

    #[test]
    fn hidden_cards_keep_their_symbol_secret() {
        let mut controller = MasteryController::new(Category::Earth);
        controller.begin(Box::new(Rng::new(3)));
        let snapshot = MasterySnapshot::of(&controller);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["stage"], "challenge");
        assert_eq!(json["challenge"]["kind"], "match");
        let cards = json["challenge"]["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 6);
        assert!(cards.iter().all(|c| c["symbol"].is_null()));
    }

    #[test]
    fn valentine_snapshot_starts_on_hub() {
        let clock = Arc::new(FixedClock::from_millis(0));
        let flow = ValentineFlow::new(
            FlowConfig::default(),
            ProgressStore::new(MemoryStore::new(), clock.clone()),
            clock,
        );
        let json = serde_json::to_value(ValentineSnapshot::of(&flow)).unwrap();
        assert_eq!(json["view"], "hub");
        assert_eq!(json["mastered"].as_array().map(Vec::len), Some(0));
        assert!(json["mastery"].is_null());
    }
}
