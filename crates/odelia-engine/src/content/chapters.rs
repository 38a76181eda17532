use serde::{Deserialize, Serialize};

/// Identifier of a top-level chapter of the experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChapterId {
    #[serde(rename = "valentine")]
    Valentine,
    #[serde(rename = "datePlan")]
    DatePlan,
}

impl ChapterId {
    pub fn as_str(self) -> &'static str {
        match self {
            ChapterId::Valentine => "valentine",
            ChapterId::DatePlan => "datePlan",
        }
    }

    pub fn parse(s: &str) -> Option<ChapterId> {
        CHAPTERS.iter().map(|c| c.id).find(|id| id.as_str() == s)
    }

    pub fn chapter(self) -> &'static Chapter {
        match self {
            ChapterId::Valentine => &CHAPTERS[0],
            ChapterId::DatePlan => &CHAPTERS[1],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: &'static str,
    pub description: &'static str,
    /// Page the timeline navigates to.
    pub route: &'static str,
    /// Chapter that must be completed before this one unlocks.
    pub prerequisite: Option<ChapterId>,
}

/// Static chapter list in timeline order.
pub const CHAPTERS: &[Chapter] = &[
    Chapter {
        id: ChapterId::Valentine,
        title: "Valentine's Game",
        description: "Master the four elements and answer the ultimate question",
        route: "/valentine",
        prerequisite: None,
    },
    Chapter {
        id: ChapterId::DatePlan,
        title: "Date Plan",
        description: "Choose our perfect date together",
        route: "/date-plan",
        prerequisite: Some(ChapterId::Valentine),
    },
];
