//! The four elements: names, lore, riddles and which challenge masters each.
//!
//! Immutable configuration. Nothing here changes at runtime.

use serde::{Deserialize, Serialize};

use crate::challenges::ChallengeKind;

/// One of the four thematic content groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Water,
    Fire,
    Earth,
    Air,
}

impl Category {
    /// Fixed display order.
    pub const ALL: [Category; 4] = [Category::Water, Category::Fire, Category::Earth, Category::Air];

    pub fn from_index(index: usize) -> Option<Category> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Water => "water",
            Category::Fire => "fire",
            Category::Earth => "earth",
            Category::Air => "air",
        }
    }

    pub fn config(self) -> &'static CategoryConfig {
        match self {
            Category::Water => &WATER,
            Category::Fire => &FIRE,
            Category::Earth => &EARTH,
            Category::Air => &AIR,
        }
    }
}

/// A riddle answer with the lines revealed after choosing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: &'static str,
    pub label: &'static str,
    pub reflection: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Riddle {
    pub question: &'static str,
    pub choices: &'static [Choice],
}

impl Riddle {
    pub fn choice(&self, id: &str) -> Option<&'static Choice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

#[derive(Debug)]
pub struct CategoryConfig {
    pub name: &'static str,
    /// Revealed line by line on the intro screen. Empty strings are spacers.
    pub lore: &'static [&'static str],
    pub riddle: Option<Riddle>,
    /// Shown on the success screen.
    pub mastery_message: &'static str,
    pub challenge: ChallengeKind,
}

static WATER: CategoryConfig = CategoryConfig {
    name: "Water",
    lore: &[
        "Water is the element of change.",
        "",
        "The people of the Water Tribes",
        "are capable of adapting to many things.",
        "",
        "They have a sense of community and love",
        "that holds them together through anything.",
    ],
    riddle: Some(Riddle {
        question: "What virtue does water teach us above all?",
        choices: &[
            Choice {
                id: "adaptability",
                label: "Adaptability",
                reflection: &[
                    "Yes, water flows around all obstacles.",
                    "",
                    "Like water, love adapts and finds its way.",
                    "It changes form but never loses its essence.",
                    "It nourishes all it touches.",
                ],
            },
            Choice {
                id: "strength",
                label: "Strength",
                reflection: &[
                    "Water's strength is undeniable.",
                    "",
                    "But its greatest power comes from yielding.",
                    "The softest water carves the hardest stone,",
                    "not through force, but through persistence and time.",
                ],
            },
            Choice {
                id: "healing",
                label: "Healing",
                reflection: &[
                    "Indeed, water restores what is broken.",
                    "",
                    "Love, like water, has the power to heal.",
                    "It washes away pain, renews hope,",
                    "and brings life to the barren places of the heart.",
                ],
            },
        ],
    }),
    mastery_message: "Like water, you flow with grace and adaptability.",
    challenge: ChallengeKind::Trace,
};

static FIRE: CategoryConfig = CategoryConfig {
    name: "Fire",
    lore: &[
        "Fire is the element of power.",
        "",
        "The people of the Fire Nation",
        "have desire and will,",
        "",
        "and the energy and drive",
        "to achieve what they want.",
    ],
    riddle: Some(Riddle {
        question: "What gift does fire offer to those brave enough to embrace it?",
        choices: &[
            Choice {
                id: "passion",
                label: "Passion",
                reflection: &[
                    "Yes, fire ignites the soul with purpose.",
                    "",
                    "True passion burns eternal, driving us forward.",
                    "It transforms ordinary moments into memories",
                    "that warm us long after the flame has dimmed.",
                ],
            },
            Choice {
                id: "courage",
                label: "Courage",
                reflection: &[
                    "Fire demands courage to wield.",
                    "",
                    "To love is to risk being burned,",
                    "yet the brave embrace the flame regardless.",
                    "For without risk, there can be no warmth.",
                ],
            },
            Choice {
                id: "transformation",
                label: "Transformation",
                reflection: &[
                    "Indeed, fire transforms all it touches.",
                    "",
                    "Like the phoenix, love rises from ashes.",
                    "What was once impossible becomes reality",
                    "when the heart burns bright enough.",
                ],
            },
        ],
    }),
    mastery_message: "Like fire, your passion burns bright and true.",
    challenge: ChallengeKind::Sequence,
};

static EARTH: CategoryConfig = CategoryConfig {
    name: "Earth",
    lore: &[
        "Earth is the element of substance.",
        "",
        "The people of the Earth Kingdom",
        "are diverse and strong.",
        "",
        "They are persistent and enduring.",
    ],
    riddle: Some(Riddle {
        question: "What strength does earth provide that all else depends upon?",
        choices: &[
            Choice {
                id: "loyalty",
                label: "Loyalty",
                reflection: &[
                    "Yes, earth stands unmoved through storms.",
                    "",
                    "True loyalty is the bedrock of love,",
                    "weathering every trial without wavering.",
                    "It creates a foundation that time cannot erode.",
                ],
            },
            Choice {
                id: "growth",
                label: "Growth",
                reflection: &[
                    "From earth, all life springs forth.",
                    "",
                    "Love, like a seed, needs stable ground.",
                    "With patience and care, it grows into something",
                    "magnificent that reaches toward the sky.",
                ],
            },
            Choice {
                id: "endurance",
                label: "Endurance",
                reflection: &[
                    "Indeed, earth endures eternally.",
                    "",
                    "Mountains may erode, but the stone remains.",
                    "Love that endures through hardship",
                    "is the strongest force in all the world.",
                ],
            },
        ],
    }),
    mastery_message: "Like earth, you stand firm and unshakeable.",
    challenge: ChallengeKind::Match,
};

static AIR: CategoryConfig = CategoryConfig {
    name: "Air",
    lore: &[
        "Air is the element of freedom.",
        "",
        "The Air Nomads detached themselves",
        "from worldly concerns",
        "and found peace and freedom.",
        "",
        "Also, they apparently had",
        "pretty good senses of humor.",
    ],
    // Air is the story's closing stage; it asks nothing.
    riddle: None,
    mastery_message: "Like air, you soar to boundless heights.",
    challenge: ChallengeKind::Catch,
};
