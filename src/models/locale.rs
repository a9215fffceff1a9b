//! UI locale and the handful of strings the core needs
//!
//! Only the strings that end up in persisted records or agent-facing text live
//! here; the rest of the translation table belongs to the UI.

use serde::{Deserialize, Serialize};

use super::breath::Phase;
use super::grounding::SenseCategory;

/// Supported UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    /// Detect the locale from an `Accept-Language` style tag
    ///
    /// Anything starting with "ja" is Japanese, everything else English.
    pub fn detect(tag: Option<&str>) -> Self {
        match tag {
            Some(tag) if tag.trim().to_lowercase().starts_with("ja") => Self::Ja,
            _ => Self::En,
        }
    }

    /// Title of a grounding step, as stored with the session
    pub fn step_title(&self, category: SenseCategory) -> &'static str {
        match (self, category) {
            (Self::En, SenseCategory::Sight) => "5 things you can see",
            (Self::En, SenseCategory::Touch) => "4 things you can touch",
            (Self::En, SenseCategory::Sound) => "3 things you can hear",
            (Self::En, SenseCategory::Smell) => "2 things you can smell",
            (Self::En, SenseCategory::Taste) => "1 thing you can taste",
            (Self::Ja, SenseCategory::Sight) => "見えるもの 5つ",
            (Self::Ja, SenseCategory::Touch) => "触れるもの 4つ",
            (Self::Ja, SenseCategory::Sound) => "聞こえるもの 3つ",
            (Self::Ja, SenseCategory::Smell) => "匂うもの 2つ",
            (Self::Ja, SenseCategory::Taste) => "味わうもの 1つ",
        }
    }

    pub fn step_instruction(&self, category: SenseCategory) -> &'static str {
        match (self, category) {
            (Self::En, SenseCategory::Sight) => "Slowly find five things you can see right now.",
            (Self::En, SenseCategory::Touch) => "Find four things around you that you can touch.",
            (Self::En, SenseCategory::Sound) => "Listen carefully and find three sounds you can hear.",
            (Self::En, SenseCategory::Smell) => "Turn your attention to the smells around you and find two.",
            (Self::En, SenseCategory::Taste) => "Find one taste you can notice in your mouth right now.",
            (Self::Ja, SenseCategory::Sight) => "いま、目に見えるものを5つ、ゆっくり見つけてください。",
            (Self::Ja, SenseCategory::Touch) => "まわりにあって、触れることができるものを4つ見つけてください。",
            (Self::Ja, SenseCategory::Sound) => "耳をすませて、いま聞こえる音を3つ見つけてください。",
            (Self::Ja, SenseCategory::Smell) => "まわりの匂いに意識を向けて、2つ見つけてください。",
            (Self::Ja, SenseCategory::Taste) => "いま、口の中で感じられる味を1つ見つけてください。",
        }
    }

    pub fn phase_label(&self, phase: Phase) -> &'static str {
        match (self, phase) {
            (Self::En, Phase::Idle) => "Start when you are ready",
            (Self::En, Phase::Inhale) => "Inhale",
            (Self::En, Phase::Hold) => "Hold",
            (Self::En, Phase::Exhale) => "Exhale",
            (Self::En, Phase::Complete) => "Complete!",
            (Self::Ja, Phase::Idle) => "準備ができたら開始",
            (Self::Ja, Phase::Inhale) => "吸って",
            (Self::Ja, Phase::Hold) => "止めて",
            (Self::Ja, Phase::Exhale) => "吐いて",
            (Self::Ja, Phase::Complete) => "完了しました",
        }
    }

    /// Message shown when a grounding step is submitted with no entries
    pub fn empty_step_message(&self) -> &'static str {
        match self {
            Self::En => "Please enter at least one item",
            Self::Ja => "少なくとも1つ入力してください",
        }
    }

    pub fn confirm_cancel_message(&self) -> &'static str {
        match self {
            Self::En => "You're partway through. Do you want to stop?",
            Self::Ja => "途中ですが、やめますか？",
        }
    }

    pub fn confirm_delete_message(&self) -> &'static str {
        match self {
            Self::En => "Delete this record?",
            Self::Ja => "この記録を削除しますか？",
        }
    }
}
