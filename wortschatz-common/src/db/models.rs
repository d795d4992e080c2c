//! Database models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed vocabulary category whitelist
///
/// Categories are stored as plain text; this list is the single source of
/// validation for catalog writes and bulk import.
pub const CATEGORIES: &[&str] = &[
    "Greetings",
    "Numbers",
    "Colors",
    "Family",
    "Food",
    "Drinks",
    "Animals",
    "Body",
    "Clothing",
    "Home",
    "School",
    "Work",
    "Travel",
    "Weather",
    "Time",
    "Nature",
    "Emotions",
    "Health",
    "Shopping",
    "Sports",
];

/// Check a category name against the whitelist (case-sensitive)
pub fn is_valid_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// A registered learner (or administrator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub password_salt: String,
    pub is_admin: bool,
    pub reset_code: Option<String>,
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One entry in the vocabulary bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: Uuid,
    pub word: String,
    pub meaning: String,
    pub example_sentence: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Learner's status on one vocabulary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    New,
    Learning,
    Known,
}

impl WordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WordStatus::New => "new",
            WordStatus::Learning => "learning",
            WordStatus::Known => "known",
        }
    }

    pub fn parse(s: &str) -> Option<WordStatus> {
        match s {
            "new" => Some(WordStatus::New),
            "learning" => Some(WordStatus::Learning),
            "known" => Some(WordStatus::Known),
            _ => None,
        }
    }
}

/// Per-(user, word) review state, created lazily on first review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordProgress {
    pub user_id: Uuid,
    pub vocabulary_id: Uuid,
    pub status: WordStatus,
    pub times_reviewed: i64,
    pub last_reviewed: Option<DateTime<Utc>>,
}

/// Per-user rollup of learning activity
///
/// `version` is the optimistic-concurrency counter guarding the
/// read-modify-write cycle of the streak update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateProgress {
    pub user_id: Uuid,
    pub words_learned: i64,
    pub total_xp: i64,
    pub current_streak_days: i64,
    pub last_active_date: Option<NaiveDate>,
    pub version: i64,
}

impl AggregateProgress {
    /// Zero state reported when no progress row exists for a user
    pub fn zero(user_id: Uuid) -> Self {
        Self {
            user_id,
            words_learned: 0,
            total_xp: 0,
            current_streak_days: 0,
            last_active_date: None,
            version: 0,
        }
    }
}

/// An achievement unlocked when an aggregate metric crosses a threshold
///
/// `criteria_type` is matched by string in the evaluator; unknown values are
/// never eligible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub criteria_type: String,
    pub criteria_value: i64,
}

/// A (user, badge) award; unique per pair, never revoked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardedBadge {
    pub user_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
}
