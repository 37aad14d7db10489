use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{likes, matches, users};

// --- Gender ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

// --- Preferences ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(default = "default_min_age")]
    pub min: u8,
    #[serde(default = "default_max_age")]
    pub max: u8,
}

fn default_min_age() -> u8 { 18 }
fn default_max_age() -> u8 { 99 }

impl Default for AgeRange {
    fn default() -> Self {
        Self { min: 18, max: 99 }
    }
}

/// Discovery preferences stored as a JSONB blob on the user row. Every
/// field is serde-defaulted so a partial or malformed blob degrades to
/// "no filter" instead of failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub age_range: AgeRange,
    #[serde(default = "default_distance")]
    pub distance: u32,
    #[serde(default)]
    pub gender_preference: Vec<Gender>,
}

fn default_distance() -> u32 { 50 }

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            age_range: AgeRange::default(),
            distance: default_distance(),
            // Empty means no gender filter
            gender_preference: Vec::new(),
        }
    }
}

pub(crate) fn parse_preferences(value: Option<serde_json::Value>) -> UserPreferences {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

// --- User ---

/// Raw user row as the backing store hands it over. Most columns are
/// nullable; `UserRow::into_profile` is the strict boundary that turns
/// this into the canonical shape.
#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences: Option<serde_json::Value>,
    pub is_verified: Option<bool>,
    pub is_online: Option<bool>,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Total conversion into the canonical profile shape. Never fails:
    /// missing fields take documented defaults (empty email, verified,
    /// offline, timestamps "now") and a malformed gender falls back to
    /// `other`.
    pub fn into_profile(self) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: self.id,
            full_name: self.full_name.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            gender: self.gender.parse().unwrap_or(Gender::Other),
            birthdate: self.birthdate,
            bio: self.bio.unwrap_or_default(),
            avatar_url: self.avatar_url.unwrap_or_default(),
            preferences: parse_preferences(self.preferences),
            last_active: self.last_active,
            is_verified: self.is_verified.unwrap_or(true),
            is_online: self.is_online.unwrap_or(false),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

/// Canonical profile shape surfaced to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub gender: Gender,
    pub birthdate: Option<NaiveDate>,
    pub bio: String,
    pub avatar_url: String,
    pub preferences: UserPreferences,
    pub last_active: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Rewrites both timestamps to the match row's creation time, so a
    /// match list entry reads as "matched since", not "account created".
    pub fn matched_since(mut self, matched_at: DateTime<Utc>) -> Self {
        self.created_at = matched_at;
        self.updated_at = matched_at;
        self
    }
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

impl UpdateUser {
    /// An all-`None` changeset is rejected up front; diesel refuses to
    /// build an UPDATE with no assignments.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.username.is_none()
            && self.bio.is_none()
            && self.gender.is_none()
            && self.birthdate.is_none()
            && self.avatar_url.is_none()
            && self.preferences.is_none()
    }
}

// --- Like ---

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct MatchRecord {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    /// The other side of the match from `viewer`'s perspective.
    pub fn counterpart(&self, viewer: Uuid) -> Uuid {
        if viewer == self.user1_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user1_id: Uuid,
    pub user2_id: Uuid,
}

/// Sorts an unordered pair into the canonical `(user1, user2)` order so a
/// pair always maps to exactly one match row.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b { (a, b) } else { (b, a) }
}

// --- Like outcome ---

/// Outcome of a like action, serialized camelCase for the UI contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub success: bool,
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    pub fn liked() -> Self {
        Self {
            success: true,
            is_match: false,
            matched_user: None,
            already_liked: None,
            error: None,
        }
    }

    pub fn already_liked() -> Self {
        Self {
            success: true,
            is_match: false,
            matched_user: None,
            already_liked: Some(true),
            error: None,
        }
    }

    pub fn matched(user: UserProfile) -> Self {
        Self {
            success: true,
            is_match: true,
            matched_user: Some(user),
            already_liked: None,
            error: None,
        }
    }
}
