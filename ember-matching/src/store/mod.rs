use uuid::Uuid;

use ember_shared::errors::AppResult;

use crate::models::{Gender, MatchRecord, UpdateUser, UserPreferences, UserProfile};

mod pg;
#[cfg(test)]
pub mod testing;

pub use pg::PgProfileStore;

/// Outcome of recording a like edge. A duplicate is a domain outcome, not
/// an error; only genuine write failures surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeInsert {
    Created,
    Duplicate,
}

/// Data access seam for profiles, like edges and match rows. Methods are
/// synchronous since the production implementation sits on a blocking
/// connection pool; the seam exists so the engine and assembler can run
/// against an in-memory store in tests.
pub trait ProfileStore: Send + Sync {
    fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile>;

    /// A user with no stored preferences (or a malformed blob) gets the
    /// default: no gender filter. Only a failed read is an error.
    fn get_preferences(&self, user_id: Uuid) -> AppResult<UserPreferences>;

    /// Candidate page for discovery: excludes `exclude_user_id`, applies
    /// the gender filter in the query when non-empty, newest accounts
    /// first for deterministic pagination.
    fn load_candidates(
        &self,
        exclude_user_id: Uuid,
        gender_filter: &[Gender],
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<UserProfile>>;

    /// Records the directed edge `from -> to` at most once.
    fn insert_like(&self, from: Uuid, to: Uuid) -> AppResult<LikeInsert>;

    fn has_like(&self, from: Uuid, to: Uuid) -> AppResult<bool>;

    /// Creates the canonical match row for the unordered pair, or returns
    /// the existing one. Concurrent upserts from both sides of a mutual
    /// like must converge on a single row.
    fn upsert_match(&self, a: Uuid, b: Uuid) -> AppResult<MatchRecord>;

    /// All active matches involving `user_id`, each resolved to the
    /// counterpart's profile. A counterpart whose profile row is missing
    /// drops that match from the result instead of failing the call.
    fn active_matches(&self, user_id: Uuid) -> AppResult<Vec<(MatchRecord, UserProfile)>>;

    fn update_profile(&self, user_id: Uuid, changes: UpdateUser) -> AppResult<UserProfile>;
}
