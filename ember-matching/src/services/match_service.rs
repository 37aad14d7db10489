use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use ember_shared::errors::AppResult;

use crate::cache::LocalCache;
use crate::models::UserProfile;
use crate::store::ProfileStore;

// Match lists mutate more often than the candidate pool, so they get the
// shorter window.
const USER_MATCHES_TTL: Duration = Duration::from_secs(3 * 60);
const CANDIDATES_TTL: Duration = Duration::from_secs(5 * 60);

const USER_MATCHES_KEY: &str = "user-matches";

pub const DEFAULT_CANDIDATE_LIMIT: i64 = 50;

/// Serves the two discovery lists: active matches resolved to counterpart
/// profiles, and preference-filtered candidate pages. Both are cached
/// per-user; a hit never touches the backing store.
#[derive(Clone)]
pub struct MatchService {
    store: Arc<dyn ProfileStore>,
    cache: Arc<LocalCache>,
    user_matches_ttl: Duration,
    candidates_ttl: Duration,
}

impl MatchService {
    pub fn new(store: Arc<dyn ProfileStore>, cache: Arc<LocalCache>) -> Self {
        Self {
            store,
            cache,
            user_matches_ttl: USER_MATCHES_TTL,
            candidates_ttl: CANDIDATES_TTL,
        }
    }

    #[cfg(test)]
    fn with_ttls(
        store: Arc<dyn ProfileStore>,
        cache: Arc<LocalCache>,
        user_matches_ttl: Duration,
        candidates_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            user_matches_ttl,
            candidates_ttl,
        }
    }

    /// All active matches for `user_id`, as the counterparts' profiles
    /// with timestamps rewritten to "matched since".
    pub async fn get_user_matches(&self, user_id: Uuid) -> AppResult<Vec<UserProfile>> {
        let key = LocalCache::user_key(user_id, USER_MATCHES_KEY);
        if let Some(cached) = self.cache.get::<Vec<UserProfile>>(&key) {
            return Ok(cached);
        }

        let rows = self.store.active_matches(user_id)?;
        let profiles: Vec<UserProfile> = rows
            .into_iter()
            .map(|(record, profile)| profile.matched_since(record.created_at))
            .collect();

        self.cache.set(&key, &profiles, self.user_matches_ttl);
        Ok(profiles)
    }

    /// Preference-filtered candidate page for discovery. Candidates the
    /// caller has already liked or matched are not excluded here; the
    /// like path reports those as `alreadyLiked` instead.
    pub async fn get_potential_matches(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<UserProfile>> {
        let key = LocalCache::user_key(user_id, &format!("matches:{limit}:{offset}"));
        if let Some(cached) = self.cache.get::<Vec<UserProfile>>(&key) {
            return Ok(cached);
        }

        let prefs = self.store.get_preferences(user_id)?;
        let candidates =
            self.store
                .load_candidates(user_id, &prefs.gender_preference, limit, offset)?;

        self.cache.set(&key, &candidates, self.candidates_ttl);
        Ok(candidates)
    }
}
