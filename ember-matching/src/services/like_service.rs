use std::sync::Arc;

use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::MatchResult;
use crate::store::{LikeInsert, ProfileStore};

/// Records directional likes and detects mutual ones.
///
/// Per call the sequence is strictly insert-like, check-reverse-edge,
/// upsert-match. There is no cross-request locking: when both sides like
/// each other near-simultaneously, both calls may observe the reverse
/// edge and both may upsert; the canonical-pair conflict target keeps the
/// match to a single row either way.
#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn ProfileStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn like_user(&self, from: Uuid, to: Uuid) -> AppResult<MatchResult> {
        if from == to {
            return Err(AppError::new(ErrorCode::CannotLikeSelf, "cannot like yourself"));
        }

        match self.store.insert_like(from, to)? {
            LikeInsert::Duplicate => {
                tracing::debug!(%from, %to, "like already recorded");
                return Ok(MatchResult::already_liked());
            }
            LikeInsert::Created => {}
        }

        if !self.store.has_like(to, from)? {
            return Ok(MatchResult::liked());
        }

        // Mutual like. The like edge is already durable, so a failed
        // match upsert is logged and swallowed rather than rolling the
        // like back. Known edge case: both edges can exist without a
        // materialized match row until something re-runs the upsert.
        if let Err(err) = self.store.upsert_match(from, to) {
            tracing::warn!(%from, %to, error = %err, "match upsert failed after mutual like");
        }

        let matched_user = self.store.get_profile(to)?;
        Ok(MatchResult::matched(matched_user))
    }

    /// Whether `from` has already liked `to`. Backs the pre-like check
    /// the UI runs before showing the like button state.
    pub async fn has_liked(&self, from: Uuid, to: Uuid) -> AppResult<bool> {
        self.store.has_like(from, to)
    }
}
