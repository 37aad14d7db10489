use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use ember_shared::db::DbPool;
use ember_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    canonical_pair, parse_preferences, Gender, MatchRecord, NewLike, NewMatch, UpdateUser,
    UserPreferences, UserProfile, UserRow,
};
use crate::schema::{likes, matches, users};
use crate::store::{LikeInsert, ProfileStore};

pub struct PgProfileStore {
    pool: DbPool,
}

impl PgProfileStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(|e| AppError::internal(e.to_string()))
    }
}

impl ProfileStore for PgProfileStore {
    fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let mut conn = self.conn()?;

        let row = users::table
            .find(user_id)
            .first::<UserRow>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

        Ok(row.into_profile())
    }

    fn get_preferences(&self, user_id: Uuid) -> AppResult<UserPreferences> {
        let mut conn = self.conn()?;

        let blob: Option<serde_json::Value> = users::table
            .find(user_id)
            .select(users::preferences)
            .first(&mut conn)?;

        Ok(parse_preferences(blob))
    }

    fn load_candidates(
        &self,
        exclude_user_id: Uuid,
        gender_filter: &[Gender],
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<UserProfile>> {
        let mut conn = self.conn()?;

        let mut query = users::table
            .filter(users::id.ne(exclude_user_id))
            .order(users::created_at.desc())
            .limit(limit)
            .offset(offset)
            .into_boxed();

        // Filter in the query, not post-fetch, to bound transferred rows
        if !gender_filter.is_empty() {
            let names: Vec<String> = gender_filter.iter().map(Gender::to_string).collect();
            query = query.filter(users::gender.eq_any(names));
        }

        let rows = query.load::<UserRow>(&mut conn)?;
        Ok(rows.into_iter().map(UserRow::into_profile).collect())
    }

    fn insert_like(&self, from: Uuid, to: Uuid) -> AppResult<LikeInsert> {
        let mut conn = self.conn()?;

        let new_like = NewLike {
            from_user_id: from,
            to_user_id: to,
        };

        match diesel::insert_into(likes::table).values(&new_like).execute(&mut conn) {
            Ok(_) => Ok(LikeInsert::Created),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(LikeInsert::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn has_like(&self, from: Uuid, to: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;

        let count: i64 = likes::table
            .filter(likes::from_user_id.eq(from))
            .filter(likes::to_user_id.eq(to))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }

    fn upsert_match(&self, a: Uuid, b: Uuid) -> AppResult<MatchRecord> {
        let mut conn = self.conn()?;

        let (user1, user2) = canonical_pair(a, b);
        let new_match = NewMatch {
            user1_id: user1,
            user2_id: user2,
        };

        // Both sides of a mutual like can race into this insert; the
        // conflict target on the canonical pair keeps it to one row.
        diesel::insert_into(matches::table)
            .values(&new_match)
            .on_conflict((matches::user1_id, matches::user2_id))
            .do_nothing()
            .execute(&mut conn)?;

        let record = matches::table
            .filter(matches::user1_id.eq(user1))
            .filter(matches::user2_id.eq(user2))
            .first::<MatchRecord>(&mut conn)?;

        Ok(record)
    }

    fn active_matches(&self, user_id: Uuid) -> AppResult<Vec<(MatchRecord, UserProfile)>> {
        let mut conn = self.conn()?;

        let rows: Vec<MatchRecord> = matches::table
            .filter(matches::is_active.eq(true))
            .filter(matches::user1_id.eq(user_id).or(matches::user2_id.eq(user_id)))
            .order(matches::created_at.desc())
            .load(&mut conn)?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // One batched lookup for all counterparts instead of N queries
        let counterpart_ids: Vec<Uuid> = rows.iter().map(|m| m.counterpart(user_id)).collect();
        let profiles: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&counterpart_ids))
            .load(&mut conn)?;

        let mut by_id: HashMap<Uuid, UserProfile> = profiles
            .into_iter()
            .map(|row| (row.id, row.into_profile()))
            .collect();

        // A match whose counterpart row is gone is dropped, not fatal
        Ok(rows
            .into_iter()
            .filter_map(|m| {
                let other = m.counterpart(user_id);
                by_id.remove(&other).map(|profile| (m, profile))
            })
            .collect())
    }

    fn update_profile(&self, user_id: Uuid, changes: UpdateUser) -> AppResult<UserProfile> {
        let mut conn = self.conn()?;

        let updated = diesel::update(users::table.find(user_id))
            .set((&changes, users::updated_at.eq(Some(chrono::Utc::now()))))
            .get_result::<UserRow>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

        Ok(updated.into_profile())
    }
}
