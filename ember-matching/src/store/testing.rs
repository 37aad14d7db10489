//! In-memory `ProfileStore` used by the service-level tests. Tracks
//! per-operation call counts so cache behavior is observable, and lets
//! tests inject one-shot failures on the write paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    canonical_pair, parse_preferences, Gender, MatchRecord, UpdateUser, UserPreferences,
    UserProfile,
};
use crate::store::{LikeInsert, ProfileStore};

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<UserProfile>>,
    preferences: Mutex<HashMap<Uuid, UserPreferences>>,
    likes: Mutex<Vec<(Uuid, Uuid)>>,
    matches: Mutex<Vec<MatchRecord>>,

    pub candidate_queries: AtomicUsize,
    pub match_queries: AtomicUsize,
    pub preference_queries: AtomicUsize,

    pub fail_next_insert_like: AtomicBool,
    pub fail_next_upsert_match: AtomicBool,
    pub fail_next_active_matches: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_profile(&self, profile: UserProfile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn set_preferences(&self, user_id: Uuid, prefs: UserPreferences) {
        self.preferences.lock().unwrap().insert(user_id, prefs);
    }

    pub fn like_count(&self, from: Uuid, to: Uuid) -> usize {
        self.likes
            .lock()
            .unwrap()
            .iter()
            .filter(|&&(f, t)| f == from && t == to)
            .count()
    }

    pub fn all_matches(&self) -> Vec<MatchRecord> {
        self.matches.lock().unwrap().clone()
    }

    pub fn deactivate_match(&self, a: Uuid, b: Uuid) {
        let (user1, user2) = canonical_pair(a, b);
        for m in self.matches.lock().unwrap().iter_mut() {
            if m.user1_id == user1 && m.user2_id == user2 {
                m.is_active = false;
            }
        }
    }

    pub fn remove_profile(&self, user_id: Uuid) {
        self.profiles.lock().unwrap().retain(|p| p.id != user_id);
    }

    fn take_failure(&self, flag: &AtomicBool) -> AppResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            Err(AppError::internal("injected store failure"))
        } else {
            Ok(())
        }
    }
}

/// Fresh profile with sane defaults for tests.
pub fn profile(full_name: &str, gender: Gender) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: Uuid::new_v4(),
        full_name: full_name.to_string(),
        username: full_name.to_lowercase().replace(' ', "_"),
        email: String::new(),
        gender,
        birthdate: None,
        bio: String::new(),
        avatar_url: String::new(),
        preferences: UserPreferences::default(),
        last_active: None,
        is_verified: true,
        is_online: false,
        created_at: now,
        updated_at: now,
    }
}

impl ProfileStore for MemoryStore {
    fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
    }

    fn get_preferences(&self, user_id: Uuid) -> AppResult<UserPreferences> {
        self.preference_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .preferences
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn load_candidates(
        &self,
        exclude_user_id: Uuid,
        gender_filter: &[Gender],
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<UserProfile>> {
        self.candidate_queries.fetch_add(1, Ordering::SeqCst);

        let mut rows: Vec<UserProfile> = self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.id != exclude_user_id)
            .filter(|p| gender_filter.is_empty() || gender_filter.contains(&p.gender))
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    fn insert_like(&self, from: Uuid, to: Uuid) -> AppResult<LikeInsert> {
        self.take_failure(&self.fail_next_insert_like)?;

        let mut likes = self.likes.lock().unwrap();
        if likes.contains(&(from, to)) {
            return Ok(LikeInsert::Duplicate);
        }
        likes.push((from, to));
        Ok(LikeInsert::Created)
    }

    fn has_like(&self, from: Uuid, to: Uuid) -> AppResult<bool> {
        Ok(self.likes.lock().unwrap().contains(&(from, to)))
    }

    fn upsert_match(&self, a: Uuid, b: Uuid) -> AppResult<MatchRecord> {
        self.take_failure(&self.fail_next_upsert_match)?;

        let (user1, user2) = canonical_pair(a, b);
        let mut matches = self.matches.lock().unwrap();
        if let Some(existing) = matches
            .iter()
            .find(|m| m.user1_id == user1 && m.user2_id == user2)
        {
            return Ok(existing.clone());
        }

        let record = MatchRecord {
            id: Uuid::new_v4(),
            user1_id: user1,
            user2_id: user2,
            is_active: true,
            created_at: Utc::now(),
        };
        matches.push(record.clone());
        Ok(record)
    }

    fn active_matches(&self, user_id: Uuid) -> AppResult<Vec<(MatchRecord, UserProfile)>> {
        self.take_failure(&self.fail_next_active_matches)?;
        self.match_queries.fetch_add(1, Ordering::SeqCst);

        let matches = self.matches.lock().unwrap().clone();
        let profiles = self.profiles.lock().unwrap();

        Ok(matches
            .into_iter()
            .filter(|m| m.is_active && (m.user1_id == user_id || m.user2_id == user_id))
            .filter_map(|m| {
                let other = m.counterpart(user_id);
                profiles
                    .iter()
                    .find(|p| p.id == other)
                    .cloned()
                    .map(|p| (m, p))
            })
            .collect())
    }

    fn update_profile(&self, user_id: Uuid, changes: UpdateUser) -> AppResult<UserProfile> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

        if let Some(full_name) = changes.full_name {
            profile.full_name = full_name;
        }
        if let Some(username) = changes.username {
            profile.username = username;
        }
        if let Some(bio) = changes.bio {
            profile.bio = bio;
        }
        if let Some(gender) = changes.gender {
            profile.gender = gender.parse().unwrap_or(Gender::Other);
        }
        if let Some(birthdate) = changes.birthdate {
            profile.birthdate = Some(birthdate);
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = avatar_url;
        }
        if let Some(prefs) = changes.preferences {
            let parsed = parse_preferences(Some(prefs));
            profile.preferences = parsed.clone();
            self.preferences.lock().unwrap().insert(user_id, parsed);
        }
        profile.updated_at = Utc::now();

        Ok(profile.clone())
    }
}
