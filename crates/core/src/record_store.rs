//! User record and session store
//!
//! Users live as one serialized list in the durable slot; the active session
//! is one serialized record in the volatile slot. Lookups are linear scans
//! over the list, keyed by case-folded email.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::invariants::{assert_session_invariants, assert_user_list_invariants};
use crate::models::{generate_user_id, SessionRecord, UserPatch, UserRecord};
use crate::storage::{KeyValueStore, SESSION_SLOT, USERS_SLOT};

/// Attempts for a save before giving up on a slot that keeps changing
const MAX_SAVE_ATTEMPTS: usize = 3;

/// Snapshot of everything the store holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataExport {
    pub users: Vec<UserRecord>,
    pub session: Option<SessionRecord>,
}

impl DataExport {
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct RecordStore<D, V> {
    durable: D,
    volatile: V,
    session_ttl: Duration,
}

impl<D: KeyValueStore, V: KeyValueStore> RecordStore<D, V> {
    /// Create the store and seed the user slot if it is empty
    pub fn new(durable: D, volatile: V) -> Result<Self> {
        let store = Self {
            durable,
            volatile,
            session_ttl: Duration::days(7),
        };
        store.init()?;
        Ok(store)
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    pub fn volatile(&self) -> &V {
        &self.volatile
    }

    /// Seed the user slot with an empty list if nothing is stored yet
    pub fn init(&self) -> Result<()> {
        if self.durable.get(USERS_SLOT)?.is_none() {
            debug!("Seeding empty user list");
            self.durable.compare_and_swap(USERS_SLOT, None, "[]")?;
        }
        Ok(())
    }

    /// All stored users. A corrupt slot reads as an empty list and an
    /// unreadable record is skipped.
    #[instrument(skip(self))]
    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let raw = self.durable.get(USERS_SLOT)?;
        Ok(decode_users(raw.as_deref()))
    }

    /// First user whose email matches, ignoring case
    #[instrument(skip(self))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .list_users()?
            .into_iter()
            .find(|u| u.matches_email(email)))
    }

    pub fn user_exists(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email)?.is_some())
    }

    /// Insert or merge a user keyed by email
    pub fn save_user(&self, patch: UserPatch) -> Result<UserRecord> {
        self.save_user_at(patch, Utc::now())
    }

    /// Insert or merge a user keyed by email, stamping times with `now`.
    ///
    /// An existing record gets the present fields of `patch` merged over it,
    /// `last_login = now` and its login counter bumped. A new record gets a
    /// fresh id, `created_at = last_login = now` and a counter of 1. The
    /// whole list is written back with a conditional swap so a concurrent
    /// writer is detected instead of silently overwritten.
    #[instrument(skip(self, patch), fields(email = %patch.email))]
    pub fn save_user_at(&self, patch: UserPatch, now: DateTime<Utc>) -> Result<UserRecord> {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let raw = self.durable.get(USERS_SLOT)?;
            let mut users = decode_users(raw.as_deref());

            let saved = match users.iter_mut().find(|u| u.matches_email(&patch.email)) {
                Some(existing) => {
                    existing.merge(patch.clone());
                    existing.last_login = now;
                    existing.login_count = existing.login_count.saturating_add(1);
                    existing.clone()
                }
                None => {
                    let record =
                        UserRecord::from_patch(generate_user_id(now), patch.clone(), now);
                    users.push(record.clone());
                    record
                }
            };

            assert_user_list_invariants(&users);
            let encoded = serde_json::to_string(&users)?;
            if self
                .durable
                .compare_and_swap(USERS_SLOT, raw.as_deref(), &encoded)?
            {
                info!(
                    user_id = %saved.id,
                    login_count = saved.login_count,
                    "User saved"
                );
                return Ok(saved);
            }

            warn!(attempt, "User list changed during save, retrying");
        }

        Err(Error::Conflict(format!(
            "user list kept changing while saving {}",
            patch.email
        )))
    }

    /// Issue a session for `user`, replacing any previous one
    pub fn issue_session(&self, user: &UserRecord) -> Result<SessionRecord> {
        self.issue_session_at(user, Utc::now())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub fn issue_session_at(
        &self,
        user: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        let session = SessionRecord::for_user(user, now, self.session_ttl)?;
        assert_session_invariants(&session);
        self.volatile
            .set(SESSION_SLOT, &serde_json::to_string(&session)?)?;
        info!(expires_at = %session.expires_at, "Session issued");
        Ok(session)
    }

    /// The active session, if one is stored and not yet expired
    pub fn current_session(&self) -> Result<Option<SessionRecord>> {
        self.current_session_at(Utc::now())
    }

    pub fn current_session_at(&self, now: DateTime<Utc>) -> Result<Option<SessionRecord>> {
        let Some(raw) = self.volatile.get(SESSION_SLOT)? else {
            return Ok(None);
        };

        let session = match serde_json::from_str::<Option<SessionRecord>>(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Unreadable session slot");
                None
            }
        };

        Ok(session.filter(|s| s.is_valid_at(now)))
    }

    /// Forget the active session
    #[instrument(skip(self))]
    pub fn clear_session(&self) -> Result<()> {
        self.volatile.remove(SESSION_SLOT)
    }

    pub fn export(&self) -> Result<DataExport> {
        Ok(DataExport {
            users: self.list_users()?,
            session: self.current_session()?,
        })
    }
}

fn decode_users(raw: Option<&str>) -> Vec<UserRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let entries = match serde_json::from_str::<Option<Vec<serde_json::Value>>>(raw) {
        Ok(entries) => entries.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Error reading users, treating slot as empty");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable user record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::storage::{MemorySlot, SqliteSlot};

    type TestStore = RecordStore<MemorySlot, MemorySlot>;

    fn store() -> TestStore {
        RecordStore::new(MemorySlot::new(), MemorySlot::new()).unwrap()
    }

    fn patch_with_hash(email: &str, hash: &str) -> UserPatch {
        let mut patch = UserPatch::new(email);
        patch.password_hash = Some(hash.to_string());
        patch
    }

    #[test]
    fn test_init_seeds_empty_list() {
        let store = store();
        assert_eq!(store.durable().get(USERS_SLOT).unwrap().as_deref(), Some("[]"));
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_init_keeps_existing_list() {
        let durable = MemorySlot::new();
        durable.set(USERS_SLOT, "[]").unwrap();
        let store = RecordStore::new(durable, MemorySlot::new()).unwrap();
        store.save_user(UserPatch::new("a@b.com")).unwrap();
        store.init().unwrap();
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_save_then_resave_same_email() {
        let store = store();

        let first = store.save_user(patch_with_hash("a@b.com", "secret")).unwrap();
        assert_eq!(first.login_count, 1);
        assert_eq!(store.list_users().unwrap().len(), 1);

        let second = store.save_user(patch_with_hash("a@b.com", "changed")).unwrap();
        assert_eq!(store.list_users().unwrap().len(), 1);
        assert_eq!(second.login_count, 2);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.password_hash.as_deref(), Some("changed"));
    }

    #[test]
    fn test_new_email_adds_exactly_one() {
        let store = store();
        store.save_user(UserPatch::new("one@b.com")).unwrap();
        store.save_user(UserPatch::new("two@b.com")).unwrap();

        let before = store.list_users().unwrap().len();
        let saved = store.save_user(UserPatch::new("three@b.com")).unwrap();
        assert_eq!(store.list_users().unwrap().len(), before + 1);
        assert_eq!(saved.login_count, 1);
        assert!(saved.id.starts_with("user_"));
    }

    #[test]
    fn test_email_match_ignores_case() {
        let store = store();
        let mut patch = UserPatch::new("Asha@Example.com");
        patch.name = Some("Asha".to_string());
        patch.phone = Some("9812345678".to_string());
        store.save_user(patch).unwrap();

        let mut update = UserPatch::new("asha@example.COM");
        update.provider = Some(Provider::Google);
        let saved = store.save_user(update).unwrap();

        assert_eq!(store.list_users().unwrap().len(), 1);
        assert_eq!(saved.login_count, 2);
        assert_eq!(saved.name, "Asha");
        assert_eq!(saved.phone.as_deref(), Some("9812345678"));
        assert_eq!(saved.provider, Provider::Google);
        assert!(store.user_exists("ASHA@EXAMPLE.COM").unwrap());
    }

    #[test]
    fn test_save_stamps_last_login() {
        let store = store();
        let t0 = Utc::now() - Duration::days(3);
        let created = store.save_user_at(UserPatch::new("a@b.com"), t0).unwrap();
        assert_eq!(created.created_at, t0);
        assert_eq!(created.last_login, t0);

        let t1 = t0 + Duration::days(1);
        let updated = store.save_user_at(UserPatch::new("a@b.com"), t1).unwrap();
        assert_eq!(updated.created_at, t0);
        assert_eq!(updated.last_login, t1);
    }

    #[test]
    fn test_corrupt_user_slot_reads_empty() {
        let durable = MemorySlot::new();
        durable.set(USERS_SLOT, "{not json").unwrap();
        let store = RecordStore::new(durable, MemorySlot::new()).unwrap();

        assert!(store.list_users().unwrap().is_empty());
        assert!(store.find_by_email("a@b.com").unwrap().is_none());

        store.save_user(UserPatch::new("a@b.com")).unwrap();
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_record_does_not_hide_the_rest() {
        let store = store();
        let kept = store.save_user(UserPatch::new("a@b.com")).unwrap();

        let mut entries: Vec<serde_json::Value> =
            serde_json::from_str(&store.durable().get(USERS_SLOT).unwrap().unwrap()).unwrap();
        entries.push(serde_json::json!({ "email": "broken@b.com" }));
        entries.push(serde_json::json!(42));
        store
            .durable()
            .set(USERS_SLOT, &serde_json::to_string(&entries).unwrap())
            .unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users, vec![kept.clone()]);

        let updated = store.save_user(UserPatch::new("c@d.com")).unwrap();
        let emails: Vec<_> = store
            .list_users()
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, vec![kept.email, updated.email]);
    }

    #[test]
    fn test_null_user_slot_reads_empty() {
        let durable = MemorySlot::new();
        durable.set(USERS_SLOT, "null").unwrap();
        let store = RecordStore::new(durable, MemorySlot::new()).unwrap();
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_session_overwrites_previous() {
        let store = store();
        let a = store.save_user(UserPatch::new("a@b.com")).unwrap();
        let b = store.save_user(UserPatch::new("b@b.com")).unwrap();

        store.issue_session(&a).unwrap();
        store.issue_session(&b).unwrap();

        let session = store.current_session().unwrap().unwrap();
        assert_eq!(session.user_id, b.id);
        assert_eq!(session.email, "b@b.com");
    }

    #[test]
    fn test_session_has_seven_day_horizon() {
        let store = store();
        let user = store.save_user(UserPatch::new("a@b.com")).unwrap();
        let now = Utc::now();
        let session = store.issue_session_at(&user, now).unwrap();
        assert_eq!(session.login_time, now);
        assert_eq!(session.expires_at, now + Duration::days(7));
    }

    #[test]
    fn test_expired_session_reads_absent_but_bytes_remain() {
        let store = store();
        let user = store.save_user(UserPatch::new("a@b.com")).unwrap();
        let issued = Utc::now();
        store.issue_session_at(&user, issued).unwrap();

        let just_before = issued + Duration::days(7) - Duration::seconds(1);
        assert!(store.current_session_at(just_before).unwrap().is_some());

        let after = issued + Duration::days(7) + Duration::seconds(1);
        assert!(store.current_session_at(after).unwrap().is_none());
        assert!(store.volatile().get(SESSION_SLOT).unwrap().is_some());
    }

    #[test]
    fn test_custom_session_ttl() {
        let store = store().with_session_ttl(Duration::hours(1));
        let user = store.save_user(UserPatch::new("a@b.com")).unwrap();
        let issued = Utc::now();
        store.issue_session_at(&user, issued).unwrap();
        assert!(store
            .current_session_at(issued + Duration::hours(2))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unusable_ttl_fails_without_writing_session() {
        for ttl in [Duration::zero(), Duration::days(200_000_000)] {
            let store = store().with_session_ttl(ttl);
            let user = store.save_user(UserPatch::new("a@b.com")).unwrap();

            let err = store.issue_session(&user).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)));
            assert!(store.volatile().get(SESSION_SLOT).unwrap().is_none());
        }
    }

    #[test]
    fn test_corrupt_session_reads_absent() {
        let store = store();
        store.volatile().set(SESSION_SLOT, "garbage").unwrap();
        assert!(store.current_session().unwrap().is_none());
    }

    #[test]
    fn test_clear_session() {
        let store = store();
        let user = store.save_user(UserPatch::new("a@b.com")).unwrap();
        store.issue_session(&user).unwrap();

        store.clear_session().unwrap();
        assert!(store.current_session().unwrap().is_none());
        assert!(store.volatile().get(SESSION_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_export_includes_users_and_session() {
        let store = store();
        let user = store.save_user(UserPatch::new("a@b.com")).unwrap();
        store.issue_session(&user).unwrap();

        let export = store.export().unwrap();
        assert_eq!(export.users.len(), 1);
        assert_eq!(export.session.unwrap().user_id, user.id);

        let json = store.export().unwrap().to_pretty_json().unwrap();
        assert!(json.contains("\"loginCount\": 1"));
    }

    #[test]
    fn test_sqlite_durable_slot() {
        let store = RecordStore::new(SqliteSlot::open_in_memory().unwrap(), MemorySlot::new())
            .unwrap();
        store.save_user(UserPatch::new("a@b.com")).unwrap();
        store.save_user(UserPatch::new("A@B.com")).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login_count, 2);
    }

    /// Slot that changes underneath every conditional write
    struct RacingSlot {
        inner: MemorySlot,
    }

    impl KeyValueStore for RacingSlot {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }

        fn compare_and_swap(&self, key: &str, expected: Option<&str>, _new: &str) -> Result<bool> {
            if expected.is_none() {
                self.inner.set(key, "[]")?;
                return Ok(true);
            }
            Ok(false)
        }
    }

    #[test]
    fn test_save_gives_up_on_constant_contention() {
        let store = RecordStore::new(
            RacingSlot {
                inner: MemorySlot::new(),
            },
            MemorySlot::new(),
        )
        .unwrap();

        let err = store.save_user(UserPatch::new("a@b.com")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(store.list_users().unwrap().is_empty());
    }
}
