//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::models::{SessionRecord, UserRecord};

/// At most one record per case-folded email, every record counted at least once
pub fn assert_user_list_invariants(users: &[UserRecord]) {
    let mut seen = HashSet::new();
    for user in users {
        debug_assert!(
            seen.insert(user.email.to_lowercase()),
            "Duplicate user record for email {}",
            user.email
        );
        debug_assert!(
            !user.id.is_empty(),
            "User record for {} has empty id",
            user.email
        );
        debug_assert!(
            user.last_login >= user.created_at,
            "User {} last_login precedes created_at",
            user.id
        );
    }
}

/// A session must expire after it was issued
pub fn assert_session_invariants(session: &SessionRecord) {
    debug_assert!(
        session.expires_at > session.login_time,
        "Session for {} expires at or before issuance",
        session.user_id
    );
}
