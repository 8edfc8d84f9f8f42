//! Best-effort mapping of application users to Slack identities.

use std::collections::HashMap;

use tracing::error;

use crate::core::models::AlertUser;
use crate::core::subjects::SubjectStore;

/// Resolve Slack subject IDs for `users` within `team_id`.
///
/// The mapping is built fresh per call and never cached: identity mappings
/// can change, and mis-attribution is higher-risk than a stale channel
/// name. Lookup failures are logged and degrade to an empty or partial
/// mapping; rendering falls back to profile links for unresolved users.
pub async fn link_users(
    store: &dyn SubjectStore,
    team_id: &str,
    users: &[AlertUser],
) -> HashMap<String, String> {
    if users.is_empty() {
        return HashMap::new();
    }

    let user_ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
    let scope_key = format!("slack:{team_id}");

    match store.auth_subjects(&scope_key, &user_ids).await {
        Ok(subjects) => subjects
            .into_iter()
            .map(|s| (s.user_id, s.subject_id))
            .collect(),
        Err(err) => {
            error!(error = %err, "lookup auth subjects for slack");
            HashMap::new()
        }
    }
}
