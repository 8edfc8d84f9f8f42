use async_trait::async_trait;

/// A stored association between an application user and their identity on
/// an external platform, scoped per workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubject {
    pub user_id: String,
    pub subject_id: String,
}

/// Subject-mapping lookup supplied by the host application.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Return the external identities stored under `scope_key` for the
    /// given application user IDs. Neither ordering nor completeness is
    /// guaranteed; users without a mapping are simply absent.
    async fn auth_subjects(
        &self,
        scope_key: &str,
        user_ids: &[String],
    ) -> anyhow::Result<Vec<AuthSubject>>;
}
