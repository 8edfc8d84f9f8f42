use crate::errors::NotifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    System,
}

/// Permission boundary supplied by the host application.
///
/// Every public lookup on the channel sender checks permissions before
/// touching any cache or remote API.
pub trait PermissionChecker: Send + Sync {
    /// Pass when the calling context holds at least one of `roles`.
    fn limit_check_any(&self, roles: &[Role]) -> Result<(), NotifyError>;
}

/// Checker backed by a fixed set of held roles.
#[derive(Debug, Default, Clone)]
pub struct RoleSet {
    held: Vec<Role>,
}

impl RoleSet {
    #[must_use]
    pub fn new(held: Vec<Role>) -> Self {
        Self { held }
    }
}

impl PermissionChecker for RoleSet {
    fn limit_check_any(&self, roles: &[Role]) -> Result<(), NotifyError> {
        if roles.iter().any(|role| self.held.contains(role)) {
            Ok(())
        } else {
            Err(NotifyError::PermissionDenied)
        }
    }
}
