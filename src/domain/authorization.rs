//! Role-based authorization policy

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether a caller holding `authorities` may use an operation that
/// requires any one of `required_roles`
///
/// An empty requirement admits every authenticated caller.
pub fn authorize<R, A>(required_roles: &[R], authorities: &[A]) -> AccessDecision
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    if required_roles.is_empty() {
        return AccessDecision::Allow;
    }

    let granted = required_roles.iter().any(|required| {
        authorities
            .iter()
            .any(|held| held.as_ref() == required.as_ref())
    });

    if granted {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny
    }
}
