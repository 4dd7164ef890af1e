//! Access decision engine
//!
//! Each route declares one [`RouteRequirement`]. The HTTP layer hands that
//! value plus the raw `Authorization` header to [`authorize`], which either
//! returns the resolved caller (for non-public routes) or an [`AccessDenied`].

use thiserror::Error;

use super::identity::CallerIdentity;
use super::role::UserRole;
use super::token::CredentialVerifier;

/// Message returned when a caller's role is not accepted by a route
pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions";

/// What a route demands of its caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// No identity needed; the token is never inspected.
    Public,
    /// Any valid identity.
    AuthenticatedOnly,
    /// Valid identity whose role is one of the listed roles.
    RequiresRole(Vec<UserRole>),
}

impl RouteRequirement {
    pub fn roles(roles: &[UserRole]) -> Self {
        RouteRequirement::RequiresRole(roles.to_vec())
    }

    pub fn admin_only() -> Self {
        Self::roles(&[UserRole::Admin])
    }

    pub fn is_public(&self) -> bool {
        matches!(self, RouteRequirement::Public)
    }
}

/// Why a request was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    /// No usable identity (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// Identity present, role not accepted (403)
    #[error("{0}")]
    Forbidden(String),
}

/// Decide whether `caller` may use a route with `requirement`.
///
/// Role membership is exact: an admin is refused on a user-only route, and
/// an empty role list refuses everyone.
pub fn decide(
    requirement: &RouteRequirement,
    caller: Option<&CallerIdentity>,
) -> Result<(), AccessDenied> {
    let roles = match requirement {
        RouteRequirement::Public => return Ok(()),
        RouteRequirement::AuthenticatedOnly => None,
        RouteRequirement::RequiresRole(roles) => Some(roles),
    };

    let caller = caller
        .ok_or_else(|| AccessDenied::Unauthenticated("User not authenticated".to_string()))?;

    match roles {
        None => Ok(()),
        Some(roles) if roles.contains(&caller.role) => Ok(()),
        Some(_) => Err(AccessDenied::Forbidden(INSUFFICIENT_PERMISSIONS.to_string())),
    }
}

/// Resolve and check the caller for one request.
///
/// Public routes return `Ok(None)` before the header is looked at. For every
/// other requirement the header goes through `verifier`; a verification
/// failure is reported as unauthenticated with the verifier's reason.
pub fn authorize<V>(
    requirement: &RouteRequirement,
    header: Option<&str>,
    verifier: &V,
) -> Result<Option<CallerIdentity>, AccessDenied>
where
    V: CredentialVerifier + ?Sized,
{
    if requirement.is_public() {
        return Ok(None);
    }

    let caller = verifier
        .verify(header)
        .map_err(|e| AccessDenied::Unauthenticated(e.to_string()))?;

    decide(requirement, Some(&caller))?;
    Ok(Some(caller))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> CallerIdentity {
        CallerIdentity::new("1", "admin@example.com", UserRole::Admin)
    }

    fn user() -> CallerIdentity {
        CallerIdentity::new("2", "user@example.com", UserRole::User)
    }

    #[test]
    fn test_public_allows_anonymous() {
        assert!(decide(&RouteRequirement::Public, None).is_ok());
    }

    #[test]
    fn test_authenticated_only_requires_identity() {
        assert!(decide(&RouteRequirement::AuthenticatedOnly, Some(&user())).is_ok());
        assert!(matches!(
            decide(&RouteRequirement::AuthenticatedOnly, None),
            Err(AccessDenied::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_admin_only() {
        let req = RouteRequirement::admin_only();
        assert!(decide(&req, Some(&admin())).is_ok());
        assert_eq!(
            decide(&req, Some(&user())),
            Err(AccessDenied::Forbidden(INSUFFICIENT_PERMISSIONS.to_string()))
        );
        assert!(matches!(decide(&req, None), Err(AccessDenied::Unauthenticated(_))));
    }

    #[test]
    fn test_admin_is_not_a_user() {
        let req = RouteRequirement::roles(&[UserRole::User]);
        assert!(matches!(decide(&req, Some(&admin())), Err(AccessDenied::Forbidden(_))));
        assert!(decide(&req, Some(&user())).is_ok());
    }

    #[test]
    fn test_multiple_roles() {
        let req = RouteRequirement::roles(&[UserRole::User, UserRole::Admin]);
        assert!(decide(&req, Some(&admin())).is_ok());
        assert!(decide(&req, Some(&user())).is_ok());
    }

    #[test]
    fn test_empty_role_set_denies_everyone() {
        let req = RouteRequirement::RequiresRole(Vec::new());
        assert!(matches!(decide(&req, Some(&admin())), Err(AccessDenied::Forbidden(_))));
        assert!(matches!(decide(&req, Some(&user())), Err(AccessDenied::Forbidden(_))));
    }
}
