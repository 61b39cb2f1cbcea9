//! Authorization predicates.
//!
//! Each [`Policy`] is a pure function of the request method, the calling
//! [`Actor`] and, for object-level checks, the record being touched. The
//! predicates never fail and have no side effects; mapping a denial onto a
//! status code is the HTTP layer's job.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use yamdb_core::permissions::{Actor, Permissions, Policy};
//!
//! let permissions = Permissions::default();
//! assert!(permissions.has_permission(Policy::AdminOrReadOnly, &Method::GET, &Actor::Anonymous));
//! assert!(!permissions.has_permission(Policy::AdminOrReadOnly, &Method::POST, &Actor::Anonymous));
//! ```

use crate::feedback::Authored;
use crate::role::Role;
use crate::user::{User, UserId};
use http::Method;
use std::str::FromStr;

/// The authenticated user as seen by permission checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User id.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Role.
    pub role: Role,
    /// Operator account flag.
    pub is_superuser: bool,
}

impl Principal {
    /// Snapshot the authorization-relevant part of a user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            is_superuser: user.is_superuser,
        }
    }

    /// Admin role or superuser flag.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Moderator | Role::User => self.is_superuser,
        }
    }

    /// Moderator, admin or superuser.
    #[must_use]
    pub const fn is_moderator_or_admin(&self) -> bool {
        match self.role {
            Role::Admin | Role::Moderator => true,
            Role::User => self.is_superuser,
        }
    }
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    /// No credentials were presented.
    #[default]
    Anonymous,
    /// A valid bearer token was presented.
    Authenticated(Principal),
}

impl Actor {
    /// The principal, if authenticated.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }

    /// Returns `true` for authenticated callers.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    fn is_admin(&self) -> bool {
        self.principal().is_some_and(Principal::is_admin)
    }

    fn is_moderator_or_admin(&self) -> bool {
        self.principal().is_some_and(Principal::is_moderator_or_admin)
    }

    fn is_author_of<O: Authored + ?Sized>(&self, object: &O) -> bool {
        self.principal().is_some_and(|p| p.id == object.author_id())
    }
}

/// Methods that never modify state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMethods(Vec<Method>);

impl SafeMethods {
    /// Build from an explicit list.
    #[must_use]
    pub const fn new(methods: Vec<Method>) -> Self {
        Self(methods)
    }

    /// Returns `true` if `method` is read-only.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }
}

impl Default for SafeMethods {
    fn default() -> Self {
        Self(vec![Method::GET, Method::HEAD, Method::OPTIONS])
    }
}

/// Error returned when a safe-method list contains an invalid token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid HTTP method in safe-method list: {0:?}")]
pub struct InvalidMethod(pub String);

impl FromStr for SafeMethods {
    type Err = InvalidMethod;

    /// Parse a comma-separated list such as `GET,HEAD,OPTIONS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                Method::from_bytes(token.to_ascii_uppercase().as_bytes())
                    .map_err(|_| InvalidMethod(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Access policy attached to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Authenticated admins only.
    AdminOnly,
    /// Anyone may read; only admins may write.
    AdminOrReadOnly,
    /// Anyone may read; authenticated users may create; authors,
    /// moderators and admins may change existing content.
    AuthorModeratorAdminOrReadOnly,
    /// No request-level restriction; authors and staff may change content.
    OwnerOrReadOnlyOrOfficial,
    /// Any authenticated user.
    Authenticated,
}

/// Evaluates [`Policy`] predicates against a configured safe-method set.
#[derive(Debug, Clone, Default)]
pub struct Permissions {
    safe_methods: SafeMethods,
}

impl Permissions {
    /// Create with a custom safe-method set.
    #[must_use]
    pub const fn new(safe_methods: SafeMethods) -> Self {
        Self { safe_methods }
    }

    /// The configured safe methods.
    #[must_use]
    pub const fn safe_methods(&self) -> &SafeMethods {
        &self.safe_methods
    }

    /// Request-level check, before any record is loaded.
    #[must_use]
    pub fn has_permission(&self, policy: Policy, method: &Method, actor: &Actor) -> bool {
        let safe = self.safe_methods.contains(method);
        match policy {
            Policy::AdminOnly => actor.is_admin(),
            Policy::AdminOrReadOnly => safe || actor.is_admin(),
            Policy::AuthorModeratorAdminOrReadOnly => safe || actor.is_authenticated(),
            Policy::OwnerOrReadOnlyOrOfficial => true,
            Policy::Authenticated => actor.is_authenticated(),
        }
    }

    /// Object-level check against an existing record.
    #[must_use]
    pub fn has_object_permission<O: Authored + ?Sized>(
        &self,
        policy: Policy,
        method: &Method,
        actor: &Actor,
        object: &O,
    ) -> bool {
        let safe = self.safe_methods.contains(method);
        match policy {
            Policy::AdminOnly | Policy::AdminOrReadOnly | Policy::Authenticated => {
                self.has_permission(policy, method, actor)
            }
            Policy::AuthorModeratorAdminOrReadOnly | Policy::OwnerOrReadOnlyOrOfficial => {
                safe || actor.is_author_of(object) || actor.is_moderator_or_admin()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Owned(UserId);

    impl Authored for Owned {
        fn author_id(&self) -> UserId {
            self.0
        }
    }

    fn actor(id: i64, role: Role, is_superuser: bool) -> Actor {
        Actor::Authenticated(Principal {
            id: UserId(id),
            username: format!("user{id}"),
            role,
            is_superuser,
        })
    }

    #[test]
    fn superuser_counts_as_admin() {
        let permissions = Permissions::default();
        let root = actor(1, Role::User, true);
        assert!(permissions.has_permission(Policy::AdminOnly, &Method::DELETE, &root));
        assert!(!permissions.has_permission(
            Policy::AdminOnly,
            &Method::GET,
            &actor(2, Role::Moderator, false)
        ));
    }

    #[test]
    fn admin_only_rejects_anonymous_reads() {
        let permissions = Permissions::default();
        assert!(!permissions.has_permission(Policy::AdminOnly, &Method::GET, &Actor::Anonymous));
    }

    #[test]
    fn anonymous_may_read_but_not_write_reviews() {
        let permissions = Permissions::default();
        let policy = Policy::AuthorModeratorAdminOrReadOnly;
        assert!(permissions.has_permission(policy, &Method::GET, &Actor::Anonymous));
        assert!(!permissions.has_permission(policy, &Method::POST, &Actor::Anonymous));
        assert!(permissions.has_permission(policy, &Method::POST, &actor(1, Role::User, false)));
    }

    #[test]
    fn author_and_staff_may_edit() {
        let permissions = Permissions::default();
        let policy = Policy::AuthorModeratorAdminOrReadOnly;
        let review = Owned(UserId(1));
        for (who, allowed) in [
            (actor(1, Role::User, false), true),
            (actor(2, Role::User, false), false),
            (actor(3, Role::Moderator, false), true),
            (actor(4, Role::Admin, false), true),
            (actor(5, Role::User, true), true),
        ] {
            assert_eq!(
                permissions.has_object_permission(policy, &Method::PATCH, &who, &review),
                allowed,
                "{who:?}"
            );
        }
    }

    #[test]
    fn owner_or_official_has_no_request_level_gate() {
        let permissions = Permissions::default();
        let policy = Policy::OwnerOrReadOnlyOrOfficial;
        assert!(permissions.has_permission(policy, &Method::DELETE, &Actor::Anonymous));
        assert!(!permissions.has_object_permission(
            policy,
            &Method::DELETE,
            &Actor::Anonymous,
            &Owned(UserId(1))
        ));
    }

    #[test]
    fn safe_methods_are_configurable() {
        let safe: SafeMethods = "get, head".parse().unwrap();
        let permissions = Permissions::new(safe);
        let policy = Policy::AdminOrReadOnly;
        assert!(permissions.has_permission(policy, &Method::HEAD, &Actor::Anonymous));
        assert!(!permissions.has_permission(policy, &Method::OPTIONS, &Actor::Anonymous));
    }

    #[test]
    fn invalid_safe_method_is_rejected() {
        assert!("GET,NOT A METHOD".parse::<SafeMethods>().is_err());
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::User), Just(Role::Moderator), Just(Role::Admin)]
    }

    fn unsafe_method_strategy() -> impl Strategy<Value = Method> {
        prop_oneof![
            Just(Method::POST),
            Just(Method::PUT),
            Just(Method::PATCH),
            Just(Method::DELETE)
        ]
    }

    proptest! {
        #[test]
        fn plain_users_never_modify_foreign_content(
            author in 1i64..1000,
            caller in 1i64..1000,
            method in unsafe_method_strategy(),
        ) {
            prop_assume!(author != caller);
            let permissions = Permissions::default();
            let who = actor(caller, Role::User, false);
            for policy in [Policy::AuthorModeratorAdminOrReadOnly, Policy::OwnerOrReadOnlyOrOfficial] {
                prop_assert!(!permissions.has_object_permission(policy, &method, &who, &Owned(UserId(author))));
            }
        }

        #[test]
        fn everyone_reads_public_content(
            role in role_strategy(),
            superuser in any::<bool>(),
            anonymous in any::<bool>(),
        ) {
            let permissions = Permissions::default();
            let who = if anonymous { Actor::Anonymous } else { actor(1, role, superuser) };
            for policy in [
                Policy::AdminOrReadOnly,
                Policy::AuthorModeratorAdminOrReadOnly,
                Policy::OwnerOrReadOnlyOrOfficial,
            ] {
                prop_assert!(permissions.has_permission(policy, &Method::GET, &who));
                prop_assert!(permissions.has_object_permission(policy, &Method::GET, &who, &Owned(UserId(99))));
            }
        }

        #[test]
        fn admin_only_matches_is_admin(role in role_strategy(), superuser in any::<bool>()) {
            let permissions = Permissions::default();
            let who = actor(1, role, superuser);
            let expected = who.principal().is_some_and(Principal::is_admin);
            prop_assert_eq!(permissions.has_permission(Policy::AdminOnly, &Method::GET, &who), expected);
        }
    }
}
