//! Project-scoped permissions for the current user.

use std::collections::HashMap;

use crate::api::ProjectApi;
use crate::model::Role;

/// Permission predicates derived from a resolved role. An unresolved role
/// grants nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    role: Option<Role>,
}

impl Capabilities {
    pub fn new(role: Option<Role>) -> Self {
        Self { role }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_member(&self) -> bool {
        self.role == Some(Role::Member)
    }

    pub fn is_observer(&self) -> bool {
        self.role == Some(Role::Observer)
    }

    /// Create, edit, and delete tasks.
    pub fn can_edit(&self) -> bool {
        self.is_admin() || self.is_member()
    }

    /// Invite, re-role, and remove members; edit or delete the project.
    pub fn can_manage_members(&self) -> bool {
        self.is_admin()
    }
}

/// Resolves and caches the current user's role per project.
///
/// The cache lives as long as the resolver; drop it (or call
/// [`RoleResolver::invalidate`]) when the view that owns it goes away. Only
/// answered lookups are cached, so a failed request is retried on the next
/// `resolve`.
#[derive(Debug, Default)]
pub struct RoleResolver {
    cache: HashMap<String, Option<Role>>,
}

impl RoleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Role of `email` in `project`, asking the backend on a cache miss.
    /// Lookup failures yield [`Capabilities::none`].
    pub async fn resolve<P: ProjectApi>(
        &mut self,
        backend: &P,
        project: &str,
        email: &str,
    ) -> Capabilities {
        if let Some(cached) = self.cache.get(project) {
            return Capabilities::new(*cached);
        }
        match backend.member_role(project, email).await {
            Ok(lookup) => self.record(project, lookup.role),
            Err(e) => {
                tracing::debug!(project, error = %e, "role lookup failed, granting no permissions");
                Capabilities::none()
            }
        }
    }

    /// Store a role fetched elsewhere (the TUI worker) and return its
    /// capabilities.
    pub fn record(&mut self, project: &str, role: Option<Role>) -> Capabilities {
        self.cache.insert(project.to_string(), role);
        Capabilities::new(role)
    }

    pub fn cached(&self, project: &str) -> Option<Capabilities> {
        self.cache.get(project).map(|r| Capabilities::new(*r))
    }

    pub fn invalidate(&mut self, project: &str) {
        self.cache.remove(project);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;

    fn backend_with(role: &str) -> FakeBackend {
        let mut backend = FakeBackend::default();
        backend.roles.insert(
            ("Apollo".to_string(), "ana@example.com".to_string()),
            role.to_string(),
        );
        backend
    }

    #[test]
    fn test_predicates_are_mutually_exclusive() {
        for role in Role::ALL {
            let caps = Capabilities::new(Some(role));
            let flags = [caps.is_admin(), caps.is_member(), caps.is_observer()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{role}");
        }
    }

    #[test]
    fn test_capability_table() {
        let admin = Capabilities::new(Some(Role::Admin));
        assert!(admin.can_edit() && admin.can_manage_members());

        let member = Capabilities::new(Some(Role::Member));
        assert!(member.can_edit());
        assert!(!member.can_manage_members());

        let observer = Capabilities::new(Some(Role::Observer));
        assert!(!observer.can_edit());
        assert!(!observer.can_manage_members());
    }

    #[test]
    fn test_unresolved_role_grants_nothing() {
        let caps = Capabilities::none();
        assert!(!caps.is_admin() && !caps.is_member() && !caps.is_observer());
        assert!(!caps.can_edit());
        assert!(!caps.can_manage_members());
    }

    #[tokio::test]
    async fn test_resolve_localized_role() {
        let backend = backend_with("ADMINISTRATEUR");
        let mut resolver = RoleResolver::new();
        let caps = resolver.resolve(&backend, "Apollo", "ana@example.com").await;
        assert!(caps.is_admin());
    }

    #[tokio::test]
    async fn test_resolve_caches_per_project() {
        let backend = backend_with("MEMBER");
        let mut resolver = RoleResolver::new();
        resolver.resolve(&backend, "Apollo", "ana@example.com").await;
        let caps = resolver.resolve(&backend, "Apollo", "ana@example.com").await;
        assert!(caps.is_member());
        assert_eq!(backend.role_calls(), 1);

        resolver.invalidate("Apollo");
        resolver.resolve(&backend, "Apollo", "ana@example.com").await;
        assert_eq!(backend.role_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_role_string_grants_nothing() {
        let backend = backend_with("admin");
        let mut resolver = RoleResolver::new();
        let caps = resolver.resolve(&backend, "Apollo", "ana@example.com").await;
        assert_eq!(caps, Capabilities::none());
        assert!(resolver.cached("Apollo").is_some());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_cached() {
        let backend = FakeBackend::default();
        let mut resolver = RoleResolver::new();
        let caps = resolver.resolve(&backend, "Apollo", "ghost@example.com").await;
        assert!(!caps.can_edit());
        assert!(resolver.cached("Apollo").is_none());

        resolver.resolve(&backend, "Apollo", "ghost@example.com").await;
        assert_eq!(backend.role_calls(), 2);
    }
}
