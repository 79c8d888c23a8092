//! Navigation gating on session state.

use crate::session::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Projects,
    ProjectDetail,
    Users,
    History,
}

impl Route {
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Projects => "/projects",
            Self::ProjectDetail => "/projects/:name",
            Self::Users => "/users",
            Self::History => "/history",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Whatever performs navigation: the TUI switches screens, the CLI prints a
/// hint and exits non-zero.
pub trait Navigator {
    fn redirect_to_login(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn new() -> Self {
        Self
    }

    /// `true` iff someone is logged in. On denial the navigator is sent to
    /// the login route before this returns.
    pub fn can_activate<A, N>(&self, session: &A, navigator: &mut N) -> bool
    where
        A: AuthState + ?Sized,
        N: Navigator + ?Sized,
    {
        if session.is_logged_in() {
            return true;
        }
        tracing::debug!("navigation denied, redirecting to login");
        navigator.redirect_to_login();
        false
    }

    /// Gate a specific route: public routes always pass.
    pub fn check<A, N>(&self, route: Route, session: &A, navigator: &mut N) -> bool
    where
        A: AuthState + ?Sized,
        N: Navigator + ?Sized,
    {
        route.is_public() || self.can_activate(session, navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::user;
    use crate::session::{MemoryStorage, SessionStore};

    #[derive(Default)]
    struct Recorder {
        redirects: usize,
    }

    impl Navigator for Recorder {
        fn redirect_to_login(&mut self) {
            self.redirects += 1;
        }
    }

    #[test]
    fn test_denies_and_redirects_when_logged_out() {
        let session = SessionStore::restore(MemoryStorage::new());
        let mut nav = Recorder::default();
        assert!(!RouteGuard::new().can_activate(&session, &mut nav));
        assert_eq!(nav.redirects, 1);
    }

    #[test]
    fn test_allows_when_logged_in_without_redirect() {
        let mut session = SessionStore::restore(MemoryStorage::new());
        session.establish(user(1, "ana@example.com")).unwrap();
        let mut nav = Recorder::default();
        assert!(RouteGuard::new().can_activate(&session, &mut nav));
        assert_eq!(nav.redirects, 0);
    }

    #[test]
    fn test_public_routes_pass_when_logged_out() {
        let session = SessionStore::restore(MemoryStorage::new());
        let mut nav = Recorder::default();
        let guard = RouteGuard::new();
        assert!(guard.check(Route::Login, &session, &mut nav));
        assert!(guard.check(Route::Register, &session, &mut nav));
        assert_eq!(nav.redirects, 0);

        for route in [
            Route::Dashboard,
            Route::Projects,
            Route::ProjectDetail,
            Route::Users,
            Route::History,
        ] {
            assert!(!guard.check(route, &session, &mut nav), "{route}");
        }
        assert_eq!(nav.redirects, 5);
    }

    #[test]
    fn test_logout_revokes_access() {
        let mut session = SessionStore::restore(MemoryStorage::new());
        session.establish(user(1, "ana@example.com")).unwrap();
        session.logout();
        let mut nav = Recorder::default();
        assert!(!RouteGuard::new().can_activate(&session, &mut nav));
        assert_eq!(nav.redirects, 1);
    }
}
