//! Route Guard
//!
//! Decides synchronously, before anything renders, whether a protected view
//! may appear. The navigation layer has exactly two route classes - public
//! (login) and protected (dashboard) - plus a catch-all not-found fallback;
//! an unauthenticated visit to a protected route resolves to the login
//! entry point instead of rendering, so protected content never flashes.

use tracing::debug;

use crate::session::SessionStore;

/// The navigation targets the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Public login entry point
    Login,
    /// Protected dashboard view
    Dashboard,
    /// Catch-all for unknown paths
    NotFound,
}

impl Route {
    /// Whether entering this route requires a valid session
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Gates rendering of protected views on session validity.
///
/// Validity is read from the session store, which the controller keeps
/// consistent with its own state on every transition; this also makes the
/// guard usable at boot, before a controller exists.
#[derive(Clone)]
pub struct RouteGuard {
    store: SessionStore,
}

impl RouteGuard {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Whether the given route may render right now.
    pub fn can_enter(&self, route: Route) -> bool {
        !route.is_protected() || self.store.is_valid()
    }

    /// Resolve a requested path to the route that should actually render:
    /// blocked protected routes fall back to login, the index dispatches on
    /// auth state, anything unknown is the not-found page.
    pub fn resolve(&self, path: &str) -> Route {
        let requested = match path {
            "/login" => Route::Login,
            "/" | "/dashboard" => Route::Dashboard,
            _ => Route::NotFound,
        };
        let resolved = if self.can_enter(requested) {
            requested
        } else {
            Route::Login
        };
        debug!(path, ?resolved, authenticated = self.store.is_valid(), "resolved route");
        resolved
    }
}
