//! Route Table and Navigation Guard
//!
//! The client's routed pages as a static table with `:param` segments, plus
//! a pre-navigation guard that keeps unauthenticated users out of flagged
//! routes while preserving the requested destination for post-login return.

use tracing::debug;
use url::form_urlencoded;

use crate::services::session::SessionStore;

/// Query parameter carrying the original target through the login redirect
const REDIRECT_PARAM: &str = "redirect";

/// One routed page
#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_auth: bool,
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDecision {
    /// Navigation proceeds to the requested target
    Allow,
    /// Navigation is sent elsewhere, typically to the login page
    Redirect { to: String },
}

/// The client's routed pages. Favorites and continue-watching are served by
/// user-filtered endpoints, so those routes require a session.
pub fn default_routes() -> Vec<Route> {
    vec![
        Route {
            name: "home",
            path: "/",
            requires_auth: false,
        },
        Route {
            name: "catalog",
            path: "/catalog",
            requires_auth: false,
        },
        Route {
            name: "title",
            path: "/title/:id",
            requires_auth: false,
        },
        Route {
            name: "watch",
            path: "/watch/:id",
            requires_auth: false,
        },
        Route {
            name: "my-list",
            path: "/my-list",
            requires_auth: true,
        },
        Route {
            name: "continue",
            path: "/continue",
            requires_auth: true,
        },
        Route {
            name: "login",
            path: "/login",
            requires_auth: false,
        },
    ]
}

/// Pre-navigation check protecting authentication-required routes
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    routes: Vec<Route>,
    login_path: String,
}

impl RouteGuard {
    /// Guard the default route table, redirecting to `/login`
    pub fn new(session: SessionStore) -> Self {
        Self::with_routes(session, default_routes(), "/login")
    }

    /// Guard a custom route table
    pub fn with_routes(session: SessionStore, routes: Vec<Route>, login_path: &str) -> Self {
        Self {
            session,
            routes,
            login_path: login_path.to_string(),
        }
    }

    /// Decide whether navigation to `target` may proceed.
    ///
    /// The target's query string is ignored for route matching but kept in
    /// the redirect parameter so the login page can return to the exact
    /// original destination.
    pub fn check(&self, target: &str) -> NavDecision {
        let path = target.split('?').next().unwrap_or(target);

        let requires_auth = self
            .routes
            .iter()
            .any(|route| route.requires_auth && matches_path(route.path, path));

        if requires_auth && !self.session.is_authenticated() {
            let query: String = form_urlencoded::Serializer::new(String::new())
                .append_pair(REDIRECT_PARAM, target)
                .finish();
            let to = format!("{}?{}", self.login_path, query);
            debug!("Redirecting unauthenticated navigation from {} to {}", target, to);
            return NavDecision::Redirect { to };
        }

        NavDecision::Allow
    }
}

/// Match a concrete path against a route pattern where `:param` segments
/// match any single non-empty segment
fn matches_path(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    if pattern_segments.len() != path_segments.len() {
        return false;
    }

    pattern_segments
        .iter()
        .zip(&path_segments)
        .all(|(pattern_segment, path_segment)| {
            if pattern_segment.starts_with(':') {
                !path_segment.is_empty()
            } else {
                pattern_segment == path_segment
            }
        })
}
