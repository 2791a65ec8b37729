//! Page routes and the session guard in front of them.

use std::fmt;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Onboarding,
    Dashboard,
    Chat,
    Database,
    Settings,
    Profile,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Landing,
        Route::Onboarding,
        Route::Dashboard,
        Route::Chat,
        Route::Database,
        Route::Settings,
        Route::Profile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Onboarding => "/onboarding",
            Route::Dashboard => "/dashboard",
            Route::Chat => "/chat",
            Route::Database => "/database",
            Route::Settings => "/settings",
            Route::Profile => "/profile",
        }
    }

    /// Unknown paths fall through to the landing page.
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == trimmed)
            .unwrap_or(Route::Landing)
    }

    pub fn is_protected(self) -> bool {
        self != Route::Landing
    }

    /// Entries shown in the sidebar, in order.
    pub fn navigation() -> [(&'static str, Route); 4] {
        [
            ("Dashboard", Route::Dashboard),
            ("AI Assistant", Route::Chat),
            ("Database", Route::Database),
            ("Settings", Route::Settings),
        ]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    /// `from` is kept so a caller can return there after signing in.
    Redirect { to: Route, from: Route },
}

/// Token presence is the only check: no expiry, no refresh.
pub fn guard(route: Route, session: &Session) -> Navigation {
    if !route.is_protected() || session.is_authenticated() {
        Navigation::Allow(route)
    } else {
        tracing::debug!(route = %route, "No session, redirecting to landing");
        Navigation::Redirect {
            to: Route::Landing,
            from: route,
        }
    }
}
