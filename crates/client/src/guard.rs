//! Route guard for protected areas of a front end.
//!
//! Mirrors the gatekeeper a UI shell puts in front of admin routes: evaluate
//! the session before rendering, show nothing while the check is pending,
//! and redirect to the sign-in page when the check fails.

use tokio::sync::watch;
use tracing::instrument;

use crate::session::{SessionManager, SessionSnapshot};

/// Where denied visitors are sent.
pub const SIGN_IN_PATH: &str = "/signin";

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Validation is still in flight; render nothing yet.
    Pending,
    /// Session is valid; render the protected content.
    Allowed,
    /// No usable session; redirect to [`SIGN_IN_PATH`].
    Denied,
}

impl Access {
    /// Redirect destination, present only for [`Access::Denied`].
    #[must_use]
    pub const fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Denied => Some(SIGN_IN_PATH),
            Self::Pending | Self::Allowed => None,
        }
    }
}

/// Guards entry into protected routes by consulting the session manager.
///
/// Holds a subscription to session changes so a shell can re-evaluate when
/// the session is cleared underneath it (expiry, 401 cleanup, logout in
/// another view).
pub struct RouteGuard {
    session: SessionManager,
    changes: watch::Receiver<SessionSnapshot>,
}

impl RouteGuard {
    pub(crate) fn new(session: SessionManager) -> Self {
        let changes = session.subscribe();
        Self { session, changes }
    }

    /// Evaluate access right now.
    ///
    /// The token-absent case short-circuits to [`Access::Denied`] without
    /// any network traffic; otherwise the session manager validates (and
    /// silently renews) the token. Callers may render [`Access::Pending`]
    /// while awaiting this.
    #[instrument(skip(self))]
    pub async fn evaluate(&self) -> Access {
        if self.session.access_token().await.is_none() {
            return Access::Denied;
        }
        if self.session.is_valid().await {
            Access::Allowed
        } else {
            Access::Denied
        }
    }

    /// Wait until the session changes, then re-evaluate.
    ///
    /// Lets a shell react when the session is cleared (or established)
    /// underneath it. Resolves immediately if a change arrived since the
    /// last call.
    pub async fn watch_access(&mut self) -> Access {
        // The sender lives as long as the session manager we hold, so the
        // channel cannot close while `self` exists.
        let _ = self.changes.changed().await;
        self.changes.borrow_and_update();
        self.evaluate().await
    }

    /// The snapshot the guard last observed.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.changes.borrow().clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_denied_redirects() {
        assert_eq!(Access::Denied.redirect_target(), Some(SIGN_IN_PATH));
        assert_eq!(Access::Pending.redirect_target(), None);
        assert_eq!(Access::Allowed.redirect_target(), None);
    }
}
