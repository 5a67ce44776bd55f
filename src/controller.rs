//! Auth Controller
//!
//! The login state machine. A controller owns the gateway, the session store
//! and a notifier, and moves through four phases:
//!
//! ```text
//! Idle --submit--> Submitting --success--> Authenticated
//!                      |                        |
//!                      +------failure------> Failed --submit--> Submitting
//!                                               |
//! Authenticated --logout--> Idle          reset +--> Idle
//! ```
//!
//! The phase itself answers "is a login in flight" - there is no separate
//! loading flag to drift out of sync, and a second `submit` while one is in
//! flight is ignored. Requests run on a background thread (each builds a
//! small tokio runtime and blocks on the gateway call, the same shape the
//! login happens in an event-driven UI); the completion comes back over a
//! channel and is applied by [`AuthController::poll`] on the UI thread.
//! Dropping the channel receiver on `reset`/`logout` is the liveness guard:
//! a response that arrives for a torn-down login view is simply discarded.

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AuthError;
use crate::gateway::{AuthGateway, Credentials, LoginResponse};
use crate::session::{SessionStore, UserProfile};
use crate::storage::KeyValueStorage;
use crate::validate::{self, DEMO_PASSWORD, DEMO_USERNAME};

/// Where the controller currently is in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No attempt in progress, no error to show
    Idle,
    /// Exactly one login request is in flight
    Submitting,
    /// A valid session exists
    Authenticated,
    /// The last attempt failed; the error is held for display
    Failed,
}

/// Read-only projection of the controller for views and the route guard.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<AuthError>,
}

/// Toast/alert collaborator. Receives rendered messages, never structured
/// error codes.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that writes to the log, for headless use and tests.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(message, "auth notification");
    }

    fn error(&self, message: &str) {
        warn!(message, "auth notification");
    }
}

/// Drives the login lifecycle and keeps the in-memory state consistent with
/// the persisted session on every transition.
pub struct AuthController {
    gateway: AuthGateway,
    store: SessionStore,
    notifier: Box<dyn Notifier>,
    phase: Phase,
    user: Option<UserProfile>,
    error: Option<AuthError>,
    pending: Option<Receiver<Result<LoginResponse, AuthError>>>,
}

impl AuthController {
    /// Build a controller over the given storage. If a valid session is
    /// already persisted, the controller starts authenticated with the
    /// persisted profile.
    pub fn new(config: Config, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_notifier(config, storage, Box::new(LogNotifier))
    }

    pub fn with_notifier(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let store = SessionStore::new(storage);
        let gateway = AuthGateway::new(config, store.clone());

        let (phase, user) = match store.load() {
            Some(session) => {
                debug!(username = %session.user.username, "restored persisted session");
                (Phase::Authenticated, Some(session.user))
            }
            None => (Phase::Idle, None),
        };

        Self {
            gateway,
            store,
            notifier,
            phase,
            user,
            error: None,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session store this controller writes to, shared with the guard.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Current UI-facing state, derived from the phase.
    pub fn state(&self) -> AuthState {
        AuthState {
            is_authenticated: self.phase == Phase::Authenticated,
            user: self.user.clone(),
            is_loading: self.phase == Phase::Submitting,
            error: self.error.clone(),
        }
    }

    /// Credentials of the well-known demo account, for the quick-login
    /// button on the login form.
    pub fn demo_credentials() -> Credentials {
        Credentials {
            username: DEMO_USERNAME.to_string(),
            password: DEMO_PASSWORD.to_string(),
        }
    }

    /// Start a login attempt. Returns `false` when an attempt is already in
    /// flight (the call is ignored); otherwise the credentials are validated
    /// locally and, if well-formed, the request is started in the
    /// background. Completion is applied by [`poll`](Self::poll).
    pub fn submit(&mut self, credentials: Credentials) -> bool {
        if self.phase == Phase::Submitting {
            debug!("login already in flight, ignoring submit");
            return false;
        }

        if let Err(e) = validate::validate_username(&credentials.username) {
            self.fail(AuthError::validation("username", e.to_string()));
            return true;
        }
        // The demo account has exactly one password; a wrong one is knowable
        // without asking the server, even before the complexity rules run.
        if credentials.username == DEMO_USERNAME && credentials.password != DEMO_PASSWORD {
            self.fail(AuthError::validation(
                "password",
                format!("is wrong for the demo account, use \"{DEMO_PASSWORD}\""),
            ));
            return true;
        }
        if let Err(e) = validate::validate_password(&credentials.username, &credentials.password) {
            self.fail(AuthError::validation("password", e.to_string()));
            return true;
        }

        debug!(username = %credentials.username, "starting login request");
        self.phase = Phase::Submitting;
        self.error = None;

        let gateway = self.gateway.clone();
        let (tx, rx) = channel();
        self.pending = Some(rx);
        std::thread::spawn(move || {
            let result = run_login(&gateway, &credentials);
            // The receiver is gone if the view reset while we were busy
            let _ = tx.send(result);
        });
        true
    }

    /// Apply a finished login request, if one has completed. Returns `true`
    /// when a transition happened. Call this from the UI update loop.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                // Request thread died without reporting; treat as no response
                self.pending = None;
                self.fail(AuthError::ConnectionError);
                return true;
            }
        };
        self.pending = None;

        if self.phase != Phase::Submitting {
            // reset/logout happened while the request was in flight
            debug!("discarding login response for a torn-down attempt");
            return false;
        }

        match result {
            Ok(response) => {
                self.store.save(&response.token, &response.user);
                info!(username = %response.user.username, "login succeeded");
                self.notifier
                    .success(&format!("Welcome back, {}!", response.user.display_name()));
                self.phase = Phase::Authenticated;
                self.user = Some(response.user);
                self.error = None;
            }
            Err(e) => self.fail(e),
        }
        true
    }

    /// End the session: notify the server best-effort, clear the persisted
    /// session, return to `Idle`. Never fails user-visibly.
    pub fn logout(&mut self) {
        // Any in-flight login response is no longer wanted
        self.pending = None;

        let token = self.store.token();
        let gateway = self.gateway.clone();
        std::thread::spawn(move || run_logout(&gateway, token));

        self.store.clear();
        self.phase = Phase::Idle;
        self.user = None;
        self.error = None;
        info!("logged out");
    }

    /// Clear transient state when the login view is torn down, so a stale
    /// error does not resurface on remount. The persisted session is not
    /// touched; an authenticated controller stays authenticated.
    pub fn reset(&mut self) {
        self.pending = None;
        self.error = None;
        if matches!(self.phase, Phase::Submitting | Phase::Failed) {
            self.phase = Phase::Idle;
        }
    }

    fn fail(&mut self, error: AuthError) {
        debug!(%error, "login attempt failed");
        self.notifier.error(&error.to_string());
        self.phase = Phase::Failed;
        self.user = None;
        self.error = Some(error);
    }
}

fn run_login(gateway: &AuthGateway, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            warn!(error = %e, "failed to start request runtime");
            AuthError::ConnectionError
        })?;
    rt.block_on(gateway.login(credentials))
}

fn run_logout(gateway: &AuthGateway, token: Option<String>) {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(gateway.logout(token)),
        Err(e) => debug!(error = %e, "failed to start request runtime for logout"),
    }
}
