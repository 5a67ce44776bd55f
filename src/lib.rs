//! dashgate - Session-Aware Login Client
//!
//! The client-side authentication lifecycle of a small dashboard app: how
//! credentials are validated, exchanged for a bearer token, persisted,
//! expired and used to gate navigation. Rendering, styling and translations
//! live in the presentation layer; this crate exposes the components behind
//! them plus the collaborator traits they plug into.
//!
//! # Module Structure
//!
//! - **`validate`** - pure username/password rules and strength scoring
//! - **`storage`** - key-value persistence collaborator (file / in-memory)
//! - **`session`** - persisted session with lazy 24-hour expiry
//! - **`gateway`** - HTTP boundary to the remote auth service
//! - **`controller`** - the login state machine and UI state projection
//! - **`guard`** - synchronous route gating for protected views
//! - **`config`**, **`error`** - configuration and the error taxonomy
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dashgate::{AuthController, Config, FileStorage, Route, RouteGuard};
//!
//! let mut controller = AuthController::new(Config::new(), Arc::new(FileStorage::new()));
//! let guard = RouteGuard::new(controller.store().clone());
//!
//! if guard.can_enter(Route::Dashboard) {
//!     // render the dashboard
//! } else {
//!     controller.submit(AuthController::demo_credentials());
//!     // ...then call controller.poll() from the UI update loop
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod session;
pub mod storage;
pub mod validate;

pub use config::{Config, ConfigError};
pub use controller::{AuthController, AuthState, LogNotifier, Notifier, Phase};
pub use error::{AuthError, FieldError};
pub use gateway::{AuthGateway, Credentials, LoginResponse};
pub use guard::{Route, RouteGuard};
pub use session::{Session, SessionStore, UserProfile, SESSION_TTL_MS};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
