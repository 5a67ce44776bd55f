//! Shared helpers for the integration suites: a stubbed auth endpoint, a
//! recording notifier and a controller fixture wired to both.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use dashgate::{AuthController, Config, Credentials, MemoryStorage, Notifier, UserProfile};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT_TRACING: Once = Once::new();

pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "dashgate=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn demo_profile() -> UserProfile {
    UserProfile {
        id: 1,
        username: "emilys".to_string(),
        email: "emily.johnson@x.dummyjson.com".to_string(),
        first_name: "Emily".to_string(),
        last_name: "Johnson".to_string(),
        gender: Some("female".to_string()),
        image: None,
    }
}

/// Success body the remote service answers a login with: profile fields at
/// the top level plus the token.
pub fn login_success_body(token: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "username": "emilys",
        "email": "emily.johnson@x.dummyjson.com",
        "firstName": "Emily",
        "lastName": "Johnson",
        "gender": "female",
        "token": token,
    })
}

pub fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Mount a login stub answering with the given template.
pub async fn mount_login(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Notifier that records every message for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub successes: Arc<Mutex<Vec<String>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Controller over in-memory storage, pointed at the stub server.
pub fn controller_for(server: &MockServer) -> (AuthController, RecordingNotifier) {
    controller_with_storage(server, Arc::new(MemoryStorage::new()))
}

pub fn controller_with_storage(
    server: &MockServer,
    storage: Arc<MemoryStorage>,
) -> (AuthController, RecordingNotifier) {
    init_tracing();
    let config = Config::builder()
        .api_url(server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .expect("test config is valid");
    let notifier = RecordingNotifier::default();
    let controller = AuthController::with_notifier(config, storage, Box::new(notifier.clone()));
    (controller, notifier)
}

/// Poll the controller until the in-flight request settles.
pub async fn poll_until_settled(controller: &mut AuthController) {
    for _ in 0..250 {
        if controller.poll() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("login request did not settle in time");
}
