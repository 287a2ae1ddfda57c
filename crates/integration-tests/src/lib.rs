//! Integration tests for the `BileMo` API.
//!
//! The tests drive the real axum router in-process with
//! `tower::ServiceExt::oneshot`, backed by the in-memory store. No database
//! or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bilemo-integration-tests
//! ```
//!
//! # Fixture
//!
//! [`TestContext::new`] seeds two customers, `alice` and `bob`, each with an
//! API token, 25 phones, two users owned by alice and one owned by bob.

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use bilemo_api::config::AccessSettings;
use bilemo_api::db::{DataStore, MemoryStore, RecordWriter};
use bilemo_api::models::{NewUser, Phone, PhoneDetails, User, UserProfile};
use bilemo_api::routes;
use bilemo_api::services::tokens::TokenHasher;
use bilemo_api::state::AppState;
use bilemo_core::{Identity, PageSize};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PEPPER: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";
pub const ALICE_TOKEN: &str = "alice-token-0001";
pub const BOB_TOKEN: &str = "bob-token-0002";
pub const PHONE_COUNT: usize = 25;

/// A seeded application plus handles for inspecting it.
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub alice: Identity,
    pub bob: Identity,
    /// Users owned by alice, in creation order.
    pub alice_users: Vec<User>,
    /// The single user owned by bob.
    pub bob_user: User,
    router: Router,
}

/// Access settings used by every test context.
#[must_use]
pub fn test_settings() -> AccessSettings {
    AccessSettings {
        cache_ttl: Duration::from_secs(3600),
        cache_capacity: 1_000,
        page_size: PageSize::new(10).expect("non-zero page size"),
        token_pepper: SecretString::from(TEST_PEPPER.to_owned()),
    }
}

/// A valid user profile with a unique username.
#[must_use]
pub fn profile(username: &str) -> UserProfile {
    UserProfile {
        username: username.to_owned(),
        name: "Jean".to_owned(),
        surname: "Dupont".to_owned(),
        email: format!("{username}@orange.fr"),
    }
}

impl TestContext {
    pub async fn new() -> Self {
        let settings = test_settings();
        let hasher = TokenHasher::new(&settings.token_pepper).expect("hasher");
        let store = Arc::new(MemoryStore::new());

        let alice = store
            .insert_customer("alice", hasher.hash(ALICE_TOKEN))
            .await
            .expect("insert alice")
            .identity();
        let bob = store
            .insert_customer("bob", hasher.hash(BOB_TOKEN))
            .await
            .expect("insert bob")
            .identity();

        for i in 1..=PHONE_COUNT {
            RecordWriter::<Phone>::create(
                store.as_ref(),
                PhoneDetails {
                    name: format!("Phone {i}"),
                    color: "Black".to_owned(),
                    price: 500,
                    description: "A phone".to_owned(),
                },
            )
            .await
            .expect("insert phone");
        }

        let mut alice_users = Vec::new();
        for username in ["alice-one", "alice-two"] {
            let user = RecordWriter::<User>::create(
                store.as_ref(),
                NewUser {
                    customer: alice.name.clone(),
                    profile: profile(username),
                },
            )
            .await
            .expect("insert alice user");
            alice_users.push(user);
        }
        let bob_user = RecordWriter::<User>::create(
            store.as_ref(),
            NewUser {
                customer: bob.name.clone(),
                profile: profile("bob-one"),
            },
        )
        .await
        .expect("insert bob user");

        let dyn_store: Arc<dyn DataStore> = store.clone();
        let state = AppState::new(&settings, dyn_store).expect("state");
        let router = routes::app(state.clone());

        Self {
            state,
            store,
            alice,
            bob,
            alice_users,
            bob_user,
            router,
        }
    }

    /// Send a request and decode the JSON response body (`Null` if empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request");

        self.send_request(request).await
    }

    /// Send a prebuilt request, e.g. one with a raw (non-JSON) body.
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }
}
