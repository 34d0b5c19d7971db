use crate::cli::Args;
use crate::judge::{CodeExecutor, HttpExecutor, HttpExecutorConfig};
use crate::store::{JudgeStore, PgStore};
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use axum_keycloak_auth::PassthroughMode;
use axum_keycloak_auth::instance::{KeycloakAuthInstance, KeycloakConfig};
use axum_keycloak_auth::layer::KeycloakAuthLayer;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod cli;
pub mod judge;
pub mod model;
pub mod payloads;
pub mod response;
pub mod schema;
pub mod store;

mod api;
mod errors;

/// Shared handles every handler works with.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JudgeStore>,
    pub executor: Arc<dyn CodeExecutor>,
    /// Language prefix of the exercise detail page, e.g. `en`.
    pub site_language: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn JudgeStore>,
        executor: Arc<dyn CodeExecutor>,
        site_language: impl Into<String>,
    ) -> Self {
        AppState {
            store,
            executor,
            site_language: site_language.into(),
        }
    }

    /// Where every submission redirects to.
    pub fn exercise_detail_path(&self, exercise_id: i64) -> String {
        format!("/{}/exercise/{}/", self.site_language, exercise_id)
    }
}

pub fn init_router(args: &Args) -> anyhow::Result<Router> {
    info!("Initializing database pool...");
    let store = PgStore::connect(&args.connection_str, args.db_pool_max_size)
        .context("Failed to initialize database pool")?;

    info!("Initializing execution client for {}...", args.executor_url);
    let executor = HttpExecutor::new(HttpExecutorConfig {
        url: args.executor_url.clone(),
        client_secret: args.executor_client_secret.clone(),
        lang: args.executor_lang.clone(),
        time_limit: args.executor_time_limit,
        memory_limit: args.executor_memory_limit,
        timeout: Duration::from_secs(args.executor_timeout_secs),
    })
    .context("Failed to initialize execution client")?;

    info!("Initializing Keycloak authentication layer...");
    let keycloak_layer =
        init_protection_layer(args).context("Failed to initialize Keycloak layer")?;

    let state = AppState::new(Arc::new(store), Arc::new(executor), &args.site_language);

    info!("Initializing router...");
    Ok(init_router_internal(state, keycloak_layer))
}

pub fn init_test_router(state: AppState) -> Router {
    Router::new()
        .nest("/exercise", exercise_routes())
        .nest("/editor", editor_routes())
        .with_state(state)
}

fn init_router_internal(state: AppState, keycloak_layer: KeycloakAuthLayer<String>) -> Router {
    let exercise_api = exercise_routes().layer(keycloak_layer.clone());
    let editor_api = editor_routes().layer(keycloak_layer);

    Router::new()
        .nest("/exercise", exercise_api)
        .nest("/editor", editor_api)
        .with_state(state)
}

fn init_protection_layer(args: &Args) -> anyhow::Result<KeycloakAuthLayer<String>> {
    let config = KeycloakConfig::builder()
        .server(args.keycloak_server_url.clone())
        .realm(args.keycloak_realm.clone())
        .build();

    let instance = KeycloakAuthInstance::new(config);

    let layer = KeycloakAuthLayer::builder()
        .instance(instance)
        .passthrough_mode(PassthroughMode::Block)
        .persist_raw_claims(false)
        .expected_audiences(vec![args.keycloak_audiences.clone()])
        .build();

    Ok(layer)
}

fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api::exercise::list_exercises_not_deprecated))
        .route("/all", get(api::exercise::list_all_exercises))
        .route("/{exercise_id}", get(api::exercise::show_exercise))
        .route(
            "/process/{exercise_id}",
            post(api::exercise::process_user_exercise),
        )
}

fn editor_routes() -> Router<AppState> {
    Router::new().route("/import_exercise", post(api::editor::import_exercise))
}
