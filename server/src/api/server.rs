//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::get;
use tokio::net::TcpListener;

use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::{AuthManager, AuthState, require_auth};
use super::embedded;
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{
    activity, agreements, auth, employees, health, infra, leads, links, projects, proposals,
    tasks, team,
};
use crate::core::CoreApp;
use crate::core::constants::{AUTH_BODY_LIMIT, DEFAULT_BODY_LIMIT};

pub struct ApiServer {
    app: CoreApp,
    auth_manager: Arc<AuthManager>,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let auth_manager = app.auth.clone();
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);

        Self {
            app,
            auth_manager,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            auth_manager,
            allowed_origins,
        } = self;

        // Clone shutdown before moving app
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let pool = app.database.pool().clone();
        let stale_secs = app.config.presence.stale_secs;

        let ui_routes = Router::new().fallback(embedded::serve_assets);

        // Login and session endpoints stay outside the guard
        let auth_routes = auth::routes(pool.clone(), auth_manager.clone())
            .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

        // Everything else requires a session
        let guarded_routes = Router::new()
            .nest("/leads", leads::routes(pool.clone()))
            .nest("/proposals", proposals::routes(pool.clone()))
            .nest("/projects", projects::routes(pool.clone()))
            .nest("/tasks", tasks::routes(pool.clone()))
            .nest("/infra", infra::routes(pool.clone()))
            .nest("/team", team::routes(pool.clone(), stale_secs))
            .nest("/agreements", agreements::routes(pool.clone()))
            .nest("/employees", employees::routes(pool.clone()))
            .nest("/links", links::routes(pool.clone()))
            .nest("/activity", activity::routes(pool.clone()))
            .layer(axum::middleware::from_fn_with_state(
                AuthState {
                    auth: auth_manager.clone(),
                },
                require_auth,
            ));

        let router = Router::new()
            .route("/", get(|| async { Redirect::temporary("/ui") }))
            .route("/api/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .route("/api/docs/", get(swagger_ui_html))
            .nest("/ui", ui_routes)
            .nest("/api/auth", auth_routes)
            .nest("/api", guarded_routes)
            .fallback(middleware::handle_404)
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(middleware::cors(&allowed_origins))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
