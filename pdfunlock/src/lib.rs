//! # pdfunlock: remove the password from a PDF
//!
//! `pdfunlock` is a small web service. A user uploads a password-protected PDF together with its
//! password; if the password is right, the service sends back an unencrypted copy of the document
//! as a download named `LIBERADO_<original name>`.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). PDF parsing, decryption
//! and serialization are done by [lopdf](https://github.com/J-F-Liu/lopdf). Nothing is persisted:
//! the upload and the result live in memory for the duration of one request.
//!
//! ### Request Flow
//!
//! `GET /` serves the upload form ([`form`]). The form posts to `/desbloquear`, where the handler
//! ([`api::handlers::unlock`]) reads the multipart body, validates it, and hands the bytes to the
//! [`unlock`] operation on the blocking thread pool. That operation parses the document, decrypts
//! it if it is encrypted, copies every page into a fresh document ([`pdf::copy`]) and serializes
//! it. Every failure, from a missing file to a corrupt PDF, is answered with the form again and a
//! message explaining what went wrong ([`errors`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use pdfunlock::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = pdfunlock::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     pdfunlock::telemetry::init_telemetry(&config.log_filter)?;
//!
//!     Application::new(config)
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

#[cfg(test)]
pub mod test_utils;

pub mod api;
pub mod config;
pub mod errors;
pub mod form;
pub mod pdf;
pub mod telemetry;
pub mod unlock;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
pub use config::Config;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

/// Application state shared across all request handlers.
///
/// Read-only: no request mutates anything another request can see.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

/// Build the application router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.limits.max_upload_size;

    Router::new()
        .route("/", get(api::handlers::form::show_form))
        .route(
            "/desbloquear",
            post(api::handlers::unlock::unlock_pdf).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state)
        // Request spans carry method and path only: never headers or bodies, which hold the password
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application: the configured router, ready to be served.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub fn new(config: Config) -> Self {
        tracing::debug!("Starting pdfunlock with configuration: {:#?}", config);

        let state = AppState { config: config.clone() };
        let router = build_router(state);

        Self { router, config }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "pdfunlock listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
