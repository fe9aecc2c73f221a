mod config;
mod error;
mod handlers;
mod numverify;
mod twilio_client;
mod twilio_types;
mod types;
mod utils;

use crate::config::Config;
use crate::numverify::NumverifyClient;
use crate::twilio_client::TwilioClient;
use crate::types::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const API_GREETING: &str = "Hello, Twilio Plugin!";
    pub const UNKNOWN_LOCATION: &str = "Unknown Location";
    /// How much of an inbound message is quoted back in the acknowledgment.
    pub const REPLY_SNIPPET_CHARS: usize = 20;
    pub const REPLY_REJECTION: &str = "Sorry, this number is not set up to receive messages.";
    pub const TASK_STATUS_PENDING: &str = "pending";
}

pub fn app(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api", get(handlers::hello))
        .route(
            "/api/call-location-name/:phone_number",
            get(handlers::call_location_name),
        )
        .route("/api/call-logs", get(handlers::call_logs))
        .route("/api/task-logs", get(handlers::task_logs))
        .route("/api/sms-logs", get(handlers::sms_logs))
        .route("/api/send-sms", post(handlers::send_sms))
        // Twilio messaging webhook; form-encoded, answered with TwiML.
        .route("/api/receive-sms", post(handlers::receive_sms))
        .route("/api/agent-status", post(handlers::agent_status))
        .route(
            "/api/allow-multiple-agents",
            post(handlers::allow_multiple_agents),
        )
        .route("/api/answer-call", post(handlers::answer_call))
        .route(
            "/api/update-call-history",
            post(handlers::update_call_history),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    // A .env file is optional; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("tower_http", tracing_subscriber::filter::LevelFilter::DEBUG),
            (
                "twilio_plugin_rs",
                tracing_subscriber::filter::LevelFilter::DEBUG,
            ),
        ]));
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let http_client = match reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };
    let twilio = Arc::new(TwilioClient::new(&config, http_client.clone()));
    let validator = Arc::new(NumverifyClient::new(&config, http_client));
    let bind_addr = config.bind_addr;

    let app_state = Arc::new(AppState {
        config,
        numbers: twilio.clone(),
        calls: twilio.clone(),
        messages: twilio.clone(),
        tasks: twilio,
        validator,
    });

    info!(%bind_addr, "listening");
    if let Err(e) = axum::Server::bind(&bind_addr)
        .serve(app(app_state).into_make_service())
        .await
    {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
