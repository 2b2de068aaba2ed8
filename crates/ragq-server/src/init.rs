//! Rocket instance assembly and the process entry point.
//!
//! The teacher resolves its transport through `init::run_server`, which
//! loads configuration, builds a handle-based DI container, and dispatches
//! to one of three transport modes (stdio, HTTP, hybrid). This service has
//! exactly one transport — HTTP — so [`run`] collapses that into: bootstrap
//! [`AppContext`], build the Rocket instance, launch it.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use rocket::{Build, Rocket};
use tracing::info;

use ragq_infrastructure::AppContext;

use crate::constants::{SESSION_CLEANUP_INTERVAL_SECS, SESSION_IDLE_TIMEOUT_SECS};
use crate::session::create_session_store;

/// Assemble the Rocket instance: every route from [`crate::handlers`],
/// managed state for the app context and the conversation session store.
pub fn build(context: Arc<AppContext>) -> Rocket<Build> {
    let host: IpAddr = context.config.server.host.parse().unwrap_or_else(|_| "0.0.0.0".parse().unwrap());
    let port = context.config.server.port;

    let rocket_config = rocket::Config {
        address: host,
        port,
        ..rocket::Config::default()
    };

    rocket::custom(rocket_config)
        .manage(context)
        .manage(create_session_store())
        .mount("/", crate::handlers::routes())
}

/// Bootstrap [`AppContext`], start its background workers, launch Rocket,
/// and run the idle-session sweep alongside it. Returns once the server
/// shuts down.
pub async fn run(context: Arc<AppContext>) -> Result<(), rocket::Error> {
    context.start_background_workers();

    let rocket = build(context.clone());
    let sessions = rocket
        .state::<Arc<crate::session::ConversationSessionStore>>()
        .expect("session store is managed by build()")
        .clone();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            sessions.cleanup_idle(Duration::from_secs(SESSION_IDLE_TIMEOUT_SECS));
        }
    });

    info!(host = %context.config.server.host, port = context.config.server.port, "starting HTTP server");
    rocket.launch().await?;
    Ok(())
}
