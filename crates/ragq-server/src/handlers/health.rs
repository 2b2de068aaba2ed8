//! Liveness and readiness probes.

use rocket::get;
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthBody {
    status: &'static str,
}

/// Liveness: the process is up and serving requests. Never touches a
/// dependency, so a slow database never fails this probe.
#[get("/health/live")]
pub fn live() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// Readiness: same signal as liveness for now — every dependency this
/// service has is wired at startup in [`crate::init::build`] and startup
/// fails outright if a dependency is unreachable, so "process is running"
/// already implies "ready".
#[get("/health/ready")]
pub fn ready() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}
