use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
    Catcher, Request, Route,
};

pub mod auth;
mod common;
mod public;
mod responses;
mod surveys;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(surveys::routes());
    routes.extend(responses::routes());
    routes.extend(public::routes());
    routes
}

/// Routes served from the root, outside the `/api` prefix.
pub fn root_routes() -> Vec<Route> {
    public::root_routes()
}

pub fn catchers() -> Vec<Catcher> {
    catchers![unauthorized, forbidden, fallback]
}

// Guard failures bypass route responders entirely, so the auth guard's
// status codes get their message bodies here.

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "message": "Access token required" }))
}

#[catch(403)]
fn forbidden() -> Json<Value> {
    Json(json!({ "message": "Invalid token" }))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request) -> Json<Value> {
    Json(json!({ "message": status.reason_lossy() }))
}
