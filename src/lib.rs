#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use rocket::{Build, Rocket};

/// Assemble the server: API routes, error catchers, and the fairings that
/// load the config and connect to the database on ignition.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::root_routes())
        .mount("/api", api::routes())
        .register("/api", api::catchers())
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
        .attach(logging::LoggerFairing)
}

/// Connect to the database configured via `db_uri` (test version).
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let figment = rocket::Config::figment();
    let db_uri = figment
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Could not connect to database")
}

/// A random database name, to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// Build a rocket against an existing database connection, running the same
/// setup that `DatabaseFairing` would (test version).
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db).await.unwrap();
    model::mongodb::ensure_counters_exist(&db).await.unwrap();

    rocket::build()
        .mount("/", api::root_routes())
        .mount("/api", api::routes())
        .register("/api", api::catchers())
        .attach(config::ConfigFairing)
        .manage(client)
        .manage(db)
}
