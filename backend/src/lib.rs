pub mod airtable;
pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod processor;
pub mod routes;
pub mod store;

use rocket::{Build, Rocket, catchers, routes};
use rocket::data::{Limits, ToByteUnit};
use crate::{
    catchers::{bad_request, internal_error, not_found, payload_too_large, unprocessable_entity},
    cors::CORS,
    routes::*,
};

/// Rocket instance serving the JSON API under `/api`, without static files.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("data-form", 10.mebibytes())
        .limit("file", 10.mebibytes());
    let figment = rocket::Config::figment().merge(("limits", limits));

    rocket::custom(figment)
        .attach(CORS)
        .manage(state)
        .mount(
            "/api",
            routes![
                list_participants,
                create_participant,
                list_votes,
                create_vote,
                get_results,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable_entity,
                internal_error
            ],
        )
}

#[cfg(test)]
mod tests;
