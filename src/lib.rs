pub mod api;
pub mod article;
pub mod comment;
pub mod config;
pub mod db;
pub mod topic;
pub mod types;
pub mod utils;


use rocket::{catchers, routes, Build, Rocket};

use crate::db::SharedRepository;

/// Assembles the server around an already opened repository.
pub fn rocket(repository: SharedRepository) -> Rocket<Build> {
    rocket::build()
        .manage(repository)
        .mount("/api", routes![api::endpoints, topic::list])
        .mount(
            "/api",
            routes![article::list, article::show, comment::list, comment::add],
        )
        .mount("/api", routes![comment::remove])
        .register(
            "/",
            catchers![
                api::not_found,
                api::bad_request,
                api::unprocessable,
                api::internal_error
            ],
        )
}
