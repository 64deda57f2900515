pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod supabase;
pub mod utils;

use rocket::{fairing::AdHoc, figment::Figment, get, routes};

use crate::{
    config::{get_config_provider, AppConfig},
    errors::get_catchers,
    supabase::setup_supabase,
};

/// Build the rocket server, load configuration and routes, prepare for launch
pub fn build_rocket() -> rocket::Rocket<rocket::Build> {
    build_rocket_with_config(get_config_provider())
}

/// Build the rocket server from the given configuration provider
pub fn build_rocket_with_config(config: Figment) -> rocket::Rocket<rocket::Build> {
    rocket::custom(config)
        .attach(AdHoc::config::<AppConfig>())
        .attach(setup_supabase())
        .register("/", get_catchers())
        .mount("/api", routes![health])
}

/// Health route
#[get("/health")]
async fn health() -> &'static str {
    "OK"
}
