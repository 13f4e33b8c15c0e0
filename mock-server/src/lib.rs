//! In-memory stand-in for the portfolio admin backend.
//!
//! Every route lives under `/api`. Everything except `/api/auth/*` requires a
//! bearer token issued by `/api/auth/login`. Errors are `{"message": ...}`.

pub mod auth;
pub mod config;
pub mod crud;
pub mod db;
pub mod error;
pub mod records;
pub mod site;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;

pub use config::MockConfig;
use crud::{create, get_one, list, remove, update};
use db::AppState;
use records::{Artwork, Contact, Image, NavigationItem, Section, SocialLink, Writing};

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let upload_limit = config.upload_limit;
    let state = Arc::new(AppState::new(config));

    let protected = Router::new()
        .route("/api/dashboard/stats", get(site::dashboard_stats))
        .route("/api/artworks", get(list::<Artwork>).post(create::<Artwork>))
        .route("/api/artworks/types", get(site::artwork_types))
        .route(
            "/api/artworks/{id}",
            get(get_one::<Artwork>)
                .put(update::<Artwork>)
                .delete(remove::<Artwork>),
        )
        .route("/api/writings", get(list::<Writing>).post(create::<Writing>))
        .route("/api/writings/types", get(site::writing_types))
        .route(
            "/api/writings/{id}",
            get(get_one::<Writing>)
                .put(update::<Writing>)
                .delete(remove::<Writing>),
        )
        .route("/api/images", get(list::<Image>))
        .route(
            "/api/images/upload",
            post(site::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/images/batch-delete", post(site::batch_delete_images))
        .route(
            "/api/images/{id}",
            get(get_one::<Image>)
                .put(update::<Image>)
                .delete(remove::<Image>),
        )
        .route("/api/contacts", get(list::<Contact>))
        .route(
            "/api/contacts/{id}",
            get(get_one::<Contact>).delete(remove::<Contact>),
        )
        .route("/api/contacts/{id}/read", put(site::mark_contact_read))
        .route(
            "/api/navigation/items",
            get(list::<NavigationItem>).post(create::<NavigationItem>),
        )
        .route(
            "/api/navigation/items/{id}",
            get(get_one::<NavigationItem>)
                .put(update::<NavigationItem>)
                .delete(remove::<NavigationItem>),
        )
        .route(
            "/api/navigation/social-links",
            get(list::<SocialLink>).post(create::<SocialLink>),
        )
        .route(
            "/api/navigation/social-links/{id}",
            get(get_one::<SocialLink>)
                .put(update::<SocialLink>)
                .delete(remove::<SocialLink>),
        )
        .route("/api/site/profile", get(site::profile).put(site::update_profile))
        .route("/api/site/hero", get(site::hero).put(site::update_hero))
        .route("/api/site/settings", get(site::settings))
        .route("/api/site/settings/{id}", put(site::update_setting))
        .route(
            "/api/site/sections",
            get(list::<Section>).post(create::<Section>),
        )
        .route(
            "/api/site/sections/{id}",
            get(get_one::<Section>)
                .put(update::<Section>)
                .delete(remove::<Section>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .merge(protected)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}
