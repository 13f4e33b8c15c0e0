//! Non-collection endpoints: singletons, settings, type lists, contacts'
//! read flag, uploads and the dashboard.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::crud::Shared;
use crate::error::HttpError;
use crate::records::{
    BatchDeleteInput, ContentType, DashboardStats, Hero, HeroInput, Image, Profile, ProfileInput,
    SettingInput, SiteSetting,
};

pub async fn artwork_types(State(state): Shared) -> Json<Vec<ContentType>> {
    Json(state.tables.read().await.artwork_types.clone())
}

pub async fn writing_types(State(state): Shared) -> Json<Vec<ContentType>> {
    Json(state.tables.read().await.writing_types.clone())
}

pub async fn profile(State(state): Shared) -> Json<Profile> {
    Json(state.tables.read().await.profile.clone())
}

pub async fn update_profile(
    State(state): Shared,
    input: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<Value>, HttpError> {
    let Json(input) = input?;
    if input.name.trim().is_empty() {
        return Err(HttpError::bad_request("name is required"));
    }
    let mut tables = state.tables.write().await;
    let profile = &mut tables.profile;
    profile.name = input.name;
    profile.title = input.title;
    profile.bio = input.bio;
    profile.avatar_url = input.avatar_url;
    profile.email = input.email;
    profile.location = input.location;
    Ok(Json(json!({ "message": "profile updated" })))
}

pub async fn hero(State(state): Shared) -> Json<Hero> {
    Json(state.tables.read().await.hero.clone())
}

pub async fn update_hero(
    State(state): Shared,
    input: Result<Json<HeroInput>, JsonRejection>,
) -> Result<Json<Value>, HttpError> {
    let Json(input) = input?;
    if input.headline.trim().is_empty() {
        return Err(HttpError::bad_request("headline is required"));
    }
    let mut tables = state.tables.write().await;
    let hero = &mut tables.hero;
    hero.headline = input.headline;
    hero.subheadline = input.subheadline;
    hero.background_image_url = input.background_image_url;
    hero.cta_text = input.cta_text;
    hero.cta_url = input.cta_url;
    Ok(Json(json!({ "message": "hero updated" })))
}

pub async fn settings(State(state): Shared) -> Json<Vec<SiteSetting>> {
    let tables = state.tables.read().await;
    Json(tables.settings.rows().cloned().collect())
}

pub async fn update_setting(
    State(state): Shared,
    Path(id): Path<i64>,
    input: Result<Json<SettingInput>, JsonRejection>,
) -> Result<Json<Value>, HttpError> {
    let Json(input) = input?;
    let mut tables = state.tables.write().await;
    let setting = tables
        .settings
        .get_mut(id)
        .ok_or_else(|| HttpError::not_found("setting"))?;
    setting.value = input.value;
    Ok(Json(json!({ "message": "setting updated" })))
}

pub async fn mark_contact_read(
    State(state): Shared,
    Path(id): Path<i64>,
) -> Result<Json<Value>, HttpError> {
    let mut tables = state.tables.write().await;
    let contact = tables
        .contacts
        .get_mut(id)
        .ok_or_else(|| HttpError::not_found("contact"))?;
    contact.is_read = true;
    Ok(Json(json!({ "message": "marked as read" })))
}

pub async fn upload_image(
    State(state): Shared,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Image>), HttpError> {
    let mut multipart = multipart?;
    let mut file = None;
    let mut alt_text = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some((filename, mime_type, bytes.len() as u64));
            }
            Some("altText") => alt_text = Some(field.text().await?),
            _ => {}
        }
    }
    let (filename, mime_type, size_bytes) =
        file.ok_or_else(|| HttpError::bad_request("file is required"))?;

    let mut tables = state.tables.write().await;
    let now = Utc::now();
    let id = tables.images.insert(|id| Image {
        id,
        url: format!("/uploads/{id}-{filename}"),
        filename,
        mime_type,
        size_bytes,
        alt_text,
        created_at: now,
    });
    debug!(id, size_bytes, "image uploaded");
    let image = tables
        .images
        .get(id)
        .cloned()
        .ok_or_else(|| HttpError::not_found("image"))?;
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn batch_delete_images(
    State(state): Shared,
    input: Result<Json<BatchDeleteInput>, JsonRejection>,
) -> Result<Json<Value>, HttpError> {
    let Json(input) = input?;
    if input.ids.is_empty() {
        return Err(HttpError::bad_request("select at least one item"));
    }
    let mut tables = state.tables.write().await;
    let deleted = input
        .ids
        .iter()
        .filter(|id| tables.images.remove(**id).is_some())
        .count();
    Ok(Json(json!({ "message": format!("{deleted} images deleted") })))
}

pub async fn dashboard_stats(State(state): Shared) -> Json<DashboardStats> {
    let tables = state.tables.read().await;
    Json(DashboardStats {
        artwork_count: tables.artworks.len() as u64,
        writing_count: tables.writings.len() as u64,
        image_count: tables.images.len() as u64,
        contact_count: tables.contacts.len() as u64,
        unread_contact_count: tables.contacts.rows().filter(|c| !c.is_read).count() as u64,
    })
}
