//! Generic collection handlers, instantiated once per table in `app`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::db::{AppState, Table, Tables};
use crate::error::HttpError;
use crate::records::{
    Artwork, ArtworkInput, Contact, Image, ImageInput, NavigationItem, NavigationItemInput,
    Section, SectionInput, SocialLink, SocialLinkInput, Writing, WritingInput,
};

/// A record stored in one of the `Tables`.
pub trait Row: Serialize + Clone + Send + Sync + 'static {
    const KIND: &'static str;
    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

/// A record the admin can edit in place.
pub trait Editable: Row {
    type Input: DeserializeOwned + Send + 'static;

    fn check(_input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    fn apply(&mut self, input: Self::Input);
}

/// A record the admin can create with a JSON body.
pub trait Creatable: Editable {
    fn build(id: i64, input: Self::Input, now: DateTime<Utc>) -> Self;
}

pub type Shared = State<Arc<AppState>>;

pub async fn list<R: Row>(State(state): Shared) -> Json<Vec<R>> {
    let tables = state.tables.read().await;
    Json(R::table(&tables).rows().cloned().collect())
}

pub async fn get_one<R: Row>(State(state): Shared, Path(id): Path<i64>) -> Result<Json<R>, HttpError> {
    let tables = state.tables.read().await;
    R::table(&tables)
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| HttpError::not_found(R::KIND))
}

pub async fn create<R: Creatable>(
    State(state): Shared,
    input: Result<Json<R::Input>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let Json(input) = input?;
    R::check(&input).map_err(HttpError::bad_request)?;
    let mut tables = state.tables.write().await;
    let now = Utc::now();
    let id = R::table_mut(&mut tables).insert(|id| R::build(id, input, now));
    debug!(kind = R::KIND, id, "created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": format!("{} created", R::KIND) })),
    ))
}

pub async fn update<R: Editable>(
    State(state): Shared,
    Path(id): Path<i64>,
    input: Result<Json<R::Input>, JsonRejection>,
) -> Result<Json<Value>, HttpError> {
    let Json(input) = input?;
    R::check(&input).map_err(HttpError::bad_request)?;
    let mut tables = state.tables.write().await;
    let row = R::table_mut(&mut tables)
        .get_mut(id)
        .ok_or_else(|| HttpError::not_found(R::KIND))?;
    row.apply(input);
    debug!(kind = R::KIND, id, "updated");
    Ok(Json(json!({ "message": format!("{} updated", R::KIND) })))
}

pub async fn remove<R: Row>(State(state): Shared, Path(id): Path<i64>) -> Result<StatusCode, HttpError> {
    let mut tables = state.tables.write().await;
    R::table_mut(&mut tables)
        .remove(id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| HttpError::not_found(R::KIND))
}

macro_rules! row {
    ($ty:ty, $field:ident, $kind:literal) => {
        impl Row for $ty {
            const KIND: &'static str = $kind;

            fn table(tables: &Tables) -> &Table<Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                &mut tables.$field
            }
        }
    };
}

row!(Artwork, artworks, "artwork");
row!(Writing, writings, "writing");
row!(Image, images, "image");
row!(Contact, contacts, "contact");
row!(NavigationItem, nav_items, "navigation item");
row!(SocialLink, social_links, "social link");
row!(Section, sections, "section");

fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

impl Editable for Artwork {
    type Input = ArtworkInput;

    fn check(input: &ArtworkInput) -> Result<(), String> {
        required("title", &input.title)?;
        required("typeName", &input.type_name)
    }

    fn apply(&mut self, input: ArtworkInput) {
        self.title = input.title;
        self.description = input.description;
        self.type_name = input.type_name;
        self.image_url = input.image_url;
        self.year = input.year;
        self.sort_order = input.sort_order;
        self.published = input.published;
    }
}

impl Creatable for Artwork {
    fn build(id: i64, input: ArtworkInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            type_name: input.type_name,
            image_url: input.image_url,
            year: input.year,
            sort_order: input.sort_order,
            published: input.published,
            created_at: now,
        }
    }
}

impl Editable for Writing {
    type Input = WritingInput;

    fn check(input: &WritingInput) -> Result<(), String> {
        required("title", &input.title)?;
        required("typeName", &input.type_name)
    }

    fn apply(&mut self, input: WritingInput) {
        self.title = input.title;
        self.content = input.content;
        self.summary = input.summary;
        self.type_name = input.type_name;
        self.published = input.published;
    }
}

impl Creatable for Writing {
    fn build(id: i64, input: WritingInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            summary: input.summary,
            type_name: input.type_name,
            published: input.published,
            created_at: now,
        }
    }
}

// Images are created by upload only.
impl Editable for Image {
    type Input = ImageInput;

    fn apply(&mut self, input: ImageInput) {
        self.alt_text = input.alt_text;
    }
}

impl Editable for NavigationItem {
    type Input = NavigationItemInput;

    fn check(input: &NavigationItemInput) -> Result<(), String> {
        required("label", &input.label)?;
        required("url", &input.url)
    }

    fn apply(&mut self, input: NavigationItemInput) {
        self.label = input.label;
        self.url = input.url;
        self.sort_order = input.sort_order;
        self.visible = input.visible;
    }
}

impl Creatable for NavigationItem {
    fn build(id: i64, input: NavigationItemInput, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            label: input.label,
            url: input.url,
            sort_order: input.sort_order,
            visible: input.visible,
        }
    }
}

impl Editable for SocialLink {
    type Input = SocialLinkInput;

    fn check(input: &SocialLinkInput) -> Result<(), String> {
        required("platform", &input.platform)?;
        required("url", &input.url)
    }

    fn apply(&mut self, input: SocialLinkInput) {
        self.platform = input.platform;
        self.url = input.url;
        self.icon = input.icon;
        self.sort_order = input.sort_order;
    }
}

impl Creatable for SocialLink {
    fn build(id: i64, input: SocialLinkInput, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            platform: input.platform,
            url: input.url,
            icon: input.icon,
            sort_order: input.sort_order,
        }
    }
}

impl Editable for Section {
    type Input = SectionInput;

    fn check(input: &SectionInput) -> Result<(), String> {
        required("key", &input.key)?;
        required("title", &input.title)
    }

    fn apply(&mut self, input: SectionInput) {
        self.key = input.key;
        self.title = input.title;
        self.content = input.content;
        self.sort_order = input.sort_order;
        self.visible = input.visible;
    }
}

impl Creatable for Section {
    fn build(id: i64, input: SectionInput, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            key: input.key,
            title: input.title,
            content: input.content,
            sort_order: input.sort_order,
            visible: input.visible,
        }
    }
}
