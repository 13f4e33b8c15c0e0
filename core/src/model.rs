//! Domain entities and the DTO → domain mapping.
//!
//! Each entity is an immutable snapshot of one backend resource. Nothing in
//! the crate mutates one in place; a newer fetch replaces it wholesale.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::{
    AckDto, ArtworkDto, ContactDto, DashboardStatsDto, HeroDto, ImageDto, NavigationItemDto,
    ProfileDto, SectionDto, SiteSettingDto, SocialLinkDto, TypeDto, WritingDto,
};

/// Anything addressed by an integer `id`.
pub trait Identified {
    fn id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub type_name: String,
    pub image_url: Option<String>,
    pub year: Option<i32>,
    pub sort_order: i32,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Writing {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub type_name: String,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub alt_text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub id: i64,
    pub label: String,
    pub url: String,
    pub sort_order: i32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: i64,
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    pub id: i64,
    pub headline: String,
    pub subheadline: Option<String>,
    pub background_image_url: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub content: Option<String>,
    pub sort_order: i32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSetting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub artwork_count: u64,
    pub writing_count: u64,
    pub image_count: u64,
    pub contact_count: u64,
    pub unread_contact_count: u64,
}

/// The signed-in administrator, as returned by login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    pub display_name: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a create/update/delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Ack {
    Created { id: i64 },
    Message { message: String },
}

impl Ack {
    pub fn created_id(&self) -> Option<i64> {
        match self {
            Ack::Created { id } => Some(*id),
            Ack::Message { .. } => None,
        }
    }
}

/// Parse a backend timestamp: RFC 3339, or a naive ISO-8601 date-time taken
/// as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_created(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(parse_timestamp)
}

// ---------------------------------------------------------------------------
// DTO → domain
// ---------------------------------------------------------------------------

impl From<ArtworkDto> for Artwork {
    fn from(dto: ArtworkDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            type_name: dto.type_name.unwrap_or_default(),
            image_url: dto.image_url,
            year: dto.year,
            sort_order: dto.sort_order.unwrap_or(0),
            published: dto.published.unwrap_or(false),
            created_at: parse_created(dto.created_at),
        }
    }
}

impl From<TypeDto> for ArtworkType {
    fn from(dto: TypeDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl From<WritingDto> for Writing {
    fn from(dto: WritingDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            content: dto.content.unwrap_or_default(),
            summary: dto.summary,
            type_name: dto.type_name.unwrap_or_default(),
            published: dto.published.unwrap_or(false),
            created_at: parse_created(dto.created_at),
        }
    }
}

impl From<TypeDto> for WritingType {
    fn from(dto: TypeDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl From<ImageDto> for ImageMeta {
    fn from(dto: ImageDto) -> Self {
        Self {
            id: dto.id,
            filename: dto.filename,
            url: dto.url,
            mime_type: dto
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size_bytes: dto.size_bytes.unwrap_or(0),
            alt_text: dto.alt_text,
            created_at: parse_created(dto.created_at),
        }
    }
}

impl From<ContactDto> for Contact {
    fn from(dto: ContactDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            email: dto.email,
            subject: dto.subject,
            message: dto.message.unwrap_or_default(),
            is_read: dto.is_read.unwrap_or(false),
            created_at: parse_created(dto.created_at),
        }
    }
}

impl From<NavigationItemDto> for NavigationItem {
    fn from(dto: NavigationItemDto) -> Self {
        Self {
            id: dto.id,
            label: dto.label,
            url: dto.url,
            sort_order: dto.sort_order.unwrap_or(0),
            visible: dto.visible.unwrap_or(true),
        }
    }
}

impl From<SocialLinkDto> for SocialLink {
    fn from(dto: SocialLinkDto) -> Self {
        Self {
            id: dto.id,
            platform: dto.platform,
            url: dto.url,
            icon: dto.icon,
            sort_order: dto.sort_order.unwrap_or(0),
        }
    }
}

impl From<ProfileDto> for Profile {
    fn from(dto: ProfileDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            title: dto.title,
            bio: dto.bio,
            avatar_url: dto.avatar_url,
            email: dto.email,
            location: dto.location,
        }
    }
}

impl From<HeroDto> for HeroContent {
    fn from(dto: HeroDto) -> Self {
        Self {
            id: dto.id,
            headline: dto.headline,
            subheadline: dto.subheadline,
            background_image_url: dto.background_image_url,
            cta_text: dto.cta_text,
            cta_url: dto.cta_url,
        }
    }
}

impl From<SectionDto> for Section {
    fn from(dto: SectionDto) -> Self {
        Self {
            id: dto.id,
            key: dto.key,
            title: dto.title,
            content: dto.content,
            sort_order: dto.sort_order.unwrap_or(0),
            visible: dto.visible.unwrap_or(true),
        }
    }
}

impl From<SiteSettingDto> for SiteSetting {
    fn from(dto: SiteSettingDto) -> Self {
        Self {
            id: dto.id,
            key: dto.key,
            value: dto.value.unwrap_or_default(),
            description: dto.description,
        }
    }
}

impl From<DashboardStatsDto> for DashboardStats {
    fn from(dto: DashboardStatsDto) -> Self {
        Self {
            artwork_count: dto.artwork_count,
            writing_count: dto.writing_count,
            image_count: dto.image_count,
            contact_count: dto.contact_count,
            unread_contact_count: dto.unread_contact_count,
        }
    }
}

impl From<AckDto> for Ack {
    fn from(dto: AckDto) -> Self {
        match dto.id {
            Some(id) => Ack::Created { id },
            None => Ack::Message {
                message: dto.message.unwrap_or_else(|| "OK".to_string()),
            },
        }
    }
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

identified!(
    Artwork,
    ArtworkType,
    Writing,
    WritingType,
    ImageMeta,
    Contact,
    NavigationItem,
    SocialLink,
    Profile,
    HeroContent,
    Section,
    SiteSetting,
);
