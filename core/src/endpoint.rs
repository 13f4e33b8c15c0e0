//! Collection endpoints of the folio REST API.
//!
//! A `CrudEndpoint` binds a collection path to the wire types it speaks, so
//! the generic builders in `FolioClient` and the generic `CrudRepository`
//! can be instantiated per entity without a hand-written class for each.

use std::fmt;
use std::marker::PhantomData;

use crate::dto::{
    ArtworkDto, ArtworkRequest, ContactDto, ImageDto, ImageMetaRequest, NavigationItemDto,
    NavigationItemRequest, SectionDto, SectionRequest, SocialLinkDto, SocialLinkRequest,
    WritingDto, WritingRequest,
};

/// A REST collection at `path` reading `Dto` and writing `Req`.
pub struct CrudEndpoint<Dto, Req> {
    path: &'static str,
    _wire: PhantomData<fn() -> (Dto, Req)>,
}

impl<Dto, Req> CrudEndpoint<Dto, Req> {
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            _wire: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

impl<Dto, Req> Clone for CrudEndpoint<Dto, Req> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Dto, Req> Copy for CrudEndpoint<Dto, Req> {}

impl<Dto, Req> fmt::Debug for CrudEndpoint<Dto, Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CrudEndpoint").field(&self.path).finish()
    }
}

/// Contacts are never created by the admin; the request type is uninhabited.
#[derive(Debug, Clone, serde::Serialize)]
pub enum NoRequest {}

pub const ARTWORKS: CrudEndpoint<ArtworkDto, ArtworkRequest> = CrudEndpoint::new("/api/artworks");
pub const WRITINGS: CrudEndpoint<WritingDto, WritingRequest> = CrudEndpoint::new("/api/writings");
pub const IMAGES: CrudEndpoint<ImageDto, ImageMetaRequest> = CrudEndpoint::new("/api/images");
pub const CONTACTS: CrudEndpoint<ContactDto, NoRequest> = CrudEndpoint::new("/api/contacts");
pub const NAV_ITEMS: CrudEndpoint<NavigationItemDto, NavigationItemRequest> =
    CrudEndpoint::new("/api/navigation/items");
pub const SOCIAL_LINKS: CrudEndpoint<SocialLinkDto, SocialLinkRequest> =
    CrudEndpoint::new("/api/navigation/social-links");
pub const SECTIONS: CrudEndpoint<SectionDto, SectionRequest> =
    CrudEndpoint::new("/api/site/sections");

pub const LOGIN: &str = "/api/auth/login";
pub const LOGOUT: &str = "/api/auth/logout";
pub const REFRESH: &str = "/api/auth/refresh";
pub const DASHBOARD_STATS: &str = "/api/dashboard/stats";
pub const ARTWORK_TYPES: &str = "/api/artworks/types";
pub const WRITING_TYPES: &str = "/api/writings/types";
pub const IMAGE_UPLOAD: &str = "/api/images/upload";
pub const IMAGE_BATCH_DELETE: &str = "/api/images/batch-delete";
pub const PROFILE: &str = "/api/site/profile";
pub const HERO: &str = "/api/site/hero";
pub const SETTINGS: &str = "/api/site/settings";
