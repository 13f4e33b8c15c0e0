//! Artworks and writings: collections with a declared type and a type list.

use crate::dto::{ArtworkDto, ArtworkRequest, TypeDto, WritingDto, WritingRequest};
use crate::envelope::{emit, ResourceStream};
use crate::filter;
use crate::model::{Artwork, ArtworkType, Writing, WritingType};

use super::CrudRepository;

pub type ArtworkRepository = CrudRepository<ArtworkDto, Artwork, ArtworkRequest>;
pub type WritingRepository = CrudRepository<WritingDto, Writing, WritingRequest>;

impl CrudRepository<ArtworkDto, Artwork, ArtworkRequest> {
    /// All artworks, narrowed client-side to `type_name` when given.
    pub fn list_by_type(&self, type_name: Option<String>) -> ResourceStream<Vec<Artwork>> {
        self.list_with(move |all| filter::by_type_name(all, type_name.as_deref()))
    }

    pub fn types(&self) -> ResourceStream<Vec<ArtworkType>> {
        let ctx = self.ctx.clone();
        emit("artwork_types", async move {
            let response = ctx.send(ctx.client.build_artwork_types()).await?;
            ctx.client.parse_list::<TypeDto, ArtworkType>(response)
        })
    }
}

impl CrudRepository<WritingDto, Writing, WritingRequest> {
    /// All writings, narrowed client-side to `type_name` when given.
    pub fn list_by_type(&self, type_name: Option<String>) -> ResourceStream<Vec<Writing>> {
        self.list_with(move |all| filter::by_type_name(all, type_name.as_deref()))
    }

    pub fn types(&self) -> ResourceStream<Vec<WritingType>> {
        let ctx = self.ctx.clone();
        emit("writing_types", async move {
            let response = ctx.send(ctx.client.build_writing_types()).await?;
            ctx.client.parse_list::<TypeDto, WritingType>(response)
        })
    }
}
