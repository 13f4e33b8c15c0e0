//! Site-wide singletons (profile, hero, settings), the collections behind
//! the public site's chrome, and the dashboard counters.

use std::sync::Arc;

use super::{Context, CrudRepository};
use crate::dto::{
    DashboardStatsDto, HeroDto, HeroRequest, NavigationItemDto, NavigationItemRequest,
    ProfileDto, ProfileRequest, SectionDto, SectionRequest, SiteSettingDto, SiteSettingRequest,
    SocialLinkDto, SocialLinkRequest,
};
use crate::envelope::{emit, ResourceStream};
use crate::model::{
    Ack, DashboardStats, HeroContent, NavigationItem, Profile, Section, SiteSetting, SocialLink,
};
use crate::validate::{Validate, ValidationError};

pub type NavigationItemRepository =
    CrudRepository<NavigationItemDto, NavigationItem, NavigationItemRequest>;
pub type SocialLinkRepository = CrudRepository<SocialLinkDto, SocialLink, SocialLinkRequest>;
pub type SectionRepository = CrudRepository<SectionDto, Section, SectionRequest>;

#[derive(Clone)]
pub struct SiteRepository {
    ctx: Arc<Context>,
}

impl SiteRepository {
    pub(crate) fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    pub fn profile(&self) -> ResourceStream<Profile> {
        let ctx = self.ctx.clone();
        emit("profile", async move {
            let response = ctx.send(ctx.client.build_get_profile()).await?;
            ctx.client.parse_item::<ProfileDto, Profile>(response)
        })
    }

    pub fn update_profile(
        &self,
        input: ProfileRequest,
    ) -> Result<ResourceStream<Ack>, ValidationError> {
        input.validate()?;
        let ctx = self.ctx.clone();
        Ok(emit("update_profile", async move {
            let request = ctx.client.build_update_profile(&input)?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }))
    }

    pub fn hero(&self) -> ResourceStream<HeroContent> {
        let ctx = self.ctx.clone();
        emit("hero", async move {
            let response = ctx.send(ctx.client.build_get_hero()).await?;
            ctx.client.parse_item::<HeroDto, HeroContent>(response)
        })
    }

    pub fn update_hero(&self, input: HeroRequest) -> Result<ResourceStream<Ack>, ValidationError> {
        input.validate()?;
        let ctx = self.ctx.clone();
        Ok(emit("update_hero", async move {
            let request = ctx.client.build_update_hero(&input)?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }))
    }

    pub fn settings(&self) -> ResourceStream<Vec<SiteSetting>> {
        let ctx = self.ctx.clone();
        emit("settings", async move {
            let response = ctx.send(ctx.client.build_list_settings()).await?;
            ctx.client.parse_list::<SiteSettingDto, SiteSetting>(response)
        })
    }

    pub fn update_setting(
        &self,
        id: i64,
        input: SiteSettingRequest,
    ) -> Result<ResourceStream<Ack>, ValidationError> {
        input.validate()?;
        let ctx = self.ctx.clone();
        Ok(emit("update_setting", async move {
            let request = ctx.client.build_update_setting(id, &input)?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }))
    }
}

#[derive(Clone)]
pub struct DashboardRepository {
    ctx: Arc<Context>,
}

impl DashboardRepository {
    pub(crate) fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Counters for the dashboard tiles. Missing counters read as zero.
    pub fn stats(&self) -> ResourceStream<DashboardStats> {
        let ctx = self.ctx.clone();
        emit("dashboard_stats", async move {
            let response = ctx.send(ctx.client.build_dashboard_stats()).await?;
            ctx.client.parse_item::<DashboardStatsDto, DashboardStats>(response)
        })
    }
}
