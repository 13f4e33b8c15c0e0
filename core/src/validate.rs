//! Client-side form validation.
//!
//! Runs before any request is built. A `ValidationError` is an inline field
//! error for the form; it never becomes a `Resource::Error`.

use thiserror::Error;

use crate::dto::{
    ArtworkRequest, BatchDeleteRequest, HeroRequest, ImageMetaRequest, LoginRequest,
    NavigationItemRequest, ProfileRequest, SectionRequest, SiteSettingRequest, SocialLinkRequest,
    WritingRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError {
            field,
            message: "must not be blank",
        });
    }
    Ok(())
}

/// Absolute http(s) URL or site-relative path.
fn link(field: &'static str, value: &str) -> Result<(), ValidationError> {
    required(field, value)?;
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/') {
        return Ok(());
    }
    Err(ValidationError {
        field,
        message: "must be an http(s) URL or start with /",
    })
}

fn optional_link(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => link(field, v),
        _ => Ok(()),
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("username", &self.username)?;
        required("password", &self.password)
    }
}

impl Validate for ArtworkRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("typeName", &self.type_name)?;
        optional_link("imageUrl", self.image_url.as_deref())
    }
}

impl Validate for WritingRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("content", &self.content)?;
        required("typeName", &self.type_name)
    }
}

impl Validate for NavigationItemRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("label", &self.label)?;
        link("url", &self.url)
    }
}

impl Validate for SocialLinkRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("platform", &self.platform)?;
        link("url", &self.url)
    }
}

impl Validate for ProfileRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        optional_link("avatarUrl", self.avatar_url.as_deref())?;
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() && !email.contains('@') => Err(ValidationError {
                field: "email",
                message: "must be an email address",
            }),
            _ => Ok(()),
        }
    }
}

impl Validate for HeroRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("headline", &self.headline)?;
        optional_link("backgroundImageUrl", self.background_image_url.as_deref())?;
        optional_link("ctaUrl", self.cta_url.as_deref())
    }
}

/// Alt text is optional and free-form.
impl Validate for ImageMetaRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for SectionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("key", &self.key)?;
        required("title", &self.title)
    }
}

impl Validate for SiteSettingRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for BatchDeleteRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.ids.is_empty() {
            return Err(ValidationError {
                field: "ids",
                message: "select at least one item",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_login_fields_are_rejected() {
        let req = LoginRequest {
            username: "  ".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(req.validate().unwrap_err().field, "username");
    }

    #[test]
    fn artwork_requires_title_and_type() {
        let mut req = ArtworkRequest {
            title: "Dawn".to_string(),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().field, "typeName");
        req.type_name = "painting".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn navigation_url_must_be_link() {
        let req = NavigationItemRequest {
            label: "Blog".to_string(),
            url: "blog".to_string(),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().field, "url");
        let req = NavigationItemRequest {
            url: "/blog".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn profile_email_needs_at_sign() {
        let req = ProfileRequest {
            name: "Ann".to_string(),
            email: Some("ann.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().field, "email");
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = BatchDeleteRequest::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "ids: select at least one item");
    }
}
