//! In-memory tables behind the mock backend.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::config::MockConfig;
use crate::records::{
    Artwork, Contact, ContentType, Hero, Image, NavigationItem, Profile, Section, SiteSetting,
    SocialLink, Writing,
};

/// Rows keyed by an auto-incremented id, listed in id order.
#[derive(Debug)]
pub struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    pub fn insert(&mut self, build: impl FnOnce(i64) -> T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, build(id));
        id
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn rows(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug)]
pub struct Tables {
    pub artworks: Table<Artwork>,
    pub writings: Table<Writing>,
    pub images: Table<Image>,
    pub contacts: Table<Contact>,
    pub nav_items: Table<NavigationItem>,
    pub social_links: Table<SocialLink>,
    pub sections: Table<Section>,
    pub settings: Table<SiteSetting>,
    pub artwork_types: Vec<ContentType>,
    pub writing_types: Vec<ContentType>,
    pub profile: Profile,
    pub hero: Hero,
}

fn types(names: &[&str]) -> Vec<ContentType> {
    names
        .iter()
        .zip(1..)
        .map(|(name, id)| ContentType {
            id,
            name: name.to_string(),
        })
        .collect()
}

impl Tables {
    /// Fixture data: type lists, singletons, settings and two contacts (one
    /// read, one unread). Content collections start empty.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut settings = Table::default();
        for (key, value, description) in [
            ("site_title", "Portfolio", Some("Shown in the browser tab")),
            ("contact_email", "hello@example.com", None),
            ("maintenance_mode", "false", Some("Hide the public site")),
        ] {
            settings.insert(|id| SiteSetting {
                id,
                key: key.to_string(),
                value: value.to_string(),
                description: description.map(str::to_string),
            });
        }

        let mut contacts = Table::default();
        contacts.insert(|id| Contact {
            id,
            name: "Ada Park".to_string(),
            email: "ada@example.com".to_string(),
            subject: Some("Commission".to_string()),
            message: "Are you taking commissions this spring?".to_string(),
            is_read: true,
            created_at: now - Duration::days(2),
        });
        contacts.insert(|id| Contact {
            id,
            name: "Ben Ortiz".to_string(),
            email: "ben@example.com".to_string(),
            subject: None,
            message: "Loved the new series.".to_string(),
            is_read: false,
            created_at: now - Duration::hours(3),
        });

        Self {
            artworks: Table::default(),
            writings: Table::default(),
            images: Table::default(),
            contacts,
            nav_items: Table::default(),
            social_links: Table::default(),
            sections: Table::default(),
            settings,
            artwork_types: types(&["painting", "drawing", "digital", "photography"]),
            writing_types: types(&["essay", "poem", "note"]),
            profile: Profile {
                id: 1,
                name: "Site Owner".to_string(),
                title: Some("Artist".to_string()),
                bio: None,
                avatar_url: None,
                email: Some("hello@example.com".to_string()),
                location: None,
            },
            hero: Hero {
                id: 1,
                headline: "Welcome".to_string(),
                subheadline: None,
                background_image_url: None,
                cta_text: Some("See the work".to_string()),
                cta_url: Some("/gallery".to_string()),
            },
        }
    }
}

/// An issued token pair.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub refresh_token: String,
}

pub struct AppState {
    pub config: MockConfig,
    pub tables: RwLock<Tables>,
    /// Keyed by access token.
    pub sessions: RwLock<HashMap<String, Session>>,
}

impl AppState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            tables: RwLock::new(Tables::seeded(Utc::now())),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut table: Table<i64> = Table::default();
        let first = table.insert(|id| id * 10);
        let second = table.insert(|id| id * 10);
        assert_eq!((first, second), (1, 2));
        table.remove(second);
        assert_eq!(table.insert(|id| id), 3);
        assert_eq!(table.rows().copied().collect::<Vec<_>>(), vec![10, 3]);
    }

    #[test]
    fn seed_has_one_unread_contact() {
        let tables = Tables::seeded(Utc::now());
        assert_eq!(tables.contacts.rows().filter(|c| !c.is_read).count(), 1);
        assert_eq!(tables.artwork_types[0].name, "painting");
        assert!(tables.artworks.is_empty());
    }
}
