//! Client-side list filters.
//!
//! The backend has no query-parameter filtering for these collections, so
//! repositories fetch everything and narrow the list here, between the parse
//! and the `Success` emission. Filters are pure and order-preserving; an
//! absent filter value returns the input untouched.

use crate::model::{Artwork, Contact, Writing};

/// Entities carrying a declared type / category name.
pub trait TypeNamed {
    fn type_name(&self) -> &str;
}

/// Entities carrying a read/unread flag.
pub trait ReadState {
    fn is_read(&self) -> bool;
}

impl TypeNamed for Artwork {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl TypeNamed for Writing {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl ReadState for Contact {
    fn is_read(&self) -> bool {
        self.is_read
    }
}

/// Keep items whose type name equals `type_name` exactly.
pub fn by_type_name<T: TypeNamed>(items: Vec<T>, type_name: Option<&str>) -> Vec<T> {
    match type_name {
        Some(wanted) => items
            .into_iter()
            .filter(|item| item.type_name() == wanted)
            .collect(),
        None => items,
    }
}

/// Keep items whose read flag equals `is_read`.
pub fn by_read_state<T: ReadState>(items: Vec<T>, is_read: Option<bool>) -> Vec<T> {
    match is_read {
        Some(wanted) => items
            .into_iter()
            .filter(|item| item.is_read() == wanted)
            .collect(),
        None => items,
    }
}
