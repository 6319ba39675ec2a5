//! Domain types for the build with strong typing.
//!
//! Title and person identifiers are both plain IMDb strings (`tt0133093`,
//! `nm0000206`). They are wrapped in separate newtypes so a person id can
//! never be looked up in a title table by accident.

pub mod events;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// IMDb title identifier (`tconst`).
    TitleId
);

string_id!(
    /// IMDb person identifier (`nconst`).
    PersonId
);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub average: f64,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: TitleId,
    pub title: String,
    pub year: Option<i32>,
    /// Comma-joined genre tags, empty when the source has none.
    pub genres: String,
    pub rating: Option<f64>,
    pub votes: Option<i64>,
}

impl MovieRecord {
    /// Copies the rating for this title, if any, onto the record.
    pub fn apply_rating(&mut self, rating: Option<&Rating>) {
        self.rating = rating.map(|r| r.average);
        self.votes = rating.map(|r| r.votes);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub id: PersonId,
    pub name: String,
    /// Informational only; these titles are not checked against the movie set.
    pub known_for: Vec<TitleId>,
}

impl PersonRecord {
    /// `known_for` as stored in the artifact: comma-joined, or `None` when empty.
    #[must_use]
    pub fn known_for_column(&self) -> Option<String> {
        if self.known_for.is_empty() {
            return None;
        }
        Some(
            self.known_for
                .iter()
                .map(TitleId::as_str)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// An acting credit: `person` appears in `movie`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppearanceLink {
    pub movie: TitleId,
    pub person: PersonId,
}

pub type RatingTable = HashMap<TitleId, Rating>;

pub type MovieTable = HashMap<TitleId, MovieRecord>;

pub type PersonTable = HashMap<PersonId, PersonRecord>;

/// Movie id to the people credited as actors in it.
pub type Adjacency = HashMap<TitleId, HashSet<PersonId>>;
