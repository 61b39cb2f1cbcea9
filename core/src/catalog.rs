//! Categories, genres and titles.

use crate::error::{FieldErrors, Result};
use crate::validation::{
    CATALOG_NAME_MAX_LENGTH, DESCRIPTION_MAX_LENGTH, required, validate_max_length, validate_name,
    validate_slug,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database identifier of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(pub i64);

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category or genre: a named group of titles addressed by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxon {
    /// Identifier.
    #[serde(skip)]
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique URL key.
    pub slug: String,
}

/// A category such as "Books" or "Films". A title has at most one.
pub type Category = Taxon;

/// A genre such as "Drama". A title may have many.
pub type Genre = Taxon;

/// Which grouping a [`Taxon`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    /// Categories.
    Category,
    /// Genres.
    Genre,
}

impl Taxonomy {
    /// Resource name used in errors and logs.
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Genre => "genre",
        }
    }
}

/// Validated name and slug for a new category or genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxon {
    /// Display name.
    pub name: String,
    /// Unique URL key.
    pub slug: String,
}

/// Category or genre payload as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonInput {
    /// Display name.
    pub name: Option<String>,
    /// URL key.
    pub slug: Option<String>,
}

impl TaxonInput {
    /// Validate the payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when a field is missing or malformed.
    pub fn validate(self) -> Result<NewTaxon> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", self.name);
        let slug = required(&mut errors, "slug", self.slug);
        if let Some(name) = &name {
            errors.check("name", validate_name(name, CATALOG_NAME_MAX_LENGTH));
        }
        if let Some(slug) = &slug {
            errors.check("slug", validate_slug(slug));
        }
        errors.into_result()?;
        Ok(NewTaxon {
            name: name.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
        })
    }
}

/// Read representation of a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleView {
    /// Identifier.
    pub id: TitleId,
    /// Unique name.
    pub name: String,
    /// Release year.
    pub year: i32,
    /// Rounded mean review score, `None` without reviews.
    pub rating: Option<i32>,
    /// Genres, ordered by slug.
    #[serde(rename = "genre")]
    pub genres: Vec<Genre>,
    /// Category, if any.
    pub category: Option<Category>,
    /// Description.
    pub description: Option<String>,
}

/// Validated data for a new title. Genres and category are given by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTitle {
    /// Unique name.
    pub name: String,
    /// Release year.
    pub year: i32,
    /// Description.
    pub description: Option<String>,
    /// Genre slugs.
    pub genres: Vec<String>,
    /// Category slug.
    pub category: Option<String>,
}

/// Partial update of a title.
///
/// `category: Some(None)` detaches the title from its category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePatch {
    /// New name.
    pub name: Option<String>,
    /// New year.
    pub year: Option<i32>,
    /// New description.
    pub description: Option<Option<String>>,
    /// Replacement genre set.
    pub genres: Option<Vec<String>>,
    /// New category.
    pub category: Option<Option<String>>,
}

/// Title payload as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleInput {
    /// Name.
    pub name: Option<String>,
    /// Release year.
    pub year: Option<i32>,
    /// Description. An explicit `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Genre slugs.
    pub genre: Option<Vec<String>>,
    /// Category slug. An explicit `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TitleInput {
    /// Validate a payload for title creation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when a field is missing or malformed.
    pub fn into_new_title(self) -> Result<NewTitle> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", self.name.clone());
        let year = required(&mut errors, "year", self.year);
        required(&mut errors, "genre", self.genre.as_ref());
        let patch = self.validated_patch(&mut errors);
        errors.into_result()?;

        Ok(NewTitle {
            name: name.unwrap_or_default(),
            year: year.unwrap_or_default(),
            description: patch.description.flatten(),
            genres: patch.genres.unwrap_or_default(),
            category: patch.category.flatten(),
        })
    }

    /// Validate a payload for a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when a field is malformed.
    pub fn into_patch(self) -> Result<TitlePatch> {
        let mut errors = FieldErrors::new();
        let patch = self.validated_patch(&mut errors);
        errors.into_result()?;
        Ok(patch)
    }

    fn validated_patch(self, errors: &mut FieldErrors) -> TitlePatch {
        if let Some(name) = &self.name {
            errors.check("name", validate_name(name, CATALOG_NAME_MAX_LENGTH));
        }
        if let Some(Some(description)) = &self.description {
            errors.check(
                "description",
                validate_max_length(description, DESCRIPTION_MAX_LENGTH),
            );
        }
        if let Some(genres) = &self.genre {
            for slug in genres {
                errors.check("genre", validate_slug(slug));
            }
        }
        if let Some(Some(category)) = &self.category {
            errors.check("category", validate_slug(category));
        }

        let mut genres = self.genre;
        if let Some(genres) = genres.as_mut() {
            genres.sort();
            genres.dedup();
        }

        TitlePatch {
            name: self.name,
            year: self.year,
            description: self.description,
            genres,
            category: self.category,
        }
    }
}

/// Filters accepted by the title listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TitleFilter {
    /// Category slug, exact.
    pub category: Option<String>,
    /// Genre slug, exact.
    pub genre: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Release year, exact.
    pub year: Option<i32>,
}

impl TitleFilter {
    /// Returns `true` if the title passes every set filter.
    #[must_use]
    pub fn matches(&self, title: &TitleView) -> bool {
        if let Some(slug) = &self.category {
            if title.category.as_ref().is_none_or(|c| &c.slug != slug) {
                return false;
            }
        }
        if let Some(slug) = &self.genre {
            if !title.genres.iter().any(|g| &g.slug == slug) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !contains_ignore_case(&title.name, name) {
                return false;
            }
        }
        self.year.is_none_or(|year| title.year == year)
    }
}

/// Case-insensitive substring match used by `search` and `name` filters.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
