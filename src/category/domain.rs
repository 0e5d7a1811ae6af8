//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated category ID, a string of exactly four ASCII digits.
///
/// Category IDs are chosen by the user when the category is created, unlike
/// most records which use database-assigned row IDs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category ID.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidCategoryId] if `id` is not
    /// a string of exactly four ASCII digits.
    pub fn new(id: &str) -> Result<Self, Error> {
        let id = id.trim();

        if id.len() == 4 && id.chars().all(|character| character.is_ascii_digit()) {
            Ok(Self(id.to_string()))
        } else {
            Err(Error::InvalidCategoryId(id.to_string()))
        }
    }

    /// Create a category ID without validation.
    ///
    /// The caller should ensure that the string is a 4-digit number.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the 4-digit invariant is violated it will cause incorrect behaviour
    /// but not affect memory safety.
    pub fn new_unchecked(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryId::new(s)
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for classifying expense transactions (e.g., '0100' Groceries).
///
/// Categories are shared across all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The user-chosen four digit ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
}

/// Form data for category creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub id: String,
    pub name: String,
}

/// Form data for category editing. Only the name can be changed.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditCategoryFormData {
    pub name: String,
}
