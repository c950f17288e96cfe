use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::IntoStaticStr;

/// One of the fixed keys of the listing form.
///
/// The `Display`/wire name is the key the remote API expects (`ageCategory` is camel-cased).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ListingField {
    Title,
    Description,
    Size,
    Category,
    Gender,
    AgeCategory,
    Tags,
}

impl ListingField {
    /// Every key, in form (and payload) order.
    pub const ALL: [ListingField; 7] = [
        ListingField::Title,
        ListingField::Description,
        ListingField::Size,
        ListingField::Category,
        ListingField::Gender,
        ListingField::AgeCategory,
        ListingField::Tags,
    ];

    /// Key used for this field in the multipart payload.
    pub fn wire_name(self) -> &'static str {
        self.into()
    }

    /// Only `tags` may be left empty.
    pub fn is_required(self) -> bool {
        !matches!(self, ListingField::Tags)
    }

    /// Human label shown next to the input, with a trailing `*` for required fields.
    pub fn label(self) -> &'static str {
        match self {
            ListingField::Title => "Title *",
            ListingField::Description => "Description *",
            ListingField::Size => "Size *",
            ListingField::Category => "Category *",
            ListingField::Gender => "Gender *",
            ListingField::AgeCategory => "Age Category *",
            ListingField::Tags => "Tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown listing field `{0}`")]
pub struct UnknownListingField(pub String);

impl FromStr for ListingField {
    type Err = UnknownListingField;

    /// Accepts the wire name (`ageCategory`) as well as the snake/kebab spellings a shell user is
    /// likely to type (`age_category`, `age-category`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ListingField::ALL
            .into_iter()
            .find(|field| field.wire_name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnknownListingField(s.to_string()))
    }
}

/// Current values of every listing field.
///
/// Values are stored verbatim; nothing is checked until the form is validated on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFields {
    pub title: String,
    pub description: String,
    pub size: String,
    pub category: String,
    pub gender: String,
    pub age_category: String,
    pub tags: String,
}

impl ListingFields {
    pub fn get(&self, field: ListingField) -> &str {
        match field {
            ListingField::Title => &self.title,
            ListingField::Description => &self.description,
            ListingField::Size => &self.size,
            ListingField::Category => &self.category,
            ListingField::Gender => &self.gender,
            ListingField::AgeCategory => &self.age_category,
            ListingField::Tags => &self.tags,
        }
    }

    pub fn set(&mut self, field: ListingField, value: impl Into<String>) {
        let slot = match field {
            ListingField::Title => &mut self.title,
            ListingField::Description => &mut self.description,
            ListingField::Size => &mut self.size,
            ListingField::Category => &mut self.category,
            ListingField::Gender => &mut self.gender,
            ListingField::AgeCategory => &mut self.age_category,
            ListingField::Tags => &mut self.tags,
        };
        *slot = value.into();
    }

    /// `(field, value)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (ListingField, &str)> + '_ {
        ListingField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Required fields whose value is currently empty, in form order.
    pub fn missing_required(&self) -> Vec<ListingField> {
        self.iter()
            .filter(|(field, value)| field.is_required() && value.is_empty())
            .map(|(field, _)| field)
            .collect()
    }
}
