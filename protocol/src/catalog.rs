//! Choice lists offered by the categorical selectors of the listing form.

use crate::ListingField;

pub const SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL"];

pub const CATEGORIES: &[&str] = &[
    "Shirts",
    "Pants",
    "Dresses",
    "Jackets",
    "Shoes",
    "Accessories",
];

pub const GENDERS: &[&str] = &["men", "women", "kids"];

pub const AGE_CATEGORIES: &[&str] = &["adult", "teen", "child"];

/// Choices for a selector field, or `None` for free-text fields.
pub fn choices(field: ListingField) -> Option<&'static [&'static str]> {
    match field {
        ListingField::Size => Some(SIZES),
        ListingField::Category => Some(CATEGORIES),
        ListingField::Gender => Some(GENDERS),
        ListingField::AgeCategory => Some(AGE_CATEGORIES),
        ListingField::Title | ListingField::Description | ListingField::Tags => None,
    }
}

/// Text shown for a choice: the value with its first character upper-cased.
pub fn choice_label(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Placeholder option shown while a selector has no value.
pub fn placeholder(field: ListingField) -> Option<&'static str> {
    match field {
        ListingField::Size => Some("Select size"),
        ListingField::Category => Some("Select category"),
        ListingField::Gender => Some("Select gender"),
        ListingField::AgeCategory => Some("Select age category"),
        ListingField::Title => Some("e.g., Vintage Denim Jacket"),
        ListingField::Description => Some("Describe your item in detail..."),
        ListingField::Tags => Some("e.g., vintage, casual, summer"),
    }
}
