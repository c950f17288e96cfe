use crate::ListingField;
use crate::ListingFields;

/// Reasons a listing cannot be submitted yet.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingFields { fields: Vec<ListingField> },
    #[error("Please upload at least one image")]
    NoImages,
}

/// Check that the listing is complete.
///
/// Checks run in a fixed order (required fields, then images) and every failing check is
/// reported. Callers that show a single message use the first entry.
pub fn validate_listing(
    fields: &ListingFields,
    attachment_count: usize,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let missing = fields.missing_required();
    if !missing.is_empty() {
        errors.push(ValidationError::MissingFields { fields: missing });
    }

    if attachment_count == 0 {
        errors.push(ValidationError::NoImages);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
