//! Plain data shared by the listing client and its front ends.
//!
//! Nothing in this crate performs I/O: it describes the listing form (field keys, values and
//! choice catalogs), the image attachments selected for it, how the form is validated, and the
//! ordered multipart payload handed to a transport.

mod attachment;
pub mod catalog;
mod fields;
mod payload;
mod validation;

pub use attachment::Attachment;
pub use fields::ListingField;
pub use fields::ListingFields;
pub use fields::UnknownListingField;
pub use payload::IMAGES_FIELD;
pub use payload::ListingPayload;
pub use payload::PayloadPart;
pub use validation::ValidationError;
pub use validation::validate_listing;
