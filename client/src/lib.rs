// Forbid accidental stdout/stderr writes in the library; front ends own the terminal.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod add_item_page;
mod attachments;
mod http_transport;
mod image_path;
mod preview;
mod session;
mod submission;
mod transport;
mod version;

#[cfg(test)]
mod test_support;

pub use add_item_page::AddItemPage;
pub use add_item_page::LOGIN_REQUIRED_MESSAGE;
pub use add_item_page::Navigator;
pub use add_item_page::PageView;
pub use attachments::AttachmentError;
pub use attachments::AttachmentSet;
pub use attachments::MAX_ATTACHMENTS;
pub use http_transport::HttpTransport;
pub use http_transport::items_endpoint;
pub use image_path::EncodedImageFormat;
pub use image_path::ImageLoadError;
pub use image_path::image_format;
pub use image_path::load_image_attachment;
pub use image_path::normalize_image_path;
pub use preview::PreviewHandle;
pub use preview::PreviewStore;
pub use preview::TempDirPreviewStore;
pub use session::CurrentUser;
pub use submission::BeginSubmit;
pub use submission::SubmissionGate;
pub use submission::SubmitOutcome;
pub use submission::SubmitStatus;
pub use transport::FALLBACK_ERROR_MESSAGE;
pub use transport::ListingTransport;
pub use transport::TransportError;
pub use transport::TransportResponse;
pub use transport::extract_message;
pub use version::LISTING_VERSION;
