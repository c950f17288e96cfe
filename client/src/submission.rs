use listing_protocol::Attachment;
use listing_protocol::ListingField;
use listing_protocol::ListingFields;
use listing_protocol::ListingPayload;
use listing_protocol::ValidationError;
use listing_protocol::validate_listing;

use crate::transport::ListingTransport;
use crate::transport::TransportError;
use crate::transport::TransportResponse;
use crate::transport::extract_message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
}

impl SubmitStatus {
    pub fn button_label(self) -> &'static str {
        match self {
            SubmitStatus::Idle => "Add Item",
            SubmitStatus::Submitting => "Adding Item...",
        }
    }
}

/// Result of starting a submission.
#[derive(Debug)]
pub enum BeginSubmit {
    /// Validation passed; send this snapshot and report back via
    /// [`SubmissionGate::finish_submit`].
    Ready(ListingPayload),
    /// Validation failed; the gate is back to idle with `last_error` set.
    Rejected(Vec<ValidationError>),
    /// A submission is already in flight; nothing changed.
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The listing was created; the caller should leave for the dashboard.
    NavigateToDashboard,
    /// Validation failed before anything was sent.
    Rejected(Vec<ValidationError>),
    /// The transport reported a failure; carries the message now in `last_error`.
    Failed(String),
    /// Called while another submission was in flight.
    Ignored,
}

/// Field values of the listing form plus the idle/submitting gate around sending them.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    fields: ListingFields,
    status: SubmitStatus,
    last_error: Option<String>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a field. Values are only checked when submitting.
    pub fn set_field(&mut self, field: ListingField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    pub fn field(&self, field: ListingField) -> &str {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &ListingFields {
        &self.fields
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn validate(&self, attachment_count: usize) -> Result<(), Vec<ValidationError>> {
        validate_listing(&self.fields, attachment_count)
    }

    /// Start a submission: clear the previous error, validate, and snapshot the payload.
    ///
    /// On `Ready` the gate stays in `Submitting` until [`finish_submit`](Self::finish_submit)
    /// is called. Edits made in the meantime do not affect the returned payload.
    pub fn begin_submit(&mut self, attachments: &[Attachment]) -> BeginSubmit {
        if self.is_submitting() {
            tracing::debug!("ignoring submit while a submission is in flight");
            return BeginSubmit::AlreadySubmitting;
        }

        self.last_error = None;
        self.status = SubmitStatus::Submitting;

        if let Err(errors) = self.validate(attachments.len()) {
            // Only the first failure is shown.
            self.last_error = errors.first().map(ToString::to_string);
            self.status = SubmitStatus::Idle;
            tracing::debug!("listing rejected by validation: {errors:?}");
            return BeginSubmit::Rejected(errors);
        }

        BeginSubmit::Ready(ListingPayload::new(&self.fields, attachments))
    }

    /// Record the transport result of the submission started by
    /// [`begin_submit`](Self::begin_submit) and return to idle.
    pub fn finish_submit(
        &mut self,
        result: Result<TransportResponse, TransportError>,
    ) -> SubmitOutcome {
        if !self.is_submitting() {
            tracing::warn!("submission result arrived with no submission in flight");
            return SubmitOutcome::Ignored;
        }

        self.status = SubmitStatus::Idle;
        match result {
            Ok(response) => {
                tracing::info!("listing created (status {})", response.status);
                SubmitOutcome::NavigateToDashboard
            }
            Err(err) => {
                tracing::warn!("listing submission failed: {err}");
                let message = extract_message(&err);
                self.last_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Validate, send, and record the outcome in one go.
    pub async fn submit<T: ListingTransport>(
        &mut self,
        attachments: &[Attachment],
        transport: &T,
        endpoint: &str,
    ) -> SubmitOutcome {
        let payload = match self.begin_submit(attachments) {
            BeginSubmit::Ready(payload) => payload,
            BeginSubmit::Rejected(errors) => return SubmitOutcome::Rejected(errors),
            BeginSubmit::AlreadySubmitting => return SubmitOutcome::Ignored,
        };
        let result = transport.post_multipart(endpoint, payload).await;
        self.finish_submit(result)
    }
}
