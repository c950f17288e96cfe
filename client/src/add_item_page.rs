//! Page-level controller for adding a listing.
//!
//! The page owns the image attachments and the submission gate, routes user actions to them, and
//! keeps the single message shown to the user. Later errors overwrite earlier ones.

use listing_protocol::Attachment;
use listing_protocol::ListingField;

use crate::attachments::AttachmentError;
use crate::attachments::AttachmentSet;
use crate::preview::PreviewStore;
use crate::session::CurrentUser;
use crate::submission::BeginSubmit;
use crate::submission::SubmissionGate;
use crate::submission::SubmitOutcome;
use crate::transport::ListingTransport;
use crate::transport::TransportError;
use crate::transport::TransportResponse;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to add items";

/// Receives the "go to dashboard" signal after a listing is created.
pub trait Navigator {
    fn go_to_dashboard(&mut self);
}

/// What the page shows once the session has been checked.
pub enum PageView<S: PreviewStore> {
    /// No user is signed in; show [`LOGIN_REQUIRED_MESSAGE`] instead of the form.
    LoginRequired,
    Form(AddItemPage<S>),
}

impl<S: PreviewStore> PageView<S> {
    /// Check the session once and build the form only for a signed-in user.
    pub fn open(current_user: Option<CurrentUser>, store: S, endpoint: impl Into<String>) -> Self {
        match current_user {
            Some(user) => PageView::Form(AddItemPage::new(user, store, endpoint)),
            None => {
                tracing::debug!("no signed-in user; add-item form not shown");
                PageView::LoginRequired
            }
        }
    }
}

pub struct AddItemPage<S: PreviewStore> {
    user: CurrentUser,
    endpoint: String,
    attachments: AttachmentSet<S>,
    gate: SubmissionGate,
    message: Option<String>,
}

impl<S: PreviewStore> AddItemPage<S> {
    fn new(user: CurrentUser, store: S, endpoint: impl Into<String>) -> Self {
        Self {
            user,
            endpoint: endpoint.into(),
            attachments: AttachmentSet::new(store),
            gate: SubmissionGate::new(),
            message: None,
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn attachments(&self) -> &AttachmentSet<S> {
        &self.attachments
    }

    pub fn gate(&self) -> &SubmissionGate {
        &self.gate
    }

    /// The message currently shown to the user, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_field(&mut self, field: ListingField, value: impl Into<String>) {
        self.gate.set_field(field, value);
    }

    pub fn add_images(&mut self, files: Vec<Attachment>) -> Result<(), AttachmentError> {
        self.attachments
            .add(files)
            .inspect_err(|err| self.message = Some(err.to_string()))
    }

    pub fn remove_image(&mut self, index: usize) -> Result<Attachment, AttachmentError> {
        self.attachments
            .remove(index)
            .inspect_err(|err| self.message = Some(err.to_string()))
    }

    /// Start a submission. See [`SubmissionGate::begin_submit`].
    pub fn begin_submit(&mut self) -> BeginSubmit {
        let begin = self.gate.begin_submit(self.attachments.items());
        if !matches!(begin, BeginSubmit::AlreadySubmitting) {
            self.message = self.gate.last_error().map(str::to_string);
        }
        begin
    }

    /// Record the transport result and signal navigation on success.
    pub fn finish_submit<N: Navigator>(
        &mut self,
        result: Result<TransportResponse, TransportError>,
        navigator: &mut N,
    ) -> SubmitOutcome {
        let outcome = self.gate.finish_submit(result);
        match &outcome {
            SubmitOutcome::NavigateToDashboard => navigator.go_to_dashboard(),
            SubmitOutcome::Failed(message) => self.message = Some(message.clone()),
            SubmitOutcome::Rejected(_) | SubmitOutcome::Ignored => {}
        }
        outcome
    }

    pub async fn submit<T: ListingTransport, N: Navigator>(
        &mut self,
        transport: &T,
        navigator: &mut N,
    ) -> SubmitOutcome {
        let payload = match self.begin_submit() {
            BeginSubmit::Ready(payload) => payload,
            BeginSubmit::Rejected(errors) => return SubmitOutcome::Rejected(errors),
            BeginSubmit::AlreadySubmitting => return SubmitOutcome::Ignored,
        };
        let result = transport.post_multipart(&self.endpoint, payload).await;
        self.finish_submit(result, navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTransport;
    use crate::test_support::RecordingPreviewStore;
    use crate::test_support::blob;
    use crate::test_support::complete_fields;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ENDPOINT: &str = "http://localhost:5000/api/items";

    #[derive(Default)]
    struct CountingNavigator {
        dashboard_visits: usize,
    }

    impl Navigator for CountingNavigator {
        fn go_to_dashboard(&mut self) {
            self.dashboard_visits += 1;
        }
    }

    fn signed_in() -> Option<CurrentUser> {
        Some(CurrentUser::new("ada", Some("token".to_string())))
    }

    fn open_form() -> AddItemPage<RecordingPreviewStore> {
        match PageView::open(signed_in(), RecordingPreviewStore::default(), ENDPOINT) {
            PageView::Form(page) => page,
            PageView::LoginRequired => panic!("user is signed in"),
        }
    }

    fn fill(page: &mut AddItemPage<RecordingPreviewStore>) {
        for (field, value) in complete_fields().iter() {
            page.set_field(field, value);
        }
    }

    #[test]
    fn absent_user_gets_login_prompt() {
        let view = PageView::open(None, RecordingPreviewStore::default(), ENDPOINT);
        assert!(matches!(view, PageView::LoginRequired));
        assert_eq!(LOGIN_REQUIRED_MESSAGE, "Please login to add items");
    }

    #[tokio::test]
    async fn complete_listing_navigates_once() {
        let mut page = open_form();
        fill(&mut page);
        page.add_images(vec![blob("front.png"), blob("back.png")])
            .expect("add");
        let transport = FakeTransport::succeeding();
        let mut navigator = CountingNavigator::default();

        let outcome = page.submit(&transport, &mut navigator).await;

        assert_eq!(outcome, SubmitOutcome::NavigateToDashboard);
        assert_eq!(navigator.dashboard_visits, 1);
        assert_eq!(page.message(), None);
        assert!(!page.gate().is_submitting());
        assert_eq!(transport.calls()[0].0, ENDPOINT);
    }

    #[tokio::test]
    async fn server_message_is_shown_without_navigation() {
        let mut page = open_form();
        fill(&mut page);
        page.add_images(vec![blob("a.png")]).expect("add");
        let transport = FakeTransport::failing_with(TransportError::Status {
            status: 409,
            body: Some(json!({ "message": "Item already exists" })),
        });
        let mut navigator = CountingNavigator::default();

        page.submit(&transport, &mut navigator).await;

        assert_eq!(page.message(), Some("Item already exists"));
        assert_eq!(navigator.dashboard_visits, 0);
    }

    #[test]
    fn capacity_error_is_shown_and_later_replaced() {
        let mut page = open_form();
        page.add_images((1..=5).map(|i| blob(&format!("{i}.png"))).collect())
            .expect("fill to capacity");

        let err = page.add_images(vec![blob("6.png")]).expect_err("over capacity");
        assert!(matches!(err, AttachmentError::Capacity { .. }));
        assert_eq!(page.message(), Some("You can upload maximum 5 images"));
        assert_eq!(page.attachments().count(), 5);

        page.remove_image(9).expect_err("out of range");
        assert_eq!(page.message(), Some("No image at position 10"));
    }

    #[test]
    fn submit_clears_message_then_shows_validation_error() {
        let mut page = open_form();
        page.add_images((1..=6).map(|i| blob(&format!("{i}.png"))).collect())
            .expect_err("over capacity");
        assert!(page.message().is_some());

        let begin = page.begin_submit();
        assert!(matches!(begin, BeginSubmit::Rejected(_)));
        assert_eq!(page.message(), Some("Please fill in all required fields"));
    }

    #[test]
    fn attachment_edits_during_flight_do_not_affect_payload() {
        let mut page = open_form();
        fill(&mut page);
        page.add_images(vec![blob("a.png"), blob("b.png")])
            .expect("add");

        let BeginSubmit::Ready(payload) = page.begin_submit() else {
            panic!("should be ready");
        };
        page.remove_image(0).expect("remove while submitting");
        page.add_images(vec![blob("c.png")]).expect("add while submitting");
        assert!(matches!(page.begin_submit(), BeginSubmit::AlreadySubmitting));

        let sent: Vec<&str> = payload.images().map(Attachment::file_name).collect();
        assert_eq!(sent, vec!["a.png", "b.png"]);

        let mut navigator = CountingNavigator::default();
        let outcome = page.finish_submit(
            Err(TransportError::Request("reset by peer".to_string())),
            &mut navigator,
        );
        assert_eq!(outcome, SubmitOutcome::Failed("Failed to add item".to_string()));
        assert_eq!(page.message(), Some("Failed to add item"));
    }

    #[test]
    fn dropping_page_releases_previews() {
        let store = RecordingPreviewStore::default();
        let log = store.log();
        let PageView::Form(mut page) = PageView::open(signed_in(), store, ENDPOINT) else {
            panic!("user is signed in");
        };
        page.add_images(vec![blob("a.png"), blob("b.png")])
            .expect("add");
        assert_eq!(log.borrow().live().len(), 2);

        drop(page);
        assert!(log.borrow().live().is_empty());
    }
}
