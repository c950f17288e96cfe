use std::cell::RefCell;
use std::io;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Mutex;

use image::ImageBuffer;
use image::ImageFormat;
use image::Rgba;
use listing_protocol::Attachment;
use listing_protocol::ListingField;
use listing_protocol::ListingFields;
use listing_protocol::ListingPayload;

use crate::PreviewHandle;
use crate::PreviewStore;
use crate::transport::ListingTransport;
use crate::transport::TransportError;
use crate::transport::TransportResponse;

/// Encode a solid-colour PNG of the given size.
pub(crate) fn png_attachment(name: &str, width: u32, height: u32) -> Attachment {
    let image = ImageBuffer::from_pixel(width, height, Rgba([200u8, 40, 120, 255]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png");
    Attachment::new(name, "image/png", out.into_inner())
}

/// Cheap attachment for tests that never decode the bytes.
pub(crate) fn blob(name: &str) -> Attachment {
    Attachment::new(name, "image/png", name.as_bytes().to_vec())
}

pub(crate) fn complete_fields() -> ListingFields {
    let mut fields = ListingFields::default();
    fields.set(ListingField::Title, "Vintage Denim Jacket");
    fields.set(ListingField::Description, "Worn twice, no stains");
    fields.set(ListingField::Size, "M");
    fields.set(ListingField::Category, "Jackets");
    fields.set(ListingField::Gender, "women");
    fields.set(ListingField::AgeCategory, "adult");
    fields.set(ListingField::Tags, "vintage, denim");
    fields
}

#[derive(Debug, Default)]
pub(crate) struct PreviewLog {
    pub(crate) created: Vec<u64>,
    pub(crate) revoked: Vec<u64>,
}

impl PreviewLog {
    pub(crate) fn live(&self) -> Vec<u64> {
        self.created
            .iter()
            .copied()
            .filter(|id| !self.revoked.contains(id))
            .collect()
    }
}

/// In-memory store that records every create/revoke so tests can assert release discipline.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingPreviewStore {
    log: Rc<RefCell<PreviewLog>>,
    next_id: Rc<RefCell<u64>>,
    /// Fail the n-th `create` call (0-based, counted across the store's lifetime).
    fail_on_create: Option<usize>,
}

impl RecordingPreviewStore {
    pub(crate) fn failing_on(call: usize) -> Self {
        Self {
            fail_on_create: Some(call),
            ..Default::default()
        }
    }

    pub(crate) fn log(&self) -> Rc<RefCell<PreviewLog>> {
        Rc::clone(&self.log)
    }
}

impl PreviewStore for RecordingPreviewStore {
    fn create(&mut self, attachment: &Attachment) -> io::Result<PreviewHandle> {
        let mut next_id = self.next_id.borrow_mut();
        let call = usize::try_from(*next_id).unwrap_or(usize::MAX);
        *next_id += 1;
        if self.fail_on_create == Some(call) {
            return Err(io::Error::other("disk full"));
        }
        let id = *next_id;
        self.log.borrow_mut().created.push(id);
        Ok(PreviewHandle::new(
            id,
            format!("mem://{id}/{}", attachment.file_name()),
            None,
        ))
    }

    fn revoke(&mut self, handle: PreviewHandle) {
        self.log.borrow_mut().revoked.push(handle.id());
    }
}

/// Transport that records every call and answers with a canned result.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    failure: Option<TransportError>,
    calls: Mutex<Vec<(String, ListingPayload)>>,
}

impl FakeTransport {
    pub(crate) fn succeeding() -> Self {
        Self::default()
    }

    pub(crate) fn failing_with(err: TransportError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, ListingPayload)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ListingTransport for FakeTransport {
    async fn post_multipart(
        &self,
        endpoint: &str,
        payload: ListingPayload,
    ) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((endpoint.to_string(), payload));
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(TransportResponse {
                status: 201,
                body: Some(serde_json::json!({ "id": "item-1" })),
            }),
        }
    }
}
