use crate::Attachment;
use crate::ListingFields;

/// Multipart field name shared by every attached image.
pub const IMAGES_FIELD: &str = "images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadPart {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        attachment: Attachment,
    },
}

impl PayloadPart {
    pub fn name(&self) -> &'static str {
        match self {
            PayloadPart::Text { name, .. } | PayloadPart::File { name, .. } => *name,
        }
    }
}

/// Snapshot of a listing ready for transport.
///
/// One text part per field in form order (empty optional fields included), followed by one
/// `images` part per attachment in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPayload {
    parts: Vec<PayloadPart>,
}

impl ListingPayload {
    pub fn new<'a>(
        fields: &ListingFields,
        attachments: impl IntoIterator<Item = &'a Attachment>,
    ) -> Self {
        let mut parts: Vec<PayloadPart> = fields
            .iter()
            .map(|(field, value)| PayloadPart::Text {
                name: field.wire_name(),
                value: value.to_string(),
            })
            .collect();
        parts.extend(
            attachments
                .into_iter()
                .map(|attachment| PayloadPart::File {
                    name: IMAGES_FIELD,
                    attachment: attachment.clone(),
                }),
        );
        Self { parts }
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<PayloadPart> {
        self.parts
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            PayloadPart::Text { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &Attachment> + '_ {
        self.parts.iter().filter_map(|part| match part {
            PayloadPart::File { attachment, .. } => Some(attachment),
            PayloadPart::Text { .. } => None,
        })
    }
}
