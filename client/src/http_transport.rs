use listing_protocol::ListingPayload;
use listing_protocol::PayloadPart;
use reqwest::multipart::Form;
use reqwest::multipart::Part;

use crate::transport::ListingTransport;
use crate::transport::TransportError;
use crate::transport::TransportResponse;
use crate::version::LISTING_VERSION;

const ITEMS_PATH: &str = "/api/items";

/// Endpoint that creates listings, relative to the API base URL.
pub fn items_endpoint(api_base_url: &str) -> String {
    format!("{}{ITEMS_PATH}", api_base_url.trim_end_matches('/'))
}

/// Posts listings to the remote API as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(bearer_token: Option<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("listing-client/{LISTING_VERSION}"))
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(Self {
            client,
            bearer_token,
        })
    }
}

impl ListingTransport for HttpTransport {
    async fn post_multipart(
        &self,
        endpoint: &str,
        payload: ListingPayload,
    ) -> Result<TransportResponse, TransportError> {
        let image_count = payload.images().count();
        let form = build_form(payload)?;

        let mut request = self.client.post(endpoint).multipart(form);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("posting listing with {image_count} image(s) to {endpoint}");
        let response = request
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let body = serde_json::from_str(&text).ok();

        if status.is_success() {
            Ok(TransportResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            tracing::warn!("listing rejected with status {status}");
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn build_form(payload: ListingPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in payload.into_parts() {
        form = match part {
            PayloadPart::Text { name, value } => form.text(name, value),
            PayloadPart::File { name, attachment } => {
                let file = Part::bytes(attachment.bytes().to_vec())
                    .file_name(attachment.file_name().to_string())
                    .mime_str(attachment.mime_type())
                    .map_err(|err| {
                        TransportError::Request(format!(
                            "invalid mime type `{}` for {}: {err}",
                            attachment.mime_type(),
                            attachment.file_name()
                        ))
                    })?;
                form.part(name, file)
            }
        };
    }
    Ok(form)
}
