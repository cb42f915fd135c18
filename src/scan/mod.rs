//! Business-card image transcription via a vision-capable chat model.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::crm::http::shared_client;
use crate::error::{Error, Result};
use crate::models::{is_valid_email, Address, Lead};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const PROMPT: &str = "Transcribe this business card. Respond with only a JSON object \
holding the keys name, email, phone, company, job_title, website, address and \
linkedin_profile. Use null for anything not printed on the card.";

/// Raw fields as read off the card, before cleanup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Transcription {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub linkedin_profile: Option<String>,
}

impl Transcription {
    /// Normalize into a [`Lead`]: the name splits on its first whitespace
    /// (`Unknown` when the card had none) and a syntactically invalid email
    /// is dropped rather than propagated.
    pub fn into_lead(self) -> Lead {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let mut lead = Lead::from_full_name(&name);
        lead.email = self.email.filter(|e| is_valid_email(e));
        lead.phone = self.phone.filter(|v| !v.is_empty());
        lead.company = self.company.filter(|v| !v.is_empty());
        lead.job_title = self.job_title.filter(|v| !v.is_empty());
        lead.website = self.website.filter(|v| !v.is_empty());
        lead.linkedin_profile = self.linkedin_profile.filter(|v| !v.is_empty());
        if let Some(street) = self.address.filter(|v| !v.is_empty()) {
            lead.address = Some(Address {
                street: Some(street),
                ..Default::default()
            });
        }
        lead
    }
}

/// Client for the vision transcription endpoint.
pub struct Transcriber {
    api_key: String,
    base_url: String,
    model: String,
}

impl Transcriber {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Read the card image into structured fields.
    ///
    /// Rejects unsupported content types and images over 10 MiB with
    /// [`Error::InvalidArgument`] before any upload happens.
    pub async fn transcribe(&self, image: &[u8], content_type: &str) -> Result<Transcription> {
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(Error::InvalidArgument(format!(
                "unsupported image type {content_type:?}, expected one of {ALLOWED_IMAGE_TYPES:?}"
            )));
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(Error::InvalidArgument(format!(
                "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
                image.len()
            )));
        }

        let data_url = format!("data:{content_type};base64,{}", BASE64.encode(image));
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": PROMPT },
                    { "type": "image_url", "image_url": { "url": data_url } },
                ],
            }],
            "max_tokens": 500,
        });

        debug!(model = %self.model, bytes = image.len(), "transcribing card image");
        let response = shared_client()
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), text));
        }

        let parsed: serde_json::Value = serde_json::from_str(&text)?;
        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::InvalidArgument("transcription response had no content".into()))?;
        extract_json_object(content)
    }
}

/// Pull the first `{...}` object out of model output, which often wraps the
/// JSON in prose or a code fence.
fn extract_json_object(content: &str) -> Result<Transcription> {
    let start = content.find('{');
    let end = content.rfind('}');
    let slice = match (start, end) {
        (Some(start), Some(end)) if end >= start => &content[start..=end],
        _ => {
            return Err(Error::InvalidArgument(
                "transcription output contained no JSON object".into(),
            ))
        }
    };
    Ok(serde_json::from_str(slice)?)
}
