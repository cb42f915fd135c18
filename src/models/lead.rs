//! The structured contact record extracted from a business card.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const MAX_NAME_LEN: usize = 50;
const MAX_LIST_ITEMS: usize = 50;

pub(crate) const DEFAULT_SOURCE: &str = "business_card_scanner";
pub(crate) const DEFAULT_LIFECYCLE_STAGE: &str = "lead";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("email regex is valid")
    })
}

/// Postal address attached to a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A social media profile gathered for a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub kind: String,
    pub url: String,
}

/// Publicly gathered background data; every list is bounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub awards: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_experience: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<String>,
}

impl PublicData {
    fn lists(&self) -> [(&'static str, &Vec<String>); 7] {
        [
            ("skills", &self.skills),
            ("languages", &self.languages),
            ("interests", &self.interests),
            ("publications", &self.publications),
            ("awards", &self.awards),
            ("work_experience", &self.work_experience),
            ("education", &self.education),
        ]
    }
}

/// The structured contact record sent to a CRM.
///
/// Optional fields that are absent are omitted from serialization, never sent
/// as null; provider adapters re-add nulls only where a CRM requires them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub first_name: String,
    /// May legitimately be empty when the card carried a single-token name.
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub social_profiles: Vec<SocialProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_data: Option<PublicData>,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_lifecycle_stage")]
    pub lifecycle_stage: String,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_lifecycle_stage() -> String {
    DEFAULT_LIFECYCLE_STAGE.to_string()
}

impl Lead {
    /// Create a lead with explicit given and family names.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            source: default_source(),
            lifecycle_stage: default_lifecycle_stage(),
            ..Default::default()
        }
    }

    /// Create a lead from a combined name string.
    ///
    /// Splits on the first whitespace run: the first token becomes the given
    /// name, the remainder the family name. A single-token name yields an
    /// empty (not omitted) family name.
    pub fn from_full_name(name: &str) -> Self {
        let (first, last) = split_full_name(name);
        Self::new(first, last)
    }

    /// The combined display name.
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_job_title(mut self, job_title: impl Into<String>) -> Self {
        self.job_title = Some(job_title.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_twitter_handle(mut self, handle: impl Into<String>) -> Self {
        self.twitter_handle = Some(handle.into());
        self
    }

    pub fn with_linkedin_profile(mut self, url: impl Into<String>) -> Self {
        self.linkedin_profile = Some(url.into());
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_social_profile(mut self, kind: impl Into<String>, url: impl Into<String>) -> Self {
        self.social_profiles.push(SocialProfile {
            kind: kind.into(),
            url: url.into(),
        });
        self
    }

    pub fn with_public_data(mut self, data: PublicData) -> Self {
        self.public_data = Some(data);
        self
    }

    /// Validate the record before it is mapped to any provider schema.
    ///
    /// At least one identity field must be non-empty; name fields are capped
    /// at 50 characters; email and website are checked syntactically.
    pub fn validate(&self) -> Result<(), Error> {
        if self.first_name.trim().is_empty() && self.last_name.trim().is_empty() {
            return Err(Error::InvalidLead(
                "at least one of first_name or last_name must be non-empty".into(),
            ));
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.chars().count() > MAX_NAME_LEN {
                return Err(Error::InvalidLead(format!(
                    "{field} exceeds {MAX_NAME_LEN} characters"
                )));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(Error::InvalidLead(format!("invalid email address: {email}")));
            }
        }
        if let Some(website) = &self.website {
            reqwest::Url::parse(website)
                .map_err(|e| Error::InvalidLead(format!("invalid website URL: {e}")))?;
        }
        if let Some(data) = &self.public_data {
            for (field, list) in data.lists() {
                if list.len() > MAX_LIST_ITEMS {
                    return Err(Error::InvalidLead(format!(
                        "public_data.{field} exceeds {MAX_LIST_ITEMS} entries"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Split a combined name on the first whitespace run.
///
/// `"John Doe"` → `("John", "Doe")`, `"John"` → `("John", "")`,
/// `"John van Doe"` → `("John", "van Doe")`.
pub fn split_full_name(name: &str) -> (String, String) {
    let trimmed = name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Syntactic email validation (RFC-5322-ish, not a deliverability check).
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_full_name_keeps_remainder_as_last_name() {
        assert_eq!(split_full_name("John Doe"), ("John".into(), "Doe".into()));
        assert_eq!(
            split_full_name("John van Doe"),
            ("John".into(), "van Doe".into())
        );
    }

    #[test]
    fn split_single_token_yields_empty_last_name() {
        assert_eq!(split_full_name("John"), ("John".into(), String::new()));
        let lead = Lead::from_full_name("John");
        assert_eq!(lead.first_name, "John");
        assert_eq!(lead.last_name, "");
        assert_eq!(lead.full_name(), "John");
    }

    #[test]
    fn lead_defaults_source_and_lifecycle_stage() {
        let lead = Lead::from_full_name("Jane Roe");
        assert_eq!(lead.source, "business_card_scanner");
        assert_eq!(lead.lifecycle_stage, "lead");
    }

    #[test]
    fn absent_optional_fields_are_omitted_from_json() {
        let lead = Lead::from_full_name("Jane Roe").with_email("jane@example.com");
        let json = serde_json::to_value(&lead).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["email"], "jane@example.com");
        assert!(!obj.contains_key("phone"));
        assert!(!obj.contains_key("public_data"));
        assert!(!obj.contains_key("social_profiles"));
    }

    #[test]
    fn validate_requires_an_identity_field() {
        let lead = Lead::new("", "");
        assert!(matches!(lead.validate(), Err(Error::InvalidLead(_))));
        assert!(Lead::new("J", "").validate().is_ok());
    }

    #[test]
    fn validate_rejects_over_long_names() {
        let lead = Lead::new("x".repeat(51), "");
        assert!(matches!(lead.validate(), Err(Error::InvalidLead(_))));
    }

    #[test]
    fn validate_checks_email_and_website_syntax() {
        assert!(Lead::from_full_name("Jane Roe")
            .with_email("not-an-email")
            .validate()
            .is_err());
        assert!(Lead::from_full_name("Jane Roe")
            .with_website("::not a url::")
            .validate()
            .is_err());
        assert!(Lead::from_full_name("Jane Roe")
            .with_email("jane@example.com")
            .with_website("https://example.com")
            .validate()
            .is_ok());
    }

    #[test]
    fn email_validation_accepts_common_forms() {
        assert!(is_valid_email("a.b+tag@sub.example.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("double@@example.com"));
        assert!(!is_valid_email("trailing-dot@example."));
    }

    #[test]
    fn deserialization_fills_defaults() {
        let lead: Lead = serde_json::from_str(r#"{"first_name": "Ada"}"#).unwrap();
        assert_eq!(lead.source, "business_card_scanner");
        assert_eq!(lead.lifecycle_stage, "lead");
        assert_eq!(lead.last_name, "");
    }
}
