//! Field-mapping helpers shared by the CRM adapters.

use serde_json::{Map, Value};

use crate::models::PublicData;

/// Insert a string property, omitting absent values entirely (never null).
pub(crate) fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            map.insert(key.to_string(), Value::String(value.clone()));
        }
    }
}

/// Insert a string property unconditionally, including the empty string.
///
/// Used for last-name fields where an empty family name must travel as
/// `""`, not be omitted.
pub(crate) fn insert_str(map: &mut Map<String, Value>, key: &str, value: &str) {
    map.insert(key.to_string(), Value::String(value.to_string()));
}

/// Flatten a list-valued field to a comma-joined string for platforms
/// without a native list property. Empty lists flatten to nothing.
pub(crate) fn flatten_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Render public data into a line-per-field description blob.
pub(crate) fn public_data_notes(data: &PublicData) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(bio) = &data.bio {
        if !bio.is_empty() {
            lines.push(format!("Bio: {bio}"));
        }
    }
    let sections = [
        ("Skills", &data.skills),
        ("Languages", &data.languages),
        ("Interests", &data.interests),
        ("Publications", &data.publications),
        ("Awards", &data.awards),
        ("Work experience", &data.work_experience),
        ("Education", &data.education),
    ];
    for (label, values) in sections {
        if let Some(flat) = flatten_list(values) {
            lines.push(format!("{label}: {flat}"));
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
