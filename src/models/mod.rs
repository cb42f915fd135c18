//! Domain models: the lead record extracted from a business card.

pub mod lead;

pub use lead::{is_valid_email, split_full_name, Address, Lead, PublicData, SocialProfile};
