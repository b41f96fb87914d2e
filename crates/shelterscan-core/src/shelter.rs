//! Canonical shelter records.

use serde::{Deserialize, Serialize};

use crate::filters::RadiusTier;
use crate::geo::Coordinate;

/// Text stored in a [`Shelter`] field when no source supplied a value.
///
/// Every optional string field is filled with one of these so consumers
/// never see an empty string.
pub mod placeholder {
    pub const NAME: &str = "Unnamed Animal Shelter";
    pub const ADDRESS: &str = "Address not available";
    pub const CITY: &str = "City not available";
    pub const STATE: &str = "State not available";
    pub const ZIP: &str = "ZIP not available";
    pub const PHONE: &str = "Phone not available";
    pub const EMAIL: &str = "Email not available";
    pub const WEBSITE: &str = "Website not available";
    pub const DESCRIPTION: &str = "No description available";
    pub const HOURS: &str = "Hours not available";
    pub const SERVICES: &str = "Contact shelter for services";

    /// All placeholder values, used to tell real contact data apart.
    pub const ALL: &[&str] = &[
        NAME,
        ADDRESS,
        CITY,
        STATE,
        ZIP,
        PHONE,
        EMAIL,
        WEBSITE,
        DESCRIPTION,
        HOURS,
        SERVICES,
    ];

    /// Returns `true` if `value` is one of the placeholder strings.
    #[must_use]
    pub fn is_placeholder(value: &str) -> bool {
        ALL.contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    /// Provider-prefixed identifier, unique across sources.
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub coordinates: Coordinate,
    pub description: String,
    /// Ordered by relevance; never empty.
    pub services: Vec<String>,
    pub hours: String,
    pub image_url: Option<String>,
    /// Set for generated sample records that do not describe a real place.
    pub is_synthetic: bool,
}

impl Shelter {
    /// `true` when the phone field holds real data.
    #[must_use]
    pub fn has_phone(&self) -> bool {
        !placeholder::is_placeholder(&self.phone)
    }

    #[must_use]
    pub fn has_email(&self) -> bool {
        !placeholder::is_placeholder(&self.email)
    }

    #[must_use]
    pub fn has_website(&self) -> bool {
        !placeholder::is_placeholder(&self.website)
    }
}

/// A [`Shelter`] paired with its distance from the discovery center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterWithDistance {
    #[serde(flatten)]
    pub shelter: Shelter,
    /// Miles from the center, always non-negative.
    pub distance: f64,
    /// Smallest radius band containing `distance`, if any.
    pub tier: Option<RadiusTier>,
}
