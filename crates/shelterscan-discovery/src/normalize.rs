//! Normalization from raw provider records to [`Shelter`].
//!
//! The two providers describe the same place with different layouts
//! (Nominatim: `address`/`extratags`/`namedetails`; Overpass: flat `tags`
//! with `addr:*` keys). Each field is read through an ordered cascade of JSON
//! pointers covering both layouts, ending in a placeholder string, so every
//! emitted shelter has every field populated.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use shelterscan_core::{distance_miles, placeholder, Coordinate, Shelter};

use crate::providers::{value_as_f64, RawCandidate};

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").expect("valid regex"));

const LAT_PATHS: &[&str] = &["/lat", "/center/lat"];
const LON_PATHS: &[&str] = &["/lon", "/center/lon"];

const STRUCTURED_NAME_PATHS: &[&str] = &["/namedetails/name", "/tags/name", "/tags/official_name"];
const GENERIC_NAME_PATHS: &[&str] = &["/name"];
const HOUSE_NUMBER_PATHS: &[&str] = &["/address/house_number", "/tags/addr:housenumber"];
const ROAD_PATHS: &[&str] = &["/address/road", "/tags/addr:street"];
const CITY_PATHS: &[&str] = &[
    "/address/city",
    "/address/town",
    "/address/village",
    "/address/hamlet",
    "/address/suburb",
    "/tags/addr:city",
];
const STATE_PATHS: &[&str] = &["/address/state", "/tags/addr:state"];
const ZIP_PATHS: &[&str] = &["/address/postcode", "/tags/addr:postcode"];
const PHONE_PATHS: &[&str] = &[
    "/extratags/phone",
    "/extratags/contact:phone",
    "/tags/phone",
    "/tags/contact:phone",
];
const EMAIL_PATHS: &[&str] = &[
    "/extratags/email",
    "/extratags/contact:email",
    "/tags/email",
    "/tags/contact:email",
];
const WEBSITE_PATHS: &[&str] = &[
    "/extratags/website",
    "/extratags/contact:website",
    "/extratags/url",
    "/tags/website",
    "/tags/contact:website",
    "/tags/url",
];
const DESCRIPTION_PATHS: &[&str] = &["/extratags/description", "/tags/description"];
const HOURS_PATHS: &[&str] = &["/extratags/opening_hours", "/tags/opening_hours"];
const IMAGE_PATHS: &[&str] = &["/extratags/image", "/tags/image"];
const AMENITY_PATHS: &[&str] = &["/tags/amenity", "/extratags/amenity"];
const ADOPTION_PATHS: &[&str] = &[
    "/tags/animal_shelter:adoption",
    "/extratags/animal_shelter:adoption",
];
const SHELTERED_ANIMALS_PATHS: &[&str] = &["/tags/animal_shelter", "/extratags/animal_shelter"];

/// Maps one raw record into a [`Shelter`].
///
/// Returns `None` when the record has no usable coordinate or lies farther
/// than `max_radius_miles` from `center`.
#[must_use]
pub fn normalize(
    candidate: &RawCandidate,
    center: Coordinate,
    max_radius_miles: f64,
) -> Option<Shelter> {
    let record = &candidate.record;
    let coordinates = extract_coordinate(record)?;

    let distance = distance_miles(center, coordinates);
    if distance.is_nan() || distance > max_radius_miles {
        return None;
    }

    let display_name = first_text(record, &["/display_name"]);

    let name = first_text(record, STRUCTURED_NAME_PATHS)
        .or_else(|| first_text(record, GENERIC_NAME_PATHS))
        .or_else(|| display_name.as_deref().and_then(first_segment))
        .unwrap_or_else(|| placeholder::NAME.to_string());

    let address = street_address(record)
        .or_else(|| display_name.clone())
        .unwrap_or_else(|| placeholder::ADDRESS.to_string());

    let zip = first_text(record, ZIP_PATHS)
        .or_else(|| display_name.as_deref().and_then(zip_from_label))
        .unwrap_or_else(|| placeholder::ZIP.to_string());

    let image_url = first_text(record, IMAGE_PATHS)
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"));

    let services = derive_services(record, &name);

    Some(Shelter {
        id: candidate.id.clone(),
        name,
        address,
        city: text_or(record, CITY_PATHS, placeholder::CITY),
        state: text_or(record, STATE_PATHS, placeholder::STATE),
        zip,
        phone: text_or(record, PHONE_PATHS, placeholder::PHONE),
        email: text_or(record, EMAIL_PATHS, placeholder::EMAIL),
        website: text_or(record, WEBSITE_PATHS, placeholder::WEBSITE),
        coordinates,
        description: text_or(record, DESCRIPTION_PATHS, placeholder::DESCRIPTION),
        services,
        hours: text_or(record, HOURS_PATHS, placeholder::HOURS),
        image_url,
        is_synthetic: false,
    })
}

fn extract_coordinate(record: &Value) -> Option<Coordinate> {
    let lat = LAT_PATHS
        .iter()
        .find_map(|p| record.pointer(p).and_then(value_as_f64))?;
    let lon = LON_PATHS
        .iter()
        .find_map(|p| record.pointer(p).and_then(value_as_f64))?;
    Coordinate::from_lat_lon(lat, lon).ok()
}

/// First non-blank string found at any of `paths`, trimmed.
fn first_text(record: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|p| record.pointer(p))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
}

fn text_or(record: &Value, paths: &[&str], fallback: &str) -> String {
    first_text(record, paths).unwrap_or_else(|| fallback.to_string())
}

fn street_address(record: &Value) -> Option<String> {
    let road = first_text(record, ROAD_PATHS)?;
    Some(match first_text(record, HOUSE_NUMBER_PATHS) {
        Some(number) => format!("{number} {road}"),
        None => road,
    })
}

fn first_segment(label: &str) -> Option<String> {
    label
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Postal codes sit near the end of a display label; take the last match so
/// a five-digit house number at the front is not mistaken for one.
fn zip_from_label(label: &str) -> Option<String> {
    ZIP_RE
        .find_iter(label)
        .last()
        .map(|m| m.as_str().to_string())
}

/// Services in relevance order, derived from tags and the name.
fn derive_services(record: &Value, name: &str) -> Vec<String> {
    let mut services: Vec<String> = Vec::new();
    let mut push = |service: String| {
        if !services.contains(&service) {
            services.push(service);
        }
    };

    let amenity = first_text(record, AMENITY_PATHS).or_else(|| {
        // Nominatim reports the primary tag as `class`/`type`.
        let class = record.get("class").and_then(Value::as_str)?;
        (class == "amenity" || class == "office")
            .then(|| record.get("type").and_then(Value::as_str).map(str::to_string))
            .flatten()
    });

    match amenity.as_deref() {
        Some("animal_shelter") => push("Animal Shelter".to_string()),
        Some("veterinary" | "clinic") => push("Veterinary Care".to_string()),
        Some("social_facility") => push("Animal Welfare".to_string()),
        _ => {}
    }

    if first_text(record, ADOPTION_PATHS).is_some_and(|v| v.eq_ignore_ascii_case("yes")) {
        push("Pet Adoption".to_string());
    }

    if let Some(animals) = first_text(record, SHELTERED_ANIMALS_PATHS) {
        for animal in animals.split(';').map(str::trim).filter(|a| !a.is_empty()) {
            push(format!("{} Sheltering", capitalize(animal)));
        }
    }

    let lowered = name.to_lowercase();
    if lowered.contains("rescue") {
        push("Animal Rescue".to_string());
    }
    if lowered.contains("adoption") {
        push("Pet Adoption".to_string());
    }
    if lowered.contains("humane") || lowered.contains("spca") {
        push("Humane Education".to_string());
    }

    if services.is_empty() {
        services.push(placeholder::SERVICES.to_string());
    }
    services
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
