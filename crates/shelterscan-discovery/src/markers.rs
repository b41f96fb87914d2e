//! Marker lifecycle: which pins are on the map and what their popups say.

use std::collections::HashMap;
use std::fmt::Write as _;

use shelterscan_core::filters::DEFAULT_TIER_COLOR;
use shelterscan_core::{Coordinate, ShelterWithDistance};

use crate::map::{MapSurface, MarkerHandle, MarkerLayer, MarkerSpec};
use crate::providers::PlaceMatch;

pub const USER_LOCATION_COLOR: &str = "#3b82f6";
pub const PLACE_SEARCH_COLOR: &str = "#9333ea";

/// Owns every marker handle this crate has placed on a [`MapSurface`].
///
/// Shelter markers are keyed by shelter id. The user-location and
/// place-search markers are tracked separately so a shelter re-render never
/// removes them.
#[derive(Debug, Default)]
pub struct MarkerManager {
    shelters: HashMap<String, MarkerHandle>,
    user_location: Option<MarkerHandle>,
    place_search: Option<MarkerHandle>,
}

impl MarkerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every shelter marker with one per entry in `shelters`.
    pub fn render_shelters<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        shelters: &[ShelterWithDistance],
    ) {
        self.clear_shelters(surface);
        for entry in shelters {
            let handle = surface.add_marker(MarkerSpec {
                coordinate: entry.shelter.coordinates,
                color: marker_color(entry).to_string(),
                title: entry.shelter.name.clone(),
                popup_html: Some(popup_html(entry)),
                layer: MarkerLayer::Shelter,
            });
            if let Some(previous) = self.shelters.insert(entry.shelter.id.clone(), handle) {
                surface.remove_marker(previous);
            }
        }
        tracing::debug!(markers = self.shelters.len(), "rendered shelter markers");
    }

    /// Removes every shelter marker. User and place markers stay.
    pub fn clear_shelters<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        for (_, handle) in self.shelters.drain() {
            surface.remove_marker(handle);
        }
    }

    pub fn set_user_location<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        coordinate: Coordinate,
    ) {
        if let Some(previous) = self.user_location.take() {
            surface.remove_marker(previous);
        }
        self.user_location = Some(surface.add_marker(MarkerSpec {
            coordinate,
            color: USER_LOCATION_COLOR.to_string(),
            title: "Your location".to_string(),
            popup_html: Some("<strong>You are here</strong>".to_string()),
            layer: MarkerLayer::UserLocation,
        }));
    }

    /// Places the single place-search marker, replacing any earlier one.
    pub fn set_place_marker<S: MapSurface + ?Sized>(&mut self, surface: &mut S, place: &PlaceMatch) {
        if let Some(previous) = self.place_search.take() {
            surface.remove_marker(previous);
        }
        self.place_search = Some(surface.add_marker(MarkerSpec {
            coordinate: place.coordinate,
            color: PLACE_SEARCH_COLOR.to_string(),
            title: place.display_name.clone(),
            popup_html: Some(format!("<strong>{}</strong>", escape_html(&place.display_name))),
            layer: MarkerLayer::PlaceSearch,
        }));
    }

    #[must_use]
    pub fn shelter_count(&self) -> usize {
        self.shelters.len()
    }

    #[must_use]
    pub fn shelter_handle(&self, id: &str) -> Option<MarkerHandle> {
        self.shelters.get(id).copied()
    }

    #[must_use]
    pub fn user_location_handle(&self) -> Option<MarkerHandle> {
        self.user_location
    }

    #[must_use]
    pub fn place_search_handle(&self) -> Option<MarkerHandle> {
        self.place_search
    }
}

/// Tier color for `entry`, or the neutral default past the widest band.
#[must_use]
pub fn marker_color(entry: &ShelterWithDistance) -> &str {
    entry
        .tier
        .as_ref()
        .map_or(DEFAULT_TIER_COLOR, |tier| tier.color.as_str())
}

/// Popup body for a shelter marker. All provider text is escaped; action
/// links appear only for real contact data.
#[must_use]
pub fn popup_html(entry: &ShelterWithDistance) -> String {
    let shelter = &entry.shelter;
    let mut html = String::from("<div class=\"shelter-popup\">");

    let _ = write!(html, "<h3>{}</h3>", escape_html(&shelter.name));
    if shelter.is_synthetic {
        html.push_str("<p class=\"sample-badge\">Sample listing, not a real shelter</p>");
    }
    let _ = write!(
        html,
        "<p>{}</p><p>{:.1} miles away</p><p>{}</p>",
        escape_html(&shelter.address),
        entry.distance,
        escape_html(&shelter.description),
    );
    let _ = write!(
        html,
        "<p>Phone: {}</p><p>Hours: {}</p>",
        escape_html(&shelter.phone),
        escape_html(&shelter.hours),
    );

    html.push_str("<ul>");
    for service in &shelter.services {
        let _ = write!(html, "<li>{}</li>", escape_html(service));
    }
    html.push_str("</ul>");

    let mut actions = Vec::new();
    if shelter.has_phone() {
        let dial: String = shelter
            .phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        if !dial.is_empty() {
            actions.push(format!("<a href=\"tel:{dial}\">Call</a>"));
        }
    }
    if shelter.has_email() {
        actions.push(format!(
            "<a href=\"mailto:{}\">Email</a>",
            escape_html(&shelter.email)
        ));
    }
    if shelter.has_website() {
        let href = if shelter.website.starts_with("http://") || shelter.website.starts_with("https://")
        {
            shelter.website.clone()
        } else {
            format!("https://{}", shelter.website)
        };
        actions.push(format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Website</a>",
            escape_html(&href)
        ));
    }
    if !actions.is_empty() {
        let _ = write!(html, "<div class=\"actions\">{}</div>", actions.join(" "));
    }

    html.push_str("</div>");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "markers_test.rs"]
mod tests;
