//! Synthetic sample shelters for areas where no provider returned anything.
//!
//! Every record produced here has `is_synthetic = true` and an id starting
//! with [`FALLBACK_ID_PREFIX`]; nothing here describes a real place.

use rand::Rng;
use shelterscan_core::{placeholder, Coordinate, Shelter};

pub const FALLBACK_ID_PREFIX: &str = "local-shelter-";
pub const MIN_FALLBACK_COUNT: usize = 10;
pub const MAX_FALLBACK_COUNT: usize = 25;

const NAMES: &[&str] = &[
    "Happy Tails Animal Shelter",
    "Second Chance Pet Rescue",
    "Paws & Whiskers Sanctuary",
    "Forever Home Adoption Center",
    "Furry Friends Humane Society",
    "Safe Haven Animal Rescue",
    "Hope for Paws Shelter",
    "Loving Hearts Pet Adoption",
    "Rainbow Bridge Animal Care",
    "New Leash on Life Rescue",
    "Whisker Wonderland Cat Rescue",
    "Muddy Paws Dog Shelter",
];

const STREETS: &[&str] = &[
    "Main St",
    "Oak Ave",
    "Maple Dr",
    "Cedar Ln",
    "Pine St",
    "Elm St",
    "Park Ave",
    "Washington Blvd",
    "Lake Rd",
    "Hillside Dr",
];

const SERVICE_BUNDLES: &[&[&str]] = &[
    &["Pet Adoption", "Veterinary Care", "Spay/Neuter"],
    &["Dog Adoption", "Cat Adoption", "Foster Program"],
    &["Animal Rescue", "Pet Adoption", "Volunteer Opportunities"],
    &["Emergency Shelter", "Lost & Found", "Microchipping"],
    &["Pet Adoption", "Training Classes", "Low-Cost Vaccinations"],
];

const HOURS: &[&str] = &[
    "Mon-Fri 9:00-17:00, Sat 10:00-16:00",
    "Tue-Sun 11:00-18:00",
    "Daily 10:00-16:00",
];

/// Generates sample shelters around `center` using the thread RNG.
#[must_use]
pub fn generate_fallback(center: Coordinate, max_radius_miles: f64) -> Vec<Shelter> {
    generate_fallback_with(&mut rand::rng(), center, max_radius_miles)
}

/// Generates between [`MIN_FALLBACK_COUNT`] and [`MAX_FALLBACK_COUNT`] sample
/// shelters at uniformly random bearings and distances within
/// `max_radius_miles` of `center`.
pub fn generate_fallback_with<R: Rng>(
    rng: &mut R,
    center: Coordinate,
    max_radius_miles: f64,
) -> Vec<Shelter> {
    let count = rng.random_range(MIN_FALLBACK_COUNT..=MAX_FALLBACK_COUNT);
    // Stay a hair inside the radius so the haversine round trip never lands outside it.
    let reach = (max_radius_miles * 0.999).max(0.0);

    (0..count)
        .map(|index| {
            let bearing = rng.random_range(0.0..360.0);
            let distance = if reach > 0.0 {
                rng.random_range(0.0..=reach)
            } else {
                0.0
            };
            let coordinates = center.destination(bearing, distance);
            synthetic_shelter(rng, index, coordinates)
        })
        .collect()
}

fn synthetic_shelter<R: Rng>(rng: &mut R, index: usize, coordinates: Coordinate) -> Shelter {
    let name = pick(rng, NAMES);
    let street_number = rng.random_range(100..10_000);
    let street = pick(rng, STREETS);
    let slug = slugify(name);
    let services = pick(rng, SERVICE_BUNDLES)
        .iter()
        .map(|s| (*s).to_string())
        .collect();

    Shelter {
        id: format!("{FALLBACK_ID_PREFIX}{index}"),
        name: name.to_string(),
        address: format!("{street_number} {street}"),
        city: placeholder::CITY.to_string(),
        state: placeholder::STATE.to_string(),
        zip: placeholder::ZIP.to_string(),
        phone: format!(
            "(555) {:03}-{:04}",
            rng.random_range(100..1000),
            rng.random_range(0..10_000)
        ),
        email: format!("info@{slug}.org"),
        website: format!("https://www.{slug}.org"),
        coordinates,
        description: format!(
            "{name} is a sample listing shown because no shelters were found nearby."
        ),
        services,
        hours: pick(rng, HOURS).to_string(),
        image_url: None,
        is_synthetic: true,
    }
}

fn pick<'a, T: ?Sized, R: Rng>(rng: &mut R, items: &'a [&'a T]) -> &'a T {
    items[rng.random_range(0..items.len())]
}

fn slugify(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shelterscan_core::{distance_miles, DEFAULT_CENTER};

    #[test]
    fn count_is_within_bounds_for_many_seeds() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = generate_fallback_with(&mut rng, DEFAULT_CENTER, 10.0);
            assert!(
                (MIN_FALLBACK_COUNT..=MAX_FALLBACK_COUNT).contains(&out.len()),
                "seed {seed} produced {}",
                out.len()
            );
        }
    }

    #[test]
    fn every_record_is_within_radius_and_synthetic() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for shelter in generate_fallback_with(&mut rng, DEFAULT_CENTER, 10.0) {
                let d = distance_miles(DEFAULT_CENTER, shelter.coordinates);
                assert!(d <= 10.0, "seed {seed}: {} at {d} mi", shelter.id);
                assert!(shelter.id.starts_with(FALLBACK_ID_PREFIX));
                assert!(shelter.is_synthetic);
                assert!(!shelter.services.is_empty());
            }
        }
    }

    #[test]
    fn ids_are_unique_within_a_batch() {
        let mut rng = StdRng::seed_from_u64(7);
        let out = generate_fallback_with(&mut rng, DEFAULT_CENTER, 25.0);
        let mut ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), out.len());
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = generate_fallback_with(&mut StdRng::seed_from_u64(42), DEFAULT_CENTER, 5.0);
        let b = generate_fallback_with(&mut StdRng::seed_from_u64(42), DEFAULT_CENTER, 5.0);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_radius_places_everything_at_center() {
        let mut rng = StdRng::seed_from_u64(3);
        for shelter in generate_fallback_with(&mut rng, DEFAULT_CENTER, 0.0) {
            assert!(distance_miles(DEFAULT_CENTER, shelter.coordinates) < 1e-6);
        }
    }

    #[test]
    fn contact_fields_are_populated() {
        let mut rng = StdRng::seed_from_u64(11);
        let shelter = &generate_fallback_with(&mut rng, DEFAULT_CENTER, 5.0)[0];
        assert!(shelter.phone.starts_with("(555) "));
        assert!(shelter.email.starts_with("info@") && shelter.email.ends_with(".org"));
        assert!(shelter.website.starts_with("https://www."));
        assert!(shelter.has_phone() && shelter.has_email() && shelter.has_website());
    }

    #[test]
    fn thread_rng_entry_point_respects_bounds() {
        let out = generate_fallback(DEFAULT_CENTER, 10.0);
        assert!((MIN_FALLBACK_COUNT..=MAX_FALLBACK_COUNT).contains(&out.len()));
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("Paws & Whiskers Sanctuary"), "pawswhiskerssanctuary");
    }
}
