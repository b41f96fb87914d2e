use super::*;

#[test]
fn default_filters_are_5_10_25_50_all_active() {
    let filters = RadiusFilters::default();
    let miles: Vec<f64> = filters.iter().map(|f| f.miles).collect();
    assert_eq!(miles, vec![5.0, 10.0, 25.0, 50.0]);
    assert!(filters.iter().all(|f| f.active));
}

#[test]
fn max_active_radius_is_largest_active_band() {
    let mut filters = RadiusFilters::default();
    assert_eq!(filters.max_active_radius(), Some(50.0));
    filters.toggle(3);
    assert_eq!(filters.max_active_radius(), Some(25.0));
}

#[test]
fn max_active_radius_none_when_all_inactive() {
    let mut filters = RadiusFilters::default();
    for i in 0..filters.len() {
        filters.toggle(i);
    }
    assert_eq!(filters.max_active_radius(), None);
    assert!(!filters.retains(0.0));
}

#[test]
fn retains_uses_union_of_active_bands() {
    let mut filters = RadiusFilters::default();
    filters.activate_only(&[5.0, 25.0]);
    assert!(filters.retains(3.0));
    assert!(filters.retains(17.0), "within 25 even though 10 is inactive");
    assert!(!filters.retains(30.0));
}

#[test]
fn tier_for_picks_smallest_containing_band() {
    let filters = RadiusFilters::default();
    assert_eq!(filters.tier_for(0.0).unwrap().miles, 5.0);
    assert_eq!(filters.tier_for(5.0).unwrap().miles, 5.0);
    assert_eq!(filters.tier_for(5.01).unwrap().miles, 10.0);
    assert_eq!(filters.tier_for(49.9).unwrap().miles, 50.0);
    assert!(filters.tier_for(60.0).is_none());
}

#[test]
fn tier_for_ignores_active_flag() {
    let mut filters = RadiusFilters::default();
    filters.activate_only(&[50.0]);
    let tier = filters.tier_for(2.0).unwrap();
    assert_eq!(tier.label, "5 miles");
    assert_eq!(tier.color, "#16a34a");
}

#[test]
fn toggle_out_of_bounds_returns_none() {
    let mut filters = RadiusFilters::default();
    assert_eq!(filters.toggle(17), None);
}

#[test]
fn set_active_by_label() {
    let mut filters = RadiusFilters::default();
    assert!(filters.set_active("10 miles", false));
    assert!(!filters.get(1).unwrap().active);
    assert!(!filters.set_active("100 miles", true));
}

#[test]
fn new_sorts_by_radius() {
    let filters = RadiusFilters::new(vec![
        RadiusFilter::new("far", 40.0, "red", true),
        RadiusFilter::new("near", 2.0, "green", true),
    ])
    .unwrap();
    assert_eq!(filters.get(0).unwrap().label, "near");
}

#[test]
fn new_rejects_empty() {
    let err = RadiusFilters::new(vec![]).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn new_rejects_non_positive_radius() {
    let err = RadiusFilters::new(vec![RadiusFilter::new("zero", 0.0, "red", true)]).unwrap_err();
    assert!(err.to_string().contains("invalid radius"));
}

#[test]
fn new_rejects_duplicate_labels() {
    let err = RadiusFilters::new(vec![
        RadiusFilter::new("Near", 2.0, "red", true),
        RadiusFilter::new("near", 3.0, "blue", true),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("duplicate filter label"));
}

#[test]
fn parse_filters_reads_yaml() {
    let yaml = r##"
filters:
  - label: "3 miles"
    miles: 3
    color: "#000000"
    active: false
  - label: "1 mile"
    miles: 1
    color: "#ffffff"
    active: true
"##;
    let filters = parse_filters(yaml).unwrap();
    assert_eq!(filters.len(), 2);
    assert_eq!(filters.get(0).unwrap().label, "1 mile");
    assert_eq!(filters.max_active_radius(), Some(1.0));
}

#[test]
fn parse_filters_rejects_malformed_yaml() {
    let err = parse_filters("filters: [ { label: 1").unwrap_err();
    assert!(matches!(err, ConfigError::FiltersFileParse(_)));
}

#[test]
fn load_filters_missing_file_reports_path() {
    let err = load_filters(Path::new("/nonexistent/filters.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::FiltersFileIo { ref path, .. } if path.contains("filters.yaml")));
}

#[test]
fn load_filters_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("filters.yaml");
    assert!(path.exists(), "filters.yaml missing at {path:?}");
    let filters = load_filters(&path).expect("failed to load filters.yaml");
    assert_eq!(filters, RadiusFilters::default());
}

#[test]
fn filters_serialize_as_plain_list() {
    let json = serde_json::to_value(RadiusFilters::default()).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["label"], "5 miles");
}
