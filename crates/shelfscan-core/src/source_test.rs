use std::path::Path;

use super::*;

fn parse_file(yaml: &str) -> SourcesFile {
    serde_yaml::from_str(yaml).expect("valid yaml")
}

#[test]
fn from_str_accepts_ids_and_display_names() {
    assert_eq!("tesco".parse::<Source>().unwrap(), Source::Tesco);
    assert_eq!("TESCO".parse::<Source>().unwrap(), Source::Tesco);
    assert_eq!("B&M".parse::<Source>().unwrap(), Source::BM);
    assert_eq!("white rose".parse::<Source>().unwrap(), Source::WhiteRose);
    assert_eq!("white-rose".parse::<Source>().unwrap(), Source::WhiteRose);
    assert_eq!("HotDeals".parse::<Source>().unwrap(), Source::HotDeals);
}

#[test]
fn from_str_rejects_unknown_source() {
    let err = "waitrose".parse::<Source>().unwrap_err();
    assert!(matches!(err, CoreError::UnknownSource(ref s) if s == "waitrose"));
}

#[test]
fn ord_follows_declaration_order() {
    let mut shuffled = vec![Source::HotDeals, Source::Asda, Source::Tesco, Source::BM];
    shuffled.sort();
    assert_eq!(
        shuffled,
        vec![Source::Tesco, Source::Asda, Source::BM, Source::HotDeals]
    );
    assert_eq!(Source::Tesco.index(), 0);
    assert_eq!(Source::HotDeals.index(), 7);
}

#[test]
fn serde_uses_ids() {
    let json = serde_json::to_string(&Source::WhiteRose).unwrap();
    assert_eq!(json, "\"white_rose\"");
    let back: Source = serde_json::from_str("\"bm\"").unwrap();
    assert_eq!(back, Source::BM);
}

#[test]
fn builtin_profiles_cover_every_source() {
    let profiles = SourceProfiles::builtin();
    for source in Source::ALL {
        let p = profiles.get(source);
        assert!((0.0..=1.0).contains(&p.reputation), "{source}");
        assert!(p.price_multiplier > 0.0, "{source}");
    }
    assert!((profiles.reputation(Source::Tesco) - 0.9).abs() < f64::EPSILON);
    assert!((profiles.price_multiplier(Source::Costco) - 1.2).abs() < f64::EPSILON);
    assert!((profiles.price_multiplier(Source::HotDeals) - 0.85).abs() < f64::EPSILON);
}

#[test]
fn overrides_replace_only_given_fields() {
    let file = parse_file(
        "sources:\n  - source: lidl\n    reputation: 0.95\n",
    );
    let profiles = SourceProfiles::builtin().with_overrides(&file);
    assert!((profiles.reputation(Source::Lidl) - 0.95).abs() < f64::EPSILON);
    assert!((profiles.price_multiplier(Source::Lidl) - 0.9).abs() < f64::EPSILON);
    assert!((profiles.reputation(Source::Asda) - 0.85).abs() < f64::EPSILON);
}

#[test]
fn validate_rejects_duplicate_source() {
    let file = parse_file(
        "sources:\n  - source: tesco\n    reputation: 0.5\n  - source: tesco\n    reputation: 0.6\n",
    );
    let err = validate_sources(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate source"));
}

#[test]
fn validate_rejects_reputation_out_of_range() {
    let file = parse_file("sources:\n  - source: asda\n    reputation: 1.5\n");
    let err = validate_sources(&file).unwrap_err();
    assert!(err.to_string().contains("reputation"));
}

#[test]
fn validate_rejects_non_positive_multiplier() {
    let file = parse_file("sources:\n  - source: costco\n    price_multiplier: 0\n");
    let err = validate_sources(&file).unwrap_err();
    assert!(err.to_string().contains("price_multiplier"));
}

#[test]
fn unknown_source_in_file_fails_to_parse() {
    let result: Result<SourcesFile, _> =
        serde_yaml::from_str("sources:\n  - source: waitrose\n    reputation: 0.5\n");
    assert!(result.is_err());
}

#[test]
fn load_source_profiles_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("sources.yaml");
    assert!(path.exists(), "sources.yaml missing at {path:?}");
    let profiles = load_source_profiles(&path).expect("failed to load sources.yaml");
    assert_eq!(profiles, SourceProfiles::builtin());
}

#[test]
fn load_source_profiles_missing_file_is_io_error() {
    let err = load_source_profiles(Path::new("/nonexistent/sources.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SourcesFileIo { .. }));
}
