// tests/providers_digea.rs
use std::fs;

use chrono::NaiveDate;
use tvguide_aggregator::guide::providers::digea::Digea;
use tvguide_aggregator::guide::types::{ChannelMap, Provider};

fn mapping() -> ChannelMap {
    let mut m = ChannelMap::new();
    m.insert("9".to_string(), ("gr.alpha".to_string(), "Alpha".to_string()));
    m.insert("11".to_string(), ("gr.skai".to_string(), "SKAI".to_string()));
    m
}

#[test]
fn digea_fixture_maps_known_channels_and_drops_bad_rows() {
    let json = fs::read_to_string("tests/fixtures/digea.json")
        .expect("missing tests/fixtures/digea.json");
    let provider = Digea::from_fixture(mapping(), &json);
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    let items = provider.extract(date, &json);

    // Unmapped channel, missing end_time and inverted bounds are all dropped.
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.channel.id == "gr.alpha"));
    assert!(items.iter().all(|i| i.programme.start < i.programme.stop));
}

#[test]
fn digea_titles_are_squished_and_desc_defaults_to_title() {
    let json = fs::read_to_string("tests/fixtures/digea.json").expect("fixture");
    let provider = Digea::from_fixture(mapping(), &json);
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    let items = provider.extract(date, &json);

    assert_eq!(items[0].programme.title, "Κεντρικό δελτίο ειδήσεων");
    assert_eq!(
        items[0].programme.desc,
        "Η ενημέρωση της ημέρας από τη συντακτική ομάδα."
    );
    // Second event has no synopsis upstream.
    assert_eq!(items[1].programme.desc, items[1].programme.title);
}

#[test]
fn digea_tolerates_a_wholly_unparsable_payload() {
    let provider = Digea::from_fixture(mapping(), "<html>not json</html>");
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert!(provider.extract(date, "<html>not json</html>").is_empty());
}
