// tests/providers_vouli.rs
use std::fs;

use chrono::{NaiveDate, NaiveTime};
use tvguide_aggregator::guide::config::at_athens;
use tvguide_aggregator::guide::providers::vouli::Vouli;
use tvguide_aggregator::guide::types::{ChannelMap, GuideItem, Provider};

fn mapping() -> ChannelMap {
    let mut m = ChannelMap::new();
    m.insert(
        "vouli".to_string(),
        ("gr.vouli".to_string(), "Vouli Tileorasi".to_string()),
    );
    m
}

fn grid(date: NaiveDate) -> Vec<GuideItem> {
    let html = fs::read_to_string("tests/fixtures/vouli.html")
        .expect("missing tests/fixtures/vouli.html");
    let provider = Vouli::from_fixture(mapping(), &html);
    provider.finish(provider.extract(date, &html))
}

fn t(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

#[test]
fn single_channel_grid_rolls_over_and_backfills_stops() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let next_day = date.succ_opt().unwrap();
    let items = grid(date);

    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i.channel.id == "gr.vouli"));
    assert!(items.iter().all(|i| i.programme.desc == i.programme.title));

    // 01:15 < 23:45 marks the midnight crossing.
    assert_eq!(items[2].programme.start, at_athens(date, t(23, 45)));
    assert_eq!(items[3].programme.start, at_athens(next_day, t(1, 15)));

    // Stops: next row's start, tail pairs with the 09:00 head on its own day.
    assert_eq!(items[0].programme.stop, at_athens(date, t(14, 30)));
    assert_eq!(items[2].programme.stop, at_athens(next_day, t(1, 15)));
    assert_eq!(items[3].programme.stop, at_athens(next_day, t(9, 0)));

    assert!(items.iter().all(|i| i.programme.start < i.programme.stop));
}

#[test]
fn missing_channel_key_in_mapping_yields_no_items() {
    let html = fs::read_to_string("tests/fixtures/vouli.html").expect("fixture");
    let mut other = ChannelMap::new();
    other.insert("elsewhere".to_string(), ("gr.x".to_string(), "X".to_string()));
    let provider = Vouli::from_fixture(other, &html);
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert!(provider.extract(date, &html).is_empty());
}
