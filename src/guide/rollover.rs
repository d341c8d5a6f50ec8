// src/guide/rollover.rs
//
// Date inference for clock-only schedule grids. Some upstreams render a
// day's programme as ordered rows carrying nothing but an HH:MM value; the
// date has to be inferred (a clock decrease means midnight passed) and the
// stop time derived from the next row of the same channel.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::guide::config::at_athens;
use crate::guide::types::GuideItem;

/// Minutes since midnight, the unit the rollover comparison works in.
pub fn clock_minutes(t: NaiveTime) -> i32 {
    (t.hour() * 60 + t.minute()) as i32
}

/// Parse an upstream "HH:MM" cell.
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Per-channel cursor over one provider run. Seeded to (-1, grid date) so
/// the first row never reads as a rollover.
#[derive(Debug, Clone)]
pub struct DayCursor {
    last_clock: i32,
    date: NaiveDate,
}

impl DayCursor {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            last_clock: -1,
            date,
        }
    }

    /// Date for a row at `clock`. A strict decrease relative to the previous
    /// row advances the date; equal values do not.
    pub fn advance(&mut self, clock: NaiveTime) -> NaiveDate {
        let c = clock_minutes(clock);
        if c < self.last_clock {
            self.date = self.date.succ_opt().expect("date in range");
        }
        self.last_clock = c;
        self.date
    }
}

/// Cursor map for grids that interleave several channels.
pub type CursorMap = HashMap<String, DayCursor>;

/// Derive stop times for items whose upstream gives none: each item's stop
/// is the start of the next item for the same channel, and the last item
/// wraps to the first item's clock value on the following day when that
/// clock is not later than its own. Items arrive with `stop == start`;
/// grouping preserves encounter order per channel.
pub fn backfill_stops(items: Vec<GuideItem>) -> Vec<GuideItem> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<GuideItem>> = HashMap::new();
    for item in items {
        let key = item.programme.channel.clone();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(item);
    }

    let mut out = Vec::new();
    for key in order {
        let group = groups.remove(&key).unwrap_or_default();
        let starts: Vec<_> = group.iter().map(|i| i.programme.start).collect();

        for (idx, mut item) in group.into_iter().enumerate() {
            let start = item.programme.start;
            item.programme.stop = if idx + 1 < starts.len() {
                let next = starts[idx + 1];
                if next <= start {
                    next + Duration::days(1)
                } else {
                    next
                }
            } else {
                // Wraparound: the head row's clock on this row's date,
                // pushed to the next day unless it is strictly later.
                let head = starts[0].time();
                let mut date = start.date_naive();
                if head <= start.time() {
                    date = date.succ_opt().expect("date in range");
                }
                at_athens(date, head)
            };
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::types::{ChannelRef, Programme};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn item(channel: &str, date: NaiveDate, clock: NaiveTime, title: &str) -> GuideItem {
        let start = at_athens(date, clock);
        GuideItem {
            channel: ChannelRef {
                id: channel.to_string(),
                name: channel.to_uppercase(),
            },
            programme: Programme {
                channel: channel.to_string(),
                start,
                stop: start,
                title: title.to_string(),
                desc: title.to_string(),
            },
        }
    }

    #[test]
    fn clock_decrease_rolls_the_date_over() {
        let mut cur = DayCursor::new(d(2025, 3, 1));
        assert_eq!(cur.advance(t(23, 50)), d(2025, 3, 1));
        assert_eq!(cur.advance(t(0, 10)), d(2025, 3, 2));
        assert_eq!(cur.advance(t(0, 40)), d(2025, 3, 2));
    }

    #[test]
    fn equal_adjacent_clocks_are_not_a_rollover() {
        let mut cur = DayCursor::new(d(2025, 3, 1));
        assert_eq!(cur.advance(t(10, 0)), d(2025, 3, 1));
        assert_eq!(cur.advance(t(10, 0)), d(2025, 3, 1));
    }

    #[test]
    fn first_row_at_midnight_is_not_a_rollover() {
        let mut cur = DayCursor::new(d(2025, 3, 1));
        assert_eq!(cur.advance(t(0, 0)), d(2025, 3, 1));
    }

    #[test]
    fn stops_come_from_the_next_row_and_the_tail_wraps() {
        let day = d(2025, 3, 1);
        let out = backfill_stops(vec![
            item("gr.ert1", day, t(10, 0), "A"),
            item("gr.ert1", day, t(10, 30), "B"),
        ]);
        assert_eq!(out[0].programme.stop, at_athens(day, t(10, 30)));
        // 10:00 is not later than 10:30, so B's stop lands on the next day.
        assert_eq!(out[1].programme.stop, at_athens(d(2025, 3, 2), t(10, 0)));
    }

    #[test]
    fn single_row_pairs_with_itself_a_day_later() {
        let day = d(2025, 3, 1);
        let out = backfill_stops(vec![item("gr.vouli", day, t(9, 0), "Session")]);
        assert_eq!(out[0].programme.stop, at_athens(d(2025, 3, 2), t(9, 0)));
        assert!(out[0].programme.start < out[0].programme.stop);
    }

    #[test]
    fn interleaved_channels_pair_within_their_own_group() {
        let day = d(2025, 3, 1);
        let out = backfill_stops(vec![
            item("gr.ert1", day, t(8, 0), "A1"),
            item("gr.ert2", day, t(8, 30), "B1"),
            item("gr.ert1", day, t(9, 0), "A2"),
            item("gr.ert2", day, t(10, 0), "B2"),
        ]);
        let a1 = out.iter().find(|i| i.programme.title == "A1").unwrap();
        assert_eq!(a1.programme.stop, at_athens(day, t(9, 0)));
        let b1 = out.iter().find(|i| i.programme.title == "B1").unwrap();
        assert_eq!(b1.programme.stop, at_athens(day, t(10, 0)));
    }

    #[test]
    fn strictly_later_head_keeps_the_tail_stop_on_the_same_day() {
        let day = d(2025, 3, 1);
        let out = backfill_stops(vec![
            item("gr.ert1", day, t(7, 0), "Head"),
            item("gr.ert1", day, t(6, 0), "Tail"),
        ]);
        // Head clock 07:00 is strictly later than the tail's 06:00, so the
        // wraparound stop stays on the tail's own date.
        let tail = out.iter().find(|i| i.programme.title == "Tail").unwrap();
        assert_eq!(tail.programme.stop, at_athens(day, t(7, 0)));
    }

    #[test]
    fn all_backfilled_items_keep_start_strictly_before_stop() {
        let day = d(2025, 3, 1);
        let out = backfill_stops(vec![
            item("gr.ert1", day, t(23, 50), "Late"),
            item("gr.ert1", d(2025, 3, 2), t(0, 10), "Night"),
            item("gr.ert1", d(2025, 3, 2), t(0, 10), "Duplicate"),
        ]);
        for it in &out {
            assert!(
                it.programme.start < it.programme.stop,
                "{} should end after it starts",
                it.programme.title
            );
        }
    }
}
