use super::TimeRange;
use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;

/// Tiles every working range into consecutive, non-overlapping slots of the given length.
/// The remainder of a range shorter than `duration` is dropped.
/// Slots are shuffled and then stably ordered from longest to shortest.
#[must_use]
pub fn generate_slots(working: &[TimeRange], duration: Duration, rng: &mut impl Rng) -> Vec<TimeRange> {
    if duration <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();

    for range in working {
        let mut start = range.start;
        while start + duration <= range.end {
            slots.push(TimeRange::new(start, start + duration));
            start += duration;
        }
    }

    slots.shuffle(rng);
    slots.sort_by_key(|slot| Reverse(slot.duration_minutes()));

    slots
}
