//! Divides a day into equal slices and names the file that owns each slice.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};

use crate::config::TimeSlicedFilesLogConfig;
use crate::error::{LogError, Result};

pub const LOG_FILE_EXTENSION: &str = "log";

const SECONDS_PER_DAY: u64 = 86_400;
const MIN_SLICE: Duration = Duration::from_secs(60);
const MAX_SLICE: Duration = Duration::from_secs(SECONDS_PER_DAY);

/// Offsets from midnight at which each slice of the day starts.
///
/// `slice` must be between one minute and one day and divide the day evenly.
pub fn slice_into_offsets_per_day(slice: Duration) -> Result<Vec<Duration>> {
    if slice < MIN_SLICE {
        return Err(LogError::invalid_config(format!(
            "slice duration must be at least {} seconds",
            MIN_SLICE.as_secs()
        )));
    }
    if slice > MAX_SLICE {
        return Err(LogError::invalid_config(
            "slice duration must be at most 24 hours",
        ));
    }
    let day = Duration::from_secs(SECONDS_PER_DAY).as_nanos();
    if day % slice.as_nanos() != 0 {
        return Err(LogError::invalid_config(format!(
            "slice duration of {slice:?} does not divide a day evenly"
        )));
    }
    let count = (day / slice.as_nanos()) as u32;
    Ok((0..count).map(|i| slice * i).collect())
}

/// Brackets the time-of-day of `instant` between two offsets.
pub fn find_offset_range(offsets: &[Duration], instant: DateTime<Utc>) -> (Duration, Duration) {
    let time_of_day = Duration::new(
        u64::from(instant.num_seconds_from_midnight()),
        instant.nanosecond() % 1_000_000_000,
    );
    find_offset_range_for_time_of_day(offsets, time_of_day)
}

/// Linear scan: `next` is the first offset strictly after `time_of_day`,
/// `prior` the one before it. Both stay at zero when nothing qualifies, so
/// the last slice of the day is `(last, 0)`.
pub fn find_offset_range_for_time_of_day(
    offsets: &[Duration],
    time_of_day: Duration,
) -> (Duration, Duration) {
    let mut prior = Duration::ZERO;
    let mut next = Duration::ZERO;
    for offset in offsets {
        if *offset > time_of_day {
            next = *offset;
            break;
        }
        prior = *offset;
    }
    (prior, next)
}

fn format_offset(offset: Duration) -> String {
    let minutes = offset.as_secs() / 60;
    format!("{:02}{:02}", minutes / 60, minutes % 60)
}

/// `{prefix}--{yyyy-MM-dd}--{HHmm}Z-{HHmm}Z.log` for the slice holding `now`.
pub fn file_name(prefix: &str, offsets: &[Duration], now: DateTime<Utc>) -> String {
    let (prior, next) = find_offset_range(offsets, now);
    format!(
        "{prefix}--{}--{}Z-{}Z.{LOG_FILE_EXTENSION}",
        now.format("%Y-%m-%d"),
        format_offset(prior),
        format_offset(next)
    )
}

/// Full path of the file a time-sliced writer appends to at `now`.
pub fn compute_file_path(config: &TimeSlicedFilesLogConfig, now: DateTime<Utc>) -> PathBuf {
    config.directory().join(file_name(
        config.file_name_prefix(),
        config.slice_offsets(),
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_six_hour_slices() {
        let offsets = slice_into_offsets_per_day(Duration::from_secs(6 * 3600)).unwrap();
        assert_eq!(offsets, vec![minutes(0), minutes(360), minutes(720), minutes(1080)]);
    }

    #[test]
    fn test_bracketing_inside_the_day() {
        let offsets = [minutes(0), minutes(360), minutes(720), minutes(1080)];
        assert_eq!(
            find_offset_range_for_time_of_day(&offsets, minutes(400)),
            (minutes(360), minutes(720))
        );
        assert_eq!(
            find_offset_range_for_time_of_day(&offsets, minutes(360)),
            (minutes(360), minutes(720))
        );
    }

    #[test]
    fn test_bracketing_at_the_edges() {
        let offsets = [minutes(0), minutes(360), minutes(720), minutes(1080)];
        assert_eq!(
            find_offset_range_for_time_of_day(&offsets, Duration::ZERO),
            (Duration::ZERO, minutes(360))
        );
        assert_eq!(
            find_offset_range_for_time_of_day(&offsets, minutes(1200)),
            (minutes(1080), Duration::ZERO)
        );
    }

    #[test]
    fn test_invalid_slices() {
        for slice in [
            Duration::from_secs(59),
            Duration::from_secs(7 * 60),
            Duration::from_secs(SECONDS_PER_DAY + 60),
            Duration::from_millis(60_500),
        ] {
            let err = slice_into_offsets_per_day(slice).unwrap_err();
            assert!(matches!(err, LogError::InvalidConfig { .. }), "{slice:?}");
        }
    }

    #[test]
    fn test_whole_day_slice() {
        let offsets = slice_into_offsets_per_day(MAX_SLICE).unwrap();
        assert_eq!(offsets, vec![Duration::ZERO]);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 13, 45, 0).unwrap();
        assert_eq!(file_name("app", &offsets, now), "app--2024-03-10--0000Z-0000Z.log");
    }

    #[test]
    fn test_file_name() {
        let offsets = slice_into_offsets_per_day(Duration::from_secs(6 * 3600)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 13, 45, 0).unwrap();
        assert_eq!(file_name("app", &offsets, now), "app--2024-03-10--1200Z-1800Z.log");
        let late = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        assert_eq!(file_name("app", &offsets, late), "app--2024-03-10--1800Z-0000Z.log");
    }

    #[test]
    fn test_file_names_sort_chronologically() {
        let offsets = slice_into_offsets_per_day(minutes(90)).unwrap();
        let mut previous = String::new();
        let start = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        for step in 0..(3 * 24 * 4) {
            let now = start + chrono::Duration::minutes(15 * step);
            let name = file_name("app", &offsets, now);
            assert!(name >= previous, "{name} < {previous}");
            previous = name;
        }
    }

    fn valid_slice_minutes() -> impl Strategy<Value = u64> {
        let divisors: Vec<u64> = (1..=1440).filter(|m| 1440 % m == 0).collect();
        prop::sample::select(divisors)
    }

    proptest! {
        #[test]
        fn prop_offsets_cover_the_day(slice in valid_slice_minutes()) {
            let offsets = slice_into_offsets_per_day(minutes(slice)).unwrap();
            prop_assert_eq!(offsets.len() as u64, 1440 / slice);
            prop_assert_eq!(offsets[0], Duration::ZERO);
            for pair in offsets.windows(2) {
                prop_assert_eq!(pair[1] - pair[0], minutes(slice));
            }
        }

        #[test]
        fn prop_non_dividing_slices_fail(seconds in 60u64..=86_400) {
            prop_assume!(86_400 % seconds != 0);
            prop_assert!(slice_into_offsets_per_day(Duration::from_secs(seconds)).is_err());
        }

        #[test]
        fn prop_each_instant_lands_in_its_slice(
            slice in valid_slice_minutes(),
            second in 0u64..86_400,
        ) {
            let offsets = slice_into_offsets_per_day(minutes(slice)).unwrap();
            let time_of_day = Duration::from_secs(second);
            let (prior, next) = find_offset_range_for_time_of_day(&offsets, time_of_day);
            prop_assert!(prior <= time_of_day);
            if next == Duration::ZERO {
                prop_assert_eq!(prior, *offsets.last().unwrap());
            } else {
                prop_assert!(time_of_day < next);
                prop_assert_eq!(next - prior, minutes(slice));
            }
            prop_assert_eq!(
                find_offset_range_for_time_of_day(&offsets, time_of_day),
                (prior, next)
            );
        }
    }
}
