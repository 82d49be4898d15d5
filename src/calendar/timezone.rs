use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use color_eyre::eyre::{eyre, Result};

use super::event::format_short_date;

pub const DEFAULT_SOURCE_TZ: Tz = chrono_tz::America::Chicago;

const DATE_LABEL: &str = "%a, %b %-d";
const TIME_LABEL: &str = "%-I:%M %p";

pub fn parse_tz(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| eyre!("Unknown timezone '{}'", name))
}

/// An event date/time reprojected into the active timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Projected {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub date_label: String,
    pub time_label: String,
}

/// Resolve a wall-clock time in `tz`. Gaps move forward an hour, overlaps take
/// the earlier instant.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        }
    }
}

pub fn convert_to_timezone(
    date: NaiveDate,
    time: Option<NaiveTime>,
    source: Tz,
    target: Tz,
) -> Projected {
    match time {
        Some(time) => {
            let converted = localize(date.and_time(time), source).with_timezone(&target);
            Projected {
                date: converted.date_naive(),
                time: Some(converted.time()),
                date_label: converted.format(DATE_LABEL).to_string(),
                time_label: converted.format(TIME_LABEL).to_string(),
            }
        }
        None => Projected {
            date,
            time: None,
            date_label: format_short_date(date),
            time_label: String::new(),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOption {
    pub zone: Tz,
    pub label: String,
}

/// Every IANA zone with a display label.
pub fn catalogue() -> Vec<ZoneOption> {
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|zone| ZoneOption {
            zone: *zone,
            label: zone.name().replace('_', " "),
        })
        .collect()
}

pub fn search<'a>(options: &'a [ZoneOption], query: &str) -> Vec<&'a ZoneOption> {
    let query = query.trim().to_lowercase();
    options
        .iter()
        .filter(|o| {
            query.is_empty()
                || o.label.to_lowercase().contains(&query)
                || o.zone.name().to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_convert_chicago_to_new_york() {
        let p = convert_to_timezone(
            ymd(2025, 5, 24),
            Some(hm(19, 0)),
            DEFAULT_SOURCE_TZ,
            chrono_tz::America::New_York,
        );
        assert_eq!(p.date_label, "Sat, May 24");
        assert_eq!(p.time_label, "8:00 PM");
    }

    #[test]
    fn test_convert_crosses_midnight() {
        let p = convert_to_timezone(
            ymd(2025, 5, 24),
            Some(hm(19, 0)),
            DEFAULT_SOURCE_TZ,
            chrono_tz::Asia::Tokyo,
        );
        assert_eq!(p.date, ymd(2025, 5, 25));
        assert_eq!(p.date_label, "Sun, May 25");
        assert_eq!(p.time_label, "9:00 AM");
    }

    #[test]
    fn test_untimed_event_keeps_date() {
        let p = convert_to_timezone(ymd(2026, 1, 3), None, DEFAULT_SOURCE_TZ, chrono_tz::Asia::Tokyo);
        assert_eq!(p.date, ymd(2026, 1, 3));
        assert_eq!(p.date_label, "1/3/26");
        assert_eq!(p.time_label, "");
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 2:30 AM does not exist in Chicago on 2025-03-09.
        let dt = localize(ymd(2025, 3, 9).and_time(hm(2, 30)), DEFAULT_SOURCE_TZ);
        assert_eq!(dt.format("%H:%M %Z").to_string(), "03:30 CDT");
    }

    #[test]
    fn test_dst_overlap_takes_earlier() {
        let dt = localize(ymd(2025, 11, 2).and_time(hm(1, 30)), DEFAULT_SOURCE_TZ);
        assert_eq!(dt.format("%Z").to_string(), "CDT");
    }

    #[test]
    fn test_catalogue_labels_and_search() {
        let options = catalogue();
        assert!(options.len() > 300);
        let hits = search(&options, "los ang");
        assert!(hits.iter().any(|o| o.label == "America/Los Angeles"));
        assert_eq!(search(&options, "").len(), options.len());
    }

    #[test]
    fn test_parse_tz() {
        assert_eq!(parse_tz("Europe/London").unwrap(), chrono_tz::Europe::London);
        assert!(parse_tz("Mars/Olympus").is_err());
    }
}
