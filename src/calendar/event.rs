use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised while reading or writing event data.
#[derive(Error, Debug)]
pub enum EventFormatError {
    #[error("Invalid date '{0}'. Expected M/D/YY")]
    Date(String),

    #[error("Invalid time '{0}'. Expected h:mm AM or h:mm PM")]
    Time(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(with = "short_date")]
    pub date: NaiveDate,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_category() -> String {
    "Other".to_string()
}

#[cfg(test)]
impl EventRecord {
    pub fn new(title: impl Into<String>, date: NaiveDate, category: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            date,
            time: None,
            location: None,
            category: category.into(),
            subcategory: None,
            description: None,
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl EventRecord {
    /// Case-insensitive substring match over title, location and description.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&query);
        hit(&self.title)
            || self.location.as_deref().is_some_and(hit)
            || self.description.as_deref().is_some_and(hit)
    }
}

/// Parse `M/D/YY`. The two-digit year is taken as 2000 + YY.
pub fn parse_short_date(s: &str) -> Result<NaiveDate, EventFormatError> {
    let err = || EventFormatError::Date(s.to_string());
    let mut parts = s.trim().split('/');
    let mut next = || -> Result<u32, EventFormatError> {
        parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .ok_or_else(err)
    };
    let month = next()?;
    let day = next()?;
    let year = next()?;
    if parts.next().is_some() || year > 99 {
        return Err(err());
    }
    NaiveDate::from_ymd_opt(2000 + year as i32, month, day).ok_or_else(err)
}

pub fn format_short_date(date: NaiveDate) -> String {
    format!("{}/{}/{:02}", date.month(), date.day(), date.year().rem_euclid(100))
}

/// Parse `h:mm AM` / `h:mm PM`.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, EventFormatError> {
    let err = || EventFormatError::Time(s.to_string());
    let (clock, period) = s.trim().split_once(' ').ok_or_else(err)?;
    let (h, m) = clock.split_once(':').ok_or_else(err)?;
    let hours: u32 = h.parse().map_err(|_| err())?;
    let minutes: u32 = m.parse().map_err(|_| err())?;
    if hours == 0 || hours > 12 {
        return Err(err());
    }
    let offset = match period.trim().to_ascii_uppercase().as_str() {
        "AM" => 0,
        "PM" => 12,
        _ => return Err(err()),
    };
    NaiveTime::from_hms_opt(hours % 12 + offset, minutes, 0).ok_or_else(err)
}

pub fn format_clock_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{}:{:02} {}", hour, time.minute(), if pm { "PM" } else { "AM" })
}

pub fn load_events(path: &Path) -> Result<Vec<EventRecord>, EventFormatError> {
    let content = std::fs::read_to_string(path)?;
    let events: Vec<EventRecord> = serde_json::from_str(&content)?;
    log::info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

pub fn save_events(path: &Path, events: &[EventRecord]) -> Result<(), EventFormatError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(events)?;
    std::fs::write(path, content)?;
    log::debug!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

mod short_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_short_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_short_date(&raw).map_err(serde::de::Error::custom)
    }
}

mod clock_time {
    use super::*;

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&format_clock_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(t) => parse_clock_time(t).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_date_uses_two_thousands() {
        let date = parse_short_date("5/24/25").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 24).unwrap());
    }

    #[test]
    fn test_parse_short_date_rejects_garbage() {
        assert!(parse_short_date("2025-05-24").is_err());
        assert!(parse_short_date("13/1/25").is_err());
        assert!(parse_short_date("1/1/2025").is_err());
        assert!(parse_short_date("1/1").is_err());
    }

    #[test]
    fn test_parse_clock_time_handles_noon_and_midnight() {
        assert_eq!(parse_clock_time("12:00 AM").unwrap(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_clock_time("12:30 PM").unwrap(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(parse_clock_time("7:05 PM").unwrap(), NaiveTime::from_hms_opt(19, 5, 0).unwrap());
        assert!(parse_clock_time("19:05").is_err());
        assert!(parse_clock_time("7:05 XM").is_err());
    }

    #[test]
    fn test_format_clock_time() {
        assert_eq!(format_clock_time(NaiveTime::from_hms_opt(0, 15, 0).unwrap()), "12:15 AM");
        assert_eq!(format_clock_time(NaiveTime::from_hms_opt(19, 0, 0).unwrap()), "7:00 PM");
    }

    #[test]
    fn test_deserialize_record_from_file_layout() {
        let json = r#"{
            "title": "Season Opener",
            "date": "9/7/25",
            "time": "7:20 PM",
            "location": "",
            "category": "Football",
            "subcategory": "NFL"
        }"#;
        let ev: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(ev.title, "Season Opener");
        assert_eq!(ev.date, NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());
        assert_eq!(ev.time, NaiveTime::from_hms_opt(19, 20, 0));
        assert_eq!(ev.location, None);
        assert_eq!(ev.subcategory.as_deref(), Some("NFL"));
        assert_eq!(ev.description, None);
    }

    #[test]
    fn test_deserialize_record_without_time() {
        let json = r#"{"title": "Album Drop", "date": "1/3/26", "time": "", "category": "Release"}"#;
        let ev: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(ev.time, None);
    }

    #[test]
    fn test_bad_date_names_value() {
        let json = r#"{"title": "x", "date": "tomorrow", "category": "Other"}"#;
        let err = serde_json::from_str::<EventRecord>(json).unwrap_err();
        assert!(err.to_string().contains("tomorrow"));
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.json");
        let events = vec![
            EventRecord::new("Gala", NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(), "Ceremony")
                .with_time(NaiveTime::from_hms_opt(18, 30, 0).unwrap()),
        ];
        save_events(&path, &events).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"11/2/25\""));
        assert!(raw.contains("\"6:30 PM\""));
        assert_eq!(load_events(&path).unwrap(), events);
    }

    #[test]
    fn test_matches_query() {
        let ev = EventRecord::new("Spring Concert", NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), "Concert")
            .with_location("Riverside Hall");
        assert!(ev.matches_query("concert"));
        assert!(ev.matches_query("RIVERSIDE"));
        assert!(ev.matches_query("  "));
        assert!(!ev.matches_query("football"));
    }
}
