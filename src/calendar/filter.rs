use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::category::CategoryFilter;
use super::event::EventRecord;
use super::timezone::{convert_to_timezone, localize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Upcoming,
    All,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Upcoming => "Upcoming Events",
            Scope::All => "All Events",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Scope::Upcoming => Scope::All,
            Scope::All => Scope::Upcoming,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Instant of an event, reading its stored wall-clock time in `source`.
/// Untimed events sit at the start of their day.
pub fn instant(event: &EventRecord, source: Tz) -> DateTime<Utc> {
    let time = event.time.unwrap_or(NaiveTime::MIN);
    localize(event.date.and_time(time), source).with_timezone(&Utc)
}

#[derive(Debug, Clone)]
pub struct EventQuery {
    pub scope: Scope,
    pub order: SortOrder,
    pub search: String,
    pub source: Tz,
    pub categories: CategoryFilter,
}

impl EventQuery {
    pub fn new(source: Tz) -> Self {
        Self {
            scope: Scope::Upcoming,
            order: SortOrder::Ascending,
            search: String::new(),
            source,
            categories: CategoryFilter::default(),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.source).date_naive()
    }

    /// Scope, categories, search, then a stable sort by instant.
    pub fn apply<'a>(&self, events: &'a [EventRecord], now: DateTime<Utc>) -> Vec<&'a EventRecord> {
        let today = self.today(now);
        let mut visible: Vec<&EventRecord> = events
            .iter()
            .filter(|ev| self.scope == Scope::All || ev.date > today)
            .filter(|ev| self.categories.allows(ev))
            .filter(|ev| ev.matches_query(&self.search))
            .collect();

        visible.sort_by(|a, b| {
            let ord = instant(a, self.source).cmp(&instant(b, self.source));
            match self.order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        visible
    }
}

/// Bucket events by their projected day in `target`.
pub fn group_by_day<'a>(
    events: &[&'a EventRecord],
    source: Tz,
    target: Tz,
) -> BTreeMap<NaiveDate, Vec<&'a EventRecord>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a EventRecord>> = BTreeMap::new();
    for ev in events {
        let projected = convert_to_timezone(ev.date, ev.time, source, target);
        days.entry(projected.date).or_default().push(*ev);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample() -> Vec<EventRecord> {
        vec![
            EventRecord::new("Late", ymd(2025, 6, 10), "Concert").with_time(hm(21, 0)),
            EventRecord::new("Past", ymd(2025, 5, 1), "Release"),
            EventRecord::new("Early", ymd(2025, 6, 10), "Football").with_time(hm(9, 0)),
            EventRecord::new("Today", ymd(2025, 6, 5), "Ceremony"),
            EventRecord::new("Same day untimed", ymd(2025, 6, 10), "Concert"),
        ]
    }

    // 2025-06-05 15:00 in Chicago
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 5, 20, 0, 0).unwrap()
    }

    fn titles(events: &[&EventRecord]) -> Vec<String> {
        events.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_upcoming_starts_after_today_and_sorts() {
        let events = sample();
        let query = EventQuery::new(chrono_tz::America::Chicago);
        let visible = query.apply(&events, now());
        assert_eq!(titles(&visible), vec!["Same day untimed", "Early", "Late"]);
    }

    #[test]
    fn test_upcoming_today_is_judged_in_source_zone() {
        let events = vec![EventRecord::new("Tomorrow", ymd(2025, 6, 6), "Other")];
        let query = EventQuery::new(chrono_tz::America::Chicago);
        // 2025-06-05 23:30 in Chicago, already the 6th in UTC
        let late = Utc.with_ymd_and_hms(2025, 6, 6, 4, 30, 0).unwrap();
        assert_eq!(titles(&query.apply(&events, late)), vec!["Tomorrow"]);
    }

    #[test]
    fn test_all_scope_and_descending() {
        let events = sample();
        let mut query = EventQuery::new(chrono_tz::America::Chicago);
        query.scope = Scope::All;
        query.order = SortOrder::Descending;
        let visible = query.apply(&events, now());
        assert_eq!(
            titles(&visible),
            vec!["Late", "Early", "Same day untimed", "Today", "Past"]
        );
    }

    #[test]
    fn test_category_and_search_filters() {
        let events = sample();
        let mut query = EventQuery::new(chrono_tz::America::Chicago);
        query.scope = Scope::All;
        query.categories = CategoryFilter::from_events(&events);
        query.categories.toggle_category("Concert");
        assert_eq!(titles(&query.apply(&events, now())), vec!["Past", "Today", "Early"]);

        query.search = "ear".to_string();
        assert_eq!(titles(&query.apply(&events, now())), vec!["Early"]);
    }

    #[test]
    fn test_group_by_day_uses_target_zone() {
        let events = sample();
        let refs: Vec<&EventRecord> = events.iter().collect();
        let days = group_by_day(&refs, chrono_tz::America::Chicago, chrono_tz::Asia::Tokyo);
        // 21:00 Chicago is the next morning in Tokyo
        assert_eq!(titles(&days[&ymd(2025, 6, 11)]), vec!["Late"]);
        assert_eq!(titles(&days[&ymd(2025, 6, 10)]), vec!["Early", "Same day untimed"]);
    }
}
