use std::collections::BTreeMap;

use chrono::{Datelike, Local, Month, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MONDAY_LABELS, SUNDAY_LABELS};

/// Identity of the displayed month. Immutable per render; replaced only when
/// a saved calendar is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarConfig {
    pub month: Month,
    pub year: i32,
}

impl CalendarConfig {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    pub fn current() -> Self {
        let today = Local::now().date_naive();
        let month = Month::try_from(today.month() as u8).unwrap_or(Month::January);
        Self {
            month,
            year: today.year(),
        }
    }

    pub fn parse(month_name: &str, year: i32) -> Option<Self> {
        month_name
            .parse::<Month>()
            .ok()
            .map(|month| Self { month, year })
    }

    pub fn month_number(&self) -> u32 {
        self.month.number_from_month()
    }

    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month_number())
    }

    /// Weekday of day 1, 0=Sunday..6=Saturday.
    pub fn first_weekday(&self) -> u32 {
        NaiveDate::from_ymd_opt(self.year, self.month_number(), 1)
            .map_or(0, |first| first.weekday().num_days_from_sunday())
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

/// Day 0 of the next month is the last day of this one.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn from_monday_flag(start_on_monday: bool) -> Self {
        if start_on_monday {
            WeekStart::Monday
        } else {
            WeekStart::Sunday
        }
    }

    pub fn starts_on_monday(self) -> bool {
        self == WeekStart::Monday
    }

    pub fn toggled(self) -> Self {
        match self {
            WeekStart::Sunday => WeekStart::Monday,
            WeekStart::Monday => WeekStart::Sunday,
        }
    }

    /// Number of leading inactive cells before day 1, given the raw
    /// 0=Sunday..6=Saturday weekday of day 1.
    pub fn offset(self, raw_weekday: u32) -> u32 {
        match self {
            WeekStart::Sunday => raw_weekday,
            WeekStart::Monday => (raw_weekday + 6) % 7,
        }
    }

    pub fn labels(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => SUNDAY_LABELS,
            WeekStart::Monday => MONDAY_LABELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontChoice {
    pub family: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSelection {
    pub title_font: Option<FontChoice>,
    pub main_font: Option<FontChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub bg: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarSettings {
    pub start_on_monday: bool,
    pub show_holidays: bool,
    pub country: Option<String>,
    pub colors: ColorScheme,
    pub fonts: FontSelection,
}

/// One persisted calendar. Notes are keyed by day number as a string and hold
/// the note's markup verbatim so formatting survives the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCalendarRecord {
    pub id: String,
    pub name: String,
    pub month: String,
    pub year: i32,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub settings: CalendarSettings,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl SavedCalendarRecord {
    pub fn config(&self) -> Option<CalendarConfig> {
        CalendarConfig::parse(&self.month, self.year)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no saved calendar with id {0}")]
    NotFound(String),
}

/// In-memory view of the saved-calendars collection, insertion ordered.
#[derive(Debug, Default)]
pub struct CalendarStore {
    pub records: Vec<SavedCalendarRecord>,
}

impl CalendarStore {
    pub fn new(records: Vec<SavedCalendarRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// baseName, baseName (2), baseName (3), ... until no record carries the
    /// exact name.
    pub fn unique_name(&self, base: &str) -> String {
        let mut name = base.to_string();
        let mut counter = 2;
        while self.records.iter().any(|record| record.name == name) {
            name = format!("{} ({})", base, counter);
            counter += 1;
        }
        name
    }

    /// Millisecond-timestamp id, bumped until unique within the collection.
    pub fn fresh_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self
            .records
            .iter()
            .any(|record| record.id == candidate.to_string())
        {
            candidate += 1;
        }
        candidate.to_string()
    }

    pub fn insert(&mut self, record: SavedCalendarRecord) {
        self.records.push(record);
    }

    pub fn get(&self, id: &str) -> Result<&SavedCalendarRecord, StoreError> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Replaces the record with the same id, or appends it when the id is
    /// missing from the collection.
    pub fn update(&mut self, record: SavedCalendarRecord) {
        match self
            .records
            .iter()
            .position(|existing| existing.id == record.id)
        {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }

    pub fn delete(&mut self, id: &str) -> Result<SavedCalendarRecord, StoreError> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> SavedCalendarRecord {
        SavedCalendarRecord {
            id: id.to_string(),
            name: name.to_string(),
            month: "August".to_string(),
            year: 2026,
            created_at: "2026-08-01T00:00:00Z".to_string(),
            updated_at: "2026-08-01T00:00:00Z".to_string(),
            settings: CalendarSettings::default(),
            notes: BTreeMap::new(),
        }
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_first_weekday_uses_real_calendar() {
        // 2023-02-01 was a Wednesday, 2026-08-01 a Saturday.
        assert_eq!(
            CalendarConfig::new(Month::February, 2023).first_weekday(),
            3
        );
        assert_eq!(CalendarConfig::new(Month::August, 2026).first_weekday(), 6);
    }

    #[test]
    fn test_week_start_offset() {
        assert_eq!(WeekStart::Sunday.offset(6), 6);
        assert_eq!(WeekStart::Monday.offset(6), 5);
        assert_eq!(WeekStart::Monday.offset(0), 6);
        assert_eq!(WeekStart::Monday.offset(1), 0);
    }

    #[test]
    fn test_config_parse_month_name() {
        let config = CalendarConfig::parse("August", 2026).expect("month should parse");
        assert_eq!(config.month, Month::August);
        assert_eq!(config.title(), "August 2026");
        assert!(CalendarConfig::parse("Augustus", 2026).is_none());
    }

    #[test]
    fn test_unique_name_suffixes() {
        let mut store = CalendarStore::default();
        assert_eq!(store.unique_name("Team Calendar"), "Team Calendar");
        store.insert(record("1", "Team Calendar"));
        assert_eq!(store.unique_name("Team Calendar"), "Team Calendar (2)");
        store.insert(record("2", "Team Calendar (2)"));
        assert_eq!(store.unique_name("Team Calendar"), "Team Calendar (3)");
    }

    #[test]
    fn test_fresh_id_avoids_collisions() {
        let mut store = CalendarStore::default();
        let first = store.fresh_id();
        store.insert(record(&first, "one"));
        let second = store.fresh_id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_update_replaces_or_appends() {
        let mut store = CalendarStore::default();
        store.insert(record("1", "one"));

        let mut changed = record("1", "renamed");
        changed.year = 2027;
        store.update(changed);
        assert_eq!(store.len(), 1);
        assert_eq!(store.records[0].name, "renamed");

        store.update(record("2", "two"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_and_delete_report_not_found() {
        let mut store = CalendarStore::default();
        assert_eq!(
            store.get("99").unwrap_err(),
            StoreError::NotFound("99".to_string())
        );
        assert_eq!(
            store.delete("99").unwrap_err(),
            StoreError::NotFound("99".to_string())
        );

        store.insert(record("7", "seven"));
        assert!(store.get("7").is_ok());
        assert_eq!(store.delete("7").expect("record exists").name, "seven");
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let mut rec = record("1738000000000", "Team Calendar");
        rec.settings.colors = ColorScheme {
            bg: Some("#112233".to_string()),
            text: Some("#ffffff".to_string()),
        };
        rec.notes.insert("5".to_string(), "<b>hi</b>".to_string());

        let json = serde_json::to_string(&rec).expect("serialize");
        let back: SavedCalendarRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_record_tolerates_missing_and_unknown_fields() {
        let json = r#"{
            "id": "1",
            "name": "Old",
            "month": "May",
            "year": 2023,
            "createdAt": "2023-05-01T00:00:00Z",
            "updatedAt": "2023-05-01T00:00:00Z",
            "futureField": {"nested": true}
        }"#;
        let rec: SavedCalendarRecord = serde_json::from_str(json).expect("older record parses");
        assert_eq!(rec.settings.country, None);
        assert!(rec.settings.fonts.title_font.is_none());
        assert!(rec.notes.is_empty());
    }
}
