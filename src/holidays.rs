use crate::grid::GridEngine;

pub const COUNTRIES: [&str; 3] = ["USA", "UK", "Canada"];

pub struct HolidayTable {
    pub country: &'static str,
    pub year: i32,
    /// Entries keyed "month/day" with a 1-based month.
    pub entries: &'static [(&'static str, &'static str)],
}

pub const HOLIDAY_TABLES: &[HolidayTable] = &[
    HolidayTable {
        country: "USA",
        year: 2023,
        entries: &[
            ("1/1", "New Year's Day"),
            ("1/16", "Martin Luther King Jr. Day"),
            ("2/20", "Presidents' Day"),
            ("5/29", "Memorial Day"),
            ("7/4", "Independence Day"),
            ("9/4", "Labor Day"),
            ("10/9", "Columbus Day"),
            ("11/11", "Veterans Day"),
            ("11/23", "Thanksgiving Day"),
            ("12/25", "Christmas Day"),
        ],
    },
    HolidayTable {
        country: "UK",
        year: 2023,
        entries: &[
            ("1/1", "New Year's Day"),
            ("4/7", "Good Friday"),
            ("4/10", "Easter Monday"),
            ("5/1", "Early May Bank Holiday"),
            ("5/29", "Spring Bank Holiday"),
            ("8/28", "Summer Bank Holiday"),
            ("12/25", "Christmas Day"),
            ("12/26", "Boxing Day"),
        ],
    },
    HolidayTable {
        country: "Canada",
        year: 2023,
        entries: &[
            ("1/1", "New Year's Day"),
            ("2/20", "Family Day"),
            ("4/7", "Good Friday"),
            ("7/1", "Canada Day"),
            ("9/4", "Labour Day"),
            ("10/9", "Thanksgiving Day"),
            ("11/11", "Remembrance Day"),
            ("12/25", "Christmas Day"),
        ],
    },
];

fn table_for(country: &str, year: i32) -> Option<&'static HolidayTable> {
    HOLIDAY_TABLES
        .iter()
        .find(|table| table.country == country && table.year == year)
}

pub fn holiday_for(country: &str, year: i32, month: u32, day: u32) -> Option<&'static str> {
    let key = format!("{}/{}", month, day);
    table_for(country, year)?
        .entries
        .iter()
        .find(|(entry_key, _)| *entry_key == key)
        .map(|(_, name)| *name)
}

/// Post-render overlay hook: clears every cell's holiday label, then sets the
/// label on each cell whose day matches a table entry. `show` only controls
/// visibility; the label text is attached either way. Unknown countries and
/// years without a table degrade to an empty overlay.
pub fn refresh(grid: &mut GridEngine, country: Option<&str>, year: i32, month: u32, show: bool) {
    grid.clear_holidays();

    let Some(country) = country else {
        return;
    };

    for position in 0..grid.cell_count() {
        let Some(day) = grid.day_at(position) else {
            continue;
        };
        if let Some(name) = holiday_for(country, year, month, day) {
            grid.set_holiday(position, name, show);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Month;

    use crate::domain::{CalendarConfig, WeekStart};

    use super::*;

    fn july_2023_grid() -> GridEngine {
        let mut grid = GridEngine::new();
        grid.reconcile(&CalendarConfig::new(Month::July, 2023), WeekStart::Sunday);
        grid
    }

    #[test]
    fn test_holiday_lookup() {
        assert_eq!(holiday_for("USA", 2023, 7, 4), Some("Independence Day"));
        assert_eq!(holiday_for("UK", 2023, 12, 26), Some("Boxing Day"));
        assert_eq!(holiday_for("Canada", 2023, 7, 1), Some("Canada Day"));
        assert_eq!(holiday_for("USA", 2023, 7, 5), None);
        assert_eq!(holiday_for("France", 2023, 7, 14), None);
    }

    #[test]
    fn test_refresh_labels_matching_cells() {
        let mut grid = july_2023_grid();
        refresh(&mut grid, Some("USA"), 2023, 7, true);

        let fourth = grid.cell_for_day(4).expect("day 4 exists");
        assert_eq!(fourth.holiday, Some("Independence Day"));
        assert!(fourth.holiday_visible);

        let fifth = grid.cell_for_day(5).expect("day 5 exists");
        assert_eq!(fifth.holiday, None);
    }

    #[test]
    fn test_refresh_attaches_label_even_when_hidden() {
        let mut grid = july_2023_grid();
        refresh(&mut grid, Some("USA"), 2023, 7, false);

        let fourth = grid.cell_for_day(4).expect("day 4 exists");
        assert_eq!(fourth.holiday, Some("Independence Day"));
        assert!(!fourth.holiday_visible);
    }

    #[test]
    fn test_refresh_clears_previous_overlay() {
        let mut grid = july_2023_grid();
        refresh(&mut grid, Some("USA"), 2023, 7, true);
        refresh(&mut grid, Some("UK"), 2023, 7, true);

        // The UK table has no July entries, so the US overlay must be gone.
        assert!(grid.cells().iter().all(|cell| cell.holiday.is_none()));
    }

    #[test]
    fn test_refresh_without_country_or_table_is_empty() {
        let mut grid = july_2023_grid();
        refresh(&mut grid, None, 2023, 7, true);
        assert!(grid.cells().iter().all(|cell| cell.holiday.is_none()));

        refresh(&mut grid, Some("USA"), 2026, 7, true);
        assert!(grid.cells().iter().all(|cell| cell.holiday.is_none()));
    }
}
