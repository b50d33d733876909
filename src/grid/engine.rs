use std::collections::BTreeMap;

use crate::{
    constants::{DAYS_PER_WEEK, GRID},
    domain::{CalendarConfig, WeekStart},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CellState {
    Active,
    #[default]
    Inactive,
}

/// One grid position. `notes` normally holds zero or one entry; if a prior
/// bad state left several note elements on one day, all of them are carried
/// through re-layouts rather than deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridCell {
    pub day: Option<u32>,
    pub state: CellState,
    pub notes: Vec<String>,
    pub holiday: Option<&'static str>,
    pub holiday_visible: bool,
}

impl GridCell {
    pub fn is_active(&self) -> bool {
        self.state == CellState::Active
    }
}

/// Owns the cell sequence and the day-to-cell assignment. `reconcile` is the
/// single re-layout entrypoint; everything else reads or edits cells the
/// assignment produced.
#[derive(Debug, PartialEq, Eq)]
pub struct GridEngine {
    cells: Vec<GridCell>,
    labels: [&'static str; DAYS_PER_WEEK],
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GridEngine {
    /// A fresh grid with the base five week-rows, mirroring the static page
    /// markup before the first layout pass.
    pub fn new() -> Self {
        Self {
            cells: vec![GridCell::default(); GRID.base_cells],
            labels: WeekStart::Sunday.labels(),
        }
    }

    /// A grid with no cells at all, for surfaces that lack the grid section.
    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            labels: WeekStart::Sunday.labels(),
        }
    }

    /// Recomputes the day-to-cell assignment for `config` under `week_start`.
    ///
    /// Idempotent: running it twice with the same inputs yields the same cell
    /// state, and notes always follow their day number across re-layouts.
    /// With no cells present this only normalizes the label row.
    pub fn reconcile(&mut self, config: &CalendarConfig, week_start: WeekStart) {
        self.labels = week_start.labels();

        if self.cells.is_empty() {
            return;
        }

        let offset = week_start.offset(config.first_weekday()) as usize;
        let days = config.days_in_month() as usize;

        // Snapshot notes keyed by the day they belong to, before any row is
        // dropped, so a 42-to-35 shrink cannot lose a note whose day still
        // exists in the new layout.
        let mut migrated: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for cell in &mut self.cells {
            if let Some(day) = cell.day {
                let notes = std::mem::take(&mut cell.notes);
                if !notes.is_empty() {
                    migrated.entry(day).or_default().extend(notes);
                }
            }
        }

        let needed = offset + days;
        let target = if needed > GRID.base_cells {
            GRID.extended_cells
        } else {
            GRID.base_cells
        };
        if self.cells.len() != target {
            self.cells.resize_with(target, GridCell::default);
        }

        for cell in &mut self.cells {
            *cell = GridCell::default();
        }

        for (index, cell) in self.cells.iter_mut().enumerate() {
            if index >= offset && index < offset + days {
                let day = (index - offset + 1) as u32;
                cell.day = Some(day);
                cell.state = CellState::Active;
                if let Some(notes) = migrated.remove(&day) {
                    cell.notes = notes;
                }
            } else {
                cell.state = CellState::Inactive;
            }
        }
    }

    pub fn labels(&self) -> [&'static str; DAYS_PER_WEEK] {
        self.labels
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn active_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_active())
            .map(|(index, _)| index)
    }

    pub fn day_at(&self, position: usize) -> Option<u32> {
        self.cells.get(position).and_then(|cell| cell.day)
    }

    pub fn position_of_day(&self, day: u32) -> Option<usize> {
        self.cells.iter().position(|cell| cell.day == Some(day))
    }

    pub fn cell_for_day(&self, day: u32) -> Option<&GridCell> {
        self.cells.iter().find(|cell| cell.day == Some(day))
    }

    pub fn cell_for_day_mut(&mut self, day: u32) -> Option<&mut GridCell> {
        self.cells.iter_mut().find(|cell| cell.day == Some(day))
    }

    pub fn clear_notes(&mut self) {
        for cell in &mut self.cells {
            cell.notes.clear();
        }
    }

    pub fn set_holiday(&mut self, position: usize, label: &'static str, visible: bool) {
        if let Some(cell) = self.cells.get_mut(position) {
            cell.holiday = Some(label);
            cell.holiday_visible = visible;
        }
    }

    pub fn clear_holidays(&mut self) {
        for cell in &mut self.cells {
            cell.holiday = None;
            cell.holiday_visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Month;

    use super::*;

    fn engine_for(month: Month, year: i32, week_start: WeekStart) -> GridEngine {
        let mut grid = GridEngine::new();
        grid.reconcile(&CalendarConfig::new(month, year), week_start);
        grid
    }

    fn active_days(grid: &GridEngine) -> Vec<u32> {
        grid.cells()
            .iter()
            .filter(|cell| cell.is_active())
            .filter_map(|cell| cell.day)
            .collect()
    }

    #[test]
    fn test_reconcile_assigns_contiguous_days() {
        for (month, year, week_start) in [
            (Month::January, 2026, WeekStart::Sunday),
            (Month::February, 2024, WeekStart::Monday),
            (Month::June, 2023, WeekStart::Sunday),
            (Month::December, 2025, WeekStart::Monday),
        ] {
            let config = CalendarConfig::new(month, year);
            let grid = engine_for(month, year, week_start);

            let offset = week_start.offset(config.first_weekday()) as usize;
            let days = config.days_in_month();
            let expected: Vec<u32> = (1..=days).collect();
            assert_eq!(active_days(&grid), expected);

            for (index, cell) in grid.cells().iter().enumerate() {
                if index >= offset && index < offset + days as usize {
                    assert_eq!(cell.day, Some((index - offset + 1) as u32));
                } else {
                    assert_eq!(cell.day, None);
                    assert!(!cell.is_active());
                }
            }
        }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let config = CalendarConfig::new(Month::August, 2026);
        let mut grid = GridEngine::new();
        grid.reconcile(&config, WeekStart::Sunday);
        grid.cell_for_day_mut(15)
            .expect("day 15 exists")
            .notes
            .push("<b>standup</b>".to_string());

        let mut again = GridEngine::new();
        again.reconcile(&config, WeekStart::Sunday);
        again
            .cell_for_day_mut(15)
            .expect("day 15 exists")
            .notes
            .push("<b>standup</b>".to_string());
        again.reconcile(&config, WeekStart::Sunday);
        grid.reconcile(&config, WeekStart::Sunday);
        grid.reconcile(&config, WeekStart::Sunday);

        assert_eq!(grid, again);
        assert_eq!(
            grid.cell_for_day(15).expect("day 15 exists").notes,
            vec!["<b>standup</b>".to_string()]
        );
    }

    #[test]
    fn test_notes_follow_day_number_across_week_start_toggle() {
        let config = CalendarConfig::new(Month::August, 2026);
        let mut grid = GridEngine::new();
        grid.reconcile(&config, WeekStart::Sunday);

        let sunday_position = grid.position_of_day(15).expect("day 15 assigned");
        grid.cell_for_day_mut(15)
            .expect("day 15 exists")
            .notes
            .push("dentist".to_string());

        grid.reconcile(&config, WeekStart::Monday);

        let monday_position = grid.position_of_day(15).expect("day 15 assigned");
        assert_ne!(sunday_position, monday_position);
        assert_eq!(
            grid.cell_for_day(15).expect("day 15 exists").notes,
            vec!["dentist".to_string()]
        );

        let cells_with_notes = grid
            .cells()
            .iter()
            .filter(|cell| !cell.notes.is_empty())
            .count();
        assert_eq!(cells_with_notes, 1);
    }

    #[test]
    fn test_row_count_switches_between_five_and_six_weeks() {
        // February 2023: 28 days starting Wednesday -> fits five rows.
        let short = engine_for(Month::February, 2023, WeekStart::Sunday);
        assert_eq!(short.cell_count(), 35);

        // August 2026 Sunday-start: offset 6 + 31 days = 37 -> six rows.
        let long = engine_for(Month::August, 2026, WeekStart::Sunday);
        assert_eq!(long.cell_count(), 42);

        // Back to a five-row month removes the trailing row again.
        let mut grid = engine_for(Month::August, 2026, WeekStart::Sunday);
        grid.reconcile(
            &CalendarConfig::new(Month::February, 2023),
            WeekStart::Sunday,
        );
        assert_eq!(grid.cell_count(), 35);
    }

    #[test]
    fn test_shrinking_grid_keeps_note_on_surviving_day() {
        // Day 31 sits in the sixth row for August 2026; July 2026 needs only
        // five rows but still has a day 31.
        let mut grid = engine_for(Month::August, 2026, WeekStart::Sunday);
        assert!(grid.position_of_day(31).expect("day 31 assigned") >= 35);
        grid.cell_for_day_mut(31)
            .expect("day 31 exists")
            .notes
            .push("payday".to_string());

        grid.reconcile(&CalendarConfig::new(Month::July, 2026), WeekStart::Sunday);
        assert_eq!(grid.cell_count(), 35);
        assert_eq!(
            grid.cell_for_day(31).expect("day 31 exists").notes,
            vec!["payday".to_string()]
        );
    }

    #[test]
    fn test_note_multiplicity_is_preserved() {
        let config = CalendarConfig::new(Month::August, 2026);
        let mut grid = GridEngine::new();
        grid.reconcile(&config, WeekStart::Sunday);

        let cell = grid.cell_for_day_mut(8).expect("day 8 exists");
        cell.notes.push("first".to_string());
        cell.notes.push("second".to_string());

        grid.reconcile(&config, WeekStart::Monday);
        assert_eq!(
            grid.cell_for_day(8).expect("day 8 exists").notes,
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_empty_grid_still_normalizes_labels() {
        let mut grid = GridEngine::empty();
        grid.reconcile(
            &CalendarConfig::new(Month::August, 2026),
            WeekStart::Monday,
        );
        assert_eq!(grid.cell_count(), 0);
        assert_eq!(grid.labels()[0], "MON");
    }

    #[test]
    fn test_labels_follow_week_start() {
        let sunday = engine_for(Month::August, 2026, WeekStart::Sunday);
        assert_eq!(sunday.labels(), ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"]);

        let monday = engine_for(Month::August, 2026, WeekStart::Monday);
        assert_eq!(monday.labels(), ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"]);
    }
}
