use std::{collections::BTreeMap, time::Instant};

use crate::{
    domain::{
        CalendarSettings, ColorScheme, FontChoice, FontSelection, SavedCalendarRecord, StoreError,
        WeekStart, now_iso,
    },
    storage,
};

use super::{App, FontTarget, SaveStatus};

impl App {
    /// Notes for persistence: only active cells carrying a non-empty note,
    /// keyed by day number as a string, markup captured verbatim.
    fn collect_notes(&self) -> BTreeMap<String, String> {
        let mut notes = BTreeMap::new();
        for cell in self.grid.cells() {
            if !cell.is_active() {
                continue;
            }
            let Some(day) = cell.day else {
                continue;
            };
            let Some(note) = cell.notes.first() else {
                continue;
            };
            let html = note.trim();
            if !html.is_empty() {
                notes.insert(day.to_string(), html.to_string());
            }
        }
        notes
    }

    fn current_settings(&self) -> CalendarSettings {
        CalendarSettings {
            start_on_monday: self.week_start.starts_on_monday(),
            show_holidays: self.show_holidays,
            country: self.country.clone(),
            colors: self.colors.clone(),
            fonts: self.fonts.clone(),
        }
    }

    /// Saves the visible state as a new record under a collision-free name
    /// and adopts the new identity so later edits autosave onto it. Returns
    /// the final name.
    pub(super) fn save_as(&mut self, base_name: &str) -> String {
        let name = self.store.unique_name(base_name);
        let id = self.store.fresh_id();
        let now = now_iso();

        let record = SavedCalendarRecord {
            id: id.clone(),
            name: name.clone(),
            month: self.config.month_name().to_string(),
            year: self.config.year,
            created_at: now.clone(),
            updated_at: now.clone(),
            settings: self.current_settings(),
            notes: self.collect_notes(),
        };
        self.store.insert(record);
        self.persist_records();

        self.current_id = Some(id);
        self.current_name = Some(name.clone());
        self.created_at = Some(now);
        self.save_status = SaveStatus::Saved;
        self.render_needed = true;
        name
    }

    /// The debounced write target: re-serializes the live state over the
    /// loaded record, keeping its id, name, and creation stamp.
    pub(super) fn autosave_now(&mut self) {
        let Some(id) = self.current_id.clone() else {
            return;
        };

        let record = SavedCalendarRecord {
            id,
            name: self
                .current_name
                .clone()
                .unwrap_or_else(|| self.config.title()),
            month: self.config.month_name().to_string(),
            year: self.config.year,
            created_at: self.created_at.clone().unwrap_or_else(now_iso),
            updated_at: now_iso(),
            settings: self.current_settings(),
            notes: self.collect_notes(),
        };
        self.store.update(record);
        self.persist_records();

        self.save_status = SaveStatus::Saved;
        self.render_needed = true;
    }

    /// Restarts the quiet period. Without a loaded record identity there is
    /// nothing to autosave onto, so this is a no-op until the first save.
    pub(super) fn schedule_autosave(&mut self) {
        if self.current_id.is_none() {
            return;
        }
        self.save_status = SaveStatus::Saving;
        self.autosave.schedule(Instant::now());
        self.render_needed = true;
    }

    pub(super) fn persist_records(&self) {
        if let Err(e) = storage::save_saved_calendars(&self.store_path, &self.store.records) {
            eprintln!("Warning: could not save calendars: {}", e);
        }
    }

    /// Applies a saved calendar: identity, settings, pickers, then a render,
    /// and only then the stored notes — injection targets the day-to-cell
    /// assignment the render just produced.
    pub(super) fn load_saved(&mut self, id: &str) -> Result<(), StoreError> {
        let record = self.store.get(id)?.clone();

        if let Some(config) = record.config() {
            self.config = config;
        } else {
            eprintln!(
                "Warning: saved calendar has unknown month '{}', keeping {}",
                record.month,
                self.config.title()
            );
        }

        self.week_start = WeekStart::from_monday_flag(record.settings.start_on_monday);
        self.show_holidays = record.settings.show_holidays;
        if record.settings.country.is_some() {
            self.country = record.settings.country.clone();
        }

        // Saved colors and fonts win until the user overrides them manually.
        self.colors_overridden = false;
        self.fonts_overridden = false;
        self.loaded_colors = Some(record.settings.colors.clone());
        self.loaded_fonts = Some(record.settings.fonts.clone());
        self.apply_colors(&record.settings.colors);
        self.apply_fonts(&record.settings.fonts);

        self.render_calendar();

        self.grid.clear_notes();
        for (day_key, html) in &record.notes {
            let Ok(day) = day_key.parse::<u32>() else {
                continue;
            };
            if let Some(cell) = self.grid.cell_for_day_mut(day) {
                cell.notes.push(html.clone());
            }
        }

        self.current_id = Some(record.id.clone());
        self.current_name = Some(record.name.clone());
        self.created_at = Some(record.created_at.clone());
        self.save_status = SaveStatus::Saved;
        self.autosave.cancel();
        self.cursor = self.grid.position_of_day(1).unwrap_or(0);
        self.render_needed = true;
        Ok(())
    }

    pub(super) fn apply_colors(&mut self, colors: &ColorScheme) {
        if colors.bg.is_some() {
            self.colors.bg = colors.bg.clone();
        }
        if colors.text.is_some() {
            self.colors.text = colors.text.clone();
        }
        self.color_picker.sync_with_saved(colors);
    }

    pub(super) fn apply_fonts(&mut self, fonts: &FontSelection) {
        if let Some(title) = &fonts.title_font {
            self.fonts.title_font = Some(title.clone());
            self.title_font_picker.sync_with_saved(title);
        }
        if let Some(main) = &fonts.main_font {
            self.fonts.main_font = Some(main.clone());
            self.main_font_picker.sync_with_saved(main);
        }
    }

    /// Re-applies the loaded theme after a re-layout unless the user has
    /// taken over; manual picks latch the automatic re-application off for
    /// the rest of the session.
    pub(super) fn reapply_loaded_theme(&mut self) {
        if !self.fonts_overridden {
            if let Some(fonts) = self.loaded_fonts.clone() {
                self.apply_fonts(&fonts);
            }
        }
        if !self.colors_overridden {
            if let Some(colors) = self.loaded_colors.clone() {
                self.apply_colors(&colors);
            }
        }
    }

    pub(super) fn apply_active_swatch(&mut self) {
        let Some(combo) = self.color_picker.active_combo().cloned() else {
            return;
        };
        self.colors = ColorScheme {
            bg: Some(combo.bg),
            text: Some(combo.text),
        };
        self.colors_overridden = true;
        self.schedule_autosave();
    }

    pub(super) fn apply_font_choice(&mut self, target: FontTarget, choice: FontChoice) {
        match target {
            FontTarget::Title => self.fonts.title_font = Some(choice),
            FontTarget::Main => self.fonts.main_font = Some(choice),
        }
        self.fonts_overridden = true;
        self.schedule_autosave();
    }
}
