use crossterm::event::{KeyCode, KeyEvent};

use crate::{
    app::font_state::fonts_in_category,
    constants::DAYS_PER_WEEK,
    holidays::COUNTRIES,
};

use super::{App, FontTarget, UiMode};

impl App {
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editor.is_editing() {
            self.handle_editing_key(key);
            return false;
        }

        match self.ui_mode {
            UiMode::Main => self.handle_main_key(key),
            UiMode::SaveName => {
                self.handle_save_name_key(key);
                false
            }
            UiMode::SavedList => {
                self.handle_saved_list_key(key);
                false
            }
            UiMode::ColorModal => {
                self.handle_color_key(key);
                false
            }
            UiMode::FontModal(target) => {
                self.handle_font_key(key, target);
                false
            }
        }
    }

    /// While a cell editor is open every key belongs to the note. Esc is the
    /// outside click that commits it.
    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editor.outside_click(&mut self.grid);
                self.schedule_autosave();
            }
            KeyCode::Enter => {
                if self.editor.input_char('\n', &mut self.grid) {
                    self.schedule_autosave();
                }
            }
            KeyCode::Backspace => {
                if self.editor.backspace(&mut self.grid) {
                    self.schedule_autosave();
                }
            }
            KeyCode::Char(c) => {
                if self.editor.input_char(c, &mut self.grid) {
                    self.schedule_autosave();
                }
            }
            _ => {}
        }
        self.render_needed = true;
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-(DAYS_PER_WEEK as isize)),
            KeyCode::Down => self.move_cursor(DAYS_PER_WEEK as isize),
            KeyCode::Enter => {
                let opened = self.editor.click(self.cursor, &mut self.grid);
                if opened > 0 {
                    self.schedule_autosave();
                }
            }
            KeyCode::Char('m') => {
                self.week_start = self.week_start.toggled();
                self.render_calendar();
                self.schedule_autosave();
            }
            KeyCode::Char('h') => {
                self.show_holidays = !self.show_holidays;
                self.refresh_holidays();
                self.schedule_autosave();
            }
            KeyCode::Char('n') => {
                self.cycle_country();
                self.schedule_autosave();
            }
            KeyCode::Char('s') => {
                self.name_input.clear();
                self.ui_mode = UiMode::SaveName;
            }
            KeyCode::Char('l') => {
                self.saved_selected = 0;
                self.ui_mode = UiMode::SavedList;
            }
            KeyCode::Char('o') => self.ui_mode = UiMode::ColorModal,
            KeyCode::Char('t') => {
                self.font_selected = 0;
                self.ui_mode = UiMode::FontModal(FontTarget::Title);
            }
            KeyCode::Char('f') => {
                self.font_selected = 0;
                self.ui_mode = UiMode::FontModal(FontTarget::Main);
            }
            _ => {}
        }
        self.render_needed = true;
        false
    }

    fn move_cursor(&mut self, delta: isize) {
        let count = self.grid.cell_count() as isize;
        if count == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, count - 1) as usize;
    }

    fn cycle_country(&mut self) {
        let index = self
            .country
            .as_deref()
            .and_then(|current| COUNTRIES.iter().position(|c| *c == current))
            .map(|i| (i + 1) % COUNTRIES.len())
            .unwrap_or(0);
        self.country = Some(COUNTRIES[index].to_string());
        self.refresh_holidays();
    }

    fn handle_save_name_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.ui_mode = UiMode::Main,
            KeyCode::Enter => {
                let base = self.name_input.trim().to_string();
                let base = if base.is_empty() {
                    self.config.title()
                } else {
                    base
                };
                let name = self.save_as(&base);
                self.show_toast(format!("Saved \"{}\"", name));
                self.ui_mode = UiMode::Main;
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) => self.name_input.push(c),
            _ => {}
        }
        self.render_needed = true;
    }

    fn handle_saved_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.ui_mode = UiMode::Main,
            KeyCode::Up => self.saved_selected = self.saved_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.saved_selected + 1 < self.store.len() {
                    self.saved_selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(record) = self.store.records.get(self.saved_selected) {
                    let id = record.id.clone();
                    self.ui_mode = UiMode::Main;
                    if let Err(e) = self.load_saved(&id) {
                        eprintln!("Warning: {}", e);
                    }
                }
            }
            KeyCode::Char('x') => self.delete_selected_record(),
            _ => {}
        }
        self.render_needed = true;
    }

    fn delete_selected_record(&mut self) {
        let Some(record) = self.store.records.get(self.saved_selected) else {
            return;
        };
        let id = record.id.clone();
        match self.store.delete(&id) {
            Ok(_) => {
                if self.current_id.as_deref() == Some(id.as_str()) {
                    self.current_id = None;
                    self.current_name = None;
                    self.created_at = None;
                    self.autosave.cancel();
                }
                self.persist_records();
                if self.saved_selected > 0 && self.saved_selected >= self.store.len() {
                    self.saved_selected -= 1;
                }
            }
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    fn handle_color_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.ui_mode = UiMode::Main,
            KeyCode::Left => {
                self.color_picker.select_prev();
                self.apply_active_swatch();
            }
            KeyCode::Right => {
                self.color_picker.select_next();
                self.apply_active_swatch();
            }
            KeyCode::Char('r') => {
                let mut rng = rand::thread_rng();
                self.color_picker.randomize(&mut rng);
                self.apply_active_swatch();
            }
            KeyCode::Char(c @ '1'..='8') => {
                let index = c as usize - '1' as usize;
                self.color_picker.select(index);
                self.apply_active_swatch();
            }
            _ => {}
        }
        self.render_needed = true;
    }

    fn handle_font_key(&mut self, key: KeyEvent, target: FontTarget) {
        match key.code {
            KeyCode::Esc => self.ui_mode = UiMode::Main,
            KeyCode::Up => self.font_selected = self.font_selected.saturating_sub(1),
            KeyCode::Down => {
                let len = self.font_picker(target).page_entries().len();
                if len > 0 && self.font_selected + 1 < len {
                    self.font_selected += 1;
                }
            }
            KeyCode::Left => {
                self.font_picker_mut(target).prev_page();
                self.font_selected = 0;
            }
            KeyCode::Right => {
                self.font_picker_mut(target).next_page();
                self.font_selected = 0;
            }
            KeyCode::Tab => {
                let picker = self.font_picker_mut(target);
                let category = picker.category().next();
                let request = picker.begin_load(category);
                picker.finish_load(request, fonts_in_category(category));
                self.font_selected = 0;
            }
            KeyCode::Enter => {
                let row = self.font_selected;
                if let Some(choice) = self.font_picker_mut(target).select_on_page(row) {
                    self.apply_font_choice(target, choice);
                }
            }
            _ => {}
        }
        self.render_needed = true;
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::SystemTime};

    use chrono::Month;
    use crossterm::event::{KeyEvent, KeyModifiers};

    use crate::domain::{CalendarConfig, WeekStart};

    use super::*;

    fn test_app(prefix: &str) -> App {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut app = App::new(PathBuf::from(format!("/tmp/{}_{}.json", prefix, now)));
        app.config = CalendarConfig::new(Month::August, 2026);
        app.render_calendar();
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_week_start_toggle_re_renders() {
        let mut app = test_app("quickcal_keys_week_start");
        assert_eq!(app.week_start, WeekStart::Sunday);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.week_start, WeekStart::Monday);
        assert_eq!(app.grid.labels()[0], "MON");
    }

    #[test]
    fn test_enter_on_active_cell_opens_editor_and_typing_lands_in_note() {
        let mut app = test_app("quickcal_keys_edit");
        app.cursor = app.grid.position_of_day(10).expect("day 10 assigned");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.editor.editing_day(), Some(10));

        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Esc);

        assert!(!app.editor.is_editing());
        assert_eq!(
            app.grid.cell_for_day(10).expect("day 10 exists").notes,
            vec!["hi".to_string()]
        );
    }

    #[test]
    fn test_editing_consumes_app_shortcuts() {
        let mut app = test_app("quickcal_keys_shortcuts");
        app.cursor = app.grid.position_of_day(10).expect("day 10 assigned");
        press(&mut app, KeyCode::Enter);

        // 'm' must type into the note, not toggle the week start.
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.week_start, WeekStart::Sunday);
        press(&mut app, KeyCode::Esc);
        assert_eq!(
            app.grid.cell_for_day(10).expect("day 10 exists").notes,
            vec!["m".to_string()]
        );
    }

    #[test]
    fn test_cursor_stays_inside_grid() {
        let mut app = test_app("quickcal_keys_cursor");
        app.cursor = 0;
        press(&mut app, KeyCode::Left);
        assert_eq!(app.cursor, 0);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, 0);

        app.cursor = app.grid.cell_count() - 1;
        press(&mut app, KeyCode::Right);
        assert_eq!(app.cursor, app.grid.cell_count() - 1);
    }

    #[test]
    fn test_country_cycles_through_tables() {
        let mut app = test_app("quickcal_keys_country");
        assert_eq!(app.country.as_deref(), Some("USA"));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.country.as_deref(), Some("UK"));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.country.as_deref(), Some("Canada"));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.country.as_deref(), Some("USA"));
    }

    #[test]
    fn test_save_name_flow_creates_record_and_toast() {
        let mut app = test_app("quickcal_keys_save");
        press(&mut app, KeyCode::Char('s'));
        for c in "Team".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.records[0].name, "Team");
        assert!(app.toast.is_some());
        assert_eq!(app.ui_mode, UiMode::Main);
        std::fs::remove_file(&app.store_path).ok();
    }

    #[test]
    fn test_empty_save_name_falls_back_to_month_year() {
        let mut app = test_app("quickcal_keys_save_fallback");
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.records[0].name, "August 2026");
        std::fs::remove_file(&app.store_path).ok();
    }

    #[test]
    fn test_font_modal_selection_applies_to_target() {
        let mut app = test_app("quickcal_keys_fonts");
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.ui_mode, UiMode::FontModal(FontTarget::Title));

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.fonts.title_font.as_ref().map(|f| f.family.as_str()),
            Some("Open Sans")
        );
        assert!(app.fonts_overridden);
        assert!(app.fonts.main_font.is_none());
    }

    #[test]
    fn test_swatch_selection_applies_colors() {
        let mut app = test_app("quickcal_keys_colors");
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('1'));

        // Swatch 1 darkens the white primary by 5%.
        assert_eq!(app.colors.bg.as_deref(), Some("#f2f2f2"));
        assert_eq!(app.colors.text.as_deref(), Some("#000000"));
        assert!(app.colors_overridden);
    }

    #[test]
    fn test_deleting_current_record_stops_autosave() {
        let mut app = test_app("quickcal_keys_delete");
        app.save_as("Mine");
        app.schedule_autosave();
        assert!(app.autosave.pending());

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('x'));

        assert!(app.store.is_empty());
        assert!(app.current_id.is_none());
        assert!(!app.autosave.pending());
        std::fs::remove_file(&app.store_path).ok();
    }
}
