use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{
    constants::TOAST,
    domain::{CalendarConfig, CalendarStore, ColorScheme, FontSelection, WeekStart},
    grid::{GridEngine, NoteEditor},
    holidays, storage,
};

use self::{
    autosave::Autosave,
    color_state::ColorPicker,
    font_state::{FontCategory, FontPicker},
};

mod autosave;
mod color_state;
mod event_handlers;
mod font_state;
mod render_views;
mod saved_state;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UiMode {
    Main,
    SaveName,
    SavedList,
    ColorModal,
    FontModal(FontTarget),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FontTarget {
    Title,
    Main,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveStatus {
    Saved,
    Saving,
}

struct App {
    config: CalendarConfig,
    week_start: WeekStart,
    show_holidays: bool,
    country: Option<String>,
    grid: GridEngine,
    editor: NoteEditor,
    color_picker: ColorPicker,
    title_font_picker: FontPicker,
    main_font_picker: FontPicker,
    colors: ColorScheme,
    fonts: FontSelection,
    store: CalendarStore,
    store_path: PathBuf,
    current_id: Option<String>,
    current_name: Option<String>,
    created_at: Option<String>,
    loaded_colors: Option<ColorScheme>,
    loaded_fonts: Option<FontSelection>,
    colors_overridden: bool,
    fonts_overridden: bool,
    autosave: Autosave,
    save_status: SaveStatus,
    toast: Option<(String, Instant)>,
    cursor: usize,
    ui_mode: UiMode,
    name_input: String,
    saved_selected: usize,
    font_selected: usize,
    render_needed: bool,
}

impl App {
    fn new(store_path: PathBuf) -> Self {
        let records = storage::load_saved_calendars(&store_path);
        let color_picker = ColorPicker::new();

        // The initial swatch pass applies its default combo, like the page
        // applying inline styles on load.
        let colors = color_picker
            .active_combo()
            .map(|combo| ColorScheme {
                bg: Some(combo.bg.clone()),
                text: Some(combo.text.clone()),
            })
            .unwrap_or_default();

        Self {
            config: CalendarConfig::current(),
            week_start: WeekStart::Sunday,
            show_holidays: false,
            country: Some("USA".to_string()),
            grid: GridEngine::new(),
            editor: NoteEditor::new(),
            color_picker,
            title_font_picker: FontPicker::new(FontCategory::SansSerif),
            main_font_picker: FontPicker::new(FontCategory::SansSerif),
            colors,
            fonts: FontSelection::default(),
            store: CalendarStore::new(records),
            store_path,
            current_id: None,
            current_name: None,
            created_at: None,
            loaded_colors: None,
            loaded_fonts: None,
            colors_overridden: false,
            fonts_overridden: false,
            autosave: Autosave::new(),
            save_status: SaveStatus::Saved,
            toast: None,
            cursor: 0,
            ui_mode: UiMode::Main,
            name_input: String::new(),
            saved_selected: 0,
            font_selected: 0,
            render_needed: true,
        }
    }

    /// The one re-layout entrypoint. Reassignment runs first; the edit
    /// affordances and the holiday overlay are rebuilt only after the cell
    /// assignment is complete, never interleaved with it.
    fn render_calendar(&mut self) {
        self.grid.reconcile(&self.config, self.week_start);
        self.editor.rebind(&self.grid);
        self.refresh_holidays();
        self.reapply_loaded_theme();
        self.cursor = self.cursor.min(self.grid.cell_count().saturating_sub(1));
        self.render_needed = true;
    }

    fn refresh_holidays(&mut self) {
        holidays::refresh(
            &mut self.grid,
            self.country.as_deref(),
            self.config.year,
            self.config.month_number(),
            self.show_holidays,
        );
    }

    fn show_toast(&mut self, message: String) {
        self.toast = Some((message, Instant::now()));
        self.render_needed = true;
    }

    fn font_picker(&self, target: FontTarget) -> &FontPicker {
        match target {
            FontTarget::Title => &self.title_font_picker,
            FontTarget::Main => &self.main_font_picker,
        }
    }

    fn font_picker_mut(&mut self, target: FontTarget) -> &mut FontPicker {
        match target {
            FontTarget::Title => &mut self.title_font_picker,
            FontTarget::Main => &mut self.main_font_picker,
        }
    }
}

pub fn run_ui(calendar_id: Option<&str>, config: Option<CalendarConfig>) -> Result<(), io::Error> {
    let mut app = App::new(storage::saved_calendars_path());
    if let Some(config) = config {
        app.config = config;
    }
    app.render_calendar();
    if let Some(id) = calendar_id {
        if let Err(e) = app.load_saved(id) {
            eprintln!("Warning: {}", e);
        }
    }
    app.cursor = app.grid.position_of_day(1).unwrap_or(0);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let poll_rate = Duration::from_millis(50);

    loop {
        if app.render_needed {
            terminal.draw(|f| app.draw_frame(f))?;
            app.render_needed = false;
        }

        if event::poll(poll_rate)?
            && let Event::Key(key) = event::read()?
            && app.handle_key(key)
        {
            break;
        }

        if app.autosave.poll(Instant::now()) {
            app.autosave_now();
        }

        let toast_expired = app
            .toast
            .as_ref()
            .is_some_and(|(_, shown_at)| shown_at.elapsed() >= Duration::from_millis(TOAST.visible_ms));
        if toast_expired {
            app.toast = None;
            app.render_needed = true;
        }
    }

    // Commit any open editor and flush a pending autosave before leaving.
    app.editor.outside_click(&mut app.grid);
    if app.autosave.pending() {
        app.autosave.cancel();
        app.autosave_now();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
