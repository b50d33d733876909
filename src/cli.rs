use std::{io, path::PathBuf};

use clap::{CommandFactory, Parser, ValueEnum};
use itertools::Itertools;

use crate::{
    app,
    constants::DAYS_PER_WEEK,
    domain::{CalendarConfig, CalendarStore, SavedCalendarRecord, WeekStart},
    grid::{GridEngine, strip_markup},
    holidays, storage,
};

#[derive(Parser, Debug)]
#[command(name = "quickcal")]
#[command(about = "Customize, save, and print monthly calendars", long_about = None)]
pub enum Cli {
    #[command(about = "Open the calendar editor")]
    Open {
        #[arg(help = "Id of a saved calendar to load")]
        id: Option<String>,
    },

    #[command(about = "Open the editor on a specific month")]
    New {
        #[arg(long, help = "Month name, e.g. August")]
        month: String,

        #[arg(long, help = "Year, e.g. 2026")]
        year: i32,
    },

    #[command(about = "List saved calendars")]
    List,

    #[command(about = "Print a saved calendar as text")]
    Show {
        #[arg(help = "Id of the saved calendar")]
        id: String,
    },

    #[command(about = "Export saved calendars")]
    Export {
        #[arg(long, value_enum, help = "Export format")]
        format: ExportFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Delete a saved calendar")]
    Delete {
        #[arg(help = "Id of the saved calendar")]
        id: String,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

fn load_store() -> CalendarStore {
    CalendarStore::new(storage::load_saved_calendars(
        &storage::saved_calendars_path(),
    ))
}

pub fn list_calendars() -> Result<(), String> {
    let store = load_store();
    if store.is_empty() {
        println!("No saved calendars.");
        return Ok(());
    }

    for record in &store.records {
        println!(
            "{:15} {:28} {} {}  notes: {}  updated {}",
            record.id,
            record.name,
            record.month,
            record.year,
            record.notes.len(),
            record.updated_at
        );
    }
    Ok(())
}

pub fn show_calendar(id: &str) -> Result<(), String> {
    let store = load_store();
    let record = store.get(id).map_err(|e| e.to_string())?;
    print!("{}", render_record_text(record)?);
    Ok(())
}

/// Plain-text rendering of a saved calendar, the printable output of the
/// editor's grid.
pub fn render_record_text(record: &SavedCalendarRecord) -> Result<String, String> {
    let config = record
        .config()
        .ok_or_else(|| format!("Saved calendar has unknown month '{}'", record.month))?;
    let week_start = WeekStart::from_monday_flag(record.settings.start_on_monday);

    let mut grid = GridEngine::new();
    grid.reconcile(&config, week_start);
    for (day_key, html) in &record.notes {
        let Ok(day) = day_key.parse::<u32>() else {
            continue;
        };
        if let Some(cell) = grid.cell_for_day_mut(day) {
            cell.notes.push(html.clone());
        }
    }
    holidays::refresh(
        &mut grid,
        record.settings.country.as_deref(),
        config.year,
        config.month_number(),
        record.settings.show_holidays,
    );

    const CELL: usize = 8;
    let mut out = String::new();
    out.push_str(&format!("{}\n{}\n\n", record.name, config.title()));

    for label in grid.labels() {
        out.push_str(&format!("{:>width$}", label, width = CELL));
    }
    out.push('\n');

    for week in grid.cells().chunks(DAYS_PER_WEEK) {
        for cell in week {
            match cell.day {
                Some(day) => {
                    let marker = if !cell.notes.is_empty() {
                        "*"
                    } else if cell.holiday_visible {
                        "!"
                    } else {
                        ""
                    };
                    out.push_str(&format!(
                        "{:>width$}",
                        format!("{}{}", day, marker),
                        width = CELL
                    ));
                }
                None => out.push_str(&" ".repeat(CELL)),
            }
        }
        out.push('\n');
    }

    let noted_days: Vec<u32> = grid
        .cells()
        .iter()
        .filter(|cell| !cell.notes.is_empty())
        .filter_map(|cell| cell.day)
        .sorted()
        .collect();
    if !noted_days.is_empty() {
        out.push('\n');
        for day in noted_days {
            if let Some(cell) = grid.cell_for_day(day) {
                for note in &cell.notes {
                    out.push_str(&format!("  {:>2}* {}\n", day, strip_markup(note)));
                }
            }
        }
    }

    let holiday_days: Vec<u32> = grid
        .cells()
        .iter()
        .filter(|cell| cell.holiday_visible)
        .filter_map(|cell| cell.day)
        .sorted()
        .collect();
    if !holiday_days.is_empty() {
        out.push('\n');
        for day in holiday_days {
            if let Some(cell) = grid.cell_for_day(day) {
                out.push_str(&format!("  {:>2}! {}\n", day, cell.holiday.unwrap_or("")));
            }
        }
    }

    Ok(out)
}

pub fn export_data(format: ExportFormat, out_path: Option<PathBuf>) -> Result<(), String> {
    let store = load_store();

    let content = match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(&store.records).map_err(|e| e.to_string())?
        }
        ExportFormat::Csv => notes_csv(&store)?,
    };

    if let Some(path) = out_path {
        storage::write_text_file(&path, &content).map_err(|e| e.to_string())?;
        println!("Exported to {}", path.display());
    } else {
        print!("{}", content);
    }
    Ok(())
}

/// One CSV row per stored note, markup stripped.
pub fn notes_csv(store: &CalendarStore) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["calendar_id", "calendar_name", "month", "year", "day", "note"])
        .map_err(|e| e.to_string())?;

    for record in &store.records {
        let year = record.year.to_string();
        for (day, html) in &record.notes {
            let note = strip_markup(html);
            writer
                .write_record([
                    record.id.as_str(),
                    record.name.as_str(),
                    record.month.as_str(),
                    year.as_str(),
                    day.as_str(),
                    note.as_str(),
                ])
                .map_err(|e| e.to_string())?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub fn delete_calendar(id: &str) -> Result<(), String> {
    let mut store = load_store();
    let removed = store.delete(id).map_err(|e| e.to_string())?;
    storage::save_saved_calendars(&storage::saved_calendars_path(), &store.records)
        .map_err(|e| e.to_string())?;
    println!("Deleted \"{}\"", removed.name);
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    match shell {
        "bash" => {
            clap_complete::generate(
                Shell::Bash,
                &mut Cli::command(),
                "quickcal",
                &mut io::stdout(),
            );
        }
        "zsh" => {
            clap_complete::generate(
                Shell::Zsh,
                &mut Cli::command(),
                "quickcal",
                &mut io::stdout(),
            );
        }
        "fish" => {
            clap_complete::generate(
                Shell::Fish,
                &mut Cli::command(),
                "quickcal",
                &mut io::stdout(),
            );
        }
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    }
    Ok(())
}

pub fn run_cli() {
    let cli = Cli::parse();
    match cli {
        Cli::Open { id } => {
            if let Err(e) = app::run_ui(id.as_deref(), None) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Cli::New { month, year } => {
            let Some(config) = CalendarConfig::parse(&month, year) else {
                eprintln!("Error: unknown month '{}'", month);
                std::process::exit(1);
            };
            if let Err(e) = app::run_ui(None, Some(config)) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Cli::List => {
            if let Err(e) = list_calendars() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Cli::Show { id } => {
            if let Err(e) = show_calendar(&id) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Cli::Export { format, out } => {
            if let Err(e) = export_data(format, out) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Cli::Delete { id } => {
            if let Err(e) = delete_calendar(&id) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Cli::Completions { shell } => {
            if let Err(e) = print_completions(&shell) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
