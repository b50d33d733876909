mod app;
mod cli;
mod constants;
mod domain;
mod grid;
mod holidays;
mod storage;

fn main() {
    // No arguments opens the editor directly; anything else is a subcommand.
    if std::env::args().len() <= 1 {
        if let Err(e) = app::run_ui(None, None) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    } else {
        cli::run_cli();
    }
}
