//! FocusBoard command-line entry point.
//!
//! # Responsibility
//! - Resolve `CoreConfig`, open the configured database and print a board
//!   summary.
//! - Optionally seed a board with the default lists before printing.

use clap::Parser;
use focusboard_core::db::open_db;
use focusboard_core::{init_logging, CoreConfig, KanbanService, SqliteDocumentStore};
use log::info;
use std::path::Path;
use std::process::ExitCode;

/// Prints every board with its lists, card counts and spent hours.
#[derive(Debug, Parser)]
#[command(name = "focusboard", version)]
struct Cli {
    /// Create a board with the default lists before printing.
    #[arg(long, value_name = "BOARD NAME")]
    seed: Option<String>,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("focusboard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let seed_name = cli.seed;
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;

    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
        init_logging(config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let store = SqliteDocumentStore::try_new(&conn).map_err(|err| err.to_string())?;
    let mut service = KanbanService::open(store).map_err(|err| err.to_string())?;
    info!(
        "event=cli_run module=cli status=ok db_path={} seed={}",
        config.db_path.display(),
        seed_name.is_some()
    );

    if let Some(name) = seed_name {
        let board = service
            .create_board(name, "")
            .map_err(|err| err.to_string())?;
        let report = service.flush();
        if !report.is_clean() {
            for failure in report.failures() {
                if let Err(err) = &failure.result {
                    eprintln!("focusboard: write to `{}` failed: {err}", failure.collection);
                }
            }
            return Err(format!("seeding board `{}` did not persist cleanly", board.name));
        }
        println!("seeded board {} ({})", board.name, board.id);
    }

    print_summary(&service, &config.db_path);
    Ok(())
}

fn print_summary(service: &KanbanService<SqliteDocumentStore<'_>>, db_path: &Path) {
    let view = service.view();
    let boards = view.boards_by_name();
    if boards.is_empty() {
        println!("no boards in {}", db_path.display());
        return;
    }

    for board in boards {
        println!("{} spent={:.2}h", board.name, board.spent_hours);
        for list in view.board_lists(board.id) {
            let focus = if board.focused_list_id == Some(list.id) {
                " *"
            } else {
                ""
            };
            println!("  {}{} cards={}", list.title, focus, list.card_order.len());
        }
    }
}
