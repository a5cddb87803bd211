// Entry point and console flow.
//
// - Option [1] reads every recommendation file and extracts its records.
//   Any bad file aborts the load and leaves nothing behind.
// - Option [2] orders and totals the loaded records, previews the tables
//   and writes the report files.
// - Option [3] runs the single-motor VFD calculator from the `[vfd]`
//   section of the configuration.
mod classify;
mod config;
mod error;
mod extract;
mod loader;
mod output;
mod plant;
mod render;
mod reports;
mod rules;
mod types;
mod util;
mod vfd;

use config::Config;
use error::Result;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use types::Record;

// Records survive between menu choices so a report can be recompiled
// without re-reading the input directory.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { records: None }));

struct AppState {
    records: Option<Vec<Record>>,
}

fn with_state<T>(f: impl FnOnce(&mut AppState) -> T) -> T {
    let mut guard = APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// Returns `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to return to the menu after compiling.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn output_path(cfg: &Config, suffix: &str) -> PathBuf {
    Path::new(&cfg.output.directory).join(format!("{}-{}", cfg.output.prefix, suffix))
}

fn load_records(cfg: &Config) -> Result<Vec<Record>> {
    let opts = cfg.extract_options()?;
    let (docs, load_report) =
        loader::load_documents(Path::new(&cfg.input.directory), &cfg.input.extension, cfg.delimiter())?;
    println!(
        "Reading recommendations... ({} files in {})",
        util::format_int(load_report.files_found),
        cfg.input.directory
    );
    if load_report.documents_without_table > 0 {
        warn!(
            count = load_report.documents_without_table,
            "documents without a summary table"
        );
    }
    extract::extract_all(&docs, &opts)
}

/// Handle option [1]: load and extract every recommendation.
fn handle_load(cfg: &Config) {
    match load_records(cfg) {
        Ok(records) => {
            let alternates = records.iter().filter(|r| r.is_alternate).count();
            println!(
                "Loaded {} recommendations ({} alternate).\n",
                util::format_int(records.len()),
                util::format_int(alternates)
            );
            with_state(|state| state.records = Some(records));
        }
        Err(e) => {
            with_state(|state| state.records = None);
            error!(error = %e, "load failed");
            eprintln!("Failed to load recommendations: {}\n", e);
        }
    }
}

fn compile_report(cfg: &Config, records: &[Record]) -> Result<()> {
    let symbol = cfg.parsing.currency_symbol.as_str();
    let report = reports::compile(records)?;
    let today = chrono::Local::now().date_naive();
    let plant_info = plant::build_plant_info(&cfg.plant, &cfg.utility, cfg.visit_date()?, today);

    let rows = render::recommendation_rows(&report, symbol);
    let summary_rows = render::summary_rows(&report, symbol);
    let summary = render::report_summary(&report, &plant_info);
    let placeholders = render::placeholders(&report, &plant_info, symbol);

    // Serialize everything before touching the output directory.
    let rows_file = output_path(cfg, "recommendations.csv");
    let files = vec![
        (rows_file.clone(), output::csv_bytes(&rows)?),
        (output_path(cfg, "summary.json"), output::json_bytes(&summary)?),
        (output_path(cfg, "placeholders.json"), output::json_bytes(&placeholders)?),
    ];
    std::fs::create_dir_all(&cfg.output.directory)?;
    output::write_all(&files)?;
    info!(records = report.record_count(), file = %rows_file.display(), "report written");

    let primary_len = report.primary.as_ref().map_or(0, |c| c.records.len());
    if report.has_primary() {
        output::preview_table("Recommendations", Some("Sorted by payback period"), &rows[..primary_len], 5);
    }
    if report.has_alternates() {
        output::preview_table("Additional Recommendations", None, &rows[primary_len..], 5);
    }
    output::preview_table("Totals", None, &summary_rows, 2);
    println!("(Full table exported to {})\n", rows_file.display());
    Ok(())
}

/// Handle option [2]: compile the loaded records into the report files.
fn handle_compile(cfg: &Config) {
    let Some(records) = with_state(|state| state.records.clone()) else {
        println!("Error: No recommendations loaded. Please load them first (option 1).\n");
        return;
    };
    println!("Compiling report...\n");
    if let Err(e) = compile_report(cfg, &records) {
        error!(error = %e, "compile failed");
        eprintln!("Failed to compile report: {}\n", e);
    }
}

/// Handle option [3]: run the VFD calculator.
fn handle_vfd(cfg: &Config) {
    let Some(input) = &cfg.vfd else {
        println!("Error: no [vfd] section in the configuration.\n");
        return;
    };
    let result = match vfd::calculate(input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("VFD calculation failed: {}\n", e);
            return;
        }
    };
    let rows = vfd::display_rows(&result, &cfg.parsing.currency_symbol);
    output::preview_table("VFD on Electric Motor", None, &rows, rows.len());
    let file = output_path(cfg, "vfd.json");
    if let Err(e) = std::fs::create_dir_all(&cfg.output.directory)
        .map_err(error::CompileError::from)
        .and_then(|_| output::write_json(&file, &result))
    {
        eprintln!("Write error: {}", e);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = if Path::new(&config_path).exists() {
        match Config::load(&config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to read {}: {}", config_path, e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!(path = %config_path, "configuration not found, using defaults");
        Config::default()
    };

    loop {
        println!("Select an option:");
        println!("[1] Load recommendations");
        println!("[2] Compile report");
        println!("[3] VFD calculator\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&cfg),
            "2" => {
                println!();
                handle_compile(&cfg);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_vfd(&cfg),
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    ExitCode::SUCCESS
}
