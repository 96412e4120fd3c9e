use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossword_fill::{find_fill_with_options, render_grid, FillFailure, FillOptions, GridConfig, GridError, WordList, WordListError};
use log::{error, info, LevelFilter};
use thiserror::Error;

/// Fill a crossword grid with words from a word list.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Grid template, one row per line: `_` or `.` for fillable cells, anything else (e.g. `#`)
    /// for blocks.
    structure: PathBuf,

    /// Word list with one word per line.
    words: PathBuf,

    /// Where to write the filled grid as text, in addition to printing it.
    output: Option<PathBuf>,

    /// Give up after this many milliseconds of searching.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log progress of each solving stage.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Failed to read file {1}, more details: {0}")]
    FileReadingError(std::io::Error, String),
    #[error("Failed to write file {1}, more details: {0}")]
    FileWritingError(std::io::Error, String),
    #[error("Invalid grid structure: {0}")]
    Grid(#[from] GridError),
    #[error(transparent)]
    WordList(#[from] WordListError),
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level_filter)
        .parse_default_env()
        .init();
}

fn main() {
    let args = Args::parse();
    configure_logging(args.verbose);

    if let Err(e) = run(args) {
        error!("Execution failed, error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let template = fs::read_to_string(&args.structure)
        .map_err(|err| CliError::FileReadingError(err, args.structure.display().to_string()))?;
    let grid_config = GridConfig::from_template(&template)?;
    let word_list = WordList::from_path(&args.words)?;

    info!("Loaded {} slots and {} words", grid_config.slot_count(), word_list.len());

    let options = FillOptions { deadline: args.timeout_ms.map(Duration::from_millis) };

    let result = match find_fill_with_options(&grid_config, &word_list, &options) {
        Ok(result) => result,
        Err(FillFailure::Unsatisfiable) => {
            println!("No solution.");
            return Ok(());
        }
        Err(FillFailure::DeadlineExceeded) => {
            println!("No solution found within {} ms.", args.timeout_ms.unwrap_or_default());
            return Ok(());
        }
    };

    let display_grid = render_grid(&grid_config, &word_list, &result.choices);

    info!("{:?}", result.statistics);
    println!("{}", display_grid);

    if let Some(output) = &args.output {
        fs::write(output, display_grid + "\n")
            .map_err(|err| CliError::FileWritingError(err, output.display().to_string()))?;
        info!("Written filled grid to {}", output.display());
    }

    Ok(())
}
