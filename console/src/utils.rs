use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    BufWriter,
    Read,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use clap::{
    ArgAction,
    Args,
};
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use log::LevelFilter;

/// Path standing for stdin.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Path {0} does not exist")]
    MissingPath(PathBuf),
    #[error("Path {0} is not a file")]
    NotAFile(PathBuf),
    #[error("Directory of {0} does not exist")]
    MissingParent(PathBuf),
    #[error("Could not open {0}: {1}")]
    CantOpenFile(PathBuf, #[source] std::io::Error),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace). \
                Ignored when RUST_LOG is set."
    )]
    pub verbose:  u8,
    #[arg(
        long,
        default_value_t = false,
        global = true,
        help = "Display a progress bar while reading input."
    )]
    pub progress: bool,
}

impl UtilsArgs {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn setup(&self) -> anyhow::Result<()> {
        if std::env::var_os("RUST_LOG").is_some() {
            pretty_env_logger::try_init()?;
        }
        else {
            pretty_env_logger::formatted_builder()
                .filter_level(self.log_level())
                .try_init()?;
        }
        Ok(())
    }
}

pub fn init_pbar(total: u64) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(total);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}, ETA: {eta}] [{bar:40.cyan/blue}] {bytes:>8.green}/{total_bytes:8} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Reading...");
    Ok(progress_bar)
}

pub fn validate_input(path: &Path) -> Result<&Path, CliError> {
    if !path.exists() {
        return Err(CliError::MissingPath(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CliError::NotAFile(path.to_path_buf()));
    }
    Ok(path)
}

pub fn validate_output(path: &Path) -> Result<&Path, CliError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            Err(CliError::MissingParent(path.to_path_buf()))
        },
        _ => Ok(path),
    }
}

pub fn is_stdin(path: &Path) -> bool { path.as_os_str() == STDIN_PATH }

/// Opens `path` (or stdin for `-`). With `--progress` a file is read
/// through a byte progress bar.
pub fn open_input(
    path: &Path,
    utils: &UtilsArgs,
) -> anyhow::Result<Box<dyn BufRead>> {
    if is_stdin(path) {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(validate_input(path)?)
        .map_err(|e| CliError::CantOpenFile(path.to_path_buf(), e))?;
    let reader: Box<dyn Read> = if utils.progress {
        let progress_bar = init_pbar(file.metadata()?.len())?;
        Box::new(progress_bar.wrap_read(file))
    }
    else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Creates `path`, or returns stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(validate_output(path)?)
                .map_err(|e| CliError::CantOpenFile(path.to_path_buf(), e))?;
            Ok(Box::new(BufWriter::new(file)))
        },
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}
