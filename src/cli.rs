use clap::{ArgAction, Parser};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="dehost",
          version=&**FULL_VERSION,
          about="Compares human-read filtering tools on paired-end samples",
          long_about = None,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}",
          )]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "samples")]
    #[clap(help = "Tab-separated sample manifest: name, R1 path, R2 path")]
    #[clap(value_name = "SAMPLES")]
    #[arg(value_parser = check_file_exists)]
    pub samples_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "tools")]
    #[clap(help = "File listing the tools to compare, one name per line")]
    #[clap(value_name = "TOOLS")]
    #[arg(value_parser = check_file_exists)]
    pub tools_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "out-dir")]
    #[clap(help = "Directory that receives the filtered FASTQ files and the result table")]
    #[clap(value_name = "OUT_DIR")]
    #[arg(value_parser = check_dir_exists)]
    pub out_dir: PathBuf,

    #[clap(short = 'p')]
    #[clap(long = "tool-params")]
    #[clap(help = "JSON file with per-tool parameters (defaults to ./parameters.json when present)")]
    #[clap(value_name = "PARAMS")]
    #[arg(value_parser = check_file_exists)]
    pub tool_params_path: Option<PathBuf>,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Name of the result table, created inside the output directory")]
    #[clap(value_name = "OUTPUT")]
    #[clap(default_value = "result.dat")]
    pub output_name: String,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_file_exists(s: &str) -> std::result::Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_dir_exists(s: &str) -> std::result::Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.is_dir() {
        Err(format!("Directory does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}
