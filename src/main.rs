// vim: set ai et ts=4 sts=4 sw=4:
use std::io;
use std::process;
use log::{error, info, LevelFilter};
use thiserror::Error;

use griddlers::config::{SearchMode, SolverConfig};
use griddlers::puzzle::{self, LoadError, Puzzle};
use griddlers::ui::Rendering;
use griddlers::util::is_a_tty;

struct Args {
    puzzle_file: String,
    log_level: LevelFilter,
    brute_force: bool,
    unique: bool,
    max_depth: Option<usize>,
    max_nodes: Option<usize>,
    threads: Option<usize>,
    no_color: bool,
    subdivision: Option<usize>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("invalid value '{value}' for --{arg}: expected a non-negative integer")]
    BadNumber { arg: &'static str, value: String },
    #[error(transparent)]
    Load(#[from] LoadError),
}

fn clap_app<'a>() -> clap::App<'a, 'a> {
    clap::App::new("griddlers")
        .about("Solves multi-colour nonogram puzzles")
        .arg(clap::Arg::with_name("PUZZLE_FILE")
            .required(true)
            .help("YAML puzzle definition"))
        .arg(clap::Arg::with_name("debug")
            .short("d")
            .long("debug")
            .conflicts_with("quiet")
            .help("log every line solve"))
        .arg(clap::Arg::with_name("quiet")
            .short("q")
            .long("quiet")
            .help("only log warnings and errors"))
        .arg(clap::Arg::with_name("brute_force")
            .short("f")
            .long("brute-force")
            .help("search by trial and error when line logic stalls"))
        .arg(clap::Arg::with_name("unique")
            .long("unique")
            .help("keep searching after the first solution to check that it is the only one"))
        .arg(clap::Arg::with_name("max_depth")
            .long("max-depth")
            .takes_value(true)
            .value_name("N")
            .help("maximum number of nested guesses"))
        .arg(clap::Arg::with_name("max_nodes")
            .long("max-nodes")
            .takes_value(true)
            .value_name("N")
            .help("maximum number of search branches"))
        .arg(clap::Arg::with_name("threads")
            .long("threads")
            .takes_value(true)
            .value_name("N")
            .help("number of search threads"))
        .arg(clap::Arg::with_name("no_color")
            .long("no-color")
            .help("disable coloured output"))
        .arg(clap::Arg::with_name("subdivision")
            .long("subdivision")
            .takes_value(true)
            .value_name("N")
            .help("draw a separator every N squares (0 for none)"))
}

fn parse_count(matches: &clap::ArgMatches, arg: &'static str) -> Result<Option<usize>, CliError> {
    matches.value_of(arg)
           .map(|value| value.parse::<usize>()
                             .map_err(|_| CliError::BadNumber { arg, value: value.to_string() }))
           .transpose()
}

impl Args {
    fn from_arg_matches(matches: &clap::ArgMatches) -> Result<Self, CliError> {
        let log_level = match (matches.is_present("debug"), matches.is_present("quiet")) {
            (true, _)      => LevelFilter::Debug,
            (false, true)  => LevelFilter::Warn,
            (false, false) => LevelFilter::Info,
        };
        Ok(Args {
            puzzle_file: matches.value_of("PUZZLE_FILE").unwrap_or_default().to_string(),
            log_level,
            brute_force: matches.is_present("brute_force"),
            unique: matches.is_present("unique"),
            max_depth: parse_count(matches, "max_depth")?,
            max_nodes: parse_count(matches, "max_nodes")?,
            threads: parse_count(matches, "threads")?,
            no_color: matches.is_present("no_color"),
            subdivision: parse_count(matches, "subdivision")?,
        })
    }

    /// Command-line flags override whatever the puzzle file configured.
    fn apply_to(&self, mut config: SolverConfig) -> SolverConfig {
        if self.brute_force {
            config.search.enabled = true;
        }
        if self.unique {
            config.search.mode = SearchMode::VerifyUnique;
        }
        if let Some(max_depth) = self.max_depth {
            config.search.max_depth = max_depth;
        }
        if let Some(max_nodes) = self.max_nodes {
            config.search.max_nodes = max_nodes;
        }
        if let Some(threads) = self.threads {
            config.search.threads = threads.max(1);
        }
        config
    }
}

fn setup_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
}

fn run(args: &Args) -> Result<bool, CliError> {
    let doc = puzzle::load_document(&args.puzzle_file)?;
    let puzzle = Puzzle::from_yaml(&doc)?;
    let config = SolverConfig::default().merge_yaml(&doc["solver"])
                                        .map_err(LoadError::from)?;
    let config = args.apply_to(config);
    info!("Loaded {}x{} puzzle from {}", puzzle.width(), puzzle.height(), args.puzzle_file);

    let report = puzzle.solve(&config);

    let emit_color = !args.no_color && is_a_tty(&io::stdout());
    let subdivision = args.subdivision.or(Some(5));
    println!("{}", Rendering::new(&puzzle, &report.grid).with_subdivision(subdivision)
                                                        .with_color(emit_color));
    match report.unique {
        Some(true) => info!("Result: {} (unique)", report.status),
        _          => info!("Result: {}", report.status),
    }
    info!("Stats: {}", report.stats);
    Ok(report.status.is_solved())
}

fn main() {
    let matches = match clap_app().get_matches_safe() {
        Ok(matches) => matches,
        Err(e) => match e.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                process::exit(2);
            }
        },
    };
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e)   => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };
    if let Err(e) = setup_logger(args.log_level) {
        eprintln!("error: {}", e);
        process::exit(2);
    }
    match run(&args) {
        Ok(true)  => {}
        Ok(false) => process::exit(1),
        Err(e)    => {
            error!("{}", e);
            process::exit(2);
        }
    }
}
