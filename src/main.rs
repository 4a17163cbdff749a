use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use syntax_repl::accumulator::Mode;
use syntax_repl::cursor::DEFAULT_MAX_NESTING;
use syntax_repl::repl::{self, EditorSource, ReaderSource, ReplError, RunSummary};
use syntax_repl::session::{Session, SessionOptions};

#[derive(Parser)]
#[command(name = "syntax-repl")]
#[command(about = "Interactive parser shell for a C#-style command language")]
#[command(version)]
struct Cli {
    /// Source file to parse
    source: Option<PathBuf>,

    /// Parse a source string directly
    #[arg(short = 'e', long)]
    eval: Option<String>,

    /// Start in multi-line mode (a blank line ends each command)
    #[arg(short, long)]
    multi_line: bool,

    /// Neither load nor save line-editor history
    #[arg(long)]
    no_history: bool,

    /// Primary prompt
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// Deepest bracket, block or prefix-operator nesting a command may use
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mode = if cli.multi_line {
        Mode::MultiLine
    } else {
        Mode::SingleLine
    };
    let mut session = Session::new(SessionOptions {
        mode,
        prompt: cli.prompt.clone(),
        max_nesting: cli.max_nesting,
        ..SessionOptions::default()
    });
    session.set_reporter(|d| eprintln!("{}", d.render()));

    let mut out = io::stdout();
    let result = if let Some(source) = &cli.eval {
        repl::run(&mut session, &mut ReaderSource::new(source.as_bytes()), &mut out)
    } else if let Some(path) = &cli.source {
        match File::open(path) {
            Ok(file) => repl::run(
                &mut session,
                &mut ReaderSource::new(BufReader::new(file)),
                &mut out,
            ),
            Err(e) => {
                eprintln!("syntax-repl: cannot read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    } else if io::stdin().is_terminal() {
        run_interactive(&mut session, &cli)
    } else {
        repl::run(&mut session, &mut ReaderSource::new(io::stdin().lock()), &mut out)
    };

    match result {
        Ok(summary) => {
            log::debug!("{summary:?}");
            if summary.errors > 0 {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("syntax-repl: {e}");
            std::process::exit(1);
        }
    }
}

fn run_interactive(session: &mut Session, cli: &Cli) -> Result<RunSummary, ReplError> {
    println!(
        "syntax-repl {}, {} mode",
        env!("CARGO_PKG_VERSION"),
        session.mode()
    );
    println!("Type #help for session commands, #quit to leave.\n");

    let mut editor = EditorSource::new(!cli.no_history)?;
    repl::run(session, &mut editor, &mut io::stdout())
}
