//! Command-line front end: parse a JSON token list with a JSON grammar.
//!
//! ```text
//! llk grammar.json tokens.json          # print the tree
//! llk --trace grammar.json tokens.json  # print the execution trace
//! ```
use facet::Facet;
use llk::{parse_grammar, Parser, Token};
use std::process::ExitCode;

#[derive(Facet, Debug)]
struct Args {
    /// Path to the grammar definition.
    #[facet(positional)]
    grammar: String,

    /// Path to a JSON array of tokens.
    #[facet(positional)]
    tokens: String,

    /// Print trace records instead of the tree.
    #[facet(named, short = 't')]
    trace: bool,

    /// Log progress to stderr.
    #[facet(named, short = 'v')]
    verbose: bool,
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn run(args: &Args) -> Result<(), String> {
    let source = std::fs::read_to_string(&args.grammar)
        .map_err(|e| format!("cannot read {}: {e}", args.grammar))?;
    let grammar = parse_grammar(&source).map_err(|e| format!("{}: {e}", args.grammar))?;

    let source = std::fs::read_to_string(&args.tokens)
        .map_err(|e| format!("cannot read {}: {e}", args.tokens))?;
    let tokens: Vec<Token> =
        facet_json::from_str(&source).map_err(|e| format!("{}: {e}", args.tokens))?;
    log::info!("{} rules, {} tokens", grammar.len(), tokens.len());

    let parser = Parser::new(grammar);
    if args.trace {
        let trace = parser.trace(tokens).map_err(|e| e.to_string())?;
        for record in &trace {
            println!("{}", record.display(parser.grammar()));
        }
    } else {
        let tree = parser.parse(tokens).map_err(|e| e.to_string())?;
        println!("{tree}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Args = match facet_args::from_std_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
