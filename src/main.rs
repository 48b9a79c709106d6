use std::fs::File;
use std::io::Write;
use std::ops::Deref;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rlox::ast_printer::AstPrinter;
use rlox::interpreter::Interpreter;
use rlox::parser::{Expr, Parser, Stmt};
use rlox::resolver::{Locals, Resolver};
use rlox::scanner::Scanner;
use rlox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print each token as a JSON object instead of the text form
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// Source bytes for one invocation: a memory-mapped file, or nothing at
/// all (mapping a zero-length file fails on Linux, and an empty program
/// is still a valid program).
enum Source {
    Mapped(Mmap),
    Empty,
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Mapped(mmap) => mmap,
            Source::Empty => &[],
        }
    }
}

/// Memory-maps the source file and validates it as UTF-8 up front, so the
/// scanner can treat the bytes as ASCII-compatible without re-checking.
fn read_file(filename: PathBuf) -> Result<Source> {
    info!("Mapping file: {:?}", filename);

    let file: File =
        File::open(&filename).context(format!("Failed to open file {:?}", filename))?;

    if file.metadata()?.len() == 0 {
        info!("File {:?} is empty", filename);
        return Ok(Source::Empty);
    }

    // Safety: read-only mapping; the file is not expected to change underneath.
    let mmap: Mmap =
        unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    std::str::from_utf8(&mmap).context(format!("File {:?} is not valid UTF-8", filename))?;

    info!("Mapped {} bytes from {:?}", mmap.len(), filename);

    Ok(Source::Mapped(mmap))
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file: File = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with timestamp, module path and
    // source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'rlox::' from module path
            let module: &str = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rlox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{} {}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Scan the whole buffer, or exit 65 on the first lexical error.
fn scan_or_exit(src: &[u8]) -> Vec<Token<'_>> {
    let scanner: Scanner<'_> = Scanner::new(src);
    let mut tokens: Vec<Token<'_>> = Vec::new();

    for token in scanner {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);
                tokens.push(token);
            }

            Err(e) => {
                debug!("Lex debug: {}", e);
                eprintln!("{}", e);
                std::process::exit(65);
            }
        }
    }

    tokens
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf: Source = read_file(filename)?;
                let scanner: Scanner<'_> = Scanner::new(&buf);
                let mut tokenized: bool = true;

                for token in scanner {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            if json {
                                println!("{}", serde_json::to_string(&token)?);
                            } else {
                                println!("{}", token);
                            }
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization debug: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let buf: Source = read_file(filename)?;
                let tokens: Vec<Token<'_>> = scan_or_exit(&buf);
                let mut parser: Parser<'_> = Parser::new(&tokens);

                match parser.parse_expression() {
                    Ok(expr) => {
                        info!("Expression parsed successfully");
                        let ast_str: String = AstPrinter::print(&expr);

                        debug!("AST: {}", ast_str);
                        println!("{}", ast_str);
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let buf: Source = read_file(filename)?;
                let tokens: Vec<Token<'_>> = scan_or_exit(&buf);
                let mut parser: Parser<'_> = Parser::new(&tokens);

                let expr: Expr<'_> = match parser.parse_expression() {
                    Ok(expr) => expr,

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Expression parsed successfully");

                let mut interpreter: Interpreter<'_> = Interpreter::new();

                match interpreter.evaluate(&expr) {
                    Ok(value) => {
                        debug!("Evaluated to: {}", value);
                        println!("{}", value);
                    }

                    Err(e) => {
                        debug!("Evaluation debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => {
                info!("No filepath provided for Evaluate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let buf: Source = read_file(filename)?;
                let tokens: Vec<Token<'_>> = scan_or_exit(&buf);

                info!("Scanned {} tokens", tokens.len());

                let mut parser: Parser<'_> = Parser::new(&tokens);

                let statements: Vec<Stmt<'_>> = match parser.parse() {
                    Ok(statements) => statements,

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Parsed {} statements", statements.len());

                let locals: Locals = match Resolver::new().resolve(&statements) {
                    Ok(locals) => locals,

                    Err(e) => {
                        debug!("Resolve debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Resolved {} local binding(s)", locals.len());

                let mut interpreter: Interpreter<'_> = Interpreter::new();

                match interpreter.interpret(&statements, locals) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
