// cstep: statement-stepping C subset interpreter

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use cstep::interpreter::{Error, Hooks, Interpreter, Options, StepState};
use cstep::parser::ast::{LineIndex, SourceLocation};

#[derive(Parser, Debug)]
#[command(name = "cstep", version)]
#[command(about = "Run a C subset program one statement at a time")]
struct Args {
    /// C source file to run
    file: PathBuf,

    /// Step statement by statement, showing the current line and frame
    #[arg(long)]
    trace: bool,

    /// How errors are reported
    #[arg(long, value_enum, default_value_t = ErrorFormat::Short)]
    error_format: ErrorFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorFormat {
    /// One line
    Short,
    /// Message, offending source line and a caret
    Long,
}

impl ErrorFormat {
    fn tag(self) -> &'static str {
        match self {
            ErrorFormat::Short => "short",
            ErrorFormat::Long => "long",
        }
    }

    fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("long") => ErrorFormat::Long,
            _ => ErrorFormat::Short,
        }
    }
}

/// Sends `print` output straight to stdout
struct Echo;

impl Hooks for Echo {
    fn on_print(&mut self, text: &str) {
        println!("{}", text);
    }
}

fn main() -> ExitCode {
    let log_level = std::env::var("CSTEP_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Error reading file '{}'", args.file.display()))?;
    let lines = LineIndex::new(&source);

    let options = Options {
        error_format: Some(args.error_format.tag().to_string()),
        ..Options::default()
    };

    let mut interp = match Interpreter::with_options(&source, options, Echo) {
        Ok(interp) => interp,
        Err(Error::Compile(err)) => bail!(format_error(
            args.error_format,
            &err.to_string(),
            Some(err.location()),
            &source,
            &lines,
        )),
        Err(err) => bail!(err),
    };
    info!(file = %args.file.display(), "program loaded");

    if args.trace {
        show_state(&interp, &source, &lines);
    }

    while !interp.is_done() {
        match interp.step() {
            Ok(state) => {
                if args.trace {
                    show_state(&interp, &source, &lines);
                }
                if state == StepState::Done {
                    break;
                }
            }
            Err(err) => {
                let location = interp.position().map(|span| lines.locate(span.start));
                bail!(format_error(
                    ErrorFormat::from_tag(interp.error_format()),
                    &format!("Runtime error: {}", err),
                    location,
                    &source,
                    &lines,
                ));
            }
        }
    }

    Ok(())
}

/// Current line, then the locals of the innermost frame
fn show_state<H: Hooks>(interp: &Interpreter<H>, source: &str, lines: &LineIndex) {
    match interp.position() {
        Some(span) => {
            let line = lines.locate(span.start).line;
            println!("{:>4} | {}", line, source_line(line, source, lines));
        }
        None => println!("     | <done>"),
    }

    let frame = interp.stack().current_frame();
    let vars: Vec<String> = frame
        .vars()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    println!("     = {}: {}", frame.function_name, vars.join(", "));
}

fn source_line<'a>(line: usize, source: &'a str, lines: &LineIndex) -> &'a str {
    lines
        .line_span(line, source)
        .and_then(|span| span.text(source))
        .unwrap_or("")
        .trim_end()
}

fn format_error(
    format: ErrorFormat,
    message: &str,
    location: Option<SourceLocation>,
    source: &str,
    lines: &LineIndex,
) -> String {
    let Some(location) = location.filter(|_| format == ErrorFormat::Long) else {
        return message.to_string();
    };

    let text = source_line(location.line, source, lines);
    let gutter = " ".repeat(location.line.to_string().len());
    format!(
        "{}\n{} |\n{} | {}\n{} | {}^",
        message,
        gutter,
        location.line,
        text,
        gutter,
        " ".repeat(location.column.saturating_sub(1))
    )
}
