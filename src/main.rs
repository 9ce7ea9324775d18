use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use rustyline::{error::ReadlineError, history::History, DefaultEditor};
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};
use walox::interpreter::context::StdioContext;
use walox::interpreter::TreeWalkInterpreter;
use walox::parser::statement::Statement;

/// Data error: the source could not be tokenized or parsed.
const EXIT_COMPILE_ERROR: u8 = 65;
/// Software error: the program failed while running.
const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(Debug, Parser)]
#[clap(name = "walox", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: WaloxCommand,
}

#[derive(Debug, Subcommand)]
pub enum WaloxCommand {
    /// Print every token in a file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the syntax tree of a file.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ProgramFormat,
    },
    /// Run a script.
    Run {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ErrorFormat,
    },
    /// Start an interactive session.
    Repl,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();

    let args = CLArgs::parse();
    let succeeded = match args.routine {
        WaloxCommand::Tokenize { path, format } => {
            tracing::debug!(?path, "tokenizing");
            let src = read_to_string(&path)?;
            tokenize(&src, &format).then_some(ExitCode::SUCCESS)
        }
        WaloxCommand::Parse { path, format } => {
            tracing::debug!(?path, "parsing");
            let src = read_to_string(&path)?;
            parse(&src, &format).then_some(ExitCode::SUCCESS)
        }
        WaloxCommand::Run { path, format } => {
            tracing::debug!(?path, "running");
            let src = read_to_string(&path)?;
            Some(run(&src, &path, &format))
        }
        WaloxCommand::Repl => {
            repl()?;
            Some(ExitCode::SUCCESS)
        }
    };
    Ok(succeeded.unwrap_or(ExitCode::from(EXIT_COMPILE_ERROR)))
}

/// Logging is off unless `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use walox::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use walox::lexer::{Lexer, TokenKind};

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return succeeded;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        };
    }
}

fn parse(src: &str, format: &ProgramFormat) -> bool {
    use walox::parser::formatter::{DebugProgramFormatter, ProgramFormatter, SExpressionFormatter};

    let formatter: Box<dyn ProgramFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugProgramFormatter),
        ProgramFormat::SExpr => Box::new(SExpressionFormatter),
    };
    match walox::parser::Parser::new(src).parse() {
        Ok(program) => {
            println!("{}", formatter.format(&program));
            true
        }
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{}", formatter.format_error(error));
            }
            false
        }
    }
}

fn run(src: &str, path: &Path, format: &ErrorFormat) -> ExitCode {
    use walox::parser::formatter::{PrettyProgramFormatter, ProgramFormatter, SExpressionFormatter};
    use walox::value::formatter::{BasicFormatter, PrettyFormatter, ValueFormatter};

    let (program_formatter, value_formatter): (Box<dyn ProgramFormatter>, Box<dyn ValueFormatter>) =
        match format {
            ErrorFormat::Basic => (Box::new(SExpressionFormatter), Box::new(BasicFormatter)),
            ErrorFormat::Pretty => (
                Box::new(PrettyProgramFormatter::new(src, path)),
                Box::new(PrettyFormatter::new(src, path)),
            ),
        };

    let program = match walox::parser::Parser::new(src).parse() {
        Ok(program) => program,
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{}", program_formatter.format_error(error));
            }
            return ExitCode::from(EXIT_COMPILE_ERROR);
        }
    };

    let mut context = StdioContext;
    let mut interpreter = TreeWalkInterpreter::new(&mut context);
    match interpreter.run(&program) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(code = error.code(), category = %error.category(), "runtime error");
            eprintln!("{}", value_formatter.format_error(&error));
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

/// Read lines until every opened brace is closed.
fn repl() -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut context = StdioContext;
    let mut interpreter = TreeWalkInterpreter::new(&mut context);
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "> " } else { "| " };
        match rl.readline(prompt) {
            Ok(line) => {
                buffer.push_str(&line);
                buffer.push('\n');
                if !is_complete(&buffer) {
                    continue;
                }
                if !buffer.trim().is_empty() {
                    record_history(rl.history_mut(), buffer.trim());
                    evaluate_line(&mut interpreter, &buffer);
                }
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

fn record_history(history: &mut impl History, entry: &str) {
    if let Err(error) = history.add(entry) {
        tracing::warn!(%error, "failed to record history entry");
    }
}

fn evaluate_line(interpreter: &mut TreeWalkInterpreter<'_>, src: &str) {
    let program = match walox::parser::Parser::new(src).parse() {
        Ok(program) => program,
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{error}");
            }
            return;
        }
    };
    match interpreter.run(&program) {
        Ok(()) => {
            if matches!(program.last(), Some(Statement::Expression(_))) {
                println!("{}", interpreter.result());
            }
        }
        Err(error) => eprintln!("{error}"),
    }
}

fn is_complete(src: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_string = !in_string,
            '/' if !in_string && chars.peek() == Some(&'/') => {
                while chars.next_if(|c| *c != '\n').is_some() {}
            }
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::MemHistory;

    #[test]
    fn history_records_entries() {
        let mut history = MemHistory::new();
        record_history(&mut history, "print 1;");
        record_history(&mut history, "var a = 2;");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn braces_decide_completeness() {
        assert!(is_complete("print 1;\n"));
        assert!(!is_complete("fun f() {\n"));
        assert!(is_complete("fun f() {\n}\n"));
        assert!(is_complete("print \"{\";\n"));
        assert!(is_complete("// {\n"));
    }
}
