pub mod util;
pub mod compiler;

use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use clap::Parser as ClapParser;
use crate::compiler::ast::Program;
use crate::compiler::codegen::{Generator, Severity};
use crate::compiler::evaluator::Evaluator;
use crate::compiler::evaluator::value::Value;
use crate::compiler::lexer::Lexer;
use crate::compiler::parser::Parser;

const PROMPT: &str = ">> ";

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(help = "Source file; starts an interactive session when omitted")]
    pub input: Option<PathBuf>,
    #[clap(short, long, help = "Emit MIPS assembly instead of evaluating")]
    pub compile: bool,
    #[clap(short, long, default_value = "out.s", help = "Assembly output file")]
    pub output: PathBuf,

    #[clap(short, long, help = "Print verbose log output")]
    pub verbose: bool,
}

pub fn run(config: Config) -> Result<(), std::io::Error> {
    match &config.input {
        Some(input) => run_file(input, &config),
        None => repl(std::io::stdin().lock(), std::io::stdout()),
    }
}

fn run_file(input: &Path, config: &Config) -> Result<(), std::io::Error> {
    let source = std::fs::read_to_string(input)?;
    let program = parse_source(&source, config.verbose)?;

    if config.compile {
        compile(&program, config)
    } else {
        evaluate(&program)
    }
}

fn parse_source(source: &str, verbose: bool) -> Result<Program, std::io::Error> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse();

    if parser.had_error() {
        for error in parser.errors() {
            eprintln!("{}", error);
        }

        return Err(std::io::Error::new(ErrorKind::InvalidData, "could not parse source"));
    }

    if verbose {
        eprintln!("{}", program);
    }

    Ok(program)
}

fn compile(program: &Program, config: &Config) -> Result<(), std::io::Error> {
    let mut generator = Generator::new();
    let asm = generator.generate(program);

    for diagnostic in generator.diagnostics() {
        match diagnostic.severity() {
            Severity::Error => eprintln!("Error: {}", diagnostic),
            Severity::Warning if config.verbose => eprintln!("Warning: {}", diagnostic),
            Severity::Warning => {},
        }
    }

    // Partial output is still written so it can be inspected
    std::fs::write(&config.output, asm)?;
    crate::log_debug!("Wrote assembly to {}", config.output.display());

    if generator.had_error() {
        return Err(std::io::Error::new(ErrorKind::InvalidData, "code generation failed"));
    }

    Ok(())
}

fn evaluate(program: &Program) -> Result<(), std::io::Error> {
    let mut evaluator = Evaluator::new(std::io::stdout().lock());

    match evaluator.eval(program) {
        Ok(Value::Null) => Ok(()),
        Ok(value) => writeln!(evaluator.output_mut(), "{}", value),
        Err(err) => {
            eprintln!("ERROR: {}", err);
            Err(std::io::Error::new(ErrorKind::InvalidData, "evaluation failed"))
        },
    }
}

/// Reads one line at a time, evaluating each against the same global scope, until `input`
/// is exhausted.
pub fn repl(mut input: impl BufRead, out: impl Write) -> Result<(), std::io::Error> {
    let mut evaluator = Evaluator::new(out);
    let mut line = String::new();

    loop {
        write!(evaluator.output_mut(), "{}", PROMPT)?;
        evaluator.output_mut().flush()?;

        line.clear();

        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        let mut parser = Parser::new(Lexer::new(&line));
        let program = parser.parse();

        if parser.had_error() {
            for error in parser.errors() {
                writeln!(evaluator.output_mut(), "\t{}", error)?;
            }

            continue;
        }

        evaluator.eval_and_print(&program)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_repl(input: &str) -> String {
        let mut out = Vec::new();
        repl(input.as_bytes(), &mut out).expect("writing to a Vec");
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    pub fn test_repl_keeps_bindings() {
        assert_eq!(">> null\n>> 42\n>> ERROR: identifier not found: foo\n>> ",
            run_repl("enchanted x = 2;\nx * 21\nfoo\n"));
    }

    #[test]
    pub fn test_repl_reports_parse_errors() {
        let output = run_repl("enchanted x 1\nSpeakNow(1)\n");

        assert!(output.starts_with(">> \t[line 1 column 13]"), "unexpected output: {:?}", output);
        assert!(output.ends_with(">> 1\nnull\n>> "), "unexpected output: {:?}", output);
    }

    #[test]
    pub fn test_config_flags() {
        let config = Config::parse_from(["eras", "song.tay", "-c", "-o", "song.s"]);

        assert_eq!(Some(PathBuf::from("song.tay")), config.input);
        assert!(config.compile);
        assert_eq!(PathBuf::from("song.s"), config.output);
        assert!(!config.verbose);

        let config = Config::parse_from(["eras"]);
        assert!(config.input.is_none());
        assert_eq!(PathBuf::from("out.s"), config.output);
    }
}
