//! glox is a tree-walking interpreter for Lox, a small dynamically typed
//! scripting language with first-class functions, lexical closures and
//! single-inheritance classes. It takes Lox source text from a file or an
//! interactive prompt and executes it.
//!
//! ## Scanning
//! The first step is scanning: turning the source text into a flat list of
//! tokens. A token is a single unit of the language; the string `1 + 2`
//! becomes `[Number(1), Plus, Number(2)]`. The scanner lives in the
//! [`scanner`](scanner) module and walks the source byte by byte, ending
//! the stream with a synthetic EOF token so the parser can detect the end
//! of input uniformly. Trivial problems like an unterminated string or an
//! unexpected character are reported as a [`ScanError`](error::ScanError)
//! as soon as they are seen, and scanning carries on so several of them can
//! be reported at once.
//!
//! ## Parsing
//! The second step is parsing: turning the token list into an abstract
//! syntax tree. The [`parser`](parser) module holds a hand-written
//! recursive descent parser producing [`expressions`](expr::Expr), which
//! evaluate to an [`Object`](object::Object), and
//! [`statements`](stmt::Stmt), which act through side effects like
//! printing or declaring a variable. A syntax error becomes a
//! [`ParseError`](error::ParseError); the parser then synchronizes to the
//! next statement boundary and keeps going.
//!
//! ## Resolving
//! The third step is resolving. The [`resolver`](resolver) module walks
//! the finished tree once before execution and computes, for every
//! variable reference, how many scopes out its binding lives, so that
//! closures keep seeing the binding they closed over no matter what
//! shadows it later. The same pass rejects code that is syntactically
//! valid but semantically meaningless, like `return` at the top level or a
//! class inheriting from itself, reporting a
//! [`ResolveError`](error::ResolveError).
//!
//! ## Interpreting
//! The final step is interpreting. The [`interpreter`](interpreter) module
//! executes the tree directly: statements run for their effects and
//! expressions evaluate to values. Scopes are chains of
//! [`Environment`](environment::Environment)s, functions capture the
//! environment where they were defined, and classes bundle methods with an
//! optional superclass. Errors that only show up while running, like
//! adding a string to a number, are reported as a
//! [`RuntimeError`](error::RuntimeError).

use std::io::Write;
use std::{fs, process};

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The driver tying the pipeline together. It owns the long-lived
/// interpreter, so in prompt mode global state persists across inputs.
/// Print output goes to the writer handed to [`new`](glox::new); the
/// binary passes stdout and tests pass a buffer.
#[allow(non_camel_case_types)]
pub struct glox<'a> {
    interpreter: interpreter::Interpreter<'a>,
}

impl<'a> glox<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        glox {
            interpreter: interpreter::Interpreter::new(output),
        }
    }

    /// Runs a script from a file and exits the process on failure:
    /// 74 if the file cannot be read, 70 for a runtime error and 65 for
    /// any error caught before execution.
    pub fn run_file(&mut self, path: String) {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => {
                eprintln!("Could not read '{path}': {error}");
                process::exit(74);
            },
        };

        self.run(contents);

        if error::did_runtime_error() {
            process::exit(70);
        }
        if error::did_error() {
            process::exit(65);
        }
    }

    /// Runs an interactive prompt until end of input. Each line goes
    /// through the whole pipeline against the same interpreter, and the
    /// error flags are reset between lines so a mistake does not end the
    /// session. Line history is kept in the user's home directory.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("line editor to be available");

        let history = home::home_dir().map(|dir| dir.join(".glox_history"));
        if let Some(history) = &history {
            // A missing history file is fine on the first run.
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    self.run(line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("{error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }

    /// Runs a chunk of source through scanner, parser, resolver and
    /// interpreter, stopping at the first stage that reported an error.
    fn run(&mut self, source: String) {
        let mut scanner = Scanner::new(&source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
