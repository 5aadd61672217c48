use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use tracing::debug;

use goin_interpreter::{Environment, Evaluator};
use goin_parser::{lexer::Lexer, parser::Parser};

use crate::config::ReplConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// An interactive session. Bindings made by one line are visible to the next.
pub struct Repl {
    env: Rc<RefCell<Environment>>,
    max_call_depth: usize,
}

impl Repl {
    pub fn new(config: &ReplConfig) -> Self {
        Repl {
            env: Rc::new(RefCell::new(Environment::new())),
            max_call_depth: config.max_call_depth,
        }
    }

    /// Run one line of input and return the text to show for it.
    pub fn eval_line(&mut self, line: &str) -> String {
        let l = Lexer::new(line);
        let mut p = Parser::new(l);
        let prog = p.parse_program();

        // Never evaluate a program that did not fully parse
        if !p.errors().is_empty() {
            debug!(count = p.errors().len(), "skipping evaluation, parser errors");

            let mut output = String::from("parser errors:");
            for error in p.errors() {
                output.push_str("\n\t");
                output.push_str(&error.to_string());
            }
            return output;
        }

        Evaluator::new_with_env(Rc::clone(&self.env))
            .with_max_call_depth(self.max_call_depth)
            .eval(&prog)
            .inspect()
    }
}

pub fn repl(config: ReplConfig) -> Result<(), ReadlineError> {
    println!("goin language v{}", VERSION);

    let mut session = Repl::new(&config);

    let editor_config = Config::builder()
        .max_history_size(config.history_size)
        .build();

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::with_config(editor_config);
    loop {
        let readline = rl.readline(&config.prompt);
        match readline {
            Ok(line) => {
                if line.trim() == "exit" || line.trim() == "quit" {
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                println!("{}", session.eval_line(&line));
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::config::ReplConfig;
    use crate::repl::Repl;

    #[test]
    fn prints_values() {
        let mut repl = Repl::new(&ReplConfig::default());

        let tests = vec![
            ("5", "5"),
            ("-1 + 2 * 3", "5"),
            ("!0", "false"),
            ("1 < 2", "true"),
            ("let x = 1;", "null"),
            ("fn(a, b) { a + b }", "fn(a, b) { (a + b) }"),
        ];

        for (input, expected) in tests {
            assert_eq!(repl.eval_line(input), expected);
        }
    }

    #[test]
    fn bindings_persist_across_lines() {
        let mut repl = Repl::new(&ReplConfig::default());

        assert_eq!(repl.eval_line("let add = fn(a, b) { a + b };"), "null");
        assert_eq!(repl.eval_line("let x = 10;"), "null");
        assert_eq!(repl.eval_line("add(x, 5)"), "15");
    }

    #[test]
    fn errors_do_not_end_session() {
        let mut repl = Repl::new(&ReplConfig::default());

        assert_eq!(repl.eval_line("let x = 2;"), "null");
        assert_eq!(
            repl.eval_line("x + true; x"),
            "ERROR: type mismatch: INTEGER + BOOLEAN"
        );
        assert_eq!(repl.eval_line("y"), "ERROR: identifier not found: y");
        assert_eq!(repl.eval_line("x * 3"), "6");
    }

    #[test]
    fn prints_parser_errors_indented() {
        let mut repl = Repl::new(&ReplConfig::default());

        assert_eq!(
            repl.eval_line("let x 5; let = 1;"),
            "parser errors:\n\
             \texpected next token to be =, got INT instead (at 1:7)\n\
             \texpected next token to be IDENT, got = instead (at 1:14)"
        );

        // Nothing from the broken line was evaluated
        assert_eq!(repl.eval_line("x"), "ERROR: identifier not found: x");
    }

    #[test]
    fn uses_configured_call_depth() {
        let config = ReplConfig {
            max_call_depth: 10,
            ..ReplConfig::default()
        };
        let mut repl = Repl::new(&config);

        assert_eq!(repl.eval_line("let f = fn(n) { f(n + 1) };"), "null");
        assert_eq!(
            repl.eval_line("f(0)"),
            "ERROR: maximum call depth of 10 exceeded"
        );
    }
}
