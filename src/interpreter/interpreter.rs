use crate::environment::{EnvRef, Environment};
use crate::evaluator::eval_program;
use crate::lexer::Lexer;
use crate::object::Value;
use crate::parser::Parser;

/// The embedding-facing facade: lex, parse, and evaluate a whole source
/// string in one call, or against a caller-supplied environment so a host
/// (such as the REPL) can keep bindings alive across calls.
pub struct Interpreter;

impl Interpreter {
    /// Evaluates `source` in a fresh, empty environment.
    pub fn evaluate(source: &str) -> Result<Value, Vec<String>> {
        Self::evaluate_in(source, &Environment::new())
    }

    /// A fresh top-level environment, exposed so a host can reuse it across
    /// several calls to `evaluate_in` (the REPL does exactly this).
    pub fn new_environment() -> EnvRef {
        Environment::new()
    }

    /// Evaluates `source` against `env`. Returns the parser's error list
    /// rather than evaluating when the source doesn't parse cleanly — the
    /// evaluator has no use for a malformed AST.
    pub fn evaluate_in(source: &str, env: &EnvRef) -> Result<Value, Vec<String>> {
        let lexer = Lexer::new(source);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();

        let errors = parser.errors();
        if !errors.is_empty() {
            return Err(errors.to_vec());
        }

        Ok(eval_program(&program.statements, env))
    }
}
