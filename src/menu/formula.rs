//! Deferred numeric formulas used for ring centres and radii.
//!
//! A formula is a Rhai expression compiled once when configuration loads and
//! evaluated every time a ring opens, because it may depend on the live
//! screen size or the player's position. Conditionals use Rhai's `if`
//! expression: `player_y - if in_airship { 3 } else { 1 }`.

use rhai::{Dynamic, Engine, Scope, AST};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Variables a formula may reference.
pub const VARIABLES: [&str; 5] = [
    "screen_width",
    "screen_height",
    "player_x",
    "player_y",
    "in_airship",
];

thread_local! {
    static ENGINE: Engine = formula_engine();
}

fn formula_engine() -> Engine {
    let mut engine = Engine::new();
    engine.set_strict_variables(true);
    engine.set_max_expr_depths(32, 32);
    engine
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("cannot compile formula: {0}")]
    Compile(String),
    #[error("cannot evaluate formula: {0}")]
    Eval(String),
    #[error("formula produced {0}, expected a number")]
    NotANumber(String),
}

/// Values bound to formula variables at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FormulaContext {
    pub screen_width: f64,
    pub screen_height: f64,
    pub player_x: f64,
    pub player_y: f64,
    pub in_airship: bool,
}

impl FormulaContext {
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        Self {
            screen_width,
            screen_height,
            player_x: screen_width / 2.0,
            player_y: screen_height / 2.0,
            in_airship: false,
        }
    }

    pub fn with_player(mut self, x: f64, y: f64, in_airship: bool) -> Self {
        self.player_x = x;
        self.player_y = y;
        self.in_airship = in_airship;
        self
    }

    fn scope(&self) -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push_constant("screen_width", self.screen_width);
        scope.push_constant("screen_height", self.screen_height);
        scope.push_constant("player_x", self.player_x);
        scope.push_constant("player_y", self.player_y);
        scope.push_constant("in_airship", self.in_airship);
        scope
    }
}

/// A compiled formula. Serialises back to its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formula {
    source: String,
    ast: AST,
}

impl Formula {
    /// Compiles `source`. Variables outside [`VARIABLES`] are rejected here
    /// rather than when the ring opens.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let source = source.trim();
        let scope = FormulaContext::default().scope();
        let ast = ENGINE
            .with(|engine| engine.compile_expression_with_scope(&scope, source))
            .map_err(|err| FormulaError::Compile(err.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Integer results are widened, so `screen_width / 4` and `32` both work.
    pub fn eval(&self, context: &FormulaContext) -> Result<f64, FormulaError> {
        let mut scope = context.scope();
        let value = ENGINE
            .with(|engine| engine.eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast))
            .map_err(|err| FormulaError::Eval(err.to_string()))?;
        to_number(value)
    }
}

fn to_number(value: Dynamic) -> Result<f64, FormulaError> {
    if let Ok(float) = value.as_float() {
        return Ok(float);
    }
    match value.as_int() {
        Ok(int) => Ok(int as f64),
        Err(type_name) => Err(FormulaError::NotANumber(type_name.to_string())),
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Formula {
    type Error = FormulaError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Formula::parse(&source)
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> Self {
        formula.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> FormulaContext {
        FormulaContext::new(80.0, 24.0).with_player(40.0, 12.0, false)
    }

    fn eval_str(source: &str) -> f64 {
        Formula::parse(source)
            .expect("formula parses")
            .eval(&context())
            .expect("formula evaluates")
    }

    #[test]
    fn arithmetic_over_screen_values() {
        assert_eq!(eval_str("1 + 2 * 3"), 7.0);
        assert_eq!(eval_str("(1 + 2) * 3"), 9.0);
        assert_eq!(eval_str("screen_width / 10"), 8.0);
        assert_eq!(eval_str("-player_y + 2"), -10.0);
        assert_eq!(eval_str("10 / 4.0"), 2.5);
        assert_eq!(eval_str("  32 "), 32.0);
    }

    #[test]
    fn conditional_follows_airship_flag() {
        let source = "player_y - if in_airship { 3 } else { 1 }";
        assert_eq!(eval_str(source), 11.0);
        let airship = FormulaContext::new(80.0, 24.0).with_player(40.0, 12.0, true);
        let formula = Formula::parse(source).expect("parse");
        assert_eq!(formula.eval(&airship), Ok(9.0));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(Formula::parse("2 *"), Err(FormulaError::Compile(_))));
        assert!(matches!(Formula::parse("(2 + 3"), Err(FormulaError::Compile(_))));
        assert!(matches!(
            Formula::parse("gamePlayer * 2"),
            Err(FormulaError::Compile(_))
        ));
    }

    #[test]
    fn every_variable_is_bound() {
        for name in VARIABLES {
            assert!(Formula::parse(name).is_ok(), "{} is not bound", name);
        }
    }

    #[test]
    fn non_numeric_result_is_an_error() {
        let formula = Formula::parse("in_airship").expect("parse");
        assert!(matches!(
            formula.eval(&context()),
            Err(FormulaError::NotANumber(_))
        ));
    }

    #[test]
    fn keeps_trimmed_source_text() {
        let formula = Formula::parse(" player_x + screen_width ").expect("parse");
        assert_eq!(formula.source(), "player_x + screen_width");
        assert_eq!(formula.to_string(), "player_x + screen_width");
        assert_eq!(formula, Formula::parse("player_x + screen_width").expect("parse"));
    }

    #[test]
    fn deserializes_from_string() {
        #[derive(Deserialize)]
        struct Holder {
            radius: Formula,
        }
        let holder: Holder = toml::from_str("radius = \"screen_height / 4\"").expect("parse");
        assert_eq!(holder.radius.eval(&context()), Ok(6.0));
        assert!(toml::from_str::<Holder>("radius = \"screen_height /\"").is_err());
    }
}
