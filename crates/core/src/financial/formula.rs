//! Custom line formulas.
//!
//! A formula is plain arithmetic over numeric literals and four
//! `{placeholder}` variables: `{setup_cost}`, `{recurrent_cost}`,
//! `{quantity}` and `{total_period_years}`. Placeholders are substituted
//! first. The result is then parsed by a small recursive-descent evaluator
//! that accepts only `+ - * / ( )`, unary minus, and decimal literals.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::CoreError;

/// Maximum length of a formula, stored or previewed.
pub const MAX_FORMULA_LENGTH: usize = 500;

/// Deepest nesting of parentheses and unary minus the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Variables a formula may reference.
pub const FORMULA_VARIABLES: &[&str] =
    &["setup_cost", "recurrent_cost", "quantity", "total_period_years"];

/// Regex matching `{placeholder}` tokens in formulas.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w*)\}").expect("valid regex"));

/// Why a formula could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("formula exceeds maximum length of {MAX_FORMULA_LENGTH} characters")]
    TooLong,

    #[error("unknown variable '{{{0}}}', expected one of: {expected}", expected = FORMULA_VARIABLES.join(", "))]
    UnknownVariable(String),

    #[error("formula nests deeper than {MAX_NESTING_DEPTH} levels")]
    TooDeep,

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("result is not a finite number")]
    NonFinite,
}

/// Values substituted for formula placeholders. Missing values become `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormulaVariables {
    pub setup_cost: Option<f64>,
    pub recurrent_cost: Option<f64>,
    pub quantity: Option<f64>,
    pub total_period_years: Option<f64>,
}

impl FormulaVariables {
    /// Look up a variable by name. The outer `None` means the name is unknown.
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        let index = FORMULA_VARIABLES.iter().position(|v| *v == name)?;
        Some(
            [
                self.setup_cost,
                self.recurrent_cost,
                self.quantity,
                self.total_period_years,
            ][index],
        )
    }
}

/// Evaluate a formula, returning `0.0` on any failure.
///
/// A broken formula on one line must never block the rest of a calculation.
pub fn evaluate_custom_formula(formula: &str, variables: &FormulaVariables) -> f64 {
    try_evaluate_formula(formula, variables).unwrap_or(0.0)
}

/// Evaluate a formula, reporting why it failed.
pub fn try_evaluate_formula(
    formula: &str,
    variables: &FormulaVariables,
) -> Result<f64, FormulaError> {
    if formula.len() > MAX_FORMULA_LENGTH {
        return Err(FormulaError::TooLong);
    }
    let expression = substitute_variables(formula, variables)?;
    evaluate_arithmetic(&expression)
}

/// Replace every `{name}` with its numeric value.
fn substitute_variables(
    formula: &str,
    variables: &FormulaVariables,
) -> Result<String, FormulaError> {
    if let Some(unknown) = PLACEHOLDER_RE
        .captures_iter(formula)
        .map(|c| c[1].to_string())
        .find(|name| variables.lookup(name).is_none())
    {
        return Err(FormulaError::UnknownVariable(unknown));
    }

    let substituted = PLACEHOLDER_RE.replace_all(formula, |caps: &regex::Captures| {
        let value = variables.lookup(&caps[1]).flatten().unwrap_or(0.0);
        // Parenthesised so a negative value stays a single operand.
        format!("({value})")
    });
    Ok(substituted.into_owned())
}

/// Check that a formula only uses known variables and is well-formed.
pub fn validate_custom_formula(formula: &str) -> Result<(), CoreError> {
    let probe = FormulaVariables {
        setup_cost: Some(1.0),
        recurrent_cost: Some(1.0),
        quantity: Some(1.0),
        total_period_years: Some(1.0),
    };
    try_evaluate_formula(formula, &probe)
        .map(|_| ())
        .map_err(|e| CoreError::Validation(format!("Invalid custom_formula: {e}")))
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(expression: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(literal.clone()))?;
                tokens.push((Token::Number(value), pos));
                continue;
            }
            c => return Err(FormulaError::UnexpectedCharacter { ch: c, position: pos }),
        };
        tokens.push((token, pos));
        chars.next();
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser / evaluator
// ---------------------------------------------------------------------------

/// Evaluate a pure arithmetic expression (no placeholders).
///
/// Division by zero yields `0` for that operation rather than infinity.
pub fn evaluate_arithmetic(expression: &str) -> Result<f64, FormulaError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(&(_, position)) = parser.tokens.get(parser.pos) {
        return Err(FormulaError::UnexpectedToken(position));
    }
    if !value.is_finite() {
        return Err(FormulaError::NonFinite);
    }
    Ok(value)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    /// Current recursion depth through `unary` and parenthesised groups.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    /// Run `parse` one nesting level deeper, failing past the limit.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.advance();
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                _ if rhs == 0.0 => 0.0,
                _ => value / rhs,
            };
        }
        Ok(value)
    }

    // unary := '-' unary | primary
    fn unary(&mut self) -> Result<f64, FormulaError> {
        if self.peek() == Some(Token::Minus) {
            self.advance();
            return Ok(-self.nested(Self::unary)?);
        }
        self.primary()
    }

    // primary := number | '(' expression ')'
    fn primary(&mut self) -> Result<f64, FormulaError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((Token::LParen, _)) => {
                let value = self.nested(Self::expression)?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((_, position)) => Err(FormulaError::UnexpectedToken(position)),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((_, position)) => Err(FormulaError::UnexpectedToken(position)),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}
