use crate::interpreter::operator::{BinaryOperator, NodeKind, UnaryOperator};
use rust_decimal::Decimal;
use std::fmt;
use std::fmt::Formatter;
use thiserror::Error;

/// The input text is not a well-formed expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at position {position}{}", excerpt(.kind, .remaining))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the input where the problem was found.
    pub position: usize,
    /// The input that was left unconsumed at `position`.
    pub remaining: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    EmptyInput,
    UnexpectedCharacter(char),
    UnexpectedEnd,
    ExpectedNumber,
    InvalidNumber(String),
    UnknownIdentifier(String),
    MissingClosingParenthesis,
    TrailingInput,
    NestingTooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::EmptyInput => write!(f, "Expression is empty"),
            ParseErrorKind::UnexpectedCharacter(c) => write!(f, "Unexpected character '{}'", c),
            ParseErrorKind::UnexpectedEnd => write!(f, "Expected an operand but the input ended"),
            ParseErrorKind::ExpectedNumber => write!(f, "Expected number"),
            ParseErrorKind::InvalidNumber(text) => write!(f, "Invalid number '{}'", text),
            ParseErrorKind::UnknownIdentifier(name) => write!(f, "Unknown identifier '{}'", name),
            ParseErrorKind::MissingClosingParenthesis => write!(f, "Missing closing parenthesis"),
            ParseErrorKind::TrailingInput => write!(f, "Unexpected input"),
            ParseErrorKind::NestingTooDeep => write!(f, "Expression is nested too deeply"),
        }
    }
}

fn excerpt(kind: &ParseErrorKind, remaining: &str) -> String {
    match kind {
        ParseErrorKind::TrailingInput => format!(": '{}'", remaining),
        _ => String::new(),
    }
}

/// An operation that is undefined for the operands it was given.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(
        "Division by zero is not allowed for operation {operator} with operands {left} and {right}"
    )]
    DivideByZero {
        operator: BinaryOperator,
        left: Decimal,
        right: Decimal,
    },
    #[error("Operation {operator} is not supported for {node} with operand {operand}")]
    UnsupportedOperation {
        operator: UnaryOperator,
        node: NodeKind,
        operand: Decimal,
    },
    #[error("Result of operation {operator} cannot be represented as a decimal (got {value})")]
    NotRepresentable { operator: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_message_names_position() {
        let error = ParseError {
            kind: ParseErrorKind::UnexpectedCharacter('@'),
            position: 4,
            remaining: "@".into(),
        };

        assert_eq!(error.to_string(), "Unexpected character '@' at position 4");
    }

    #[test]
    fn trailing_input_message_quotes_remainder() {
        let error = ParseError {
            kind: ParseErrorKind::TrailingInput,
            position: 3,
            remaining: ")".into(),
        };

        assert_eq!(error.to_string(), "Unexpected input at position 3: ')'");
    }

    #[test]
    fn divide_by_zero_message_names_operands() {
        let error = EvaluationError::DivideByZero {
            operator: BinaryOperator::Divide,
            left: Decimal::from(10),
            right: Decimal::ZERO,
        };

        assert_eq!(
            error.to_string(),
            "Division by zero is not allowed for operation / with operands 10 and 0"
        );
    }
}
