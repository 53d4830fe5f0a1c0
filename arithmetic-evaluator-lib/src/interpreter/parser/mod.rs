use crate::interpreter::error::{ParseError, ParseErrorKind};
use crate::interpreter::operator::{BinaryOperator, UnaryOperator};
use crate::interpreter::syntax::expression_tree::Node;
use log::trace;
use rust_decimal::Decimal;
use std::str::FromStr;

const SQRT: &str = "sqrt";

/// How many factors and powers may be nested inside each other.
pub const MAX_NESTING_DEPTH: usize = 128;

/// How many operators may lie on the longest path from the root to a number.
///
/// Evaluating, drawing and dropping a tree all recurse along its paths, so a long
/// chain such as `1+1+...+1` is bounded here as well.
pub const MAX_TREE_HEIGHT: usize = 512;

/// Parses the given input string into an equivalent expression tree.
///
/// Grammar, from lowest to highest precedence:
///
/// ```text
/// expression := term ( ( "+" | "-" ) term )*
/// term       := power ( ( "*" | "/" | implicit ) power )*
/// power      := factor ( "^" power )?
/// factor     := "sqrt" factor | ( "+" | "-" ) power | "(" expression ")" | NUMBER
/// ```
///
/// A sign takes a whole power as its operand rather than a single factor, so `-2^2` is
/// `-(2^2)`, while `sqrt` takes exactly one factor and `sqrt 9^2` is `(sqrt 9)^2`.
///
/// A factor directly following another one (`2(3)`, `2sqrt(4)`) is multiplied with it.
///
/// # Arguments
///
/// * `expression`: The text-representation of the infix expression.
///
/// returns: The root of the expression tree.
///
/// # Examples
///
/// ```
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// use arithmetic_evaluator::interpreter::parser::parse;
///
/// let tree = parse("2^3^2")?;
/// assert_eq!(tree.to_string(), "2^3^2");
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn parse(expression: &str) -> Result<Node, ParseError> {
    trace!("Parsing {:?}", expression);
    let mut parser = Parser::new(expression);

    parser.skip_whitespace();
    if parser.is_at_end() {
        return Err(parser.error(ParseErrorKind::EmptyInput));
    }

    let tree = parser.parse_expression()?.node;

    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(parser.error(ParseErrorKind::TrailingInput));
    }

    trace!("Parsed {:?} as {}", expression, tree);
    Ok(tree)
}

/// A parsed node together with the number of operators on its longest path.
struct Subtree {
    node: Node,
    height: usize,
}

impl Subtree {
    fn leaf(node: Node) -> Subtree {
        Subtree { node, height: 0 }
    }
}

/// A cursor moving forward over the borrowed input, never backtracking.
struct Parser<'a> {
    source: &'a str,
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Parser<'a> {
        Parser {
            source,
            position: 0,
            depth: 0,
        }
    }

    fn parse_expression(&mut self) -> Result<Subtree, ParseError> {
        self.parse_addition_and_subtraction()
    }

    fn parse_addition_and_subtraction(&mut self) -> Result<Subtree, ParseError> {
        let mut left = self.parse_multiplication_and_division()?;
        loop {
            self.skip_whitespace();

            let operator = if self.match_char('+') {
                BinaryOperator::Add
            } else if self.match_char('-') {
                BinaryOperator::Subtract
            } else {
                return Ok(left);
            };
            let right = self.parse_multiplication_and_division()?;
            left = self.join(operator, left, right)?;
        }
    }

    fn parse_multiplication_and_division(&mut self) -> Result<Subtree, ParseError> {
        let mut left = self.parse_exponentiation()?;
        loop {
            self.skip_whitespace();

            let operator = if self.match_char('*') {
                BinaryOperator::Multiply
            } else if self.match_char('/') {
                BinaryOperator::Divide
            } else if self.starts_factor() {
                // Implicit multiplication, no operator is consumed.
                BinaryOperator::Multiply
            } else {
                return Ok(left);
            };
            let right = self.parse_exponentiation()?;
            left = self.join(operator, left, right)?;
        }
    }

    fn parse_exponentiation(&mut self) -> Result<Subtree, ParseError> {
        let base = self.parse_factor()?;
        self.skip_whitespace();

        if !self.match_char('^') {
            return Ok(base);
        }
        // Recursing instead of looping makes 2^3^2 group as 2^(3^2).
        let exponent = self.nested(Self::parse_exponentiation)?;
        self.join(BinaryOperator::Exponentiate, base, exponent)
    }

    fn parse_factor(&mut self) -> Result<Subtree, ParseError> {
        self.nested(|parser| {
            parser.skip_whitespace();

            if parser.match_keyword(SQRT) {
                let operand = parser.parse_factor()?;
                return parser.wrap(UnaryOperator::SquareRoot, operand);
            }

            // A sign covers the whole power following it: -2^2 is -(2^2).
            if parser.match_char('+') {
                let operand = parser.parse_exponentiation()?;
                return parser.wrap(UnaryOperator::Plus, operand);
            }
            if parser.match_char('-') {
                let operand = parser.parse_exponentiation()?;
                return parser.wrap(UnaryOperator::Minus, operand);
            }

            if parser.match_char('(') {
                let expression = parser.parse_expression()?;
                parser.skip_whitespace();
                if !parser.match_char(')') {
                    return Err(parser.error(ParseErrorKind::MissingClosingParenthesis));
                }
                return Ok(expression);
            }

            match parser.peek() {
                None => Err(parser.error(ParseErrorKind::UnexpectedEnd)),
                Some(c) if c.is_ascii_digit() || c == '.' => {
                    parser.read_number().map(Subtree::leaf)
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    parser.read_identifier().map(Subtree::leaf)
                }
                Some(c) => Err(parser.error(ParseErrorKind::UnexpectedCharacter(c))),
            }
        })
    }

    fn join(
        &self,
        operator: BinaryOperator,
        left: Subtree,
        right: Subtree,
    ) -> Result<Subtree, ParseError> {
        let height = left.height.max(right.height) + 1;
        self.check_height(height)?;
        Ok(Subtree {
            node: Node::new_binary(operator, left.node, right.node),
            height,
        })
    }

    fn wrap(&self, operator: UnaryOperator, operand: Subtree) -> Result<Subtree, ParseError> {
        let height = operand.height + 1;
        self.check_height(height)?;
        Ok(Subtree {
            node: Node::new_unary(operator, operand.node),
            height,
        })
    }

    fn check_height(&self, height: usize) -> Result<(), ParseError> {
        if height > MAX_TREE_HEIGHT {
            return Err(self.error(ParseErrorKind::NestingTooDeep));
        }
        Ok(())
    }

    /// Reads an unsigned literal such as `42`, `3.14`, `.5` or `5.`, but not a lone `.`.
    fn read_number(&mut self) -> Result<Node, ParseError> {
        let start = self.position;

        let integer_digits = self.skip_digits();
        let fraction_digits = if self.match_char('.') {
            self.skip_digits()
        } else {
            0
        };
        if integer_digits == 0 && fraction_digits == 0 {
            return Err(self.error_at(start, ParseErrorKind::ExpectedNumber));
        }

        let text = &self.source[start..self.position];
        Decimal::from_str(&normalize_literal(text))
            .map(Node::new_number)
            .map_err(|_| self.error_at(start, ParseErrorKind::InvalidNumber(text.to_string())))
    }

    fn read_identifier(&mut self) -> Result<Node, ParseError> {
        let start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.position += 1;
        }
        let name = self.source[start..self.position].to_string();
        Err(self.error_at(start, ParseErrorKind::UnknownIdentifier(name)))
    }

    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(ParseErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Whether the next character can begin a factor that is multiplied implicitly.
    fn starts_factor(&self) -> bool {
        matches!(self.peek(), Some(c) if c == '(' || c.is_ascii_digit() || c.is_ascii_alphabetic())
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.position += 1;
        }
        self.position - start
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.position += c.len_utf8();
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != Some(expected) {
            return false;
        }
        self.position += expected.len_utf8();
        true
    }

    /// Consumes the keyword unless it is the start of a longer word, `sqrt2` is still `sqrt 2`.
    fn match_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.remaining();
        if !rest.starts_with(keyword) {
            return false;
        }
        if matches!(rest[keyword.len()..].chars().next(), Some(c) if c.is_ascii_alphabetic()) {
            return false;
        }
        self.position += keyword.len();
        true
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn remaining(&self) -> &'a str {
        let source: &'a str = self.source;
        &source[self.position..]
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.position, kind)
    }

    fn error_at(&self, position: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            position,
            remaining: self.source[position..].to_string(),
        }
    }
}

fn normalize_literal(text: &str) -> String {
    let text = text.strip_suffix('.').unwrap_or(text);
    if text.starts_with('.') {
        format!("0{}", text)
    } else {
        text.to_string()
    }
}
