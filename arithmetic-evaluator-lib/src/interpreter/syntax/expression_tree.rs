use crate::interpreter::error::EvaluationError;
use crate::interpreter::operator::{Associativity, BinaryOperator, NodeKind, UnaryOperator};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::fmt;
use std::fmt::{Display, Formatter};
use string_builder::Builder;

const LEFT_BRANCH: &str = "├─ ";
const RIGHT_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const BLANK: &str = "   ";

/// A node of an expression tree. Every node owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    // Terminal symbols (leaves)
    Number(Decimal),
    // Non-terminal symbols (non-leaves)
    BinaryOperation {
        operator: BinaryOperator,
        left_operand: Box<Node>,
        right_operand: Box<Node>,
    },
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<Node>,
    },
}

impl Node {
    pub fn new_number(value: Decimal) -> Node {
        Node::Number(value)
    }

    pub fn new_binary(operator: BinaryOperator, left_operand: Node, right_operand: Node) -> Node {
        Node::BinaryOperation {
            operator,
            left_operand: Box::new(left_operand),
            right_operand: Box::new(right_operand),
        }
    }

    pub fn new_unary(operator: UnaryOperator, operand: Node) -> Node {
        Node::UnaryOperation {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Number(_) => NodeKind::Number,
            Node::BinaryOperation { .. } => NodeKind::BinaryOperation,
            Node::UnaryOperation { .. } => NodeKind::UnaryOperation,
        }
    }

    pub fn as_binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            Node::BinaryOperation { operator, .. } => Some(*operator),
            Node::Number(_) | Node::UnaryOperation { .. } => None,
        }
    }

    /// Computes the value of the tree rooted in this node.
    ///
    /// Both operands of a binary operation are evaluated, left first, before the operator
    /// is applied. The first undefined operation aborts the evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use arithmetic_evaluator::interpreter::parser::parse;
    /// use rust_decimal::Decimal;
    /// # use anyhow::Result;
    ///
    /// # fn main() -> Result<()> {
    /// let tree = parse("6 / 2 * (1 + 2)")?;
    /// assert_eq!(tree.evaluate()?, Decimal::from(9));
    /// # Ok::<(), anyhow::Error>(()) }
    /// ```
    pub fn evaluate(&self) -> Result<Decimal, EvaluationError> {
        match self {
            Node::Number(value) => Ok(*value),
            Node::BinaryOperation {
                operator,
                left_operand,
                right_operand,
            } => {
                let left = left_operand.evaluate()?;
                let right = right_operand.evaluate()?;
                operator.evaluate(left, right)
            }
            Node::UnaryOperation { operator, operand } => {
                operator.evaluate(operand.evaluate()?, self.kind())
            }
        }
    }

    /// Draws the tree as text, one node per line.
    ///
    /// # Arguments
    ///
    /// * `indent`: Prefix of this node's line, ending in the branch marker leading to it.
    /// * `is_right`: Whether this node is the last child of its parent.
    ///
    /// returns: The drawing, where `1 + 2 * 3` becomes
    ///
    /// ```text
    /// +
    /// ├─ 1
    /// └─ *
    ///    ├─ 2
    ///    └─ 3
    /// ```
    pub fn render(&self, indent: &str, is_right: bool) -> Result<String> {
        let mut builder = Builder::new(64);
        self.render_into(&mut builder, indent, is_right);
        builder.string().context("Failed to build tree diagram")
    }

    fn render_into(&self, builder: &mut Builder, indent: &str, is_right: bool) {
        builder.append(indent);
        match self {
            Node::Number(value) => {
                builder.append(value.to_string());
                builder.append('\n');
            }
            Node::BinaryOperation {
                operator,
                left_operand,
                right_operand,
            } => {
                builder.append(operator.symbol());
                builder.append('\n');
                left_operand.render_into(builder, &child_indent(indent, is_right, LEFT_BRANCH), false);
                right_operand.render_into(builder, &child_indent(indent, is_right, RIGHT_BRANCH), true);
            }
            Node::UnaryOperation { operator, operand } => {
                builder.append(operator.symbol());
                builder.append('\n');
                operand.render_into(builder, &child_indent(indent, is_right, RIGHT_BRANCH), true);
            }
        }
    }

    fn format_infix(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(value) => write!(f, "{}", value),
            Node::BinaryOperation {
                operator,
                left_operand,
                right_operand,
            } => {
                format_operand(f, left_operand, needs_parentheses(operator, left_operand, false))?;
                match operator {
                    BinaryOperator::Exponentiate => write!(f, "{}", operator)?,
                    _ => write!(f, " {} ", operator)?,
                }
                format_operand(f, right_operand, needs_parentheses(operator, right_operand, true))
            }
            Node::UnaryOperation {
                operator: UnaryOperator::SquareRoot,
                operand,
            } => {
                write!(f, "sqrt(")?;
                operand.format_infix(f)?;
                write!(f, ")")
            }
            Node::UnaryOperation { operator, operand } => {
                // A sign applies to a whole power, so only + - * / need grouping.
                let parenthesize = operand
                    .as_binary_operator()
                    .map_or(false, |child| BinaryOperator::Exponentiate.precedence_gt(&child));
                write!(f, "{}", operator)?;
                format_operand(f, operand, parenthesize)
            }
        }
    }

    fn is_signed(&self) -> bool {
        match self {
            Node::Number(value) => value.is_sign_negative(),
            Node::UnaryOperation { operator, .. } => *operator != UnaryOperator::SquareRoot,
            Node::BinaryOperation { .. } => false,
        }
    }
}

/// Prints the tree in infix notation with only the parentheses needed to parse it back
/// into the same tree.
impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.format_infix(f)
    }
}

fn child_indent(indent: &str, is_right: bool, branch: &str) -> String {
    let marker = if is_right { RIGHT_BRANCH } else { LEFT_BRANCH };
    let continuation = if is_right { BLANK } else { PIPE };
    match indent.strip_suffix(marker) {
        Some(stem) => format!("{}{}{}", stem, continuation, branch),
        None => format!("{}{}", indent, branch),
    }
}

fn needs_parentheses(parent: &BinaryOperator, child: &Node, is_right: bool) -> bool {
    if *parent == BinaryOperator::Exponentiate && !is_right && child.is_signed() {
        return true;
    }
    match child.as_binary_operator() {
        Some(child_operator) if parent.precedence_gt(&child_operator) => true,
        Some(child_operator) if child_operator.precedence() == parent.precedence() => {
            match parent.associativity() {
                Associativity::Left => is_right,
                Associativity::Right => !is_right,
            }
        }
        _ => false,
    }
}

fn format_operand(f: &mut Formatter<'_>, operand: &Node, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "(")?;
        operand.format_infix(f)?;
        write!(f, ")")
    } else {
        operand.format_infix(f)
    }
}
