pub mod error;
pub mod operator;
pub mod parser;
pub mod syntax;

use anyhow::Result;
use log::debug;
use rust_decimal::Decimal;

/// Parses the given expression and computes its value.
///
/// # Arguments
///
/// * `expression`: A text expression in infix format.
///
/// returns: The value of the expression. A malformed expression fails with an
/// [`error::ParseError`], an undefined operation with an [`error::EvaluationError`].
///
/// # Examples
///
/// ```
/// use arithmetic_evaluator::interpreter::calculate;
/// use rust_decimal::Decimal;
/// # use anyhow::Result;
///
/// # fn main() -> Result<()> {
/// let value = calculate("1 + 2 - 3 * 4 / 5 + 6")?;
/// assert_eq!(value, Decimal::new(66, 1));
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn calculate(expression: &str) -> Result<Decimal> {
    let tree = parser::parse(expression)?;
    let value = tree.evaluate()?;
    debug!("{} = {}", tree, value);
    Ok(value)
}
