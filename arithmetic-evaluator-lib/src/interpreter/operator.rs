use crate::interpreter::error::EvaluationError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use std::fmt;
use std::fmt::Formatter;

/// A binary mathematical operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponentiate,
}

/// An unary mathematical operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    SquareRoot,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::SquareRoot => "sqrt",
        }
    }

    /// Applies the operator to an already evaluated operand of a `node`.
    ///
    /// The square root is computed in floating point and converted back,
    /// and is only defined for non-negative operands.
    pub fn evaluate(&self, x: Decimal, node: NodeKind) -> Result<Decimal, EvaluationError> {
        match self {
            UnaryOperator::Plus => Ok(x),
            UnaryOperator::Minus => Ok(-x),
            UnaryOperator::SquareRoot if x < Decimal::ZERO => {
                Err(EvaluationError::UnsupportedOperation {
                    operator: *self,
                    node,
                    operand: x,
                })
            }
            UnaryOperator::SquareRoot => from_float(self.symbol(), to_float(x).sqrt()),
        }
    }
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Exponentiate => "^",
        }
    }

    pub(crate) fn associativity(&self) -> Associativity {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide => Associativity::Left,
            BinaryOperator::Exponentiate => Associativity::Right,
        }
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 0,
            BinaryOperator::Multiply | BinaryOperator::Divide => 1,
            BinaryOperator::Exponentiate => 2,
        }
    }

    pub(crate) fn precedence_gt(&self, other: &Self) -> bool {
        self.precedence().gt(&other.precedence())
    }

    /// Applies the operator to two already evaluated operands.
    ///
    /// `^` with an integral exponent is computed exactly in decimal. Any other exponent
    /// goes through `f64::powf` and is not guarded: a result the decimal type cannot hold
    /// (NaN for a negative base with a fractional exponent, infinity, anything out of
    /// range) is reported as [`EvaluationError::NotRepresentable`].
    pub fn evaluate(&self, a: Decimal, b: Decimal) -> Result<Decimal, EvaluationError> {
        let result = match self {
            BinaryOperator::Add => a.checked_add(b),
            BinaryOperator::Subtract => a.checked_sub(b),
            BinaryOperator::Multiply => a.checked_mul(b),
            BinaryOperator::Divide if b.is_zero() => {
                return Err(EvaluationError::DivideByZero {
                    operator: *self,
                    left: a,
                    right: b,
                })
            }
            BinaryOperator::Divide => a.checked_div(b),
            BinaryOperator::Exponentiate => match integral_exponent(b) {
                Some(exponent) => a.checked_powi(exponent),
                None => return from_float(self.symbol(), self.approximate(a, b)),
            },
        };
        result.ok_or_else(|| EvaluationError::NotRepresentable {
            operator: self.symbol(),
            value: self.approximate(a, b),
        })
    }

    fn approximate(&self, a: Decimal, b: Decimal) -> f64 {
        let (a, b) = (to_float(a), to_float(b));
        match self {
            BinaryOperator::Add => a + b,
            BinaryOperator::Subtract => a - b,
            BinaryOperator::Multiply => a * b,
            BinaryOperator::Divide => a / b,
            BinaryOperator::Exponentiate => a.powf(b),
        }
    }
}

/// The kind of node an operator was applied in, carried by errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Number,
    UnaryOperation,
    BinaryOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

const FLOAT_SIGNIFICANT_DIGITS: u32 = 15;

// Every decimal has an f64 approximation.
fn to_float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn integral_exponent(exponent: Decimal) -> Option<i64> {
    if exponent.fract().is_zero() {
        exponent.to_i64()
    } else {
        None
    }
}

/// Converts back keeping the 15 significant digits an f64 reliably carries.
fn from_float(operator: &'static str, value: f64) -> Result<Decimal, EvaluationError> {
    Decimal::from_f64(value)
        .and_then(|decimal| decimal.round_sf(FLOAT_SIGNIFICANT_DIGITS))
        .map(|decimal| decimal.normalize())
        .ok_or(EvaluationError::NotRepresentable { operator, value })
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Number => write!(f, "number"),
            NodeKind::UnaryOperation => write!(f, "unary operation"),
            NodeKind::BinaryOperation => write!(f, "binary operation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn operator_gt_correspond_with_precedence() {
        let greater = BinaryOperator::Multiply;
        let lesser = BinaryOperator::Add;
        assert!(greater.precedence_gt(&lesser))
    }

    #[test]
    fn exponentiation_binds_tighter_than_multiplication() {
        assert!(BinaryOperator::Exponentiate.precedence_gt(&BinaryOperator::Divide))
    }

    #[test]
    fn only_exponentiation_is_right_associative() {
        assert_eq!(
            BinaryOperator::Exponentiate.associativity(),
            Associativity::Right
        );
        assert_eq!(BinaryOperator::Subtract.associativity(), Associativity::Left);
    }

    #[test]
    fn division_by_zero_carries_operands() {
        let error = BinaryOperator::Divide
            .evaluate(decimal(10), Decimal::ZERO)
            .unwrap_err();

        assert_eq!(
            error,
            EvaluationError::DivideByZero {
                operator: BinaryOperator::Divide,
                left: decimal(10),
                right: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn division_is_exact_in_decimal() {
        let result = BinaryOperator::Divide.evaluate(decimal(7), decimal(2)).unwrap();
        assert_eq!(result, Decimal::new(35, 1));
    }

    #[test]
    fn square_root_of_negative_is_unsupported() {
        let error = UnaryOperator::SquareRoot.evaluate(decimal(-4), NodeKind::UnaryOperation).unwrap_err();

        assert!(matches!(
            error,
            EvaluationError::UnsupportedOperation {
                operator: UnaryOperator::SquareRoot,
                node: NodeKind::UnaryOperation,
                ..
            }
        ));
    }

    #[test]
    fn square_root_of_zero_is_zero() {
        let result = UnaryOperator::SquareRoot.evaluate(Decimal::ZERO, NodeKind::UnaryOperation).unwrap();
        assert!(result.is_zero());
    }

    #[test]
    fn negative_base_with_integral_exponent_is_supported() {
        let result = BinaryOperator::Exponentiate
            .evaluate(decimal(-2), decimal(3))
            .unwrap();
        assert_eq!(result, decimal(-8));
    }

    #[test]
    fn integral_power_is_exact_beyond_float_precision() {
        let result = BinaryOperator::Exponentiate
            .evaluate(decimal(10), decimal(23))
            .unwrap();
        assert_eq!(result, Decimal::from_i128_with_scale(10_i128.pow(23), 0));
    }

    #[test]
    fn negative_integral_exponent_gives_reciprocal() {
        let result = BinaryOperator::Exponentiate
            .evaluate(decimal(2), decimal(-2))
            .unwrap();
        assert_eq!(result, Decimal::new(25, 2));
    }

    #[test]
    fn zero_to_negative_power_is_not_representable() {
        let error = BinaryOperator::Exponentiate
            .evaluate(Decimal::ZERO, decimal(-1))
            .unwrap_err();

        assert!(matches!(
            error,
            EvaluationError::NotRepresentable { operator: "^", .. }
        ));
    }

    #[test]
    fn fractional_power_is_rounded_to_float_precision() {
        let result = BinaryOperator::Exponentiate
            .evaluate(decimal(2), Decimal::new(5, 1))
            .unwrap();
        assert_eq!(result, Decimal::new(141421356237310, 14));
    }

    #[test]
    fn negative_base_with_fractional_exponent_is_not_representable() {
        let error = BinaryOperator::Exponentiate
            .evaluate(decimal(-8), Decimal::new(5, 1))
            .unwrap_err();

        assert!(matches!(
            error,
            EvaluationError::NotRepresentable { operator: "^", value } if value.is_nan()
        ));
    }

    #[test]
    fn overflowing_multiplication_is_not_representable() {
        let error = BinaryOperator::Multiply
            .evaluate(Decimal::MAX, decimal(2))
            .unwrap_err();

        assert!(matches!(
            error,
            EvaluationError::NotRepresentable { operator: "*", .. }
        ));
    }
}
