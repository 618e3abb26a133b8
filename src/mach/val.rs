use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;

type Result<T> = std::result::Result<T, Error>;

/// ## Runtime values
///
/// A value is a double or a string; `%` variables are ordinary numbers.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Number(f64),
    String(String),
}

impl Val {
    pub fn is_string(&self) -> bool {
        matches!(self, Val::String(_))
    }

    pub fn as_number(&self) -> Result<f64> {
        match self {
            Val::Number(n) => Ok(*n),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            Val::String(s) => Ok(s),
            Val::Number(_) => Err(error!(TypeMismatch)),
        }
    }

    /// Whole-number conversion; fractional values floor.
    pub fn as_int(&self) -> Result<i64> {
        Ok(self.as_number()?.floor() as i64)
    }

    /// The C64 display text. Whole numbers below 10^10 render without a
    /// decimal point; everything else keeps at most nine fractional
    /// digits with trailing zeros and an orphan dot stripped. A
    /// non-negative number gets the sign position as a leading space.
    pub fn format(&self) -> String {
        match self {
            Val::String(s) => s.clone(),
            Val::Number(n) => {
                let digits = if n.fract() == 0.0 && n.abs() < 1e10 {
                    format!("{}", *n as i64)
                } else {
                    let fixed = format!("{:.9}", n.abs());
                    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
                    format!("{}{}", if *n < 0.0 { "-" } else { "" }, trimmed)
                };
                if *n >= 0.0 {
                    format!(" {}", digits)
                } else {
                    digits
                }
            }
        }
    }

    fn truth(b: bool) -> Val {
        Val::Number(if b { -1.0 } else { 0.0 })
    }

    fn finite(n: f64) -> Result<Val> {
        if n.is_finite() {
            Ok(Val::Number(n))
        } else {
            Err(error!(Overflow))
        }
    }

    pub fn negate(val: Val) -> Result<Val> {
        Ok(Val::Number(-val.as_number()?))
    }

    pub fn add(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::Number(l), Val::Number(r)) => Val::finite(l + r),
            (Val::String(l), Val::String(r)) => Ok(Val::String(l + &r)),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        Val::finite(lhs.as_number()? - rhs.as_number()?)
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        Val::finite(lhs.as_number()? * rhs.as_number()?)
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.as_number()?;
        if divisor == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Val::finite(lhs.as_number()? / divisor)
    }

    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        Val::finite(lhs.as_number()?.powf(rhs.as_number()?))
    }

    /// Logical operators work on 16-bit-style integer truth values; any
    /// number is floored first, comparisons having already produced -1/0.
    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number((lhs.as_int()? & rhs.as_int()?) as f64))
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number((lhs.as_int()? | rhs.as_int()?) as f64))
    }

    pub fn not(val: Val) -> Result<Val> {
        Ok(Val::Number(!val.as_int()? as f64))
    }

    fn compare(lhs: &Val, rhs: &Val) -> Result<Ordering> {
        match (lhs, rhs) {
            (Val::Number(l), Val::Number(r)) => {
                l.partial_cmp(r).ok_or_else(|| error!(Overflow))
            }
            (Val::String(l), Val::String(r)) => Ok(l.cmp(r)),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Val::compare(&lhs, &rhs)? == Ordering::Equal))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Val::compare(&lhs, &rhs)? != Ordering::Equal))
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Val::compare(&lhs, &rhs)? == Ordering::Less))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Val::compare(&lhs, &rhs)? != Ordering::Greater))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Val::compare(&lhs, &rhs)? == Ordering::Greater))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Val::compare(&lhs, &rhs)? != Ordering::Less))
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
