//! Runtime values and operator semantics.
//!
//! A value is either an integer scalar or a transient reference to a
//! symbol-table slot. The reference variant exists only between the
//! evaluation of an l-value and the assignment that consumes it; every
//! other operator position requires an integer and rejects a reference.

use crate::ast::{BinOp, UnOp};
use crate::diag::Loc;
use crate::error::{Error, Result};
use crate::symbol_table::Slot;

/// The fixed-width scalar every ParaCL quantity is represented with.
/// Arithmetic wraps on overflow.
pub type Int = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(Int),
    LRef(Slot),
}

impl Value {
    /// The integer inside, or `InvalidOperand` for a reference.
    pub fn as_int(self, loc: Loc) -> Result<Int> {
        match self {
            Value::Int(v) => Ok(v),
            Value::LRef(_) => Err(Error::InvalidOperand { loc }),
        }
    }

    /// Condition conversion: zero is false, any other integer is true.
    /// A reference in condition position is an invalid operand.
    pub fn truthy(self, loc: Loc) -> Result<bool> {
        Ok(self.as_int(loc)? != 0)
    }
}

/// Apply a non-assignment binary operator. Both operands must be integers;
/// assignment never reaches this function (the evaluator stores through the
/// slot itself), so `Assign` here is an operand-shape error like any other
/// misuse.
pub fn binary(op: BinOp, lhs: Value, rhs: Value, loc: Loc) -> Result<Value> {
    let a = lhs.as_int(loc)?;
    let b = rhs.as_int(loc)?;
    let v = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(Error::DivisionByZero { loc });
            }
            a.wrapping_div(b)
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(Error::DivisionByZero { loc });
            }
            a.wrapping_rem(b)
        }
        BinOp::Less => (a < b) as Int,
        BinOp::LessEq => (a <= b) as Int,
        BinOp::Greater => (a > b) as Int,
        BinOp::GreaterEq => (a >= b) as Int,
        BinOp::Equal => (a == b) as Int,
        BinOp::NotEqual => (a != b) as Int,
        // Both sides are already evaluated by the time we get here; the
        // language defines && and || without short-circuiting.
        BinOp::And => (a != 0 && b != 0) as Int,
        BinOp::Or => (a != 0 || b != 0) as Int,
        BinOp::Assign => return Err(Error::InvalidOperand { loc }),
    };
    Ok(Value::Int(v))
}

/// Apply a unary operator to an integer operand. `Print` is handled by the
/// evaluator (it owns the output stream); its value behavior is the
/// identity, which is what the operand-writing caller relies on.
pub fn unary(op: UnOp, arg: Value, loc: Loc) -> Result<Value> {
    let v = arg.as_int(loc)?;
    let r = match op {
        UnOp::Plus | UnOp::Print => v,
        UnOp::Minus => v.wrapping_neg(),
        UnOp::Not => (v == 0) as Int,
    };
    Ok(Value::Int(r))
}
