//! Semantic types inferred and checked by the parser
//!
//! Procedure parameters carry a `PP*` form of their declared type so that a
//! parameter `x: integer` and a local `x: integer` are different symbols. Inside
//! expressions the `PP*` forms behave like their plain counterparts.

use crate::constants::{INTEGER_SIZE, REAL_SIZE};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Real,
    Bool,
    ArrayInt,
    ArrayReal,
    ParamInt,
    ParamReal,
    ParamArrayInt,
    ParamArrayReal,
    /// The program's own name
    ProgramName,
    /// A name listed in the program header
    ProgramParam,
    Procedure,
    /// Already reported; suppresses follow-on diagnostics
    Error,
}

impl Type {
    /// Parameter form of a declared variable type.
    pub fn as_param(self) -> Type {
        match self {
            Type::Int => Type::ParamInt,
            Type::Real => Type::ParamReal,
            Type::ArrayInt => Type::ParamArrayInt,
            Type::ArrayReal => Type::ParamArrayReal,
            other => other,
        }
    }

    /// Plain form of a parameter type, as seen from inside expressions.
    pub fn as_value(self) -> Type {
        match self {
            Type::ParamInt => Type::Int,
            Type::ParamReal => Type::Real,
            Type::ParamArrayInt => Type::ArrayInt,
            Type::ParamArrayReal => Type::ArrayReal,
            other => other,
        }
    }

    /// Numeric family: arrays decay to their element type.
    pub fn family(self) -> Type {
        match self.as_value() {
            Type::ArrayInt => Type::Int,
            Type::ArrayReal => Type::Real,
            other => other,
        }
    }

    /// Array type with this element type.
    pub fn array_of(self) -> Type {
        match self {
            Type::Int => Type::ArrayInt,
            Type::Real => Type::ArrayReal,
            other => other,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self.as_value(), Type::ArrayInt | Type::ArrayReal)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self.family(), Type::Int | Type::Real)
    }

    pub fn is_error(self) -> bool {
        self == Type::Error
    }

    /// Size in bytes of one scalar of this type, 0 for non-storage types.
    pub fn scalar_size(self) -> usize {
        match self.family() {
            Type::Int => INTEGER_SIZE,
            Type::Real => REAL_SIZE,
            _ => 0,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Type::Int => "INT",
            Type::Real => "REAL",
            Type::Bool => "BOOL",
            Type::ArrayInt => "AINT",
            Type::ArrayReal => "AREAL",
            Type::ParamInt => "PPINT",
            Type::ParamReal => "PPREAL",
            Type::ParamArrayInt => "PPAINT",
            Type::ParamArrayReal => "PPAREAL",
            Type::ProgramName => "PGNAME",
            Type::ProgramParam => "PGPARM",
            Type::Procedure => "PROC",
            Type::Error => "ERR",
        };
        f.write_str(tag)
    }
}

/// Storage size of `array [low..high] of element`, or `None` for an empty
/// range.
pub fn array_size(element: Type, low: i64, high: i64) -> Option<usize> {
    if low > high {
        return None;
    }
    let count = usize::try_from(high - low + 1).ok()?;
    count.checked_mul(element.scalar_size())
}
