//! Error codes for analysis diagnostics.
//!
//! Format: E#### / W#### where the first digit is the area:
//! - E2xxx: value and type errors
//! - E3xxx: pattern errors
//! - E4xxx: evaluation-state errors (calls, recursion, natives)
//! - W3xxx: pattern warnings

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Value / type errors (E2xxx)
    /// Value not assignable to the variable's declared type
    E2001,
    /// Narrowing outside of the variable's declared type
    E2002,
    /// Operand of the wrong kind for a binary operator
    E2003,
    /// `if` test is not a boolean
    E2004,
    /// Access to a property the value does not have
    E2005,
    /// Wrong number of arguments
    E2006,
    /// Argument does not match the parameter's pattern
    E2007,
    /// Calling a value that is not callable
    E2008,
    /// Iterating over a value that is not iterable
    E2009,
    /// Mutable value inside an immutable container
    E2010,
    /// Reference to an undeclared variable
    E2011,
    /// Assignment to a constant
    E2012,
    /// Returned value does not match the declared return type
    E2013,
    /// Variable declared twice in the same scope
    E2014,
    /// Value does not match the pattern it is declared against
    E2015,

    // Pattern errors (E3xxx)
    /// Reference to an undefined named pattern
    E3001,
    /// Reference to an undefined pattern namespace or namespace member
    E3002,
    /// Named pattern or namespace defined twice
    E3003,
    /// Pattern construction rejected (overlapping disjoint union, mutable exact value, ...)
    E3004,

    // Evaluation-state errors (E4xxx)
    /// Recursive call to a function without a declared return type
    E4001,
    /// Error reported by a native function binding
    E4002,
    /// `self` used outside of a method
    E4003,

    // Warnings
    /// Match arm can never be selected
    W3001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::W3001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::W3001 => "W3001",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W3001)
    }

    /// Case-insensitive lookup of a code's textual form.
    pub fn parse(s: &str) -> Option<ErrorCode> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
