//! Exact-or-unknown scalars.

use std::fmt;
use std::sync::Arc;

use crate::Capabilities;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Rune,
    Byte,
    Str,
    Identifier,
    PropertyName,
    Duration,
    Date,
    ByteCount,
    LineCount,
    RuneCount,
    Port,
    Path,
    Url,
    Host,
    EmailAddress,
    ByteSlice,
}

impl ScalarKind {
    pub const ALL: &'static [ScalarKind] = &[
        ScalarKind::Bool,
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::Rune,
        ScalarKind::Byte,
        ScalarKind::Str,
        ScalarKind::Identifier,
        ScalarKind::PropertyName,
        ScalarKind::Duration,
        ScalarKind::Date,
        ScalarKind::ByteCount,
        ScalarKind::LineCount,
        ScalarKind::RuneCount,
        ScalarKind::Port,
        ScalarKind::Path,
        ScalarKind::Url,
        ScalarKind::Host,
        ScalarKind::EmailAddress,
        ScalarKind::ByteSlice,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Rune => "rune",
            ScalarKind::Byte => "byte",
            ScalarKind::Str => "string",
            ScalarKind::Identifier => "identifier",
            ScalarKind::PropertyName => "property-name",
            ScalarKind::Duration => "duration",
            ScalarKind::Date => "date",
            ScalarKind::ByteCount => "byte-count",
            ScalarKind::LineCount => "line-count",
            ScalarKind::RuneCount => "rune-count",
            ScalarKind::Port => "port",
            ScalarKind::Path => "path",
            ScalarKind::Url => "url",
            ScalarKind::Host => "host",
            ScalarKind::EmailAddress => "email-address",
            ScalarKind::ByteSlice => "byte-slice",
        }
    }

    /// Kind-level capabilities; identical for every payload.
    pub fn capabilities(self) -> Capabilities {
        let base = Capabilities::SERIALIZABLE;
        match self {
            ScalarKind::Int | ScalarKind::Float => base | Capabilities::NUMERIC,
            ScalarKind::Str => {
                base | Capabilities::STR_LIKE | Capabilities::ITERABLE | Capabilities::INDEXABLE
            }
            ScalarKind::ByteSlice => {
                base | Capabilities::BYTES_LIKE | Capabilities::ITERABLE | Capabilities::INDEXABLE
            }
            ScalarKind::Path | ScalarKind::Url | ScalarKind::Host => {
                base | Capabilities::RESOURCE_NAME
            }
            ScalarKind::Bool
            | ScalarKind::Rune
            | ScalarKind::Byte
            | ScalarKind::Identifier
            | ScalarKind::PropertyName
            | ScalarKind::Duration
            | ScalarKind::Date
            | ScalarKind::ByteCount
            | ScalarKind::LineCount
            | ScalarKind::RuneCount
            | ScalarKind::Port
            | ScalarKind::EmailAddress => base,
        }
    }

    /// Byte slices are the only mutable scalar.
    pub const fn is_mutable(self) -> bool {
        matches!(self, ScalarKind::ByteSlice)
    }

    /// Does `literal` have the representation this kind carries?
    pub fn accepts(self, literal: &Literal) -> bool {
        match literal {
            Literal::Bool(_) => self == ScalarKind::Bool,
            Literal::Int(_) => matches!(
                self,
                ScalarKind::Int
                    | ScalarKind::Duration
                    | ScalarKind::Date
                    | ScalarKind::ByteCount
                    | ScalarKind::LineCount
                    | ScalarKind::RuneCount
                    | ScalarKind::Port
            ),
            Literal::Float(_) => self == ScalarKind::Float,
            Literal::Rune(_) => self == ScalarKind::Rune,
            Literal::Byte(_) => self == ScalarKind::Byte,
            Literal::Text(_) => matches!(
                self,
                ScalarKind::Str
                    | ScalarKind::Identifier
                    | ScalarKind::PropertyName
                    | ScalarKind::Path
                    | ScalarKind::Url
                    | ScalarKind::Host
                    | ScalarKind::EmailAddress
            ),
            Literal::Bytes(_) => self == ScalarKind::ByteSlice,
        }
    }
}

/// Concrete payload of a scalar.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    /// IEEE-754 bits; payload equality is bitwise.
    Float(u64),
    Rune(char),
    Byte(u8),
    Text(Arc<str>),
    Bytes(Arc<[u8]>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            Literal::Rune(c) => write!(f, "{c:?}"),
            Literal::Byte(b) => write!(f, "0x{b:02x}"),
            Literal::Text(s) => write!(f, "{s:?}"),
            Literal::Bytes(bytes) => write!(f, "0x[{}]", bytes.len()),
        }
    }
}

/// A scalar kind with an optional payload.
///
/// Without payload it stands for every value of the kind; with one, for
/// exactly that value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Scalar {
    kind: ScalarKind,
    literal: Option<Literal>,
}

impl Scalar {
    pub const fn unknown(kind: ScalarKind) -> Self {
        Scalar {
            kind,
            literal: None,
        }
    }

    /// `None` if the payload representation does not fit the kind.
    pub fn exact(kind: ScalarKind, literal: Literal) -> Option<Self> {
        kind.accepts(&literal).then_some(Scalar {
            kind,
            literal: Some(literal),
        })
    }

    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    #[inline]
    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.literal.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn widest(&self) -> Scalar {
        Scalar::unknown(self.kind)
    }

    /// Unknown subsumes every payload of its kind; exact subsumes only itself.
    pub fn test(&self, other: &Scalar) -> bool {
        self.kind == other.kind
            && match &self.literal {
                None => true,
                Some(literal) => other.literal.as_ref() == Some(literal),
            }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            None => f.write_str(self.kind.name()),
            Some(literal) => write!(f, "{}({literal})", self.kind.name()),
        }
    }
}
