use std::fmt::{self, Display, Write};

use crate::value::write_separated;
use crate::{Shape, Value};

use super::{Pattern, SequencePattern, ShapePattern};

fn write_shape(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    kind: &str,
    shape: &ShapePattern,
) -> fmt::Result {
    let Shape::Closed(fields) = &shape.fields else {
        return f.write_str(kind);
    };
    f.write_str(open)?;
    for (i, (key, pattern)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        let mark = if shape.is_optional(key) { "?" } else { "" };
        write!(f, "{key}{mark}: {pattern}")?;
    }
    if !shape.exact {
        f.write_str(if fields.is_empty() { "..." } else { ", ..." })?;
    }
    f.write_char('}')
}

fn write_sequence(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    seq: &SequencePattern,
) -> fmt::Result {
    match seq {
        SequencePattern::Known(patterns) => {
            f.write_str(open)?;
            write_separated(f, patterns, ", ")?;
            f.write_char(']')
        }
        SequencePattern::Of(pattern) => write!(f, "{open}]{pattern}"),
    }
}

fn write_locator(f: &mut fmt::Formatter<'_>, kind: &str, glob: Option<&str>) -> fmt::Result {
    match glob {
        None => write!(f, "%{kind}"),
        Some(glob) => write!(f, "%{kind}({glob:?})"),
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => f.write_str("%any"),
            // Type patterns print like the value they wrap.
            Pattern::Type(Value::Scalar(scalar)) if !scalar.has_value() => write!(f, "%{scalar}"),
            Pattern::Type(Value::Nil) => f.write_str("%nil"),
            Pattern::Type(value) => write!(f, "%({value})"),
            Pattern::Exact(value) => write!(f, "%exact({value})"),
            Pattern::Union(union) => {
                f.write_char('(')?;
                let sep = if union.disjoint { " ^ " } else { " | " };
                write_separated(f, &union.cases, sep)?;
                f.write_char(')')
            }
            Pattern::Intersection(inter) => {
                f.write_char('(')?;
                write_separated(f, &inter.cases, " & ")?;
                f.write_char(')')
            }
            Pattern::Difference(difference) => {
                write!(f, "({} \\ {})", difference.base, difference.removed)
            }
            Pattern::IntRange { start, end } => write!(f, "%int({start}..{end})"),
            Pattern::Object(shape) => write_shape(f, "%{", "%object", shape),
            Pattern::Record(shape) => write_shape(f, "%#{", "%record", shape),
            Pattern::List(seq) => write_sequence(f, "%[", seq),
            Pattern::Tuple(seq) => write_sequence(f, "%#[", seq),
            Pattern::Optional(inner) => write!(f, "{inner}?"),
            Pattern::Function(function) => {
                f.write_str("%fn(")?;
                write_separated(f, &function.params, ", ")?;
                f.write_char(')')?;
                match &function.result {
                    Some(result) => write!(f, " {result}"),
                    None => Ok(()),
                }
            }
            Pattern::Path(glob) => write_locator(f, "path", glob.as_deref()),
            Pattern::Url(prefix) => write_locator(f, "url", prefix.as_deref()),
            Pattern::Host(host) => write_locator(f, "host", host.as_deref()),
        }
    }
}
