use std::fmt::{self, Display, Write};

use super::{DictionaryValue, Elements, ListValue, ObjectValue, Shape, Value};

fn write_list(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    list: &ListValue,
    close: &str,
) -> fmt::Result {
    match &list.elements {
        Elements::Known(values) => {
            f.write_str(open)?;
            write_separated(f, values, ", ")?;
            f.write_str(close)
        }
        Elements::Of(element) => write!(f, "{open}{close}{element}"),
    }
}

pub(crate) fn write_separated<T: Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_fields(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    kind: &str,
    object: &ObjectValue,
) -> fmt::Result {
    let Shape::Closed(entries) = &object.entries else {
        return f.write_str(kind);
    };
    f.write_str(open)?;
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        let mark = if object.is_optional(key) { "?" } else { "" };
        write!(f, "{key}{mark}: {value}")?;
    }
    if !object.exact {
        f.write_str(if entries.is_empty() { "..." } else { ", ..." })?;
    }
    f.write_char('}')
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Any => f.write_str("any"),
            Value::Never => f.write_str("never"),
            Value::Nil => f.write_str("nil"),
            Value::Scalar(scalar) => write!(f, "{scalar}"),
            Value::Marker(capabilities) => write!(f, "any-{}", capabilities.describe()),
            Value::List(list) => write_list(f, "[", list, "]"),
            Value::Tuple(tuple) => write_list(f, "#[", tuple, "]"),
            Value::Object(object) => write_fields(f, "{", "object", object),
            Value::Record(record) => write_fields(f, "#{", "record", record),
            Value::Dictionary(dict) => match dict.as_ref() {
                DictionaryValue::Known(entries) => {
                    f.write_str(":{")?;
                    for (i, (key, value)) in entries.values().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{key}: {value}")?;
                    }
                    f.write_char('}')
                }
                DictionaryValue::Of { key, value } => write!(f, "dictionary({key}, {value})"),
            },
            Value::KeyList(keys) => match &keys.keys {
                Shape::Open => f.write_str("keylist"),
                Shape::Closed(keys) => {
                    f.write_str(".{")?;
                    let keys: Vec<&String> = keys.iter().collect();
                    write_separated(f, &keys, ", ")?;
                    f.write_char('}')
                }
            },
            Value::Function(function) => match function.signature() {
                None => f.write_str("fn"),
                Some(signature) => {
                    f.write_str("fn(")?;
                    write_separated(f, &signature.params, ", ")?;
                    write!(f, ") {}", signature.result)
                }
            },
            Value::Native(native) => write!(f, "native {}", native.name),
            Value::Routine(routine) => write!(f, "routine({})", routine.result),
            Value::Pattern(pattern) => write!(f, "{pattern}"),
            Value::Multi(multi) => {
                f.write_char('(')?;
                write_separated(f, multi.members(), " | ")?;
                f.write_char(')')
            }
        }
    }
}
