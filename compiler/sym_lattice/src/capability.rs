//! Capabilities a value can fulfil regardless of its concrete kind.
//!
//! A capability marker (`Value::Marker`) stands for "some value fulfilling
//! these capabilities" and subsumes every value whose
//! [`Value::capabilities`](crate::Value::capabilities) contain them.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
    pub struct Capabilities: u16 {
        /// Can be the subject of a `for` loop.
        const ITERABLE = 1 << 0;
        /// Supports positional indexing.
        const INDEXABLE = 1 << 1;
        /// Mutations can be observed.
        const WATCHABLE = 1 << 2;
        /// Has a serialized representation.
        const SERIALIZABLE = 1 << 3;
        /// Exposes the string operations.
        const STR_LIKE = 1 << 4;
        /// Exposes the byte-sequence operations.
        const BYTES_LIKE = 1 << 5;
        /// Names a resource: path, url, or host.
        const RESOURCE_NAME = 1 << 6;
        const CALLABLE = 1 << 7;
        const NUMERIC = 1 << 8;
        /// Is a pattern.
        const PATTERN = 1 << 9;
    }
}

impl Capabilities {
    /// Capabilities whose every fulfiller is immutable.
    pub const IMMUTABLE_ONLY: Self = Self::from_bits_truncate(
        Self::STR_LIKE.bits()
            | Self::RESOURCE_NAME.bits()
            | Self::NUMERIC.bits()
            | Self::PATTERN.bits(),
    );

    /// Marker name, e.g. `iterable` or `(iterable & watchable)`.
    pub fn describe(self) -> String {
        const NAMES: &[(Capabilities, &str)] = &[
            (Capabilities::ITERABLE, "iterable"),
            (Capabilities::INDEXABLE, "indexable"),
            (Capabilities::WATCHABLE, "watchable"),
            (Capabilities::SERIALIZABLE, "serializable"),
            (Capabilities::STR_LIKE, "string-like"),
            (Capabilities::BYTES_LIKE, "bytes-like"),
            (Capabilities::RESOURCE_NAME, "resource-name"),
            (Capabilities::CALLABLE, "callable"),
            (Capabilities::NUMERIC, "numeric"),
            (Capabilities::PATTERN, "pattern"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        match names.as_slice() {
            [] => "anything".to_string(),
            [one] => (*one).to_string(),
            many => format!("({})", many.join(" & ")),
        }
    }
}
