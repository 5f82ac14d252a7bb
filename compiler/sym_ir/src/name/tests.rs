use super::*;
use pretty_assertions::assert_eq;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("alpha");
    let b = interner.intern("alpha");
    let c = interner.intern("beta");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "alpha");
    assert_eq!(interner.lookup(c), "beta");
}

#[test]
fn empty_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert_eq!(interner.len(), 1);
}

#[test]
#[should_panic(expected = "was not produced by this interner")]
fn foreign_name_panics() {
    let interner = StringInterner::new();
    interner.lookup(Name::from_raw(42));
}
