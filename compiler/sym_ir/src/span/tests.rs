use super::*;
use pretty_assertions::assert_eq;

#[test]
fn merge_covers_both() {
    let a = Span::new(4, 9);
    let b = Span::new(2, 6);
    assert_eq!(a.merge(b), Span::new(2, 9));
    assert_eq!(b.merge(a), Span::new(2, 9));
}

#[test]
fn try_from_range_rejects_inverted() {
    assert_eq!(
        Span::try_from_range(5..3),
        Err(SpanError::Inverted { start: 5, end: 3 })
    );
    assert_eq!(Span::try_from_range(3..5), Ok(Span::new(3, 5)));
}

#[test]
fn contains_is_end_exclusive() {
    let span = Span::new(1, 3);
    assert!(span.contains(1));
    assert!(span.contains(2));
    assert!(!span.contains(3));
    assert_eq!(span.len(), 2);
    assert!(Span::DUMMY.is_empty());
}

#[test]
fn source_pos_renders_unit_and_offsets() {
    let pos = SourcePos::new("main.sym".into(), Span::new(10, 14));
    assert_eq!(pos.to_string(), "main.sym:10:14");
}
