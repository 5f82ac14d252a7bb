use super::*;
use pretty_assertions::assert_eq;

#[test]
fn every_code_round_trips_through_parse() {
    for code in ErrorCode::ALL {
        assert_eq!(ErrorCode::parse(code.as_str()), Some(*code));
    }
    assert_eq!(ErrorCode::parse("e2001"), Some(ErrorCode::E2001));
    assert_eq!(ErrorCode::parse("E9999"), None);
}

#[test]
fn only_w_codes_are_warnings() {
    for code in ErrorCode::ALL {
        assert_eq!(code.is_warning(), code.as_str().starts_with('W'), "{code}");
    }
}
