#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn parses_pixels() {
    let len = CssLength::parse("8px").unwrap();
    assert_eq!(len, CssLength::px(8.0));
}

#[test]
fn parses_fractional_relative_units() {
    assert_eq!(CssLength::parse("1.5rem").unwrap().unit, CssUnit::Rem);
    assert_eq!(CssLength::parse("100%").unwrap().unit, CssUnit::Percent);
    assert_eq!(CssLength::parse(" 50VW ").unwrap().unit, CssUnit::Vw);
}

#[test]
fn rejects_empty_and_unitless() {
    assert_eq!(CssLength::parse("  "), Err(CssLengthError::Empty));
    assert!(matches!(CssLength::parse("24"), Err(CssLengthError::Unit(_))));
}

#[test]
fn rejects_unknown_unit() {
    assert!(matches!(CssLength::parse("3pt"), Err(CssLengthError::Unit(_))));
}

#[test]
fn rejects_malformed_number() {
    assert!(matches!(CssLength::parse("1.2.3px"), Err(CssLengthError::Number(_))));
    assert!(matches!(CssLength::parse("px"), Err(CssLengthError::Number(_))));
}

#[test]
fn rejects_zero_and_negative() {
    assert!(matches!(CssLength::parse("0px"), Err(CssLengthError::NotPositive(_))));
    assert!(CssLength::parse("-4px").is_err());
}

#[test]
fn display_keeps_authored_form() {
    assert_eq!(CssLength::parse("1140px").unwrap().to_string(), "1140px");
    assert_eq!(CssLength::parse("0.5rem").unwrap().to_string(), "0.5rem");
    assert_eq!(CssLength::parse("100%").unwrap().to_string(), "100%");
}

#[test]
fn resolves_against_context() {
    let ctx = LengthContext { container_px: 1000.0, viewport_px: 1440.0, font_px: 16.0 };
    assert_eq!(CssLength::parse("24px").unwrap().resolve_px(&ctx), 24.0);
    assert_eq!(CssLength::parse("2rem").unwrap().resolve_px(&ctx), 32.0);
    assert_eq!(CssLength::parse("50%").unwrap().resolve_px(&ctx), 500.0);
    assert_eq!(CssLength::parse("10vw").unwrap().resolve_px(&ctx), 144.0);
}

#[test]
fn half_keeps_unit() {
    assert_eq!(CssLength::parse("24px").unwrap().half(), CssLength::px(12.0));
}
