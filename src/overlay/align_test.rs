use super::*;

const PAGE: Size = Size { width: 1440.0, height: 3000.0 };
const OVERLAY: Size = Size { width: 1000.0, height: 2000.0 };

#[test]
fn default_is_top_center() {
    assert_eq!(Alignment::default(), Alignment::TopCenter);
    assert_eq!(Alignment::default().target(PAGE, OVERLAY), Position::new(220, 0));
}

#[test]
fn corners() {
    assert_eq!(Alignment::TopLeft.target(PAGE, OVERLAY), Position::new(0, 0));
    assert_eq!(Alignment::TopRight.target(PAGE, OVERLAY), Position::new(440, 0));
    assert_eq!(Alignment::BottomLeft.target(PAGE, OVERLAY), Position::new(0, 1000));
    assert_eq!(Alignment::BottomRight.target(PAGE, OVERLAY), Position::new(440, 1000));
}

#[test]
fn centers() {
    assert_eq!(Alignment::Center.target(PAGE, OVERLAY), Position::new(220, 500));
    assert_eq!(Alignment::CenterLeft.target(PAGE, OVERLAY), Position::new(0, 500));
    assert_eq!(Alignment::CenterRight.target(PAGE, OVERLAY), Position::new(440, 500));
    assert_eq!(Alignment::BottomCenter.target(PAGE, OVERLAY), Position::new(220, 1000));
}

#[test]
fn oversized_overlay_overhangs() {
    let wide = Size::new(2000.0, 100.0);
    assert_eq!(Alignment::TopRight.target(PAGE, wide), Position::new(-560, 0));
}

#[test]
fn odd_remainders_round() {
    let page = Size::new(101.0, 101.0);
    let overlay = Size::new(50.0, 50.0);
    assert_eq!(Alignment::Center.target(page, overlay), Position::new(26, 26));
}

#[test]
fn names_round_trip() {
    for alignment in Alignment::ALL {
        assert_eq!(alignment.as_str().parse::<Alignment>().unwrap(), alignment);
    }
    assert!("middle".parse::<Alignment>().is_err());
}
