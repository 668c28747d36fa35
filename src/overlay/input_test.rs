use super::*;

#[test]
fn button_from_dom_index() {
    assert_eq!(Button::from_dom(0), Button::Primary);
    assert_eq!(Button::from_dom(1), Button::Middle);
    assert_eq!(Button::from_dom(2), Button::Secondary);
}

#[test]
fn extra_buttons_are_not_primary() {
    assert_eq!(Button::from_dom(3), Button::Other(3));
    assert_eq!(Button::from_dom(4), Button::Other(4));
    assert_eq!(Button::from_dom(-1), Button::Other(-1));
}

#[test]
fn key_from_dom_names() {
    assert_eq!(Key::from_dom("Control"), Key::Control);
    assert_eq!(Key::from_dom(" "), Key::Space);
    assert_eq!(Key::from_dom("Escape"), Key::Escape);
    assert_eq!(Key::from_dom("ArrowLeft"), Key::ArrowLeft);
    assert_eq!(Key::from_dom("a"), Key::Other("a".into()));
}

#[test]
fn arrow_nudges_one_pixel_per_axis() {
    assert_eq!(Key::ArrowUp.nudge(), Some((0, -1)));
    assert_eq!(Key::ArrowDown.nudge(), Some((0, 1)));
    assert_eq!(Key::ArrowLeft.nudge(), Some((-1, 0)));
    assert_eq!(Key::ArrowRight.nudge(), Some((1, 0)));
    assert_eq!(Key::Space.nudge(), None);
}

#[test]
fn form_controls_are_detected() {
    assert!(KeyTarget::TextInput.is_form_control());
    assert!(KeyTarget::Select.is_form_control());
    assert!(!KeyTarget::Page.is_form_control());
}

#[test]
fn key_event_defaults_to_page_target() {
    assert_eq!(KeyEvent::new(Key::Space).target, KeyTarget::Page);
}
