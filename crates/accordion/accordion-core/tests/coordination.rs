use accordion_core::{Dom, ItemState, KeyOutcome, Transition};
use accordion_test_fixtures::{body, container, item, page, Harness};

#[test]
fn auto_close_keeps_a_single_item_open() {
    let mut h = Harness::new(&page("auto-close-linked").expect("fixture"));
    h.click_item("a");
    h.settle();
    assert_eq!(h.state("a"), ItemState::Open);

    // Opening b closes a and pulls its link partner c open with it.
    h.click_item("b");
    assert_eq!(h.state("a"), ItemState::Closing);
    assert_eq!(h.state("b"), ItemState::Opening);
    assert_eq!(h.state("c"), ItemState::Opening);
    h.settle();
    assert_eq!(h.state("a"), ItemState::Closed);
    assert_eq!(h.state("b"), ItemState::Open);
    assert_eq!(h.state("c"), ItemState::Open);

    h.click_item("a");
    h.settle();
    assert_eq!(h.state("a"), ItemState::Open);
    assert_eq!(h.state("b"), ItemState::Closed);
    assert_eq!(h.state("c"), ItemState::Closed);
}

#[test]
fn auto_close_spares_link_partners_of_the_opened_item() {
    let spec = body(vec![container(
        &[("data-auto-close", "true")],
        vec![
            item("a", &[("data-open-default", "true")]),
            item("b", &[("data-link-group", "g"), ("data-open-default", "true")]),
            item("c", &[("data-link-group", "g")]),
        ],
    )]);
    let mut h = Harness::new(&spec);
    assert_eq!(h.state("a"), ItemState::Open);
    assert_eq!(h.state("b"), ItemState::Open);

    h.click_item("c");
    assert_eq!(h.state("a"), ItemState::Closing);
    assert_eq!(h.state("b"), ItemState::Open);
    h.settle();
    assert_eq!(h.state("a"), ItemState::Closed);
    assert_eq!(h.state("b"), ItemState::Open);
    assert_eq!(h.state("c"), ItemState::Open);
}

#[test]
fn without_auto_close_items_open_independently() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    h.click_item("one");
    h.settle();
    assert_eq!(h.state("one"), ItemState::Open);
    assert_eq!(h.state("two"), ItemState::Open);
}

#[test]
fn link_group_propagates_across_containers_in_the_same_turn() {
    let mut h = Harness::new(&page("linked-containers").expect("fixture"));
    h.click_item("left");
    assert_eq!(h.state("left"), ItemState::Opening);
    assert_eq!(h.state("right"), ItemState::Opening);
    assert_eq!(h.state("left-solo"), ItemState::Closed);

    // The partner animates with its own Container's settings.
    let right_panel = h.page.panel_of("right");
    h.frame();
    assert_eq!(
        h.page.style(&right_panel, "transition").as_deref(),
        Some("height 0.2s ease")
    );
    let child = h.page.children(&right_panel)[0];
    assert_eq!(h.page.style(&child, "opacity"), None);

    h.settle();
    assert_eq!(h.state("left"), ItemState::Open);
    assert_eq!(h.state("right"), ItemState::Open);

    h.click_item("right");
    assert_eq!(h.state("left"), ItemState::Closing);
    h.settle();
    assert_eq!(h.state("left"), ItemState::Closed);
    assert_eq!(h.state("right"), ItemState::Closed);
}

#[test]
fn programmatic_control_follows_link_groups() {
    let mut h = Harness::new(&page("linked-containers").expect("fixture"));
    let left = h.key_of("left");
    h.engine.open(&mut h.page, left);
    h.settle();
    assert_eq!(h.state("right"), ItemState::Open);
    h.engine.close(&mut h.page, left);
    h.settle();
    assert_eq!(h.state("right"), ItemState::Closed);
}

#[test]
fn ignored_requests_do_not_propagate() {
    let mut h = Harness::new(&page("linked-containers").expect("fixture"));
    let left = h.key_of("left");
    assert_eq!(h.engine.close(&mut h.page, left), Transition::Ignored);
    assert_eq!(h.page.pending_frames(), 0);
    assert_eq!(h.state("right"), ItemState::Closed);
}

#[test]
fn unhydrated_link_partner_gets_a_plain_state_change() {
    let mut h = Harness::unhydrated(&page("linked-containers").expect("fixture"));
    let first = h.page.find_all_by_class("accordion")[0];
    assert_eq!(h.engine.hydrate(&mut h.page, &first).len(), 1);

    h.click_item("left");
    let right = h.page.item("right");
    assert!(h.page.has_class(&right, "is-open"));
    assert_eq!(
        h.page.attribute(&h.page.toggle_of("right"), "aria-expanded").as_deref(),
        Some("true")
    );

    h.settle();
    h.click_item("left");
    assert!(!h.page.has_class(&right, "is-open"));
    assert!(h.page.has_attribute(&h.page.panel_of("right"), "hidden"));
}

#[test]
fn arrow_keys_wrap_and_home_end_jump() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let one = h.page.toggle_of("one");
    let two = h.page.toggle_of("two");
    let three = h.page.toggle_of("three");

    h.page.focus(&three);
    assert_eq!(h.press("ArrowDown"), KeyOutcome::Handled);
    assert_eq!(h.page.focused(), Some(one));

    assert_eq!(h.press("ArrowUp"), KeyOutcome::Handled);
    assert_eq!(h.page.focused(), Some(three));

    h.page.focus(&two);
    h.press("Home");
    assert_eq!(h.page.focused(), Some(one));
    h.press("End");
    assert_eq!(h.page.focused(), Some(three));
    h.press("ArrowUp");
    assert_eq!(h.page.focused(), Some(two));

    assert_eq!(h.press("Tab"), KeyOutcome::Ignored);
    assert_eq!(h.page.focused(), Some(two));
}

#[test]
fn enter_and_space_toggle_the_focused_item() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let one = h.page.toggle_of("one");
    h.page.focus(&one);

    assert_eq!(h.press("Enter"), KeyOutcome::Handled);
    assert_eq!(h.state("one"), ItemState::Opening);
    h.settle();
    assert_eq!(h.press(" "), KeyOutcome::Handled);
    assert_eq!(h.state("one"), ItemState::Closing);
    assert_eq!(h.page.focused(), Some(one));
}

#[test]
fn keys_outside_toggles_are_not_handled() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let panel = h.page.panel_of("one");
    assert_eq!(h.key(panel, "ArrowDown"), KeyOutcome::Ignored);
    assert_eq!(h.page.focused(), None);
}

#[test]
fn nested_accordions_handle_their_own_keys_and_clicks() {
    let mut h = Harness::new(&page("nested").expect("fixture"));
    assert_eq!(h.engine.container_count(), 2);

    let inner_1 = h.page.toggle_of("inner-1");
    let inner_2 = h.page.toggle_of("inner-2");
    h.page.focus(&inner_2);
    assert_eq!(h.press("ArrowDown"), KeyOutcome::Handled);
    assert_eq!(h.page.focused(), Some(inner_1));

    h.click_item("outer-1");
    h.settle();
    h.click_item("inner-1");
    h.settle();
    assert_eq!(h.state("outer-1"), ItemState::Open);
    assert_eq!(h.state("inner-1"), ItemState::Open);

    // Outer auto-close does not reach into the nested Container.
    h.click_item("inner-2");
    h.settle();
    assert_eq!(h.state("inner-1"), ItemState::Open);
    assert_eq!(h.state("outer-1"), ItemState::Open);

    h.click_item("outer-2");
    h.settle();
    assert_eq!(h.state("outer-1"), ItemState::Closed);
    assert_eq!(h.state("inner-1"), ItemState::Open);
}

#[test]
fn reduced_motion_completes_without_frames_or_timers() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    h.page.set_reduced_motion(true);

    assert_eq!(h.click_item("one"), Transition::Settled(ItemState::Open));
    assert_eq!(h.page.pending_frames(), 0);
    assert_eq!(h.page.pending_timers(), 0);
    let panel = h.page.panel_of("one");
    assert!(h.page.styles(panel).is_empty());
    assert!(!h.page.has_attribute(&panel, "hidden"));

    assert_eq!(h.click_item("one"), Transition::Settled(ItemState::Closed));
    assert_eq!(h.page.pending_frames(), 0);
    assert!(h.page.has_attribute(&panel, "hidden"));
    for child in h.page.children(&panel) {
        assert!(h.page.styles(child).is_empty());
    }
}

#[test]
fn reduced_motion_is_read_at_activation_time() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    h.click_item("one");
    assert_eq!(h.state("one"), ItemState::Opening);
    h.settle();

    h.page.set_reduced_motion(true);
    assert_eq!(h.click_item("one"), Transition::Settled(ItemState::Closed));
}
