use accordion_core::{AccordionEvent, Dom, ItemState, Transition};
use accordion_test_fixtures::{body, container, item, page, Harness, NodeSpec};

#[test]
fn destroy_releases_everything_and_leaves_the_dom_alone() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let node = h.page.find_all_by_class("accordion")[0];
    let id = h.engine.resolve(&node).expect("container");
    let toggle = h.page.toggle_of("one");
    let panel = h.page.panel_of("one");
    h.events();

    assert!(h.engine.destroy(&mut h.page, id));
    assert_eq!(h.page.subscription_count(), 0);
    assert_eq!(h.engine.resolve(&node), None);
    assert_eq!(h.engine.container_count(), 0);
    assert!(!h.page.has_attribute(&node, "data-accordion-hydrated"));
    assert_eq!(h.events(), vec![AccordionEvent::ContainerDestroyed { container: id }]);

    let attrs = h.page.attributes(panel).clone();
    assert_eq!(h.click(toggle), Transition::Ignored);
    assert_eq!(h.engine.on_click(&mut h.page, &toggle), Transition::Ignored);
    assert_eq!(h.page.attributes(panel), &attrs);
    assert_eq!(h.page.pending_frames(), 0);

    assert!(!h.engine.destroy(&mut h.page, id));
}

#[test]
fn teardown_mid_animation_cancels_pending_work() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let node = h.page.find_all_by_class("accordion")[0];
    let panel = h.page.panel_of("two");

    h.click_item("one");
    h.frame();
    assert_eq!(h.page.pending_timers(), 1);
    h.click_item("two");
    assert_eq!(h.page.pending_frames(), 1);

    h.remove(node);
    assert_eq!(h.engine.container_count(), 0);
    assert_eq!(h.page.pending_timers(), 0);
    // The queued close frame runs after teardown and does nothing.
    h.frame();
    assert_eq!(h.page.style(&panel, "height").as_deref(), Some("102px"));
}

#[test]
fn removing_an_ancestor_tears_down_nested_containers() {
    let mut h = Harness::new(&page("linked-containers").expect("fixture"));
    let section = h
        .page
        .descendants(&h.page.root())
        .into_iter()
        .find(|n| h.page.tag(*n) == "section")
        .expect("section");
    h.remove(section);
    assert_eq!(h.engine.container_count(), 1);

    // The removed partner is no longer a group member.
    h.click_item("left");
    h.settle();
    assert_eq!(h.state("left"), ItemState::Open);
}

#[test]
fn removing_the_outer_container_takes_the_nested_one_with_it() {
    let mut h = Harness::new(&page("nested").expect("fixture"));
    let outer = h.page.find_all_by_class("accordion")[0];
    let subscriptions_before = h.page.subscription_count();
    assert!(subscriptions_before > 0);
    h.remove(outer);
    assert_eq!(h.engine.container_count(), 0);
    assert_eq!(h.page.subscription_count(), 0);
}

#[test]
fn containers_added_later_are_hydrated() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let root = h.page.root();
    let added = container(&[("data-duration", "0")], vec![item("late", &[])]);
    let node = h.insert(root, &NodeSpec::new("div").child(added));

    assert_eq!(h.engine.container_count(), 2);
    assert!(h
        .page
        .descendants(&node)
        .iter()
        .any(|n| h.page.has_attribute(n, "data-accordion-hydrated")));
    assert_eq!(h.click_item("late"), Transition::Settled(ItemState::Open));
}

#[test]
fn items_added_and_removed_are_reconciled() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let node = h.page.find_all_by_class("accordion")[0];
    let id = h.engine.resolve(&node).expect("container");

    h.click_item("one");
    h.settle();
    h.insert(node, &item("four", &[]));
    let ids: Vec<String> = h.engine.items(id).into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["one", "two", "three", "four"]);
    assert_eq!(h.state("one"), ItemState::Open);
    assert!(h.page.has_attribute(&h.page.panel_of("four"), "hidden"));

    let toggle = h.page.toggle_of("three");
    let three = h.page.item("three");
    h.remove(three);
    assert_eq!(h.engine.items(id).len(), 3);
    assert!(h.page.subscriptions_on(toggle).is_empty());

    // Keyboard order follows the reconciled list.
    let four = h.page.toggle_of("four");
    let two = h.page.toggle_of("two");
    h.page.focus(&two);
    h.press("ArrowDown");
    assert_eq!(h.page.focused(), Some(four));
}

#[test]
fn destroyed_container_can_be_hydrated_again() {
    let mut h = Harness::new(&page("basic").expect("fixture"));
    let node = h.page.find_all_by_class("accordion")[0];
    let id = h.engine.resolve(&node).expect("container");
    h.engine.destroy(&mut h.page, id);

    assert_eq!(h.hydrate(), 1);
    let again = h.engine.resolve(&node).expect("rehydrated");
    assert_ne!(again, id);
    assert_eq!(h.page.subscriptions_on(h.page.toggle_of("one")).len(), 1);
    assert_eq!(h.state("two"), ItemState::Open);
}

#[test]
fn hydrate_scopes_to_the_given_subtree() {
    let spec = body(vec![
        container(&[], vec![item("first", &[])]),
        container(&[], vec![item("second", &[])]),
    ]);
    let mut h = Harness::unhydrated(&spec);
    let second = h.page.find_all_by_class("accordion")[1];
    let created = h.engine.hydrate(&mut h.page, &second);
    assert_eq!(created.len(), 1);
    assert_eq!(h.engine.resolve(&second), created.first().copied());
    assert!(h.page.subscriptions_on(h.page.toggle_of("first")).is_empty());
}

#[test]
fn destroy_all_clears_every_container() {
    let mut h = Harness::new(&page("nested").expect("fixture"));
    let outer = h.page.item("outer-1");
    assert_eq!(h.engine.item_by_node(&outer), Some(h.key_of("outer-1")));

    assert_eq!(h.engine.destroy_all(&mut h.page), 2);
    assert_eq!(h.engine.container_count(), 0);
    assert_eq!(h.page.subscription_count(), 0);
    assert_eq!(h.engine.item_by_node(&outer), None);
    assert_eq!(h.engine.destroy_all(&mut h.page), 0);
}
