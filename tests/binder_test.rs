mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{element, legacy, seen, standard};
use dom_compat::{Compat, Event, Handler, Outcome, Point, Rect, SyntheticEvent, Target};
use keyboard_types::Modifiers;

fn recorder(log: &common::Seen) -> Handler {
    let log = Rc::clone(log);
    Handler::new(move |event: &Event| log.borrow_mut().push(event.clone()))
}

fn click_reports_dispatch_target(compat: Compat) {
    let button = element(&compat, "button");
    let log = seen();
    compat
        .bind(&button, "click", recorder(&log), false)
        .expect("listener");

    compat
        .host()
        .dispatch(&SyntheticEvent::mouse("click", button.clone(), Point::new(5.0, 6.0)));

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].target, button);
    assert_eq!(log[0].kind, "click");
    assert_eq!(log[0].client, Some(Point::new(5.0, 6.0)));
}

#[tokio::test]
async fn target_matches_dispatch_target_on_both_hosts() {
    click_reports_dispatch_target(standard());
    click_reports_dispatch_target(legacy());
}

#[tokio::test]
async fn legacy_left_button_and_modifiers_are_normalized() {
    let compat = legacy();
    let button = element(&compat, "button");
    let log = seen();
    compat.bind(&button, "mousedown", recorder(&log), false);

    let outcome = compat.host().dispatch(
        &SyntheticEvent::mouse("mousedown", button.clone(), Point::new(1.0, 1.0))
            .with_modifiers(Modifiers::CONTROL),
    );
    assert!(!outcome.default_prevented);

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    let event = &log[0];
    assert!(event.ctrl_key);
    assert!(!event.shift_key);
    assert_eq!(event.button, Some(0));
    assert_eq!(event.original.borrow().button, Some(1));
}

#[tokio::test]
async fn legacy_page_and_offset_coordinates_are_derived() {
    let compat = legacy();
    let button = element(&compat, "button");
    compat.document().scroll_to(Point::new(0.0, 100.0));
    compat
        .document()
        .set_bounding_rect(&button, Rect::new(10.0, 20.0, 50.0, 20.0));
    let log = seen();
    compat.bind(&button, "click", recorder(&log), false);

    compat
        .host()
        .dispatch(&SyntheticEvent::mouse("click", button, Point::new(15.0, 30.0)));

    let log = log.borrow();
    assert_eq!(log[0].page, Some(Point::new(15.0, 130.0)));
    assert_eq!(log[0].offset, Some(Point::new(5.0, 10.0)));
}

#[tokio::test]
async fn keypress_falls_back_to_char_code() {
    let compat = standard();
    let button = element(&compat, "button");
    let log = seen();
    compat.bind(&button, "keypress", recorder(&log), false);

    compat
        .host()
        .dispatch(&SyntheticEvent::key("keypress", button, 0, 97));

    let log = log.borrow();
    assert_eq!(log[0].key_code, Some(97));
    assert_eq!(log[0].button, None);
}

#[tokio::test]
async fn missing_handler_registers_nothing() {
    for compat in [standard(), legacy()] {
        let button = element(&compat, "button");
        assert!(compat.bind(&button, "click", None, false).is_none());
        assert_eq!(compat.host().listener_count(&button, "click"), 0);

        let outcome = compat
            .host()
            .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
        assert!(!outcome.default_prevented);
        assert!(!outcome.propagation_stopped);
    }
}

#[tokio::test]
async fn text_nodes_cannot_be_bound() {
    let compat = standard();
    let text = element(&compat, "button").first_child().expect("text node");
    assert!(!text.is_element());

    let log = seen();
    assert!(compat.bind(&text, "click", recorder(&log), false).is_none());
    assert_eq!(compat.host().listener_count(&text, "click"), 0);
}

#[tokio::test]
async fn unbind_with_returned_listener() {
    for compat in [standard(), legacy()] {
        let button = element(&compat, "button");
        let log = seen();
        let listener = compat
            .bind(&button, "click", recorder(&log), false)
            .expect("listener");
        assert_eq!(compat.host().listener_count(&button, "click"), 1);

        compat.unbind(&button, "click", &listener, false);
        assert_eq!(compat.host().listener_count(&button, "click"), 0);

        compat
            .host()
            .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
        assert!(log.borrow().is_empty());
    }
}

#[tokio::test]
async fn binding_twice_registers_twice() {
    let compat = standard();
    let button = element(&compat, "button");
    let log = seen();
    let handler = recorder(&log);
    compat.bind(&button, "click", handler.clone(), false);
    compat.bind(&button, "click", handler, false);

    compat
        .host()
        .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
    assert_eq!(log.borrow().len(), 2);
}

fn tagger(order: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Handler {
    let order = Rc::clone(order);
    Handler::new(move |_: &Event| order.borrow_mut().push(tag))
}

#[tokio::test]
async fn standard_host_runs_capture_before_bubble() {
    let compat = standard();
    let outer = element(&compat, "outer");
    let button = element(&compat, "button");
    let order = Rc::new(RefCell::new(Vec::new()));
    compat.bind(&outer, "click", tagger(&order, "outer-bubble"), false);
    compat.bind(&outer, "click", tagger(&order, "outer-capture"), true);
    compat.bind(&button, "click", tagger(&order, "button"), false);

    compat
        .host()
        .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
    assert_eq!(
        *order.borrow(),
        vec!["outer-capture", "button", "outer-bubble"]
    );
}

#[tokio::test]
async fn legacy_host_ignores_capture() {
    let compat = legacy();
    let outer = element(&compat, "outer");
    let button = element(&compat, "button");
    let order = Rc::new(RefCell::new(Vec::new()));
    compat.bind(&outer, "click", tagger(&order, "outer-capture"), true);
    compat.bind(&button, "click", tagger(&order, "button"), false);

    compat
        .host()
        .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
    assert_eq!(*order.borrow(), vec!["button", "outer-capture"]);
}

#[tokio::test]
async fn returning_false_prevents_default() {
    for compat in [standard(), legacy()] {
        let button = element(&compat, "button");
        compat.bind(&button, "click", Handler::new(|_: &Event| false), false);

        let outcome = compat
            .host()
            .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
        assert!(outcome.default_prevented);
    }
}

#[tokio::test]
async fn cancel_outcome_prevents_default() {
    let compat = legacy();
    let button = element(&compat, "button");
    compat.bind(
        &button,
        "submit",
        Handler::new(|_: &Event| Outcome::Cancel),
        false,
    );

    let outcome = compat
        .host()
        .dispatch(&SyntheticEvent::new("submit", button));
    assert!(outcome.default_prevented);
    assert!(!outcome.propagation_stopped);
}

#[tokio::test]
async fn stop_propagation_keeps_event_off_ancestors() {
    for compat in [standard(), legacy()] {
        let outer = element(&compat, "outer");
        let button = element(&compat, "button");
        let log = seen();
        compat.bind(&outer, "click", recorder(&log), false);
        compat.bind(
            &button,
            "click",
            Handler::new(|event: &Event| event.stop_propagation()),
            false,
        );

        let outcome = compat
            .host()
            .dispatch(&SyntheticEvent::mouse("click", button, Point::new(0.0, 0.0)));
        assert!(outcome.propagation_stopped);
        assert!(log.borrow().is_empty());
    }
}

#[tokio::test]
async fn window_and_document_are_bindable() {
    let compat = standard();
    let log = seen();
    assert!(compat
        .bind(&Target::Window, "load", recorder(&log), false)
        .is_some());
    assert!(compat
        .bind(&Target::Document, "click", recorder(&log), false)
        .is_some());

    compat.host().finish_loading();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].target, Target::Window);
}
