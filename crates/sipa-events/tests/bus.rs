//! Subscription bookkeeping tests for sipa-events

use std::cell::Cell;
use std::rc::Rc;

use sipa_events::{listener, EventBus, Listener};

fn counting(counter: &Rc<Cell<u32>>) -> Listener<()> {
    let counter = counter.clone();
    listener(move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    })
}

// ============================================================================
// EXACTLY-ONCE SUBSCRIPTION
// ============================================================================

#[test]
fn test_same_listener_three_times_is_stored_once() {
    let calls = Rc::new(Cell::new(0));
    let handler = counting(&calls);
    let mut bus = EventBus::new(["saved"]).unwrap();

    bus.subscribe("saved", handler.clone()).unwrap();
    bus.subscribe("saved", handler.clone()).unwrap();
    bus.subscribe("saved", handler.clone()).unwrap();

    assert_eq!(bus.listener_count("saved"), 1);
    bus.trigger("saved", &mut ()).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_distinct_closures_are_distinct_listeners() {
    let calls = Rc::new(Cell::new(0));
    let mut bus = EventBus::new(["saved"]).unwrap();
    bus.subscribe("saved", counting(&calls)).unwrap();
    bus.subscribe("saved", counting(&calls)).unwrap();

    bus.trigger("saved", &mut ()).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_same_listener_on_two_events() {
    let calls = Rc::new(Cell::new(0));
    let handler = counting(&calls);
    let mut bus = EventBus::new(["a", "b"]).unwrap();
    bus.subscribe("a", handler.clone()).unwrap();
    bus.subscribe("b", handler.clone()).unwrap();

    bus.trigger("a", &mut ()).unwrap();
    bus.trigger("b", &mut ()).unwrap();
    assert_eq!(calls.get(), 2);
}

// ============================================================================
// UNSUBSCRIBE / RESET
// ============================================================================

#[test]
fn test_unsubscribe_removes_only_that_pairing() {
    let first_calls = Rc::new(Cell::new(0));
    let second_calls = Rc::new(Cell::new(0));
    let first = counting(&first_calls);
    let second = counting(&second_calls);
    let mut bus = EventBus::new(["tick"]).unwrap();
    bus.subscribe("tick", first.clone()).unwrap();
    bus.subscribe("tick", second.clone()).unwrap();

    bus.unsubscribe("tick", &first);
    bus.trigger("tick", &mut ()).unwrap();

    assert_eq!(first_calls.get(), 0);
    assert_eq!(second_calls.get(), 1);
}

#[test]
fn test_unsubscribe_unknown_is_not_an_error() {
    let calls = Rc::new(Cell::new(0));
    let handler = counting(&calls);
    let mut bus = EventBus::new(["tick"]).unwrap();

    bus.unsubscribe("tick", &handler);
    bus.unsubscribe("nope", &handler);
    assert_eq!(bus.listener_count("tick"), 0);
}

#[test]
fn test_unsubscribe_all_and_reset() {
    let calls = Rc::new(Cell::new(0));
    let mut bus = EventBus::new(["a", "b"]).unwrap();
    bus.subscribe("a", counting(&calls)).unwrap();
    bus.subscribe("a", counting(&calls)).unwrap();
    bus.subscribe("b", counting(&calls)).unwrap();

    bus.unsubscribe_all("a");
    assert_eq!(bus.listener_count("a"), 0);
    assert_eq!(bus.listener_count("b"), 1);

    bus.reset();
    assert_eq!(bus.listener_count("b"), 0);
    assert_eq!(bus.event_names().to_vec(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_trigger_without_listeners_is_ok() {
    let bus = EventBus::<()>::new(["quiet"]).unwrap();
    assert!(bus.trigger("quiet", &mut ()).is_ok());
}

// ============================================================================
// DYNAMIC NAMES
// ============================================================================

#[test]
fn test_add_and_remove_event_names() {
    let calls = Rc::new(Cell::new(0));
    let mut bus = EventBus::new(["base"]).unwrap();
    assert!(bus.subscribe("extra", counting(&calls)).is_err());

    bus.add_event_name("extra");
    bus.subscribe("extra", counting(&calls)).unwrap();
    bus.trigger("extra", &mut ()).unwrap();
    assert_eq!(calls.get(), 1);

    bus.remove_event_name("extra");
    assert!(bus.trigger("extra", &mut ()).is_err());
    assert_eq!(bus.listener_count("extra"), 0);
}

#[test]
fn test_listener_may_resubscribe_during_trigger() {
    let bus = Rc::new(std::cell::RefCell::new(EventBus::<()>::new(["go"]).unwrap()));
    let inner = bus.clone();
    bus.borrow_mut()
        .subscribe(
            "go",
            listener(move |_| {
                // Snapshot dispatch means the bus is free to mutate here
                inner.borrow_mut().add_event_name("later");
                Ok(())
            }),
        )
        .unwrap();

    let listeners = bus.borrow().listeners("go");
    sipa_events::dispatch("go", &listeners, &mut ()).unwrap();
    assert!(bus.borrow().is_valid("later"));
}
