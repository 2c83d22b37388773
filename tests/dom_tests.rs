mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::fixtures::{checkbox, input, option, radio};
use saveform::dom::events::{Event, ListenerId};
use saveform::{Document, Element};

// =========================================================================
// Control state
// =========================================================================

#[test]
fn value_falls_back_to_markup_until_dirty() {
    let el = input("q", "text", "default");
    assert_eq!(el.value(), "default");

    el.set_value("typed");
    assert_eq!(el.value(), "typed");
    assert_eq!(el.attr("value").as_deref(), Some("default"), "Attribute untouched");

    let textarea = Element::new("textarea").with_text("body text");
    assert_eq!(textarea.value(), "body text");
    assert_eq!(Element::new("input").value(), "");
}

#[test]
fn control_type_defaults() {
    assert_eq!(Element::new("input").control_type(), "text");
    assert_eq!(Element::new("input").with_attr("type", " Email ").control_type(), "email");
    assert_eq!(Element::new("select").control_type(), "select-one");
    assert_eq!(
        Element::new("select").with_attr("multiple", "").control_type(),
        "select-multiple"
    );
    assert_eq!(Element::new("button").control_type(), "submit");
    assert_eq!(Element::new("div").control_type(), "");
}

#[test]
fn checkable_inputs_report_on_without_value_attribute() {
    let el = Element::new("input").with_attr("type", "checkbox");
    assert_eq!(el.value(), "on");
    assert!(!el.checked());

    el.set_checked(true);
    assert!(el.checked());
}

#[test]
fn single_select_value_follows_selection() {
    let select = Element::new("select")
        .with_attr("name", "size")
        .with_children([option("s", false), option("m", false), option("l", false)]);
    assert_eq!(select.value(), "s", "First option shown when nothing selected");

    select.set_value("l");
    assert_eq!(select.value(), "l");
    let selected: Vec<bool> = select.options().iter().map(|o| o.selected()).collect();
    assert_eq!(selected, vec![false, false, true]);

    select.set_value("xl");
    assert!(select.options().iter().all(|o| !o.selected()));
    assert_eq!(select.value(), "", "Explicitly cleared selection has no value");
}

#[test]
fn option_value_defaults_to_trimmed_text() {
    let select = Element::new("select").with_child(Element::new("option").with_text("  Blue "));
    assert_eq!(select.value(), "Blue");
}

#[test]
fn checking_a_radio_unchecks_its_group_within_the_form() {
    let red = radio("color", "red", true);
    let blue = radio("color", "blue", false);
    let other_form_red = radio("color", "red", true);
    let _form = Element::new("form").with_children([red.clone(), blue.clone()]);
    let _other = Element::new("form").with_child(other_form_red.clone());

    blue.set_checked(true);

    assert!(!red.checked());
    assert!(blue.checked());
    assert!(other_form_red.checked(), "Groups are scoped to their form");
}

// =========================================================================
// Tree and form association
// =========================================================================

#[test]
fn append_child_moves_between_parents() {
    let child = Element::new("input");
    let a = Element::new("div").with_child(child.clone());
    let b = Element::new("div");

    b.append_child(&child);

    assert!(a.children().is_empty());
    assert!(b.children()[0].same(&child));
    assert!(child.parent().is_some_and(|p| p.same(&b)));
}

#[test]
fn form_controls_in_document_order_with_form_attribute() {
    let document = Document::new();
    let form = document.append(
        Element::new("form").with_attr("id", "main").with_children([
            input("a", "text", ""),
            Element::new("div").with_child(input("b", "text", "")),
            input("image", "image", ""),
            input("elsewhere", "text", "").with_attr("form", "other"),
            Element::new("label").with_text("not a control"),
        ]),
    );
    document.append(input("c", "text", "").with_attr("form", "main"));
    document.append(input("d", "text", ""));

    let names: Vec<String> = form
        .form_controls()
        .iter()
        .filter_map(|el| el.name())
        .collect();

    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn document_queries() {
    let document = Document::new();
    document.append(Element::new("form").with_attr("id", "one"));
    document.append(Element::new("div").with_child(Element::new("form").with_attr("name", "two")));

    assert_eq!(document.forms().len(), 2);
    assert!(document.get_element_by_id("one").is_some());
    let found = document.query_selector("div > form").unwrap().unwrap();
    assert_eq!(found.name().as_deref(), Some("two"));
    assert_eq!(document.query_selector_all("form").unwrap().len(), 2);
    assert!(document.query_selector("#three").unwrap().is_none());
    assert!(document.query_selector("form[").is_err());
}

// =========================================================================
// Events
// =========================================================================

#[test]
fn events_bubble_to_ancestors_and_unsubscribe() {
    let document = Document::new();
    let field = checkbox("agree", false);
    let form = document.append(Element::new("form").with_child(field.clone()));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    let id = document.events().subscribe(
        &form,
        "change",
        Rc::new(move |event: &Event| log.borrow_mut().push(event.target.name())),
    );

    assert_eq!(document.dispatch_event(&field, "change"), 1);
    assert_eq!(document.dispatch_event(&field, "input"), 0, "Other event names ignored");
    assert_eq!(*seen.borrow(), vec![Some("agree".to_string())]);

    assert!(document.events().unsubscribe(id));
    assert!(!document.events().unsubscribe(id));
    assert_eq!(document.dispatch_event(&field, "change"), 0);
}

#[test]
fn listener_may_unsubscribe_itself_during_dispatch() {
    let document = Rc::new(Document::new());
    let form = document.append(Element::new("form"));
    let slot: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));
    let calls = Rc::new(RefCell::new(0));

    let doc = Rc::downgrade(&document);
    let own_id = slot.clone();
    let counter = calls.clone();
    let id = document.events().subscribe(
        &form,
        "input",
        Rc::new(move |_: &Event| {
            *counter.borrow_mut() += 1;
            if let (Some(doc), Some(id)) = (doc.upgrade(), *own_id.borrow()) {
                doc.events().unsubscribe(id);
            }
        }),
    );
    *slot.borrow_mut() = Some(id);

    document.dispatch_event(&form, "input");
    document.dispatch_event(&form, "input");

    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn listener_removed_mid_dispatch_does_not_run() {
    let document = Rc::new(Document::new());
    let field = checkbox("agree", false);
    let form = document.append(Element::new("form").with_child(field.clone()));
    let calls = Rc::new(RefCell::new(Vec::new()));

    let log = calls.clone();
    let later = document
        .events()
        .subscribe(&form, "change", Rc::new(move |_: &Event| log.borrow_mut().push("form")));

    let doc = Rc::downgrade(&document);
    let log = calls.clone();
    document.events().subscribe(
        &field,
        "change",
        Rc::new(move |_: &Event| {
            log.borrow_mut().push("field");
            if let Some(doc) = doc.upgrade() {
                doc.events().unsubscribe(later);
            }
        }),
    );

    assert_eq!(document.dispatch_event(&field, "change"), 1);
    assert_eq!(*calls.borrow(), vec!["field"]);
}
