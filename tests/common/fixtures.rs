use std::rc::Rc;

use saveform::{Document, Element, MemoryStorage, Options};

pub fn input(name: &str, ty: &str, value: &str) -> Element {
    Element::new("input")
        .with_attr("name", name)
        .with_attr("type", ty)
        .with_attr("value", value)
}

pub fn checkbox(name: &str, checked: bool) -> Element {
    let el = Element::new("input")
        .with_attr("name", name)
        .with_attr("type", "checkbox");
    if checked { el.with_attr("checked", "") } else { el }
}

pub fn radio(name: &str, value: &str, checked: bool) -> Element {
    let el = input(name, "radio", value);
    if checked { el.with_attr("checked", "") } else { el }
}

pub fn option(value: &str, selected: bool) -> Element {
    let el = Element::new("option").with_attr("value", value).with_text(value);
    if selected { el.with_attr("selected", "") } else { el }
}

pub fn multi_select(name: &str, options: Vec<Element>) -> Element {
    Element::new("select")
        .with_attr("name", name)
        .with_attr("multiple", "")
        .with_children(options)
}

/// Document with one form (`id` given) holding `controls`.
pub fn document_with_form(form_id: &str, controls: Vec<Element>) -> (Rc<Document>, Element) {
    let document = Rc::new(Document::new());
    let form = document.append(
        Element::new("form")
            .with_attr("id", form_id)
            .with_children(controls),
    );
    (document, form)
}

/// `username="initial"` + `password="secret"`.
pub fn login_form() -> (Rc<Document>, Element) {
    document_with_form(
        "login",
        vec![
            input("username", "text", "initial"),
            input("password", "password", "secret"),
        ],
    )
}

pub fn memory_options(storage: &Rc<MemoryStorage>) -> Options {
    Options::new().storage(storage.clone())
}

pub fn field(form: &Element, name: &str) -> Element {
    form.descendants()
        .into_iter()
        .find(|el| el.name().as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no field named {}", name))
}

pub fn temp_path(label: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "saveform-{}-{}-{}.json",
        label,
        std::process::id(),
        n
    ))
}
