use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Tags whose elements are listed by a form's control collection.
const FORM_ASSOCIATED_TAGS: &[&str] = &[
    "button", "fieldset", "input", "object", "output", "select", "textarea",
];

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: RefCell<Vec<(String, String)>>,
    text: RefCell<String>,

    // Live control state. `None` means "not dirty": fall back to the markup default.
    value: RefCell<Option<String>>,
    checked: Cell<Option<bool>>,
    selected: Cell<Option<bool>>,

    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<Element>>,
}

/// Shared handle to a node of the in-memory document tree.
///
/// Cloning is cheap and yields another handle to the same node; use
/// [`Element::same`] for identity comparisons.
#[derive(Clone)]
pub struct Element(Rc<Node>);

impl Element {
    pub fn new(tag: &str) -> Self {
        Element(Rc::new(Node {
            tag: tag.to_ascii_lowercase(),
            attributes: RefCell::new(Vec::new()),
            text: RefCell::new(String::new()),
            value: RefCell::new(None),
            checked: Cell::new(None),
            selected: Cell::new(None),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    // =========================================================================
    // Builder helpers
    // =========================================================================

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        *self.0.text.borrow_mut() = text.to_string();
        self
    }

    pub fn with_child(self, child: Element) -> Self {
        self.append_child(&child);
        self
    }

    pub fn with_children(self, children: impl IntoIterator<Item = Element>) -> Self {
        for child in children {
            self.append_child(&child);
        }
        self
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    pub fn same(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.borrow().upgrade().map(Element)
    }

    /// Topmost ancestor (the element itself when detached).
    pub fn root(&self) -> Element {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.children.borrow().clone()
    }

    /// Appends `child`, detaching it from any previous parent first.
    pub fn append_child(&self, child: &Element) {
        child.remove();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Detaches this element from its parent. No-op when already detached.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.children.borrow_mut().retain(|c| !c.same(self));
        *self.0.parent.borrow_mut() = Weak::new();
    }

    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(el) = current {
            if el.same(self) {
                return true;
            }
            current = el.parent();
        }
        false
    }

    /// All descendants in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        fn walk(el: &Element, out: &mut Vec<Element>) {
            for child in el.0.children.borrow().iter() {
                out.push(child.clone());
                walk(child, out);
            }
        }
        walk(self, &mut out);
        out
    }

    pub fn text_content(&self) -> String {
        let mut text = self.0.text.borrow().clone();
        for child in self.0.children.borrow().iter() {
            text.push_str(&child.text_content());
        }
        text
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.0
            .attributes
            .borrow()
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        let mut attrs = self.0.attributes.borrow_mut();
        match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove_attr(&self, name: &str) {
        self.0
            .attributes
            .borrow_mut()
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn name(&self) -> Option<String> {
        self.attr("name")
    }

    pub fn class_list(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    // =========================================================================
    // Control state
    // =========================================================================

    /// The control's type as reported by the DOM `type` property.
    pub fn control_type(&self) -> String {
        match self.tag() {
            "input" => {
                let ty = self
                    .attr("type")
                    .map(|t| t.trim().to_ascii_lowercase())
                    .unwrap_or_default();
                if ty.is_empty() { "text".to_string() } else { ty }
            }
            "select" if self.has_attr("multiple") => "select-multiple".to_string(),
            "select" => "select-one".to_string(),
            "textarea" => "textarea".to_string(),
            "button" => self
                .attr("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "submit".to_string()),
            _ => String::new(),
        }
    }

    fn is_checkable(&self) -> bool {
        self.tag() == "input" && matches!(self.control_type().as_str(), "checkbox" | "radio")
    }

    pub fn value(&self) -> String {
        match self.tag() {
            "select" => self.select_value(),
            "option" => self.option_value(),
            "input" if self.is_checkable() => self.attr("value").unwrap_or_else(|| "on".into()),
            "input" | "textarea" => {
                if let Some(dirty) = self.0.value.borrow().as_ref() {
                    return dirty.clone();
                }
                if self.tag() == "textarea" {
                    self.text_content()
                } else {
                    self.attr("value").unwrap_or_default()
                }
            }
            _ => self.attr("value").unwrap_or_default(),
        }
    }

    pub fn set_value(&self, value: &str) {
        match self.tag() {
            "select" => {
                let mut matched = false;
                for option in self.options() {
                    let hit = !matched && option.option_value() == value;
                    matched |= hit;
                    option.set_selected(hit);
                }
            }
            "input" if self.is_checkable() => self.set_attr("value", value),
            "input" | "textarea" => *self.0.value.borrow_mut() = Some(value.to_string()),
            _ => self.set_attr("value", value),
        }
    }

    pub fn checked(&self) -> bool {
        self.0.checked.get().unwrap_or_else(|| self.has_attr("checked"))
    }

    /// Sets checkedness. Checking a named radio unchecks the rest of its group,
    /// scoped to the owning form (or the tree root for form-less radios).
    pub fn set_checked(&self, checked: bool) {
        self.0.checked.set(Some(checked));
        if !checked || self.control_type() != "radio" {
            return;
        }
        let Some(group) = self.name().filter(|n| !n.is_empty()) else {
            return;
        };
        let scope = self.owner_form().unwrap_or_else(|| self.root());
        for other in scope.descendants() {
            if other.same(self) || other.control_type() != "radio" {
                continue;
            }
            if other.name().as_deref() == Some(group.as_str()) {
                other.0.checked.set(Some(false));
            }
        }
    }

    pub fn selected(&self) -> bool {
        self.0.selected.get().unwrap_or_else(|| self.has_attr("selected"))
    }

    pub fn set_selected(&self, selected: bool) {
        self.0.selected.set(Some(selected));
    }

    /// `option` descendants of a `select`, in document order.
    pub fn options(&self) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.tag() == "option")
            .collect()
    }

    fn option_value(&self) -> String {
        self.attr("value")
            .unwrap_or_else(|| self.text_content().trim().to_string())
    }

    fn select_value(&self) -> String {
        let options = self.options();
        if let Some(selected) = options.iter().find(|o| o.selected()) {
            return selected.option_value();
        }
        // Untouched single-choice selects display their first option; once
        // selectedness was set explicitly, nothing selected reads as "".
        let pristine = options.iter().all(|o| o.0.selected.get().is_none());
        if pristine && !self.has_attr("multiple") {
            if let Some(first) = options.first() {
                return first.option_value();
            }
        }
        String::new()
    }

    // =========================================================================
    // Form association
    // =========================================================================

    pub fn is_form_associated(&self) -> bool {
        FORM_ASSOCIATED_TAGS.contains(&self.tag())
            && !(self.tag() == "input" && self.control_type() == "image")
    }

    /// The form this control belongs to: the form named by its `form`
    /// attribute if present, otherwise the nearest ancestor form.
    pub fn owner_form(&self) -> Option<Element> {
        if let Some(form_ref) = self.attr("form") {
            return self
                .root()
                .descendants()
                .into_iter()
                .find(|el| el.tag() == "form" && el.id().as_deref() == Some(form_ref.as_str()));
        }
        let mut current = self.parent();
        while let Some(el) = current {
            if el.tag() == "form" {
                return Some(el);
            }
            current = el.parent();
        }
        None
    }

    /// Form-associated controls owned by this form, in document order.
    pub fn form_controls(&self) -> Vec<Element> {
        self.root()
            .descendants()
            .into_iter()
            .filter(|el| el.is_form_associated())
            .filter(|el| el.owner_form().is_some_and(|form| form.same(self)))
            .collect()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag())?;
        for (k, v) in self.0.attributes.borrow().iter() {
            write!(f, " {}=\"{}\"", k, v)?;
        }
        write!(f, ">")
    }
}
