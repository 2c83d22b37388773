use crate::dom::element::Element;
use crate::dom::events::EventRegistry;
use crate::dom::selector::Selector;
use crate::error::FormStateError;

/// An in-memory document: an element tree plus its event substrate.
pub struct Document {
    root: Element,
    events: EventRegistry,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            root: Element::new("html"),
            events: EventRegistry::new(),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Appends `el` under the document root and returns it.
    pub fn append(&self, el: Element) -> Element {
        self.root.append_child(&el);
        el
    }

    pub fn contains(&self, el: &Element) -> bool {
        self.root.contains(el)
    }

    /// All `form` elements in document order.
    pub fn forms(&self) -> Vec<Element> {
        self.root
            .descendants()
            .into_iter()
            .filter(|el| el.tag() == "form")
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.root
            .descendants()
            .into_iter()
            .find(|el| el.id().as_deref() == Some(id))
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, FormStateError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .root
            .descendants()
            .into_iter()
            .find(|el| selector.matches(el)))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, FormStateError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .root
            .descendants()
            .into_iter()
            .filter(|el| selector.matches(el))
            .collect())
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Fires `event` at `target`, bubbling up through its ancestors.
    pub fn dispatch_event(&self, target: &Element, event: &str) -> usize {
        self.events.dispatch(target, event)
    }
}
