use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dom::document::Document;
use crate::dom::element::Element;
use crate::dom::events::{Event, EventCallback, ListenerId};
use crate::error::FormStateError;
use crate::form::codec::{AccessorTable, SetterTable};
use crate::form::key::{field_key, form_id};
use crate::form::policy::{FieldSelectionPolicy, select_fields};
use crate::snapshot::model::{Snapshot, parse_snapshot, serialize_snapshot};
use crate::snapshot::options::Options;
use crate::storage::Storage;
use crate::storage::file::{DEFAULT_STORE_PATH, FileStorage};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{Operation, TraceEvent};

/// What to bind a [`SaveForm`] to: a live element or a selector resolved
/// against the document.
#[derive(Debug, Clone)]
pub enum FormTarget {
    Element(Element),
    Selector(String),
}

impl From<Element> for FormTarget {
    fn from(el: Element) -> Self {
        FormTarget::Element(el)
    }
}

impl From<&Element> for FormTarget {
    fn from(el: &Element) -> Self {
        FormTarget::Element(el.clone())
    }
}

impl From<&str> for FormTarget {
    fn from(selector: &str) -> Self {
        FormTarget::Selector(selector.to_string())
    }
}

impl From<String> for FormTarget {
    fn from(selector: String) -> Self {
        FormTarget::Selector(selector)
    }
}

/// Everything the save/restore paths need. Event listeners reach it through
/// a weak reference so a dropped handle silences them.
struct FormState {
    document: Rc<Document>,
    form: Element,
    storage_key: String,
    storage: Rc<dyn Storage>,
    policy: FieldSelectionPolicy,
    accessors: AccessorTable,
    setters: SetterTable,
    tracer: Option<Rc<TraceLogger>>,
}

/// Keeps one form's fields in sync with a snapshot in storage.
pub struct SaveForm {
    state: Rc<FormState>,
    subscriptions: RefCell<Vec<(String, ListenerId)>>,
    destroyed: Cell<bool>,
}

impl SaveForm {
    /// Binds to a form, wires the trigger events and performs the initial
    /// restore before returning.
    pub fn create(
        document: &Rc<Document>,
        target: impl Into<FormTarget>,
        options: Options,
    ) -> Result<Self, FormStateError> {
        let form = resolve_form(document, target.into())?;

        let policy = FieldSelectionPolicy::compile(&options.fields, &options.exclude)?;
        let accessors = AccessorTable::new(&options.accessors)?;
        let setters = SetterTable::new(&options.setters)?;
        let storage: Rc<dyn Storage> = match options.storage {
            Some(storage) => storage,
            None => Rc::new(FileStorage::open(DEFAULT_STORE_PATH)?),
        };
        let storage_key = format!("{}{}", options.prefix, form_id(document, &form));

        let handle = SaveForm {
            state: Rc::new(FormState {
                document: Rc::clone(document),
                form,
                storage_key,
                storage,
                policy,
                accessors,
                setters,
                tracer: options.tracer,
            }),
            subscriptions: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        };

        for event in &options.events {
            handle.attach(event);
        }
        log::debug!(
            "bound {:?} to '{}' ({} trigger events)",
            handle.state.form,
            handle.state.storage_key,
            handle.subscriptions.borrow().len()
        );

        handle.restore()?;
        Ok(handle)
    }

    fn attach(&self, event: &str) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        if subscriptions.iter().any(|(name, _)| name == event) {
            return;
        }

        let weak = Rc::downgrade(&self.state);
        let callback: EventCallback = Rc::new(move |event: &Event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if let Err(e) = state.save() {
                log::warn!(
                    "save triggered by '{}' failed for '{}': {}",
                    event.name,
                    state.storage_key,
                    e
                );
            }
        });

        let id = self
            .state
            .document
            .events()
            .subscribe(&self.state.form, event, callback);
        subscriptions.push((event.to_string(), id));
    }

    /// Merges the live field values over the stored snapshot and persists it.
    pub fn save(&self) -> Result<Snapshot, FormStateError> {
        self.state.save()
    }

    /// Applies the stored snapshot to the live fields.
    ///
    /// Returns `None` when nothing is stored (or the stored entry was corrupt
    /// and has been removed), otherwise the keys applied in field order.
    pub fn restore(&self) -> Result<Option<Vec<String>>, FormStateError> {
        self.state.restore()
    }

    /// Removes the stored snapshot. Absent entries are fine.
    pub fn clear(&self) -> Result<(), FormStateError> {
        self.state.storage.remove_item(&self.state.storage_key)?;
        self.state.trace(TraceEvent::now(Operation::Clear, &self.state.storage_key));
        Ok(())
    }

    /// Detaches every trigger listener. Storage is untouched. Idempotent.
    pub fn destroy(&self) {
        let detached: Vec<(String, ListenerId)> = self.subscriptions.borrow_mut().drain(..).collect();
        let events = self.state.document.events();
        for (_, id) in &detached {
            events.unsubscribe(*id);
        }
        if !self.destroyed.replace(true) {
            let names: Vec<&str> = detached.iter().map(|(name, _)| name.as_str()).collect();
            self.state.trace(
                TraceEvent::now(Operation::Destroy, &self.state.storage_key).with_fields(&names),
            );
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn storage_key(&self) -> &str {
        &self.state.storage_key
    }

    pub fn form(&self) -> &Element {
        &self.state.form
    }

    /// Names of the events currently wired to an implicit save.
    pub fn trigger_events(&self) -> Vec<String> {
        self.subscriptions
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl fmt::Debug for SaveForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveForm")
            .field("form", &self.state.form)
            .field("storage_key", &self.state.storage_key)
            .field("trigger_events", &self.trigger_events())
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

impl Drop for SaveForm {
    fn drop(&mut self) {
        let events = self.state.document.events();
        for (_, id) in self.subscriptions.get_mut().drain(..) {
            events.unsubscribe(id);
        }
    }
}

impl FormState {
    fn save(&self) -> Result<Snapshot, FormStateError> {
        let mut snapshot = match self.storage.get_item(&self.storage_key)? {
            Some(raw) => parse_snapshot(&raw).unwrap_or_else(|| {
                log::warn!("ignoring unreadable snapshot at '{}'", self.storage_key);
                Snapshot::new()
            }),
            None => Snapshot::new(),
        };

        let mut written = Vec::new();
        for control in select_fields(&self.form, &self.policy) {
            let Some(key) = field_key(&control) else {
                continue;
            };
            let accessor = self.accessors.accessor_for(&control);
            if let Some(value) = accessor(&control) {
                snapshot.insert(key.clone(), value);
                written.push(key);
            }
        }

        self.storage
            .set_item(&self.storage_key, &serialize_snapshot(&snapshot)?)?;

        log::debug!("saved {} fields to '{}'", written.len(), self.storage_key);
        self.trace(TraceEvent::now(Operation::Save, &self.storage_key).with_fields(&written));
        Ok(snapshot)
    }

    fn restore(&self) -> Result<Option<Vec<String>>, FormStateError> {
        let Some(raw) = self.storage.get_item(&self.storage_key)? else {
            self.trace(TraceEvent::now(Operation::Restore, &self.storage_key).with_outcome("empty"));
            return Ok(None);
        };

        let Some(snapshot) = parse_snapshot(&raw) else {
            log::warn!("removing corrupt snapshot at '{}'", self.storage_key);
            self.storage.remove_item(&self.storage_key)?;
            self.trace(
                TraceEvent::now(Operation::Restore, &self.storage_key).with_outcome("corrupt"),
            );
            return Ok(None);
        };

        let mut restored = Vec::new();
        for control in select_fields(&self.form, &self.policy) {
            let Some(key) = field_key(&control) else {
                continue;
            };
            let Some(value) = snapshot.get(&key) else {
                continue;
            };
            let setter = self.setters.setter_for(&control);
            setter(&control, value);
            restored.push(key);
        }

        log::debug!("restored {} fields from '{}'", restored.len(), self.storage_key);
        self.trace(
            TraceEvent::now(Operation::Restore, &self.storage_key)
                .with_fields(&restored)
                .with_outcome("restored"),
        );
        Ok(Some(restored))
    }

    fn trace(&self, event: TraceEvent) {
        if let Some(tracer) = &self.tracer {
            tracer.log(&event);
        }
    }
}

fn resolve_form(document: &Document, target: FormTarget) -> Result<Element, FormStateError> {
    let element = match target {
        FormTarget::Element(el) => el,
        FormTarget::Selector(selector) => document.query_selector(&selector)?.ok_or_else(|| {
            FormStateError::InvalidElement(format!("no element matches '{}'", selector))
        })?,
    };
    if element.tag() != "form" {
        return Err(FormStateError::InvalidElement(format!(
            "expected a <form>, got <{}>",
            element.tag()
        )));
    }
    Ok(element)
}
