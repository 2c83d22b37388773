use std::rc::Rc;

use serde_json::Value;

use crate::dom::element::Element;
use crate::error::FormStateError;
use crate::form::policy::{FieldMatcher, FieldRule};

/// Reads a control's value. `None` means "no value": the key is left out of
/// the snapshot entirely.
pub type Accessor = Rc<dyn Fn(&Element) -> Option<Value>>;

/// Writes a stored value back into a control.
pub type Setter = Rc<dyn Fn(&Element, &Value)>;

/// Ordered `(matcher, handler)` entries plus a mandatory fallback.
/// Lookup is first-match-wins: caller entries, then built-ins, then fallback.
pub struct CodecTable<H> {
    entries: Vec<(FieldMatcher, H)>,
    fallback: H,
}

pub type AccessorTable = CodecTable<Accessor>;
pub type SetterTable = CodecTable<Setter>;

impl<H: Clone> CodecTable<H> {
    fn build(
        custom: &[(FieldRule, H)],
        builtins: Vec<(FieldMatcher, H)>,
        fallback: H,
    ) -> Result<Self, FormStateError> {
        let mut entries = Vec::with_capacity(custom.len() + builtins.len());
        for (rule, handler) in custom {
            entries.push((FieldMatcher::compile(rule)?, handler.clone()));
        }
        entries.extend(builtins);
        Ok(CodecTable { entries, fallback })
    }

    /// The handler serving `control`. Always returns something.
    pub fn lookup(&self, control: &Element) -> &H {
        self.entries
            .iter()
            .find(|(matcher, _)| matcher.matches(control))
            .map(|(_, handler)| handler)
            .unwrap_or(&self.fallback)
    }
}

impl AccessorTable {
    pub fn new(custom: &[(FieldRule, Accessor)]) -> Result<Self, FormStateError> {
        let builtins: Vec<(FieldMatcher, Accessor)> = vec![
            (matcher(is_checkbox), Rc::new(checkbox_get) as Accessor),
            (matcher(is_radio), Rc::new(radio_get) as Accessor),
            (matcher(is_multi_select), Rc::new(multi_select_get) as Accessor),
        ];
        Self::build(custom, builtins, Rc::new(default_get) as Accessor)
    }

    pub fn accessor_for(&self, control: &Element) -> &Accessor {
        self.lookup(control)
    }
}

impl SetterTable {
    pub fn new(custom: &[(FieldRule, Setter)]) -> Result<Self, FormStateError> {
        let builtins: Vec<(FieldMatcher, Setter)> = vec![
            (matcher(is_checkbox), Rc::new(checkbox_set) as Setter),
            (matcher(is_radio), Rc::new(radio_set) as Setter),
            (matcher(is_multi_select), Rc::new(multi_select_set) as Setter),
        ];
        Self::build(custom, builtins, Rc::new(default_set) as Setter)
    }

    pub fn setter_for(&self, control: &Element) -> &Setter {
        self.lookup(control)
    }
}

fn matcher(predicate: fn(&Element) -> bool) -> FieldMatcher {
    FieldMatcher::Predicate(Rc::new(predicate))
}

// =========================================================================
// Built-in strategies
// =========================================================================

fn is_checkbox(el: &Element) -> bool {
    el.tag() == "input" && el.control_type() == "checkbox"
}

fn is_radio(el: &Element) -> bool {
    el.tag() == "input" && el.control_type() == "radio"
}

fn is_multi_select(el: &Element) -> bool {
    el.tag() == "select" && el.has_attr("multiple")
}

fn checkbox_get(el: &Element) -> Option<Value> {
    Some(Value::Bool(el.checked()))
}

fn checkbox_set(el: &Element, value: &Value) {
    el.set_checked(is_truthy(value));
}

fn radio_get(el: &Element) -> Option<Value> {
    el.checked().then(|| Value::String(el.value()))
}

fn radio_set(el: &Element, value: &Value) {
    if value.as_str() == Some(el.value().as_str()) {
        el.set_checked(true);
    }
}

fn multi_select_get(el: &Element) -> Option<Value> {
    let selected = el
        .options()
        .into_iter()
        .filter(|o| o.selected())
        .map(|o| Value::String(o.value()))
        .collect();
    Some(Value::Array(selected))
}

fn multi_select_set(el: &Element, value: &Value) {
    let wanted: Vec<&str> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(single) => vec![single.as_str()],
        _ => Vec::new(),
    };
    for option in el.options() {
        option.set_selected(wanted.contains(&option.value().as_str()));
    }
}

fn default_get(el: &Element) -> Option<Value> {
    Some(Value::String(el.value()))
}

fn default_set(el: &Element, value: &Value) {
    el.set_value(&coerce_to_string(value));
}

// =========================================================================
// Coercions (browser semantics for values assigned to DOM properties)
// =========================================================================

/// Boolean conversion as applied when assigning to `checked`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String conversion as applied when assigning to `value`; null becomes "".
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
