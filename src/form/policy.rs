use std::fmt;
use std::rc::Rc;

use crate::dom::element::Element;
use crate::dom::selector::Selector;
use crate::error::FormStateError;
use crate::form::key::field_key;

pub type Predicate = Rc<dyn Fn(&Element) -> bool>;

pub const DEFAULT_EXCLUDE: &str = r#"input[type="password"], input[type="file"]"#;

/// An unparsed matching rule as supplied through configuration.
#[derive(Clone)]
pub enum FieldRule {
    /// `"*"`: skip the check entirely
    All,
    Selector(String),
    Predicate(Predicate),
}

impl FieldRule {
    pub fn predicate(f: impl Fn(&Element) -> bool + 'static) -> Self {
        FieldRule::Predicate(Rc::new(f))
    }
}

impl From<&str> for FieldRule {
    fn from(rule: &str) -> Self {
        if rule.trim() == "*" {
            FieldRule::All
        } else {
            FieldRule::Selector(rule.to_string())
        }
    }
}

impl From<String> for FieldRule {
    fn from(rule: String) -> Self {
        FieldRule::from(rule.as_str())
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::All => write!(f, "All"),
            FieldRule::Selector(s) => write!(f, "Selector({:?})", s),
            FieldRule::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// A compiled rule, ready to test controls.
#[derive(Clone)]
pub enum FieldMatcher {
    All,
    Selector(Selector),
    Predicate(Predicate),
}

impl FieldMatcher {
    pub fn compile(rule: &FieldRule) -> Result<Self, FormStateError> {
        Ok(match rule {
            FieldRule::All => FieldMatcher::All,
            FieldRule::Selector(s) => FieldMatcher::Selector(Selector::parse(s)?),
            FieldRule::Predicate(p) => FieldMatcher::Predicate(p.clone()),
        })
    }

    pub fn matches(&self, control: &Element) -> bool {
        match self {
            FieldMatcher::All => true,
            FieldMatcher::Selector(selector) => selector.matches(control),
            FieldMatcher::Predicate(predicate) => predicate(control),
        }
    }
}

impl fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMatcher::All => write!(f, "All"),
            FieldMatcher::Selector(s) => write!(f, "Selector({:?})", s.as_str()),
            FieldMatcher::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSelectionPolicy {
    pub include: FieldMatcher,
    pub exclude: FieldMatcher,
}

impl FieldSelectionPolicy {
    pub fn compile(include: &FieldRule, exclude: &FieldRule) -> Result<Self, FormStateError> {
        Ok(FieldSelectionPolicy {
            include: FieldMatcher::compile(include)?,
            exclude: FieldMatcher::compile(exclude)?,
        })
    }

    pub fn is_trackable(&self, control: &Element) -> bool {
        if field_key(control).is_none() {
            return false;
        }
        self.include.matches(control) && !self.exclude.matches(control)
    }
}

/// Trackable controls of `form` in document order. Membership is recomputed
/// on every call.
pub fn select_fields(form: &Element, policy: &FieldSelectionPolicy) -> Vec<Element> {
    form.form_controls()
        .into_iter()
        .filter(|control| policy.is_trackable(control))
        .collect()
}
