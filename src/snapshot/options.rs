use std::rc::Rc;

use serde_json::Value;

use crate::cli::config::AppConfig;
use crate::dom::element::Element;
use crate::form::codec::{Accessor, Setter};
use crate::form::policy::{DEFAULT_EXCLUDE, FieldRule};
use crate::storage::Storage;
use crate::trace::logger::TraceLogger;

pub const DEFAULT_PREFIX: &str = "saveform_";
pub const DEFAULT_EVENTS: &[&str] = &["input", "change"];

/// Construction options for a [`SaveForm`](crate::snapshot::manager::SaveForm).
/// Every field starts at its default; builder methods override one at a time.
#[derive(Clone)]
pub struct Options {
    /// `None` opens the persistent file store at its default path.
    pub storage: Option<Rc<dyn Storage>>,
    pub prefix: String,
    pub events: Vec<String>,
    pub fields: FieldRule,
    pub exclude: FieldRule,
    pub accessors: Vec<(FieldRule, Accessor)>,
    pub setters: Vec<(FieldRule, Setter)>,
    pub tracer: Option<Rc<TraceLogger>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            storage: None,
            prefix: DEFAULT_PREFIX.to_string(),
            events: DEFAULT_EVENTS.iter().map(|e| e.to_string()).collect(),
            fields: FieldRule::All,
            exclude: FieldRule::from(DEFAULT_EXCLUDE),
            accessors: Vec::new(),
            setters: Vec::new(),
            tracer: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying the serializable settings of a config file.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut options = Options::default()
            .prefix(&config.prefix)
            .events(config.events.iter().map(String::as_str))
            .fields(config.fields.as_str())
            .exclude(config.exclude.as_str());
        if let Some(path) = &config.trace_file {
            options = options.tracer(Rc::new(TraceLogger::new(path)));
        }
        options
    }

    pub fn storage(mut self, storage: Rc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn events<'a>(mut self, events: impl IntoIterator<Item = &'a str>) -> Self {
        self.events = events.into_iter().map(str::to_string).collect();
        self
    }

    pub fn fields(mut self, rule: impl Into<FieldRule>) -> Self {
        self.fields = rule.into();
        self
    }

    pub fn exclude(mut self, rule: impl Into<FieldRule>) -> Self {
        self.exclude = rule.into();
        self
    }

    pub fn accessor(
        mut self,
        rule: impl Into<FieldRule>,
        accessor: impl Fn(&Element) -> Option<Value> + 'static,
    ) -> Self {
        let accessor: Accessor = Rc::new(accessor);
        self.accessors.push((rule.into(), accessor));
        self
    }

    pub fn setter(
        mut self,
        rule: impl Into<FieldRule>,
        setter: impl Fn(&Element, &Value) + 'static,
    ) -> Self {
        let setter: Setter = Rc::new(setter);
        self.setters.push((rule.into(), setter));
        self
    }

    pub fn tracer(mut self, tracer: Rc<TraceLogger>) -> Self {
        self.tracer = Some(tracer);
        self
    }
}
