use std::fmt;

#[derive(Debug)]
pub enum FormStateError {
    /// The form argument did not resolve to a `<form>` element
    InvalidElement(String),

    /// A structural-match string could not be parsed
    InvalidSelector { selector: String, reason: String },

    /// The storage collaborator refused an operation (quota, disabled, ...)
    Storage { key: String, message: String },

    /// Reading or writing the backing file of a persistent store failed
    StorageIo { path: String, source: std::io::Error },

    /// JSON parsing failed outside of snapshot recovery (store files, config)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (snapshot or store file)
    JsonSerialize { context: String, source: serde_json::Error },
}

impl fmt::Display for FormStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormStateError::InvalidElement(msg) => {
                write!(f, "Invalid form element: {}", msg)
            }
            FormStateError::InvalidSelector { selector, reason } => {
                write!(f, "Invalid selector '{}': {}", selector, reason)
            }
            FormStateError::Storage { key, message } => {
                write!(f, "Storage failure for '{}': {}", key, message)
            }
            FormStateError::StorageIo { path, source } => {
                write!(f, "Storage file '{}' I/O error: {}", path, source)
            }
            FormStateError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            FormStateError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
        }
    }
}

impl std::error::Error for FormStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormStateError::StorageIo { source, .. } => Some(source),
            FormStateError::JsonParse { source, .. } => Some(source),
            FormStateError::JsonSerialize { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl FormStateError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        FormStateError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
