use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dom::document::Document;
use crate::dom::element::Element;

const GENERATED_SUFFIX_LEN: usize = 9;

static GENERATED_IDS: AtomicU64 = AtomicU64::new(0);

/// The key a control is stored under: its non-empty `name`, else its
/// non-empty `id`. Controls with neither are not trackable.
pub fn field_key(control: &Element) -> Option<String> {
    non_empty(control.name()).or_else(|| non_empty(control.id()))
}

/// Identifier used to build a form's storage key: `id`, then `name`, then a
/// generated one.
pub fn form_id(document: &Document, form: &Element) -> String {
    non_empty(form.id())
        .or_else(|| non_empty(form.name()))
        .unwrap_or_else(|| generate_form_id(document, form))
}

/// `form_<index>` by position among the document's forms, or
/// `form_<random>` when the form is not part of the document.
pub fn generate_form_id(document: &Document, form: &Element) -> String {
    match document.forms().iter().position(|f| f.same(form)) {
        Some(index) => format!("form_{}", index),
        None => format!("form_{}", random_suffix()),
    }
}

fn random_suffix() -> String {
    use sha1::{Digest, Sha1};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let counter = GENERATED_IDS.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha1::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(counter.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..GENERATED_SUFFIX_LEN].to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
