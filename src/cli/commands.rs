use crate::error::FormStateError;
use crate::snapshot::model::parse_snapshot;
use crate::storage::Storage;
use crate::storage::file::FileStorage;

// ============================================================================
// list subcommand
// ============================================================================

/// One summary line per stored snapshot: `<key>  <n> fields` (or `corrupt`).
pub fn cmd_list(store: &FileStorage, prefix: &str, all: bool) -> Result<Vec<String>, FormStateError> {
    let mut lines = Vec::new();
    for key in store.keys() {
        if !all && !key.starts_with(prefix) {
            continue;
        }
        let summary = match store.get_item(&key)?.as_deref().and_then(parse_snapshot) {
            Some(snapshot) => format!("{} fields", snapshot.len()),
            None => "corrupt".to_string(),
        };
        lines.push(format!("{}  {}", key, summary));
    }
    Ok(lines)
}

// ============================================================================
// show subcommand
// ============================================================================

/// Pretty-printed snapshot for `form`, or `None` when nothing is stored.
/// Corrupt entries are shown raw.
pub fn cmd_show(store: &FileStorage, prefix: &str, form: &str) -> Result<Option<String>, FormStateError> {
    let key = format!("{}{}", prefix, form);
    let Some(raw) = store.get_item(&key)? else {
        return Ok(None);
    };
    let rendered = match parse_snapshot(&raw) {
        Some(snapshot) => serde_json::to_string_pretty(&snapshot).map_err(|e| {
            FormStateError::JsonSerialize {
                context: format!("snapshot {}", key),
                source: e,
            }
        })?,
        None => format!("(corrupt) {}", raw),
    };
    Ok(Some(rendered))
}

// ============================================================================
// clear subcommand
// ============================================================================

/// Removes the snapshot for `form`. Returns whether one existed.
pub fn cmd_clear(store: &FileStorage, prefix: &str, form: &str) -> Result<bool, FormStateError> {
    let key = format!("{}{}", prefix, form);
    let existed = store.get_item(&key)?.is_some();
    store.remove_item(&key)?;
    Ok(existed)
}
