use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::trace::trace::TraceEvent;

/// JSONL sink for [`TraceEvent`]s, shared between handles through `Rc`.
///
/// Each event is flushed as soon as it is written so a crashed session still
/// leaves a readable trail. I/O problems are logged and otherwise ignored.
pub struct TraceLogger {
    sink: Option<RefCell<BufWriter<File>>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(|file| RefCell::new(BufWriter::new(file)))
            .inspect_err(|e| log::warn!("trace file {} unavailable: {}", path.display(), e))
            .ok();
        Self { sink }
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        let mut out = sink.borrow_mut();
        let written = serde_json::to_writer(&mut *out, event)
            .map_err(std::io::Error::from)
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            log::warn!("dropped {:?} trace for '{}': {}", event.operation, event.storage_key, e);
        }
    }
}
