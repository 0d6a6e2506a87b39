//! Surface for non-interactive output (pipes, files, CI logs).
//!
//! Only the final render is written; incremental updates are kept in memory
//! and replaced by their successors.

use relay_application::ports::surface::ResponseSurface;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::debug;

pub struct LineSurface {
    out: Mutex<Box<dyn Write + Send>>,
    latest: Mutex<String>,
}

impl LineSurface {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            latest: Mutex::new(String::new()),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }
}

impl ResponseSurface for LineSurface {
    fn begin(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            latest.clear();
        }
    }

    fn show_working(&self) {}

    fn clear_working(&self) {}

    fn update(&self, markup: &str) {
        if let Ok(mut latest) = self.latest.lock() {
            markup.clone_into(&mut latest);
        }
    }

    fn status(&self, notice: &str) {
        eprintln!("note: {notice}");
    }

    fn finish(&self) {
        let text = match self.latest.lock() {
            Ok(mut latest) => std::mem::take(&mut *latest),
            Err(_) => return,
        };
        if let Ok(mut out) = self.out.lock()
            && let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush())
        {
            debug!("Could not write answer: {}", e);
        }
    }

    fn abandon(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            latest.clear();
        }
    }
}
