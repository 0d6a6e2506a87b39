//! In-place answer display on an interactive terminal.
//!
//! Each `update` carries the complete answer. When it extends what is already
//! on screen only the new suffix is written; otherwise the answer region is
//! erased and redrawn. The working indicator is an `indicatif` spinner.

use crate::output::sanitize::visible_width;
use colored::Colorize;
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    terminal::{self, Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use relay_application::ports::surface::ResponseSurface;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// How to get from what is on screen to the next render.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Redraw<'a> {
    Unchanged,
    /// Write this suffix after the current output.
    Append(&'a str),
    /// Erase the answer region and write everything.
    Replace,
}

pub(crate) fn plan_redraw<'a>(shown: &str, next: &'a str) -> Redraw<'a> {
    if shown == next {
        Redraw::Unchanged
    } else if let Some(suffix) = next.strip_prefix(shown)
        && !ends_inside_escape(shown)
    {
        Redraw::Append(suffix)
    } else {
        Redraw::Replace
    }
}

/// A styled render may end in a reset sequence that the next render moves;
/// appending after it would leave stale styling on screen.
fn ends_inside_escape(shown: &str) -> bool {
    shown.ends_with('m') && shown.contains('\u{1b}')
}

/// Screen rows `text` occupies at `width` columns.
pub(crate) fn rows_for(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = text
        .split('\n')
        .map(|line| visible_width(line).max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

#[derive(Default)]
struct State {
    shown: String,
    active: bool,
    spinner: Option<ProgressBar>,
    notices: Vec<String>,
}

pub struct TerminalSurface {
    state: Mutex<State>,
    show_progress: bool,
}

impl TerminalSurface {
    pub fn new(show_progress: bool) -> Self {
        Self {
            state: Mutex::new(State::default()),
            show_progress,
        }
    }

    fn spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    fn redraw(shown: &str, next: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        match plan_redraw(shown, next) {
            Redraw::Unchanged => return Ok(()),
            Redraw::Append(suffix) => write!(stdout, "{suffix}")?,
            Redraw::Replace => {
                let (width, _) = terminal::size().unwrap_or((80, 24));
                let up = rows_for(shown, width).saturating_sub(1);
                queue!(stdout, MoveToColumn(0))?;
                if up > 0 {
                    queue!(stdout, MoveUp(up))?;
                }
                queue!(stdout, Clear(ClearType::FromCursorDown))?;
                write!(stdout, "{next}")?;
            }
        }
        stdout.flush()
    }

    fn print_notice(notice: &str) {
        eprintln!("{} {}", "!".yellow().bold(), notice.yellow());
    }

    /// End the answer region and print the notices it held back.
    fn close(state: &mut State) {
        for notice in state.notices.drain(..) {
            Self::print_notice(&notice);
        }
        state.shown.clear();
        state.active = false;
    }
}

impl ResponseSurface for TerminalSurface {
    fn begin(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.shown.clear();
            state.active = true;
        }
        println!();
    }

    fn show_working(&self) {
        if !self.show_progress {
            return;
        }
        if let Ok(mut state) = self.state.lock()
            && state.spinner.is_none()
        {
            state.spinner = Some(Self::spinner());
        }
    }

    fn clear_working(&self) {
        if let Ok(mut state) = self.state.lock()
            && let Some(spinner) = state.spinner.take()
        {
            spinner.finish_and_clear();
        }
    }

    fn update(&self, markup: &str) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
        if let Err(e) = Self::redraw(&state.shown, markup) {
            debug!("Terminal redraw failed: {}", e);
        }
        state.shown = markup.to_string();
    }

    fn status(&self, notice: &str) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.active {
            state.notices.push(notice.to_string());
        } else {
            Self::print_notice(notice);
        }
    }

    fn finish(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
        println!();
        println!();
        Self::close(&mut state);
    }

    fn abandon(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
        if state.active {
            println!();
        }
        Self::close(&mut state);
    }
}
