//! Response surfaces
//!
//! [`TerminalSurface`] redraws the answer in place on an interactive
//! terminal; [`LineSurface`] writes only final answers for pipes and files.

mod line;
mod terminal;

pub use line::LineSurface;
pub use terminal::TerminalSurface;
