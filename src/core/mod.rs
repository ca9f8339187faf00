//! Editing core: buffer contract, windowing, flags, session, redraw engine.

pub mod buffer;
pub mod flags;
pub mod gapbuf;
pub mod redraw;
pub mod screen;
pub mod session;
pub mod terminal;
pub mod window;
