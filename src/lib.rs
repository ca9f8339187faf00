//! Line editing and redraw engine for raw-mode terminals.
//!
//! Invariant: the core never concatenates escape strings itself — every
//! terminal write flows through the [`Terminal`] capability trait, so a
//! recording backend can stand in for a TTY.
//!
//! # Public API Overview
//! - Bind a [`TextBuffer`] and a [`Terminal`] into a [`Session`], the
//!   per-connection editing handle.
//! - Feed raw input with [`Session::insert_input`]; repaint with
//!   [`Session::display_line`] and the thin redraw entry points.
//! - Acquire input with [`Session::poll`], [`Session::read`],
//!   [`Session::pause`], and locate the cursor with
//!   [`Session::query_cursor`].
//! - Lines wider than the terminal scroll horizontally through
//!   [`window`], keeping the point visible.

pub mod config;
pub mod error;
pub mod prompt;

pub mod core;
pub mod platform;

/// Text storage contract and the built-in gap buffer.
pub use crate::core::buffer::TextBuffer;
pub use crate::core::gapbuf::GapBuffer;

/// Terminal capability trait, the recording test backend, and the
/// fd-backed Unix implementation.
pub use crate::core::terminal::{RecordingTerminal, TermOp, Terminal};
#[cfg(unix)]
pub use crate::platform::fd::FdTerminal;

/// Session and screen state.
pub use crate::core::screen::Screen;
pub use crate::core::session::{Session, DEFAULT_PAUSE_KEYS};

/// Redraw obligations and the windowing computation.
pub use crate::core::flags::Redraw;
pub use crate::core::window::window;

/// Prompt rendering callbacks.
pub use crate::prompt::{display_width, static_prompt, PromptFn, PromptKind};

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Crate error and result types.
pub use crate::error::{Error, Result};
