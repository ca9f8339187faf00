//! Platform-specific terminal backends and escape tables.

#[cfg(unix)]
pub mod fd;
pub mod vt100;

#[cfg(unix)]
pub use fd::FdTerminal;
