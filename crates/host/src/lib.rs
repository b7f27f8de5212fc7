//! PaneStack Host
//!
//! Configuration loading and the command session behind the `panestack`
//! binary. The binary owns the process plumbing (stdin reader, stdout
//! writer, signals); everything that touches the container lives here so it
//! can be driven directly from tests.

pub mod config;
pub mod session;
