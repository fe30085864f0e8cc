//! # System Interaction Layer
//!
//! The boundary between the expansion engine and the outside world. The engine only talks to
//! the traits defined here, so tests can swap in fakes.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns external processes for `@(...)@` forms and captures their output,
//!   either through the configured shell interpreter or directly.
//! - **`script`**: Evaluates `@<...>@` forms in a persistent, sandboxed Lua state.

pub mod executor;
pub mod script;
