//! Service layer for provider API surfaces.

pub mod completions;
