//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the
//! individual workspace crates (e.g., `core-store`, `core-sync`,
//! `provider-drive`). Host applications can depend on `lms-workspace` and
//! enable the documented features without needing to wire each crate
//! individually.
