//! Application-level orchestration.
//!
//! This module owns selector bootstrap, mode resolution and validation, and the
//! request/paint lifecycle of each user action. UI/CLI layers call into it so
//! that every front end follows the same rules.

pub(crate) mod bootstrap;
mod controller;
pub(crate) mod form;
mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use controller::{run_controller, Outcome, Session, UiCommand, ViewEvent};
