//! Runtime metadata model.
//!
//! Types in `model` mirror the metadata rows handed back by the store:
//! cards, their fields, their actions, and the parent/child links between
//! cards. They are plain data. All interpretation (shortcut paths, filter
//! lookup, context checks) lives in `graph` and above.

pub mod action;
pub mod card;
pub mod field;
pub mod id;
pub mod keycode;
pub mod link;
