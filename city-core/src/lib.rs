//! # city-core
//!
//! Pure logic for Listy City (no I/O, instant tests).
//!
//! This crate decides what should happen when a snapshot arrives or the user
//! asks for a write, without touching the store.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. The list state machine returns actions, and intent
//! planning returns the write to perform (or the reason it must not happen).
//!
//! The actual I/O is performed by `city-client`, which interprets the
//! actions and plans produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod intent;
pub mod list;
pub mod notice;

pub use intent::{plan_add, plan_delete, plan_update, IntentError, WritePlan};
pub use list::{Action, CityList, ListEvent};
pub use notice::{Notice, Op};
