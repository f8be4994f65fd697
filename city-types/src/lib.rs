//! # city-types
//!
//! Record model for Listy City.
//!
//! This crate provides the types shared by every other Listy City crate:
//! - [`City`] - The sole entity: a name/province pair plus optional store identity
//! - [`Document`], [`Fields`], [`Snapshot`] - The document-store view of a collection

#![warn(missing_docs)]
#![warn(clippy::all)]

mod city;
mod document;

pub use city::{City, FIELD_NAME, FIELD_PROVINCE};
pub use document::{Document, Fields, Snapshot};
