//! Presenters turning backend records into user-facing text.
//!
//! All functions are pure: they read a [`Record`](crate::fields::Record) and
//! return a display string. Missing fields degrade to placeholders, never to errors.

pub mod contact;
pub mod property;
pub mod task;

pub use contact::{contact_detail, contact_summary};
pub use property::{property_detail, property_summary};
pub use task::{format_due, task_summary};
