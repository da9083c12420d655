//! Scheduling rules that do not touch storage.
//!
//! The repository calls into these inside its transactions; keeping them pure lets the
//! rules be tested without a database.

pub mod calendar;
pub mod selection;
pub mod transfer;
