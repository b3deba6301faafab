//! Subway line topology management.
//!
//! A line is a single chain of directed, distance-weighted sections. The
//! [`domain`] layer keeps that chain well-formed across inserts and removals,
//! [`application`] services load, edit and store lines, and [`infrastructure`]
//! provides the store and wiring behind them.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
