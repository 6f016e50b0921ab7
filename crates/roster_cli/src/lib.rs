//! Command-line front end for the student roster.

pub mod api;
