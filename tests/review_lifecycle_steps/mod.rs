//! Step definitions for review lifecycle scenarios.

pub mod world;

mod given;
mod then;
mod when;
