//! Unit tests for review lifecycle governance.

mod support;
