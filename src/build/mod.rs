//! Toolchain steps: format check, lint, build and test.

pub mod cargo;

pub use cargo::{build, clippy, fmt_check, test};
