#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::needless_pass_by_value, clippy::type_complexity)] // too many false positives from system params.
#![allow(clippy::collapsible_else_if)] // this is usually intentional
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]
#![allow(clippy::implicit_hasher)] // unnecessary generalization
#![allow(clippy::many_single_char_names)] // Doc29 formulas use single-letter coefficient names
#![cfg_attr(not(feature = "precommit-checks"), allow(dead_code, unused_variables, unused_imports))]
#![cfg_attr(feature = "precommit-checks", allow(dead_code))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]
#![cfg_attr(feature = "rust-analyzer", allow(unused_imports))]

//! The GRAPE computational core: components C through K of the system
//! overview. `grape-store` supplies the validated value objects; this crate
//! turns them into a four-dimensional performance trajectory and, from that,
//! per-receptor noise exposure.

pub mod config;
pub mod error;

pub mod route_expander;
pub mod thrust;
pub mod profile;
pub mod performance_assembler;
pub mod fuel_flow;
pub mod npd;
pub mod noise_generator;
pub mod performance_run_driver;
pub mod noise_run_driver;
mod track4d;

pub use error::{RunError, RunResult};
