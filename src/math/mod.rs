// src/math/mod.rs
#![allow(clippy::module_name_repetitions)] // Common in math modules

//! Numeric primitives the geometry is built on.
//!
//! `r1`, `r2` and `r3` operate on ℝ¹, ℝ² and ℝ³; `s1` operates on the circle S¹.

pub mod exact;
pub mod r1;
pub mod r2;
pub mod r3;
pub mod s1;
