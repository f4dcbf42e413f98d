//! # Base types for pgnfen
//!
//! This is an auxiliary crate for `pgnfen`, which contains the board primitives. It is split from the
//! main crate, so everything declared here can be used in the build script for `pgnfen`.
//!
//! Normally you don't want to use this crate directly. Use `pgnfen` instead.

pub mod bitboard;
pub mod bitboard_consts;
pub mod geometry;
pub mod types;
