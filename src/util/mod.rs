//! Utilities shared across the crate and its tests
