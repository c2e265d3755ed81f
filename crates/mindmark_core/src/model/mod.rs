//! Outline domain model shared by the normalizer, transformer and views.
//!
//! # Responsibility
//! - Define the flat `(level, text)` line form emitted by normalization.
//! - Define the hierarchical node tree consumed by render targets.
//!
//! # Invariants
//! - `OutlineLine::text` is trimmed and never empty.
//! - Canonical markdown is a pure function of the line sequence.

pub mod outline;
