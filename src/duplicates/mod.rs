//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Name-based candidate grouping (first tier)
//! - Optional content verification of candidates (second tier)
//! - Duplicate set types handed to presenters

pub mod groups;
pub mod verifier;

pub use groups::{
    group_by_name, CandidateGroup, CandidateGrouper, DuplicateSet, GroupingStats, KeyPolicy,
};
pub use verifier::{ContentVerifier, VerifyProgress};
