//! Core library for labsim, a similarity checker for coding-lab submissions.
//!
//! Submissions of a lab are reduced to one per author, normalized, tokenized and scored
//! pairwise; pairs above a threshold are stored and the worst ones flagged for review.

#![allow(clippy::similar_names, clippy::items_after_statements)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Request handling: parsing, caller gate, response bodies and status codes.
pub mod api;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants.
pub mod constants;

/// Comparison runs: selection, pairing, scoring and result replacement.
pub mod engine;

/// Module defining the entry point logic shared by all binaries.
pub mod entry_point;

/// Error types.
pub mod error;

/// Tracing subscriber setup.
pub mod logging;

/// Module for rich CLI output formatting with colored text and spinners.
pub mod output;

/// Normalization, tokenization and similarity scoring.
pub mod similarity;

/// Submission and result stores.
pub mod store;
