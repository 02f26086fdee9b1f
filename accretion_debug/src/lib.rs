// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON Lines export for accretion diagnostics.
//!
//! This crate provides [`Reporter`](accretion_core::report::Reporter)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyReportSink`] — human-readable one-line-per-record output.
//! - [`json::JsonLinesSink`] — one JSON object per record, for machine
//!   consumption and log shipping.

pub mod json;
pub mod pretty;
