// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types and change-notification engine for scene-graph monitoring.
//!
//! `accretion_core` subscribes to structural and attribute-level mutation
//! events emitted by an external, mutable scene graph, filters and decodes
//! those events, and for transform-relevant changes walks the ancestor chain
//! of the changed node to resolve local and world-space translation, scale,
//! and rotation at the moment of change. It also owns the callback
//! lifecycle: registration with outcome tracking and guaranteed bulk
//! teardown.
//!
//! # Architecture
//!
//! The crate is organized around a synchronous dispatch loop driven by the
//! host graph's own event delivery:
//!
//! ```text
//!   Host scene graph (SceneBoundary)
//!       │
//!       ▼
//!   HostEvent ──► ChangeDispatcher::dispatch()
//!                      │
//!                      ├─► DecodedFacts::decode() ── fact set
//!                      │
//!                      ├─► walk::resolve() ── TransformWalk (leaf → root)
//!                      │
//!                      ▼
//!                 structured records ──► Reporter
//! ```
//!
//! **[`node`]** — Opaque node handles and the closed set of node type tags.
//! The core never owns graph state; it holds handles plus cached metadata.
//!
//! **[`boundary`]** — The [`SceneBoundary`](boundary::SceneBoundary) trait
//! that host integrations implement: subscription management plus the
//! read-only queries (transforms, ancestor paths, mesh points) the engine
//! performs while resolving a change.
//!
//! **[`facts`]** — Capability-bitmask decoding. A raw change mask becomes an
//! immutable set of named facts; downstream logic is set-membership tests,
//! not bit twiddling. Also classifies attributes into the three interest
//! categories (point data, transform channel, topology output).
//!
//! **[`registry`]** — The callback registry: register-with-outcome-tracking
//! and atomic, idempotent bulk teardown. The active set only ever holds
//! ids whose registration succeeded.
//!
//! **[`transform`]** — TRS value types and glam-backed compose/decompose,
//! with rotations reported as Euler degrees (converted from the host's
//! native radians).
//!
//! **[`walk`]** — The hierarchy walker: a bounded, cycle-checked, lazy
//! iterator producing one [`TransformSnapshot`](transform::TransformSnapshot)
//! per ancestor level, re-querying live graph state at each step.
//!
//! **[`dispatch`]** — The control-flow hub routing each
//! [`HostEvent`](dispatch::HostEvent) to its handler. No error escapes a
//! handler; every failure is absorbed into a reduced result plus a
//! `tracing` diagnostic.
//!
//! **[`report`]** — The [`Reporter`](report::Reporter) trait and the
//! structured records it receives. All methods default to no-ops, so
//! implementations only handle the records they care about.

pub mod boundary;
pub mod dispatch;
pub mod facts;
pub mod node;
pub mod registry;
pub mod report;
pub mod transform;
pub mod walk;
