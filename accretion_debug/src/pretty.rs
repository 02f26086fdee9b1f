// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable observation output.
//!
//! [`PrettyReportSink`] implements [`Reporter`] and writes one line per
//! record to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use glam::DVec3;

use accretion_core::node::HandleStatus;
use accretion_core::report::{
    AttributeFacts, NodeEvent, PointSnapshot, RenameEvent, Reporter, TimerTick, TopologySnapshot,
};
use accretion_core::transform::{TransformSnapshot, Trs};

/// Writes human-readable observation lines to a [`Write`](std::io::Write) destination.
pub struct PrettyReportSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyReportSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyReportSink").finish_non_exhaustive()
    }
}

impl PrettyReportSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyReportSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn vec3(v: DVec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

fn trs(t: &Trs) -> String {
    format!(
        "t={} r={} s={}",
        vec3(t.translate),
        vec3(t.rotate_deg),
        vec3(t.scale),
    )
}

impl<W: Write> Reporter for PrettyReportSink<W> {
    fn on_node_event(&mut self, e: &NodeEvent) {
        let stale = match e.status {
            HandleStatus::Live => "",
            HandleStatus::Stale => " (stale)",
        };
        let _ = writeln!(
            self.writer,
            "[{}] tag={} name=\"{}\"{stale}",
            e.kind.as_str(),
            e.tag.as_str(),
            e.name,
        );
    }

    fn on_rename(&mut self, e: &RenameEvent) {
        let _ = writeln!(
            self.writer,
            "[rename] node={:?} \"{}\" -> \"{}\"",
            e.node, e.old_name, e.new_name,
        );
    }

    fn on_attribute_facts(&mut self, e: &AttributeFacts) {
        let _ = writeln!(
            self.writer,
            "[attr] tag={} name=\"{}\" facts={:?}",
            e.tag.as_str(),
            e.attr_name,
            e.facts,
        );
    }

    fn on_transform(&mut self, s: &TransformSnapshot) {
        let _ = writeln!(
            self.writer,
            "[xform] node={:?} name=\"{}\" local {} | world {}",
            s.node,
            s.name,
            trs(&s.local),
            trs(&s.world),
        );
    }

    fn on_point(&mut self, s: &PointSnapshot) {
        let _ = writeln!(
            self.writer,
            "[point] attr=\"{}\" position={}",
            s.attr_name,
            vec3(s.position),
        );
    }

    fn on_topology(&mut self, s: &TopologySnapshot) {
        let _ = writeln!(
            self.writer,
            "[topology] source=\"{}\" vertices={}",
            s.source,
            s.vertex_indices.len(),
        );
    }

    fn on_timer(&mut self, t: &TimerTick) {
        let _ = writeln!(self.writer, "[timer] elapsed={:.1}s", t.elapsed);
    }
}
