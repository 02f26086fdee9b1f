// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON Lines observation output.
//!
//! [`JsonLinesSink`] implements [`Reporter`] and writes one JSON object per
//! record, newline-delimited, suitable for log shipping or `jq` analysis.

use std::io::Write;

use serde_json::json;

use accretion_core::facts::Direction;
use accretion_core::node::HandleStatus;
use accretion_core::report::{
    AttributeFacts, NodeEvent, PointSnapshot, RenameEvent, Reporter, TimerTick, TopologySnapshot,
};
use accretion_core::transform::{TransformSnapshot, Trs};

/// Writes newline-delimited JSON records to a [`Write`](std::io::Write) destination.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: serde_json::Value) {
        let _ = writeln!(self.writer, "{value}");
    }
}

fn vec3(v: glam::DVec3) -> serde_json::Value {
    json!([v.x, v.y, v.z])
}

fn trs(t: &Trs) -> serde_json::Value {
    json!({
        "translate": vec3(t.translate),
        "rotate_deg": vec3(t.rotate_deg),
        "scale": vec3(t.scale),
    })
}

impl<W: Write> Reporter for JsonLinesSink<W> {
    fn on_node_event(&mut self, e: &NodeEvent) {
        self.emit(json!({
            "record": e.kind.as_str(),
            "tag": e.tag.as_str(),
            "name": e.name,
            "stale": e.status == HandleStatus::Stale,
        }));
    }

    fn on_rename(&mut self, e: &RenameEvent) {
        self.emit(json!({
            "record": "rename",
            "node": e.node.0,
            "old_name": e.old_name,
            "new_name": e.new_name,
        }));
    }

    fn on_attribute_facts(&mut self, e: &AttributeFacts) {
        let facts: Vec<&'static str> = e.facts.iter().map(|f| f.name()).collect();
        let direction = match e.facts.direction() {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        };
        self.emit(json!({
            "record": "attribute",
            "tag": e.tag.as_str(),
            "name": e.attr_name,
            "facts": facts,
            "direction": direction,
        }));
    }

    fn on_transform(&mut self, s: &TransformSnapshot) {
        self.emit(json!({
            "record": "transform",
            "node": s.node.0,
            "name": s.name,
            "local": trs(&s.local),
            "world": trs(&s.world),
        }));
    }

    fn on_point(&mut self, s: &PointSnapshot) {
        self.emit(json!({
            "record": "point",
            "attr": s.attr_name,
            "position": vec3(s.position),
        }));
    }

    fn on_topology(&mut self, s: &TopologySnapshot) {
        self.emit(json!({
            "record": "topology",
            "source": s.source,
            "vertex_indices": s.vertex_indices,
        }));
    }

    fn on_timer(&mut self, t: &TimerTick) {
        self.emit(json!({
            "record": "timer",
            "elapsed": t.elapsed,
        }));
    }
}
