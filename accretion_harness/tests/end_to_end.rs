// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full-pipeline tests: scene mutations drain through a dispatcher into a
//! collecting reporter.

use glam::DVec3;

use accretion_core::boundary::EventKind;
use accretion_core::dispatch::{ChangeDispatcher, WatchConfig};
use accretion_core::facts::{AttrRef, ChangeMask, EVAL, INCOMING, VALUE_SET};
use accretion_core::node::{HandleStatus, NodeTag};
use accretion_core::transform::LocalTransform;
use accretion_harness::{CollectingReporter, MemoryScene};

/// Drains the scene's queued notifications through the dispatcher.
fn pump(scene: &mut MemoryScene, dispatcher: &mut ChangeDispatcher, reporter: &mut CollectingReporter) {
    for event in scene.drain_events() {
        dispatcher.dispatch(scene, reporter, event);
    }
}

fn install(scene: &mut MemoryScene) -> ChangeDispatcher {
    ChangeDispatcher::install(scene, WatchConfig::default())
}

#[test]
fn install_covers_graph_and_timer() {
    let mut scene = MemoryScene::new();
    let dispatcher = install(&mut scene);

    assert_eq!(dispatcher.registry().active_count(), 3);
    assert_eq!(scene.subscription_count(), 3);
}

#[test]
fn node_added_widens_coverage() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let root = scene.add_node("root", NodeTag::Transform, None);
    scene.add_node("mid", NodeTag::Transform, Some(root));
    scene.add_node("leaf", NodeTag::Transform, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.node_events.len(), 3);
    // Three install callbacks plus two per observed node.
    assert_eq!(dispatcher.registry().active_count(), 9);
    assert_eq!(scene.subscription_count(), 9);
}

#[test]
fn refused_sub_registration_shrinks_coverage_not_correctness() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    scene.fail_next_subscribes(1);
    scene.add_node("partial", NodeTag::Transform, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);

    // The node event is still reported; only one of the two per-node
    // callbacks landed.
    assert_eq!(reporter.node_events.len(), 1);
    assert_eq!(dispatcher.registry().active_count(), 4);
}

#[test]
fn translate_change_reports_every_ancestor_level() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let root = scene.add_node("root", NodeTag::Transform, None);
    let mid = scene.add_node("mid", NodeTag::Transform, Some(root));
    let leaf = scene.add_node("leaf", NodeTag::Transform, Some(mid));
    scene.set_local_transform(root, LocalTransform::from_translation(DVec3::new(1.0, 0.0, 0.0)));
    scene.set_local_transform(mid, LocalTransform::from_translation(DVec3::new(0.0, 1.0, 0.0)));
    pump(&mut scene, &mut dispatcher, &mut reporter);
    reporter = CollectingReporter::new();

    scene.set_translation(leaf, DVec3::new(0.0, 0.0, 1.0));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    // One snapshot per level, deepest first.
    assert_eq!(reporter.transforms.len(), 3);
    assert_eq!(reporter.transforms[0].name, "leaf");
    assert_eq!(reporter.transforms[2].name, "root");

    let leaf_snap = &reporter.transforms[0];
    assert!((leaf_snap.local.translate.z - 1.0).abs() < 1e-9);
    let world = leaf_snap.world.translate;
    assert!((world.x - 1.0).abs() < 1e-9, "world x, got {world:?}");
    assert!((world.y - 1.0).abs() < 1e-9, "world y, got {world:?}");
    assert!((world.z - 1.0).abs() < 1e-9, "world z, got {world:?}");

    // The generic summary still accompanies the walk.
    assert_eq!(reporter.attribute_facts.len(), 1);
    assert_eq!(reporter.attribute_facts[0].attr_name, "translate");
}

#[test]
fn deep_chain_walks_every_level() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let mut parent = None;
    let mut deepest = None;
    for depth in 0..40 {
        let node = scene.add_node(format!("n{depth}"), NodeTag::Transform, parent);
        parent = Some(node);
        deepest = Some(node);
    }
    pump(&mut scene, &mut dispatcher, &mut reporter);
    reporter = CollectingReporter::new();

    scene.set_translation(deepest.unwrap(), DVec3::new(2.0, 0.0, 0.0));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.transforms.len(), 40);
    assert_eq!(reporter.transforms[0].name, "n39");
    assert_eq!(reporter.transforms[39].name, "n0");
}

#[test]
fn parent_cycle_aborts_the_walk_without_panic() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let a = scene.add_node("a", NodeTag::Transform, None);
    let b = scene.add_node("b", NodeTag::Transform, Some(a));
    pump(&mut scene, &mut dispatcher, &mut reporter);
    scene.force_parent(a, b);
    reporter = CollectingReporter::new();

    scene.set_translation(b, DVec3::new(1.0, 0.0, 0.0));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert!(reporter.transforms.is_empty(), "cycle must abort resolution");
    assert_eq!(reporter.attribute_facts.len(), 1);
}

#[test]
fn detached_node_walks_nothing() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let node = scene.add_node("floating", NodeTag::Transform, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    scene.detach(node);
    reporter = CollectingReporter::new();

    scene.set_translation(node, DVec3::new(1.0, 0.0, 0.0));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert!(reporter.transforms.is_empty());
    assert_eq!(reporter.attribute_facts.len(), 1);
}

#[test]
fn rename_carries_old_and_new_names() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let node = scene.add_node("before", NodeTag::Material, None);
    scene.rename(node, "after");
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.renames.len(), 1);
    assert_eq!(reporter.renames[0].old_name, "before");
    assert_eq!(reporter.renames[0].new_name, "after");
}

#[test]
fn point_move_reads_back_the_new_position() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let mesh = scene.add_node("meshShape1", NodeTag::Mesh, None);
    scene.set_mesh_points(mesh, vec![DVec3::ZERO, DVec3::ZERO]);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    reporter = CollectingReporter::new();

    scene.set_mesh_point(mesh, 1, DVec3::new(4.0, 5.0, 6.0));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.points.len(), 1);
    assert_eq!(reporter.points[0].attr_name, "controlPoints");
    assert_eq!(reporter.points[0].position, DVec3::new(4.0, 5.0, 6.0));
}

#[test]
fn topology_rebuild_enumerates_vertices() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let mesh = scene.add_node("meshShape1", NodeTag::Mesh, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    reporter = CollectingReporter::new();

    scene.rebuild_topology(mesh, vec![DVec3::ZERO, DVec3::ONE, DVec3::X]);
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.topologies.len(), 1);
    assert_eq!(reporter.topologies[0].source, "meshShape1");
    assert_eq!(reporter.topologies[0].vertex_indices, vec![0, 1, 2]);
}

#[test]
fn derived_output_eval_enumerates_vertices() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let mesh = scene.add_node("meshShape1", NodeTag::Mesh, None);
    scene.set_mesh_points(mesh, vec![DVec3::ZERO, DVec3::ONE]);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    reporter = CollectingReporter::new();

    scene.touch_attribute(mesh, AttrRef::named("outMesh"), ChangeMask(EVAL | INCOMING));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.topologies.len(), 1);
    assert_eq!(reporter.topologies[0].source, "outMesh");
    assert_eq!(reporter.topologies[0].vertex_indices, vec![0, 1]);
}

#[test]
fn removal_reports_a_stale_node_event() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let node = scene.add_node("doomed", NodeTag::Light, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    reporter = CollectingReporter::new();

    scene.remove_node(node);
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.node_events.len(), 1);
    assert_eq!(reporter.node_events[0].kind, EventKind::NodeRemoved);
    assert_eq!(reporter.node_events[0].status, HandleStatus::Stale);
    assert_eq!(reporter.node_events[0].tag, NodeTag::Other);
}

#[test]
fn change_on_removed_node_degrades_to_summary() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    let node = scene.add_node("gone", NodeTag::Transform, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    scene.remove_node(node);
    scene.drain_events();
    reporter = CollectingReporter::new();

    scene.touch_attribute(node, AttrRef::named("translateX"), ChangeMask(VALUE_SET));
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert!(reporter.transforms.is_empty());
    assert_eq!(reporter.attribute_facts.len(), 1);
    assert_eq!(reporter.attribute_facts[0].tag, NodeTag::Other);
}

#[test]
fn timer_ticks_flow_through() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    scene.tick(5.0);
    scene.tick(5.0);
    pump(&mut scene, &mut dispatcher, &mut reporter);

    assert_eq!(reporter.ticks.len(), 2);
}

#[test]
fn shutdown_sweeps_everything_once() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);
    let mut reporter = CollectingReporter::new();

    scene.add_node("a", NodeTag::Transform, None);
    pump(&mut scene, &mut dispatcher, &mut reporter);
    assert_eq!(scene.subscription_count(), 5);

    dispatcher.shutdown(&mut scene);
    assert_eq!(dispatcher.registry().active_count(), 0);
    assert_eq!(scene.subscription_count(), 0);

    // A second shutdown is a no-op.
    dispatcher.shutdown(&mut scene);
    assert_eq!(scene.subscription_count(), 0);
}

#[test]
fn refused_unsubscribe_still_clears_the_registry() {
    let mut scene = MemoryScene::new();
    let mut dispatcher = install(&mut scene);

    scene.refuse_next_unsubscribe();
    dispatcher.shutdown(&mut scene);

    // The host kept its callbacks, but the engine no longer tracks them.
    assert_eq!(dispatcher.registry().active_count(), 0);
    assert_eq!(scene.subscription_count(), 3);
}
