//! End-to-end properties of evaluation, emission and the tick loop.

use pointsbuilder::prelude::*;

fn worked_example() -> NodeTree<Geometry> {
    let mut tree = NodeTree::new();
    tree.push(Geometry::Axis(Axis { axis: DVec3::Y }));
    tree.push(Geometry::AddLine(AddLine {
        start: DVec3::ZERO,
        end: DVec3::new(3.0, 0.0, 3.0),
        count: 30,
    }));
    tree.push(Geometry::Scale(Scale { factor: 2.0 }));
    tree
}

fn strip(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

// ============================================================================
// Worked example
// ============================================================================

#[test]
fn test_worked_example_points() {
    let tree = worked_example();
    let result = evaluate(tree.roots(), DVec3::Y);

    assert_eq!(result.points.len(), 31);
    for (i, p) in result.points.iter().enumerate() {
        let expected = DVec3::new(6.0, 0.0, 6.0) * (i as f64 / 30.0);
        assert!((*p - expected).length() < 1e-9, "point {i}: {p} != {expected}");
    }
    assert_eq!(result.axis, DVec3::Y);
}

#[test]
fn test_worked_example_program() {
    let program = emit(worked_example().roots());
    let expected = [
        "PointsBuilder()",
        "    .axis(RelativeLocation(0.0, 1.0, 0.0))",
        "    .addLine(RelativeLocation(0.0, 0.0, 0.0), RelativeLocation(3.0, 0.0, 3.0), 30)",
        "    .scale(2.0)",
    ];
    assert_eq!(program, expected.join("\n"));
    assert_eq!(
        strip(&program),
        "PointsBuilder().axis(RelativeLocation(0.0,1.0,0.0))\
         .addLine(RelativeLocation(0.0,0.0,0.0),RelativeLocation(3.0,0.0,3.0),30).scale(2.0)"
    );
}

// ============================================================================
// Determinism and seeds
// ============================================================================

#[test]
fn test_evaluation_and_emission_are_deterministic() {
    let mut tree = worked_example();
    tree.push(Geometry::AddBall(AddBall::default()));
    tree.push(Geometry::AddFourierSeries(AddFourierSeries::default()));

    assert_eq!(evaluate(tree.roots(), DVec3::Y), evaluate(tree.roots(), DVec3::Y));
    assert_eq!(emit(tree.roots()), emit(tree.roots()));
}

fn jittered(seed: i64) -> Vec<DVec3> {
    let mut tree = NodeTree::new();
    tree.push(Geometry::AddCircle(AddCircle::default()));
    tree.push(Geometry::ApplyRandomOffset(ApplyRandomOffset {
        seed_enabled: true,
        seed,
        ..Default::default()
    }));
    evaluate(tree.roots(), DVec3::Y).points
}

#[test]
fn test_seeded_nodes_reproduce() {
    assert_eq!(jittered(42), jittered(42));
    assert_ne!(jittered(42), jittered(43));
}

#[test]
fn test_seed_is_emitted() {
    let mut tree = NodeTree::new();
    tree.push(Geometry::ApplyRandomOffset(ApplyRandomOffset {
        seed_enabled: true,
        seed: 9,
        ..Default::default()
    }));
    assert!(emit(tree.roots()).ends_with(".applyRandomOffset(0.05, 0.2, SeededRandom(9))"));
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn test_container_children_in_order() {
    let mut tree = NodeTree::new();
    let group = tree.push(Geometry::WithBuilder(WithBuilder));
    for x in [1.0, 2.0, 3.0] {
        tree.append(
            Some(group),
            Geometry::AddPoint(AddPoint {
                point: DVec3::new(x, 0.0, 0.0),
            }),
        )
        .unwrap();
    }

    let result = evaluate(tree.roots(), DVec3::Y);
    assert_eq!(
        result.points,
        vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0)]
    );
    let expected = [
        "PointsBuilder()",
        "    .addBuilder(",
        "        PointsBuilder()",
        "            .addPoint(RelativeLocation(1.0, 0.0, 0.0))",
        "            .addPoint(RelativeLocation(2.0, 0.0, 0.0))",
        "            .addPoint(RelativeLocation(3.0, 0.0, 0.0))",
        "    )",
    ];
    assert_eq!(emit(tree.roots()), expected.join("\n"));
}

#[test]
fn test_empty_containers_add_nothing() {
    let mut tree = NodeTree::new();
    tree.push(Geometry::WithBuilder(WithBuilder));
    tree.push(Geometry::AddWith(AddWith::default()));
    assert!(evaluate(tree.roots(), DVec3::Y).points.is_empty());
}

// ============================================================================
// Node identity
// ============================================================================

#[test]
fn test_edits_keep_other_ids() {
    let mut tree = worked_example();
    let ids = tree.root_ids().to_vec();

    tree.move_node(ids[2], None, 0).unwrap();
    let copy = tree.duplicate(ids[0]).unwrap();
    tree.remove(ids[1]).unwrap();

    assert_eq!(tree.root_ids(), &[ids[2], ids[0], copy]);
    assert!(!ids.contains(&copy));
    let fresh = tree.push(Geometry::Scale(Scale::default()));
    assert!(!ids.contains(&fresh));
}

// ============================================================================
// Particles
// ============================================================================

#[test]
fn test_falloff_is_one_at_zero_and_decreasing() {
    assert_eq!(falloff(0.0, 2.0, 2.0), 1.0);
    assert!(falloff(1.0, 2.0, 2.0) > falloff(3.0, 2.0, 2.0));
    assert_eq!(falloff(10.0, -1.0, 2.0), 1.0);
}

#[test]
fn test_tick_loop_conservation() {
    let mut commands = NodeTree::new();
    commands.push(Command::Drag(ParticleDrag::default()));

    let config = SimulationConfig {
        spawn_min: 0,
        spawn_max: 0,
        seed: Some(5),
        ..Default::default()
    };
    let mut sim = Simulation::new(config);
    sim.insert(Particle::new(DVec3::ZERO, DVec3::X, 7, 0.1, 1));

    for tick in 1..7 {
        sim.tick(&commands);
        assert_eq!(sim.len(), 1, "particle removed early at tick {tick}");
    }
    sim.tick(&commands);
    assert_eq!(sim.len(), 0);
}

#[test]
fn test_particle_program() {
    let mut commands = NodeTree::new();
    commands.push(Command::Drag(ParticleDrag {
        damping: 0.1,
        linear: 0.0,
    }));
    assert_eq!(
        emit(commands.roots()),
        "ParticleCommandQueue()\n    .add(ParticleDragCommand(damping = 0.1, linear = 0.0))"
    );
}
