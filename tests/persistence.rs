mod common;

use common::SimulationBuilder;
use orchard_lib::data::{TreeComponent, TreeDistribution, TreeRecord, Vec2};
use orchard_lib::io::{distribution, IoError};
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("orchard_persistence_{}_{}", name, std::process::id()))
}

#[test]
fn test_distribution_survives_a_file_round_trip() {
    let mut source = SimulationBuilder::new()
        .with_seed(17)
        .populated(0, 25)
        .build();
    source.run(240);
    let captured = source.capture_tree_distribution();
    assert!(!captured.is_empty());

    let dir = scratch_dir("round_trip");
    let path = distribution::default_distribution_path(&dir);
    distribution::save(&captured, &path).unwrap();
    let loaded = distribution::load(&path).unwrap();
    assert_eq!(loaded, captured);

    let mut replica = SimulationBuilder::new().with_seed(99).build();
    let planted = replica.load_tree_distribution(&loaded).unwrap();
    assert_eq!(planted, captured.len());
    assert_eq!(replica.capture_tree_distribution(), captured);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_loaded_saplings_keep_their_age() {
    let distribution = TreeDistribution {
        trees: vec![
            TreeRecord {
                position: Vec2::new(5.0, 5.0),
                angle: 1.25,
                age: 3.0,
            },
            TreeRecord {
                position: Vec2::new(30.0, 12.0),
                angle: 0.0,
                age: 45.0,
            },
        ],
    };
    let mut sim = SimulationBuilder::new().build();
    sim.load_tree_distribution(&distribution).unwrap();

    let stats = sim.stats();
    assert_eq!(stats.saplings, 1);
    assert_eq!(stats.mature_trees, 1);
    let trees = sim.registry.components::<TreeComponent>();
    assert_eq!(trees[0].angle, 1.25);
    assert_eq!(trees[1].age, 45.0);
}

#[test]
fn test_out_of_bounds_records_are_skipped() {
    let distribution = TreeDistribution {
        trees: vec![
            TreeRecord {
                position: Vec2::new(-3.0, 5.0),
                angle: 0.0,
                age: 30.0,
            },
            TreeRecord {
                position: Vec2::new(10.0, 10.0),
                angle: 0.0,
                age: 30.0,
            },
        ],
    };
    let mut sim = SimulationBuilder::new().build();
    assert_eq!(sim.load_tree_distribution(&distribution).unwrap(), 1);
    assert_eq!(sim.registry.count::<TreeComponent>(), 1);
}

#[test]
fn test_loading_into_a_planted_world_fails() {
    let mut sim = SimulationBuilder::new().populated(0, 5).build();
    let distribution = sim.capture_tree_distribution();
    let err = sim.load_tree_distribution(&distribution).unwrap_err();
    assert!(err.to_string().contains("5 trees"));
    assert_eq!(sim.registry.count::<TreeComponent>(), 5);
}

#[test]
fn test_corrupt_file_is_reported() {
    let dir = scratch_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("trees.json");
    std::fs::write(&path, "{ \"trees\": [ { \"position\": [1.0] } ] }").unwrap();

    let err = distribution::load(&path).unwrap_err();
    assert!(err.to_string().starts_with("loading tree distribution"));
    assert!(matches!(err, IoError::Context { .. }));

    std::fs::remove_dir_all(&dir).ok();
}
