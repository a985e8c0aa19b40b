//! Code generator strategies under concurrency

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use linkforge::config::{GeneratorConfig, GeneratorStrategy};
use linkforge::generator::snowflake::decompose;
use linkforge::generator::{CodeGenerator, ManualClock, SnowflakeGenerator, base62};

const EPOCH: u64 = 1_735_689_600_000;

fn distributed(node_id: u64) -> GeneratorConfig {
    GeneratorConfig {
        strategy: GeneratorStrategy::Distributed,
        node_id,
        ..Default::default()
    }
}

#[test]
fn test_counter_is_unique_across_threads() {
    let generator = Arc::new(
        CodeGenerator::from_config(&GeneratorConfig {
            strategy: GeneratorStrategy::Counter,
            ..Default::default()
        })
        .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let generator = generator.clone();
            thread::spawn(move || {
                (0..1000)
                    .map(|_| generator.next_code().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        for code in handle.join().unwrap() {
            assert!(codes.insert(code));
        }
    }
    assert_eq!(codes.len(), 8000);

    // seeded high, so no short early codes
    assert!(codes.iter().all(|c| base62::decode(c).unwrap() >= 1_000_000));
}

#[test]
fn test_distributed_is_unique_across_threads() {
    let generator = Arc::new(CodeGenerator::from_config(&distributed(17)).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let generator = generator.clone();
            thread::spawn(move || {
                (0..2000)
                    .map(|_| generator.next_code().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        for code in handle.join().unwrap() {
            let parts = decompose(base62::decode(&code).unwrap());
            assert_eq!(parts.node_id, 17);
            assert!(code.len() <= 10);
            assert!(codes.insert(code));
        }
    }
    assert_eq!(codes.len(), 16_000);
}

#[test]
fn test_nodes_sharing_a_clock_never_collide() {
    let clock = Arc::new(ManualClock::new(EPOCH + 10_000));
    let wait = std::time::Duration::from_millis(1);

    let nodes: Vec<SnowflakeGenerator> = (0..4)
        .map(|node| SnowflakeGenerator::new(node, EPOCH, wait, clock.clone()).unwrap())
        .collect();

    let mut codes = HashSet::new();
    for _ in 0..100 {
        for node in &nodes {
            assert!(codes.insert(node.next_code().unwrap()));
        }
    }
    assert_eq!(codes.len(), 400);
}

#[test]
fn test_invalid_node_id_is_rejected() {
    assert!(CodeGenerator::from_config(&distributed(1024)).is_err());
}
