use std::collections::BTreeMap;

use boss_room_core::AttackKind;
use boss_room_system_attack_scheduler::AttackPool;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DRAWS: u32 = 100_000;
// Chi-square critical value for 7 degrees of freedom at p = 0.0001.
const CRITICAL_7_DOF: f64 = 29.88;

#[test]
fn phase_two_draws_converge_to_weight_fractions() {
    let pool = AttackPool::phase2();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_cafe);
    let mut counts: BTreeMap<AttackKind, u32> = BTreeMap::new();
    for _ in 0..DRAWS {
        let kind = pool.draw(&mut rng).expect("non-empty pool");
        *counts.entry(kind).or_insert(0) += 1;
    }

    let total_weight = f64::from(pool.total_weight());
    let chi_square: f64 = pool
        .entries()
        .iter()
        .map(|entry| {
            let expected = f64::from(DRAWS) * f64::from(entry.weight) / total_weight;
            let observed = f64::from(counts.get(&entry.kind).copied().unwrap_or(0));
            (observed - expected).powi(2) / expected
        })
        .sum();

    assert!(
        chi_square < CRITICAL_7_DOF,
        "chi-square {chi_square} exceeds critical value"
    );
}

#[test]
fn zero_weight_entries_are_never_drawn_when_others_have_weight() {
    let pool = AttackPool::from_weights(&[
        (AttackKind::InputDesync, 0),
        (AttackKind::AreaBurst, 5),
    ]);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..1_000 {
        assert_eq!(pool.draw(&mut rng), Some(AttackKind::AreaBurst));
    }
}

#[test]
fn pool_round_trips_through_toml() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        pool: AttackPool,
    }
    let wrapper: Wrapper = toml::from_str(
        r#"
        [[pool]]
        kind = "collision_paradox"
        weight = 3
        [[pool]]
        kind = "area_burst"
        weight = 1
        "#,
    )
    .expect("valid pool");
    assert_eq!(
        wrapper.pool,
        AttackPool::from_weights(&[(AttackKind::CollisionParadox, 3), (AttackKind::AreaBurst, 1)])
    );
}
