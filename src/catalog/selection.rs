//! Shuffling, sampling and lookup over a loaded catalog.
//!
//! Everything here is generic over the random source so tests can drive it
//! with a seeded generator.

use rand::Rng;

use crate::error::CatalogError;

use super::types::Character;

/// Fisher-Yates shuffle in place.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen slot in `0..=i`, so every permutation is equally likely.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffle `items` and keep the first `limit` of them.
///
/// `None` keeps everything; a limit above the length is the same as `None`.
pub fn shuffled_prefix<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    limit: Option<usize>,
    rng: &mut R,
) -> Vec<T> {
    shuffle(&mut items, rng);
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

/// Take one element uniformly at random.
pub fn pick_random<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Result<T, CatalogError> {
    if items.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }
    let index = rng.random_range(0..items.len());
    Ok(items.swap_remove(index))
}

/// First character whose numeric id equals `id`. Records with a missing or
/// non-numeric id are skipped, not rejected.
pub fn find_by_id(characters: Vec<Character>, id: i64) -> Option<Character> {
    characters.into_iter().find(|c| c.numeric_id() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn record(value: Value) -> Character {
        serde_json::from_value(value).unwrap()
    }

    fn character(id: i64) -> Character {
        record(json!({ "id": id }))
    }

    fn id_of(character: &Character) -> i64 {
        character.numeric_id().unwrap()
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..50).collect();

        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = StdRng::seed_from_u64(1);

        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec![9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![9]);
    }

    #[test]
    fn shuffle_has_no_positional_bias() {
        const N: usize = 4;
        const TRIALS: usize = 40_000;

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts = [[0usize; N]; N];

        for _ in 0..TRIALS {
            let mut items: Vec<usize> = (0..N).collect();
            shuffle(&mut items, &mut rng);
            for (position, &element) in items.iter().enumerate() {
                counts[element][position] += 1;
            }
        }

        // Expected 10_000 per cell; 5% tolerance is ~10 standard deviations.
        let expected = TRIALS / N;
        for row in counts {
            for observed in row {
                let diff = observed.abs_diff(expected);
                assert!(diff < expected / 20, "cell off by {diff}: {counts:?}");
            }
        }
    }

    #[test]
    fn every_permutation_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();

        for _ in 0..2_000 {
            let mut items = vec![1, 2, 3];
            shuffle(&mut items, &mut rng);
            seen.insert(items);
        }

        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn prefix_respects_limit_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let all: Vec<Character> = (1..=3).map(character).collect();

        let picked = shuffled_prefix(all, Some(2), &mut rng);

        assert_eq!(picked.len(), 2);
        let ids: HashSet<i64> = picked.iter().map(id_of).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| (1..=3).contains(id)));
    }

    #[test]
    fn prefix_without_limit_returns_everything_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let all: Vec<Character> = (1..=10).map(character).collect();

        let picked = shuffled_prefix(all, None, &mut rng);

        let mut ids: Vec<i64> = picked.iter().map(id_of).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn oversized_limit_never_pads() {
        let mut rng = StdRng::seed_from_u64(5);
        let all: Vec<Character> = (1..=3).map(character).collect();

        assert_eq!(shuffled_prefix(all, Some(99), &mut rng).len(), 3);
    }

    #[test]
    fn pick_random_stays_in_catalog() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let all: Vec<Character> = (1..=5).map(character).collect();
            let chosen = pick_random(all, &mut rng).unwrap();
            assert!((1..=5).contains(&id_of(&chosen)));
        }
    }

    #[test]
    fn pick_random_on_empty_is_an_error() {
        let mut rng = StdRng::seed_from_u64(9);
        let result = pick_random(Vec::<Character>::new(), &mut rng);
        assert!(matches!(result, Err(CatalogError::EmptyCatalog)));
    }

    #[test]
    fn find_by_id_returns_first_match() {
        let all = vec![
            character(1),
            record(json!({ "id": 2, "name": "first" })),
            record(json!({ "id": 2, "name": "second" })),
        ];

        let found = find_by_id(all.clone(), 2).unwrap();
        assert_eq!(found.fields()["name"], json!("first"));

        assert!(find_by_id(all, 5).is_none());
    }

    #[test]
    fn find_by_id_skips_odd_ids() {
        let all = vec![
            record(json!({ "id": "1" })),
            record(json!({ "name": "no id" })),
            character(1),
        ];

        let found = find_by_id(all, 1).unwrap();
        assert_eq!(found.id(), Some(&json!(1)));
    }
}
