//! In-place uniform permutation.

use rand::Rng;

/// Fisher–Yates shuffle: walks from the last index down to 1, swapping each
/// slot with a uniformly drawn index in `[0, i]`.
pub fn shuffle_in_place<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..50).collect();
        shuffle_in_place(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_handles_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle_in_place(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec![42];
        shuffle_in_place(&mut one, &mut rng);
        assert_eq!(one, vec![42]);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        shuffle_in_place(&mut a, &mut StdRng::seed_from_u64(99));
        shuffle_in_place(&mut b, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn every_position_is_reachable() {
        // Over many runs the first element should land in every slot.
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let mut items = [0, 1, 2, 3];
            shuffle_in_place(&mut items, &mut rng);
            let pos = items.iter().position(|&v| v == 0).unwrap();
            seen[pos] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
