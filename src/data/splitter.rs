// ============================================================
// Layer 4: Seeded Train/Test Splitter
// ============================================================
// Shuffles samples and splits them into a training set and a
// held-out test set.
//
// The shuffle is driven by a seeded StdRng, so the same input and
// the same seed always give the same split. That is what makes the
// loan report (and the example applicant's probability) repeatable
// from one run to the next.
//
// The held-out size is rounded UP: 0.2 of 11 rows holds out 3.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SeedableRng)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, test).
///
/// # Arguments
/// * `samples`       - All available samples (consumed by this function)
/// * `test_fraction` - Proportion held out, e.g. 0.2 = 20%
/// * `seed`          - RNG seed; equal seeds give equal splits
pub fn split_train_test<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total     = samples.len();
    let fraction  = test_fraction.clamp(0.0, 1.0);
    let test_size = ((total as f64) * fraction).ceil() as usize;
    let split_at  = total - test_size.min(total);

    // split_off(n) removes elements [n..] and returns them
    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split (seed {}): {} train, {} test",
        seed,
        samples.len(),
        test.len(),
    );

    (samples, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_test_size_rounds_up() {
        let items: Vec<usize> = (0..11).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(test.len(),  3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, test)     = split_train_test(items, 0.3, 7);
        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_test((0..40).collect::<Vec<usize>>(), 0.2, 42);
        let b = split_train_test((0..40).collect::<Vec<usize>>(), 0.2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_order() {
        let a = split_train_test((0..40).collect::<Vec<usize>>(), 0.2, 1);
        let b = split_train_test((0..40).collect::<Vec<usize>>(), 0.2, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_train_test(Vec::<usize>::new(), 0.2, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }
}
