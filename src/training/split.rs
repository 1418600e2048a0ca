//! Stratified train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so each class keeps its proportion in both parts.
/// Same `seed` and labels always give the same split.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let mut n_test = (members.len() as f64 * test_size).round() as usize;
        // a class with two or more rows is represented on both sides
        if members.len() >= 2 {
            n_test = n_test.clamp(1, members.len() - 1);
        } else {
            n_test = 0;
        }

        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}
