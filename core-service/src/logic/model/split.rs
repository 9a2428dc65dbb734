//! Train / evaluation partition
//!
//! Seeded and reproducible. Stratified by label when both classes occur,
//! otherwise a plain seeded shuffle.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::logic::threshold::SafetyLabel;

/// Fixed label space, in priority order for allocation ties
const LABEL_SPACE: [SafetyLabel; 2] = [SafetyLabel::Unsafe, SafetyLabel::Safe];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub stratified: bool,
}

/// Rows held out: ceil(ratio · n), always leaving at least one training row
pub fn test_size(n_rows: usize, test_ratio: f64) -> usize {
    if n_rows < 2 {
        return 0;
    }
    let ratio = test_ratio.clamp(0.0, 1.0);
    let wanted = (ratio * n_rows as f64).ceil() as usize;
    wanted.min(n_rows - 1)
}

/// Split proportionally per class; the largest fractional remainders get
/// the leftover test slots.
fn allocate(class_counts: &[usize], n_rows: usize, n_test: usize) -> Vec<usize> {
    let exact: Vec<f64> = class_counts
        .iter()
        .map(|&c| n_test as f64 * c as f64 / n_rows as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut remaining = n_test - alloc.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..class_counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    for class in order {
        if remaining == 0 {
            break;
        }
        if alloc[class] < class_counts[class] {
            alloc[class] += 1;
            remaining -= 1;
        }
    }
    alloc
}

pub fn train_test_split(labels: &[SafetyLabel], test_ratio: f64, seed: u64) -> TrainTestSplit {
    let n_rows = labels.len();
    let n_test = test_size(n_rows, test_ratio);
    let mut rng = StdRng::seed_from_u64(seed);

    let by_class: Vec<Vec<usize>> = LABEL_SPACE
        .iter()
        .map(|class| (0..n_rows).filter(|&i| labels[i] == *class).collect())
        .collect();
    let distinct = by_class.iter().filter(|rows| !rows.is_empty()).count();

    if distinct < 2 {
        let mut order: Vec<usize> = (0..n_rows).collect();
        order.shuffle(&mut rng);
        let train = order.split_off(n_test);
        return TrainTestSplit {
            train,
            test: order,
            stratified: false,
        };
    }

    let counts: Vec<usize> = by_class.iter().map(Vec::len).collect();
    let alloc = allocate(&counts, n_rows, n_test);

    let mut train = Vec::with_capacity(n_rows - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (mut rows, take) in by_class.into_iter().zip(alloc) {
        rows.shuffle(&mut rng);
        let rest = rows.split_off(take);
        test.extend(rows);
        train.extend(rest);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    TrainTestSplit {
        train,
        test,
        stratified: true,
    }
}
