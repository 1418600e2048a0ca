//! Held-out evaluation metrics
//!
//! Informational only; nothing here gates whether an artifact is written.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Index 0 = stayed, 1 = left
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    /// `None` when the held-out part lacks one of the classes
    pub roc_auc: Option<f64>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn class_metrics(truth: &[u8], predicted: &[u8], class: u8) -> ClassMetrics {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&t, &p) in truth.iter().zip(predicted) {
        match (t == class, p == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support: tp + fn_,
    }
}

impl ClassificationReport {
    pub fn new(truth: &[u8], predicted: &[u8], scores: &[f64]) -> Self {
        let classes = [
            class_metrics(truth, predicted, 0),
            class_metrics(truth, predicted, 1),
        ];
        let total = truth.len();
        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();

        let macro_avg = ClassMetrics {
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall: (classes[0].recall + classes[1].recall) / 2.0,
            f1: (classes[0].f1 + classes[1].f1) / 2.0,
            support: total,
        };

        let weight = |c: &ClassMetrics| ratio(c.support, total);
        let weighted_avg = ClassMetrics {
            precision: classes.iter().map(|c| c.precision * weight(c)).sum(),
            recall: classes.iter().map(|c| c.recall * weight(c)).sum(),
            f1: classes.iter().map(|c| c.f1 * weight(c)).sum(),
            support: total,
        };

        Self {
            classes,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            roc_auc: roc_auc(truth, scores),
        }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{name:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        write_row(f, "0", &self.classes[0])?;
        write_row(f, "1", &self.classes[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)?;
        writeln!(f)?;
        match self.roc_auc {
            Some(auc) => write!(f, "ROC AUC: {auc}"),
            None => write!(f, "ROC AUC: undefined (single class in held-out set)"),
        }
    }
}

/// Area under the ROC curve via the rank-sum statistic, ties averaged
pub fn roc_auc(truth: &[u8], scores: &[f64]) -> Option<f64> {
    let positives = truth.iter().filter(|&&y| y == 1).count();
    let negatives = truth.len() - positives;
    if positives == 0 || negatives == 0 || truth.len() != scores.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j share their mean
        let mean_rank = (i + 1 + j) as f64 / 2.0;
        positive_rank_sum += order[i..j].iter().filter(|&&k| truth[k] == 1).count() as f64 * mean_rank;
        i = j;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}
