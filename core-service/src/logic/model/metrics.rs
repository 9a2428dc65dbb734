//! Evaluation metrics for the binary Safe/Unsafe task
//!
//! Both classes are always reported, even when one never occurs in the
//! evaluation subset. Any ratio with a zero denominator is 0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::threshold::SafetyLabel;

/// 2×2 confusion matrix, `counts[actual][predicted]`, index 0 = Unsafe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[SafetyLabel], predicted: &[SafetyLabel]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            counts[a.encoded() as usize][p.encoded() as usize] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        self.counts[0][0] + self.counts[1][1]
    }

    fn support(&self, class: usize) -> usize {
        self.counts[class][0] + self.counts[class][1]
    }

    fn predicted(&self, class: usize) -> usize {
        self.counts[0][class] + self.counts[1][class]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn for_class(cm: &ConfusionMatrix, class: usize) -> Self {
        let tp = cm.counts[class][class];
        let precision = ratio(tp, cm.predicted(class));
        let recall = ratio(tp, cm.support(class));
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
            support: cm.support(class),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Index 0 = Unsafe, 1 = Safe
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn evaluate(actual: &[SafetyLabel], predicted: &[SafetyLabel]) -> Self {
        let confusion = ConfusionMatrix::from_labels(actual, predicted);
        let classes = [
            ClassMetrics::for_class(&confusion, 0),
            ClassMetrics::for_class(&confusion, 1),
        ];
        let total = confusion.total();

        // Macro average covers only classes seen in either labels or predictions
        let present: Vec<&ClassMetrics> = (0..2)
            .filter(|&c| confusion.support(c) > 0 || confusion.predicted(c) > 0)
            .map(|c| &classes[c])
            .collect();
        let mean = |pick: fn(&ClassMetrics) -> f64| -> f64 {
            if present.is_empty() {
                return 0.0;
            }
            present.iter().map(|c| pick(c)).sum::<f64>() / present.len() as f64
        };
        let macro_avg = ClassMetrics {
            precision: mean(|c| c.precision),
            recall: mean(|c| c.recall),
            f1: mean(|c| c.f1),
            support: total,
        };

        let weight = |pick: fn(&ClassMetrics) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| pick(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total,
        };

        Self {
            classes,
            accuracy: ratio(confusion.correct(), total),
            macro_avg,
            weighted_avg,
            confusion,
        }
    }

    pub fn class(&self, label: SafetyLabel) -> &ClassMetrics {
        &self.classes[label.encoded() as usize]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14}{:>11}{:>10}{:>10}{:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (index, metrics) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>14}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                index, metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14}{:>11}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = actual, cols = predicted):")?;
        writeln!(f, "[[{} {}]", self.confusion.counts[0][0], self.confusion.counts[0][1])?;
        write!(f, " [{} {}]]", self.confusion.counts[1][0], self.confusion.counts[1][1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SafetyLabel::{Safe, Unsafe};

    #[test]
    fn test_report_values() {
        let actual = [Safe, Safe, Safe, Unsafe, Unsafe];
        let predicted = [Safe, Safe, Unsafe, Unsafe, Safe];
        let report = ClassificationReport::evaluate(&actual, &predicted);

        assert_eq!(report.confusion.counts, [[1, 1], [1, 2]]);
        assert!((report.accuracy - 0.6).abs() < 1e-12);

        let safe = report.class(Safe);
        assert!((safe.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((safe.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(safe.support, 3);

        let unsafe_ = report.class(Unsafe);
        assert!((unsafe_.precision - 0.5).abs() < 1e-12);
        assert!((unsafe_.f1 - 0.5).abs() < 1e-12);

        let expected_weighted = (2.0 / 3.0 * 3.0 + 0.5 * 2.0) / 5.0;
        assert!((report.weighted_avg.f1 - expected_weighted).abs() < 1e-12);
        assert_eq!(report.macro_avg.support, 5);
    }

    #[test]
    fn test_zero_division_is_zero() {
        // Safe never predicted and never present
        let report = ClassificationReport::evaluate(&[Unsafe, Unsafe], &[Unsafe, Unsafe]);
        let safe = report.class(Safe);
        assert_eq!(safe.precision, 0.0);
        assert_eq!(safe.recall, 0.0);
        assert_eq!(safe.f1, 0.0);
        assert_eq!(safe.support, 0);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_avg.f1, 1.0);
        assert_eq!(report.macro_avg.precision, 1.0);

        // Safe predicted but never present still counts toward the macro average
        let report = ClassificationReport::evaluate(&[Unsafe, Unsafe], &[Unsafe, Safe]);
        assert_eq!(report.macro_avg.precision, 0.5);
        assert_eq!(report.macro_avg.recall, 0.25);

        let empty = ClassificationReport::evaluate(&[], &[]);
        assert_eq!(empty.accuracy, 0.0);
        assert_eq!(empty.macro_avg.f1, 0.0);
        assert_eq!(empty.weighted_avg.precision, 0.0);
    }

    #[test]
    fn test_display_lists_both_classes() {
        let report = ClassificationReport::evaluate(&[Safe, Unsafe], &[Safe, Safe]);
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("[[0 1]"));
        assert!(text.contains(" [0 1]]"));
    }
}
