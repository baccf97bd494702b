// ============================================================
// Layer 3 — Classification Evaluation
// ============================================================
// A confusion matrix plus the usual metrics derived from it.
//
//   rows    = actual digit
//   columns = predicted digit
//
// Precision, recall and F1 are macro-averaged: computed per
// class, then averaged over the classes where they are defined.
// A class nobody predicted has no precision; a class with no
// examples has no recall. Those classes are left out of the
// average instead of dragging it to zero.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::domain::digit::NUM_CLASSES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    num_classes: usize,
    /// Flattened `num_classes x num_classes` matrix
    matrix: Vec<u64>,
}

impl Evaluation {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            matrix: vec![0; num_classes * num_classes],
        }
    }

    /// Record one example. Out-of-range classes are ignored.
    pub fn record(&mut self, actual: usize, predicted: usize) {
        if actual >= self.num_classes || predicted >= self.num_classes {
            tracing::warn!(
                "Ignoring out-of-range evaluation entry ({}, {})",
                actual,
                predicted
            );
            return;
        }
        self.matrix[actual * self.num_classes + predicted] += 1;
    }

    /// Fold another evaluation over the same classes into this one
    pub fn merge(&mut self, other: &Evaluation) {
        debug_assert_eq!(self.num_classes, other.num_classes);
        for (a, b) in self.matrix.iter_mut().zip(&other.matrix) {
            *a += b;
        }
    }

    pub fn count(&self, actual: usize, predicted: usize) -> u64 {
        self.matrix[actual * self.num_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.matrix.iter().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.num_classes).map(|c| self.count(c, c)).sum()
    }

    fn actual_total(&self, class: usize) -> u64 {
        (0..self.num_classes).map(|p| self.count(class, p)).sum()
    }

    fn predicted_total(&self, class: usize) -> u64 {
        (0..self.num_classes).map(|a| self.count(a, class)).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64
    }

    pub fn class_precision(&self, class: usize) -> Option<f64> {
        let predicted = self.predicted_total(class);
        (predicted > 0).then(|| self.count(class, class) as f64 / predicted as f64)
    }

    pub fn class_recall(&self, class: usize) -> Option<f64> {
        let actual = self.actual_total(class);
        (actual > 0).then(|| self.count(class, class) as f64 / actual as f64)
    }

    pub fn class_f1(&self, class: usize) -> Option<f64> {
        let p = self.class_precision(class)?;
        let r = self.class_recall(class)?;
        if p + r == 0.0 {
            return Some(0.0);
        }
        Some(2.0 * p * r / (p + r))
    }

    pub fn precision(&self) -> f64 {
        self.macro_average(|c| self.class_precision(c))
    }

    pub fn recall(&self) -> f64 {
        self.macro_average(|c| self.class_recall(c))
    }

    pub fn f1(&self) -> f64 {
        self.macro_average(|c| self.class_f1(c))
    }

    fn macro_average(&self, metric: impl Fn(usize) -> Option<f64>) -> f64 {
        let values: Vec<f64> = (0..self.num_classes).filter_map(metric).collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Multi-line report: counts, metrics, then the confusion matrix.
    pub fn stats(&self) -> String {
        let mut out = String::new();
        let n = self.num_classes;

        let _ = writeln!(out, "========================Evaluation Metrics========================");
        let _ = writeln!(out, " # of classes:    {}", n);
        let _ = writeln!(out, " Examples:        {}", self.total());
        let _ = writeln!(out, " Correct:         {}", self.correct());
        let _ = writeln!(out, " Accuracy:        {:.4}", self.accuracy());
        let _ = writeln!(out, " Precision:       {:.4}", self.precision());
        let _ = writeln!(out, " Recall:          {:.4}", self.recall());
        let _ = writeln!(out, " F1 Score:        {:.4}", self.f1());
        let _ = writeln!(out);
        let _ = writeln!(out, "=========================Confusion Matrix=========================");

        let header: Vec<String> = (0..n).map(|c| format!("{c:>6}")).collect();
        let _ = writeln!(out, "{}", header.join(""));
        let _ = writeln!(out, "{}", "-".repeat(6 * n));
        for actual in 0..n {
            let row: Vec<String> = (0..n)
                .map(|predicted| format!("{:>6}", self.count(actual, predicted)))
                .collect();
            let _ = writeln!(out, "{} | {} = {}", row.join(""), actual, actual);
        }
        let _ = writeln!(out);
        let _ = write!(out, "Confusion matrix format: Actual (rowClass) predicted as (columnClass) N times");

        out
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Self::new(NUM_CLASSES)
    }
}
