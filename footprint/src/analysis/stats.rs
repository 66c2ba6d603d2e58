//! Code structure statistics
//!
//! One [`Stats`] per file, computed by a single traversal of its finished
//! tree, then reduced with [`Stats::add`] for a whole run.

// Ratios intentionally convert counts to f64
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

use crate::frame::{FrameKind, FrameTree, VisitOrder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub if_count: usize,
    pub for_count: usize,
    /// `case` and `default` clauses of switch, type switch and select
    pub case_count: usize,
    pub func_count: usize,
    pub go_func_count: usize,
    /// Sum of the five counters above
    pub injection_points: usize,
    pub lines: usize,
}

impl Stats {
    pub fn from_tree(tree: &FrameTree, lines: usize) -> Self {
        let mut stats = Stats { lines, ..Stats::default() };
        tree.visit(VisitOrder::PreOrder, |_, frame| match frame.kind {
            FrameKind::Package { .. } => {}
            FrameKind::Function { .. } => stats.func_count += 1,
            FrameKind::IfElse => stats.if_count += 1,
            FrameKind::Case => stats.case_count += 1,
            FrameKind::For => stats.for_count += 1,
            FrameKind::GoRoutine { .. } => stats.go_func_count += 1,
        });
        stats.injection_points =
            stats.if_count + stats.for_count + stats.case_count + stats.func_count + stats.go_func_count;
        stats
    }

    /// Field-wise sum
    pub fn add(&mut self, other: &Stats) {
        self.if_count += other.if_count;
        self.for_count += other.for_count;
        self.case_count += other.case_count;
        self.func_count += other.func_count;
        self.go_func_count += other.go_func_count;
        self.injection_points += other.injection_points;
        self.lines += other.lines;
    }

    /// Injection points per source line, in percent
    pub fn injection_ratio(&self) -> f64 {
        if self.lines == 0 {
            return 0.0;
        }
        100.0 * self.injection_points as f64 / self.lines as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::BuildCursor;

    #[test]
    fn test_counts_every_kind() {
        let mut cursor = BuildCursor::new("main", 1, 20);
        cursor.enter_frame(FrameKind::Function { has_result: false }, "f", 2, 2);
        cursor.enter_frame(FrameKind::IfElse, "if", 3, 3);
        cursor.exit_frame(4).unwrap();
        cursor.enter_frame(FrameKind::For, "for", 5, 5);
        cursor.enter_frame(FrameKind::Case, "switch", 6, 6);
        cursor.exit_frame(7).unwrap();
        cursor.exit_frame(8).unwrap();
        cursor.enter_frame(FrameKind::GoRoutine { target: "w".into(), anchor: None }, "go-w", 9, 9);
        cursor.exit_frame(9).unwrap();
        cursor.exit_frame(10).unwrap();
        let tree = cursor.finish().unwrap();

        let stats = Stats::from_tree(&tree, 20);
        assert_eq!(stats.func_count, 1);
        assert_eq!(stats.if_count, 1);
        assert_eq!(stats.for_count, 1);
        assert_eq!(stats.case_count, 1);
        assert_eq!(stats.go_func_count, 1);
        assert_eq!(stats.injection_points, 5);
        assert_eq!(stats.lines, 20);
        assert!((stats.injection_ratio() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_is_commutative() {
        let a = Stats { if_count: 2, injection_points: 2, lines: 10, ..Stats::default() };
        let b = Stats { func_count: 3, injection_points: 3, lines: 7, ..Stats::default() };

        let mut ab = a;
        ab.add(&b);
        let mut ba = b;
        ba.add(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.injection_points, 5);
        assert_eq!(ab.lines, 17);
    }

    #[test]
    fn test_empty_ratio() {
        assert!(Stats::default().injection_ratio().abs() < f64::EPSILON);
    }
}
