//! # CGP Expression
//!
//! An evaluation and mutation engine for Cartesian Genetic Programming.
//! A CGP expression is a feed-forward program laid out on an `r × c` grid
//! of function nodes, each applying a kernel from a configurable library to
//! nodes in earlier columns; the whole graph plus output selectors is one
//! flat integer vector (the chromosome).
//!
//! ## Features
//!
//! - **Bounded chromosome encoding**: per-gene `[lb, ub]` bounds derived
//!   from the grid shape and levels-back window make every in-bounds
//!   chromosome a valid DAG, so mutation never needs repair.
//! - **Active-subgraph evaluation**: only the nodes that actually feed an
//!   output are visited, in one shared traversal for numeric and symbolic
//!   evaluation.
//! - **Bounded mutation family**: whole-chromosome, active-gene,
//!   active-kernel, active-connection and output-gene operators, all
//!   validity-preserving, driven by an instance-owned seeded RNG.
//! - **Loss reporting**: MSE and max-stabilized cross-entropy on single
//!   points and batches, with a rayon-parallel batch path.
//! - **Generic scalar domain**: evaluation and loss are generic over the
//!   [`Scalar`] trait; `f64` is built in, richer algebras plug in.
//!
//! ## Quick Start
//!
//! ```rust
//! use cgp_expression::{Expression, KernelSet};
//!
//! // A kernel library and a random single-row grid over two inputs.
//! let kernels: KernelSet<f64> =
//!     KernelSet::from_names(&["sum", "diff", "mul", "pdiv"]).unwrap();
//! let mut expr = Expression::new(2, 1, 1, 10, 10, 2, kernels.build(), 42).unwrap();
//!
//! // Evaluate numerically and symbolically.
//! let value = expr.evaluate(&[1.0, 2.0]).unwrap();
//! let formula = expr
//!     .evaluate_symbolic(&["x".to_string(), "y".to_string()])
//!     .unwrap();
//! println!("{} = {}", formula[0], value[0]);
//!
//! // Mutate three active genes; the chromosome stays valid throughout.
//! expr.mutate_active(3);
//! assert!(expr.is_valid(expr.chromosome()));
//! ```
//!
//! ## Fitness over a batch
//!
//! ```rust
//! use cgp_expression::{Expression, KernelSet};
//!
//! let kernels: KernelSet<f64> = KernelSet::from_names(&["sum", "mul"]).unwrap();
//! let expr = Expression::new(1, 1, 1, 6, 6, 2, kernels.build(), 7).unwrap();
//!
//! let points: Vec<Vec<f64>> = (0..16).map(|i| vec![f64::from(i) * 0.1]).collect();
//! let labels: Vec<Vec<f64>> = points.iter().map(|p| vec![p[0] * p[0]]).collect();
//!
//! // Sequential and four-slab parallel reductions agree.
//! let loss = expr.batch_loss(&points, &labels, "MSE", 0).unwrap();
//! let par = expr.batch_loss(&points, &labels, "MSE", 4).unwrap();
//! assert!((loss - par).abs() < 1e-9);
//! ```
//!
//! ## Architecture
//!
//! The chromosome is column-major: per column `j` and row `i`, one kernel
//! gene (an index into the library) and `arity[j]` connection genes, then
//! `m` output selectors at the very end. Connection bounds restrict every
//! gene to inputs or columns within the previous `levels_back` columns, so
//! the encoded graph is acyclic by construction and ascending node id is a
//! topological order.
//!
//! The derived active sets (the nodes and chromosome positions that
//! influence at least one output) are rebuilt by a reverse wave from the
//! output selectors whenever a structural gene changes, and cached between
//! changes so evaluation and mutation can stay on the active subgraph.

pub mod error;
pub mod expression;
pub mod kernel;
pub mod layout;
pub mod loss;
pub mod ops;
pub mod scalar;

mod eval;
mod mutation;

// Re-exports for convenience
pub use error::ExpressionError;
pub use expression::Expression;
pub use kernel::{Kernel, KernelSet};
pub use layout::ChromosomeLayout;
pub use loss::LossKind;
pub use scalar::Scalar;

#[cfg(test)]
mod tests {
    use super::*;

    fn kernels(names: &[&str]) -> Vec<Kernel<f64>> {
        KernelSet::from_names(names).unwrap().build()
    }

    #[test]
    fn test_evaluate_mutate_loss_flow() {
        let mut expr = Expression::new(
            2,
            1,
            2,
            6,
            3,
            2,
            kernels(&["sum", "diff", "mul", "pdiv"]),
            2024,
        )
        .unwrap();

        let points: Vec<Vec<f64>> = (0..8).map(|i| vec![f64::from(i), 1.5]).collect();
        let labels: Vec<Vec<f64>> = (0..8).map(|i| vec![f64::from(i) * 2.0]).collect();

        for _ in 0..50 {
            expr.mutate_active(2);
            assert!(expr.is_valid(expr.chromosome()));
            let loss = expr.batch_loss(&points, &labels, "MSE", 0).unwrap();
            assert!(!loss.is_nan());
        }
    }

    #[test]
    fn test_symbolic_formula_round_trips_through_set() {
        let mut expr = Expression::new(2, 1, 1, 4, 4, 2, kernels(&["sum", "mul"]), 9).unwrap();
        let x = expr.chromosome().to_vec();
        let formula = expr
            .evaluate_symbolic(&["x0".to_string(), "x1".to_string()])
            .unwrap();

        expr.mutate_random(20);
        expr.set(&x).unwrap();
        let restored = expr
            .evaluate_symbolic(&["x0".to_string(), "x1".to_string()])
            .unwrap();
        assert_eq!(formula, restored);
    }

    #[test]
    fn test_renderer_smoke() {
        let expr = Expression::new(2, 1, 1, 3, 2, 2, kernels(&["sum", "pdiv"]), 1).unwrap();
        let dump = format!("{expr}");
        assert!(dump.contains("CGP expression"));
        assert!(dump.contains("pdiv"));
    }
}
