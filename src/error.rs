//! Error type for expression construction, mutation and evaluation.
//!
//! Every failure in this crate is synchronous and reported as an
//! [`ExpressionError`] value; nothing is retried internally and no partially
//! mutated state is ever observable after an error returns.

/// Errors produced by [`Expression`](crate::Expression) and
/// [`KernelSet`](crate::KernelSet) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// A grid parameter (`n`, `m`, `rows`, `cols`, `levels_back`) or the
    /// kernel library was empty at construction time.
    EmptyParameter(&'static str),
    /// The per-column arity vector does not have one entry per column.
    ArityCountMismatch {
        /// Number of arities supplied.
        arities: usize,
        /// Number of columns in the grid.
        columns: usize,
    },
    /// A column was given arity zero.
    ZeroArity {
        /// Index of the offending column.
        column: usize,
    },
    /// A chromosome passed to `set` has the wrong length or a gene outside
    /// its `[lb, ub]` bounds.
    InvalidChromosome,
    /// A gene index passed to a mutation operator is past the end of the
    /// chromosome.
    GeneOutOfRange {
        /// The requested gene index.
        index: usize,
        /// The chromosome length.
        len: usize,
    },
    /// A node id does not name a function node of this grid.
    InvalidNode {
        /// The requested node id.
        node_id: usize,
        /// First valid function-node id (`n`).
        first: usize,
        /// Last valid function-node id (`n + rows·cols − 1`).
        last: usize,
    },
    /// A kernel id is outside the kernel library.
    InvalidKernel {
        /// The requested kernel id.
        kernel_id: usize,
        /// Number of kernels in the library.
        available: usize,
    },
    /// A kernel name not known to the [`KernelSet`](crate::KernelSet) builder.
    UnknownKernel(String),
    /// Batch loss was given differently sized point and label sets.
    BatchSizeMismatch {
        /// Number of input points.
        points: usize,
        /// Number of labels.
        labels: usize,
    },
    /// Batch loss was given an empty batch.
    EmptyBatch,
    /// The batch cannot be split into the requested number of equal slabs.
    IndivisibleBatch {
        /// The batch size.
        batch: usize,
        /// The requested slab count.
        parallel: usize,
    },
    /// A loss kind string other than `"MSE"` or `"CE"`.
    UnknownLoss(String),
    /// An evaluation point whose length differs from the number of inputs.
    InputLengthMismatch {
        /// Expected length (`n`).
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },
    /// A prediction whose length differs from the number of outputs.
    PredictionLengthMismatch {
        /// Expected length (`m`).
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },
}

impl std::fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyParameter(what) => {
                write!(f, "{what} cannot be zero")
            }
            Self::ArityCountMismatch { arities, columns } => write!(
                f,
                "arity vector has {arities} entries but the grid has {columns} columns"
            ),
            Self::ZeroArity { column } => {
                write!(f, "column {column} has arity zero")
            }
            Self::InvalidChromosome => {
                write!(f, "chromosome is incompatible with this expression")
            }
            Self::GeneOutOfRange { index, len } => write!(
                f,
                "gene index {index} out of range for a chromosome of length {len}"
            ),
            Self::InvalidNode {
                node_id,
                first,
                last,
            } => write!(
                f,
                "node id {node_id} is not a function node; valid ids are [{first}, {last}]"
            ),
            Self::InvalidKernel {
                kernel_id,
                available,
            } => write!(
                f,
                "kernel id {kernel_id} out of range for a library of {available} kernels"
            ),
            Self::UnknownKernel(name) => {
                write!(f, "no kernel named {name:?} is implemented")
            }
            Self::BatchSizeMismatch { points, labels } => write!(
                f,
                "batch has {points} points but {labels} labels"
            ),
            Self::EmptyBatch => write!(f, "batch size cannot be zero"),
            Self::IndivisibleBatch { batch, parallel } => write!(
                f,
                "batch of {batch} points cannot be divided into {parallel} equal slabs"
            ),
            Self::UnknownLoss(kind) => write!(
                f,
                "requested loss was {kind:?}; only \"MSE\" and \"CE\" are allowed"
            ),
            Self::InputLengthMismatch { expected, got } => write!(
                f,
                "input point has {got} values but the expression has {expected} inputs"
            ),
            Self::PredictionLengthMismatch { expected, got } => write!(
                f,
                "prediction has {got} values but the expression has {expected} outputs"
            ),
        }
    }
}

impl std::error::Error for ExpressionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_name_the_offending_values() {
        let err = ExpressionError::GeneOutOfRange { index: 12, len: 10 };
        let msg = err.to_string();
        assert!(msg.contains("12") && msg.contains("10"), "got: {msg}");

        let err = ExpressionError::UnknownLoss("RMSE".into());
        assert!(err.to_string().contains("RMSE"));

        let err = ExpressionError::UnknownKernel("cbrt".into());
        assert!(err.to_string().contains("cbrt"));
    }
}
