//! Chromosome layout: size derivation, per-gene bounds, gene-index table.
//!
//! A chromosome is a flat `Vec<usize>` whose shape is fully determined by
//! the grid parameters. Per column `j` and row `i` it carries one kernel
//! gene followed by `arity[j]` connection genes; the final `m` genes select
//! which node feeds each output. [`ChromosomeLayout`] derives the per-gene
//! `[lb, ub]` bounds that make every in-bounds chromosome encode a DAG:
//! connection genes may only reference inputs or nodes in strictly earlier
//! columns, within the levels-back window.

use serde::{Deserialize, Serialize};

use crate::error::ExpressionError;

/// Shape, bounds and gene-index table of a chromosome.
///
/// Node ids `0..n` are inputs; ids `n..n + rows·cols` are function nodes
/// numbered column-major (column `(id − n) / rows`, row `(id − n) % rows`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromosomeLayout {
    n: usize,
    m: usize,
    rows: usize,
    cols: usize,
    levels_back: usize,
    arity: Vec<usize>,
    kernel_count: usize,
    lb: Vec<usize>,
    ub: Vec<usize>,
    gene_idx: Vec<usize>,
}

impl ChromosomeLayout {
    /// Derive the layout for a grid, checking every shape parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if any of `n`, `m`, `rows`, `cols`, `levels_back`
    /// or `kernel_count` is zero, if `arity` does not have one entry per
    /// column, or if any column arity is zero.
    pub fn new(
        n: usize,
        m: usize,
        rows: usize,
        cols: usize,
        levels_back: usize,
        arity: Vec<usize>,
        kernel_count: usize,
    ) -> Result<Self, ExpressionError> {
        if n == 0 {
            return Err(ExpressionError::EmptyParameter("number of inputs"));
        }
        if m == 0 {
            return Err(ExpressionError::EmptyParameter("number of outputs"));
        }
        if rows == 0 {
            return Err(ExpressionError::EmptyParameter("number of rows"));
        }
        if cols == 0 {
            return Err(ExpressionError::EmptyParameter("number of columns"));
        }
        if levels_back == 0 {
            return Err(ExpressionError::EmptyParameter("levels-back"));
        }
        if kernel_count == 0 {
            return Err(ExpressionError::EmptyParameter("number of kernels"));
        }
        if arity.len() != cols {
            return Err(ExpressionError::ArityCountMismatch {
                arities: arity.len(),
                columns: cols,
            });
        }
        if let Some(column) = arity.iter().position(|&a| a == 0) {
            return Err(ExpressionError::ZeroArity { column });
        }

        let len = rows * cols + rows * arity.iter().sum::<usize>() + m;
        let mut lb = vec![0usize; len];
        let mut ub = vec![0usize; len];

        // Kernel and connection genes, column-major.
        let mut k = 0usize;
        for j in 0..cols {
            for _ in 0..rows {
                ub[k] = kernel_count - 1;
                k += 1;
                for _ in 0..arity[j] {
                    ub[k] = n + j * rows - 1;
                    if j >= levels_back {
                        lb[k] = n + rows * (j - levels_back);
                    }
                    k += 1;
                }
            }
        }
        // Output genes.
        for k in len - m..len {
            ub[k] = n + rows * cols - 1;
            if levels_back <= cols {
                lb[k] = n + rows * (cols - levels_back);
            }
        }

        // Position of the kernel gene expressing each node. Input nodes
        // have no gene representation; their slots stay zero.
        let mut gene_idx = vec![0usize; n + rows * cols];
        for (node_id, slot) in gene_idx.iter_mut().enumerate().skip(n) {
            let col = (node_id - n) / rows;
            let row = (node_id - n) % rows;
            let prior: usize = arity[..col].iter().sum::<usize>() * rows;
            *slot = prior + row * arity[col] + (node_id - n);
        }

        Ok(Self {
            n,
            m,
            rows,
            cols,
            levels_back,
            arity,
            kernel_count,
            lb,
            ub,
            gene_idx,
        })
    }

    /// Chromosome length `S = rows·cols + rows·Σ arity + m`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lb.len()
    }

    /// A layout always describes at least one gene.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of inputs.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.n
    }

    /// Number of outputs.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.m
    }

    /// Grid rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Levels-back window.
    #[must_use]
    pub fn levels_back(&self) -> usize {
        self.levels_back
    }

    /// Per-column arities.
    #[must_use]
    pub fn arities(&self) -> &[usize] {
        &self.arity
    }

    /// Size of the kernel library this layout was derived for.
    #[must_use]
    pub fn kernel_count(&self) -> usize {
        self.kernel_count
    }

    /// Total node count: inputs plus function nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.n + self.rows * self.cols
    }

    /// Per-gene lower bounds.
    #[must_use]
    pub fn lower_bounds(&self) -> &[usize] {
        &self.lb
    }

    /// Per-gene upper bounds.
    #[must_use]
    pub fn upper_bounds(&self) -> &[usize] {
        &self.ub
    }

    /// Chromosome position of the kernel gene expressing each node.
    #[must_use]
    pub fn gene_indices(&self) -> &[usize] {
        &self.gene_idx
    }

    /// Column of a function node.
    #[inline]
    pub(crate) fn column_of(&self, node_id: usize) -> usize {
        debug_assert!(node_id >= self.n && node_id < self.node_count());
        (node_id - self.n) / self.rows
    }

    /// Arity of a function node, unchecked.
    #[inline]
    pub(crate) fn arity_of(&self, node_id: usize) -> usize {
        self.arity[self.column_of(node_id)]
    }

    /// Chromosome position of a function node's kernel gene, unchecked.
    #[inline]
    pub(crate) fn gene_index(&self, node_id: usize) -> usize {
        debug_assert!(node_id >= self.n && node_id < self.node_count());
        self.gene_idx[node_id]
    }

    /// Arity of a function node.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InvalidNode`] if `node_id` does not name
    /// a function node.
    pub fn node_arity(&self, node_id: usize) -> Result<usize, ExpressionError> {
        self.check_function_node(node_id)?;
        Ok(self.arity_of(node_id))
    }

    /// Whether `node_id` names a function node of this grid.
    pub(crate) fn check_function_node(&self, node_id: usize) -> Result<(), ExpressionError> {
        if node_id < self.n || node_id >= self.node_count() {
            return Err(ExpressionError::InvalidNode {
                node_id,
                first: self.n,
                last: self.node_count() - 1,
            });
        }
        Ok(())
    }

    /// Whether a chromosome has the right length and every gene within its
    /// `[lb, ub]` bounds.
    #[must_use]
    pub fn is_valid(&self, x: &[usize]) -> bool {
        x.len() == self.len()
            && x.iter()
                .zip(self.lb.iter().zip(&self.ub))
                .all(|(&g, (&lo, &hi))| g >= lo && g <= hi)
    }
}
