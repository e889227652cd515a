//! Mutation operators.
//!
//! All mutations draw replacement values uniformly within the per-gene
//! `[lb, ub]` bounds, so the chromosome can never leave the valid region.
//! A draw is rejected until it differs from the current value; a degenerate
//! gene (`lb == ub`) is a deliberate no-op. Operators that may change
//! connectivity rebuild the active sets before returning, so the derived
//! structures always match the chromosome a caller observes.

use rand::Rng;

use crate::error::ExpressionError;
use crate::expression::Expression;

impl<T> Expression<T> {
    /// Draw a fresh in-bounds value for gene `idx`, different from the
    /// current one. Returns whether the gene changed (degenerate genes
    /// never do).
    fn draw_gene(&mut self, idx: usize) -> bool {
        let lo = self.layout.lower_bounds()[idx];
        let hi = self.layout.upper_bounds()[idx];
        if lo == hi {
            return false;
        }
        let fresh = loop {
            let v = self.rng.random_range(lo..=hi);
            if v != self.x[idx] {
                break v;
            }
        };
        self.x[idx] = fresh;
        true
    }

    /// Mutate a gene known to be in range, rebuilding the active sets if
    /// it changed.
    fn mutate_in_bounds(&mut self, idx: usize) {
        if self.draw_gene(idx) {
            // TODO: skip the rebuild when idx addresses a kernel gene; a
            // kernel swap cannot change connectivity.
            self.update_active();
        }
    }

    /// Mutate one gene.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::GeneOutOfRange`] if `idx` is past the end
    /// of the chromosome.
    pub fn mutate_gene(&mut self, idx: usize) -> Result<(), ExpressionError> {
        if idx >= self.x.len() {
            return Err(ExpressionError::GeneOutOfRange {
                index: idx,
                len: self.x.len(),
            });
        }
        self.mutate_in_bounds(idx);
        Ok(())
    }

    /// Mutate several genes, rebuilding the active sets once at the end.
    ///
    /// Indices are validated before anything is written, so an error leaves
    /// the chromosome untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::GeneOutOfRange`] if any index is past the
    /// end of the chromosome.
    pub fn mutate_genes(&mut self, idxs: &[usize]) -> Result<(), ExpressionError> {
        for &idx in idxs {
            if idx >= self.x.len() {
                return Err(ExpressionError::GeneOutOfRange {
                    index: idx,
                    len: self.x.len(),
                });
            }
        }
        let mut changed = false;
        for &idx in idxs {
            changed |= self.draw_gene(idx);
        }
        if changed {
            self.update_active();
        }
        Ok(())
    }

    /// Mutate `count` genes picked uniformly over the whole chromosome,
    /// rebuilding the active sets once at the end.
    pub fn mutate_random(&mut self, count: usize) {
        let len = self.x.len();
        let mut changed = false;
        for _ in 0..count {
            let idx = self.rng.random_range(0..len);
            changed |= self.draw_gene(idx);
        }
        if changed {
            self.update_active();
        }
    }

    /// Mutate `count` genes picked uniformly among the active genes.
    ///
    /// The active set is rebuilt after every change, so later picks draw
    /// from the gene set the earlier mutations produced.
    pub fn mutate_active(&mut self, count: usize) {
        for _ in 0..count {
            let pick = self.rng.random_range(0..self.active_genes.len());
            let idx = self.active_genes[pick];
            self.mutate_in_bounds(idx);
        }
    }

    /// An active node that is not an input, picked uniformly among the
    /// active nodes by rejection. Only called when one exists: the output
    /// selectors guarantee the active set is never empty, and the caller
    /// has checked that it holds more than the output genes.
    fn random_active_function_node(&mut self) -> usize {
        loop {
            let pick = self.rng.random_range(0..self.active_nodes.len());
            let node_id = self.active_nodes[pick];
            if node_id >= self.layout.num_inputs() {
                return node_id;
            }
        }
    }

    /// Mutate the kernel gene of `count` active function nodes.
    ///
    /// Does nothing when no function node is active (outputs wired straight
    /// to inputs).
    pub fn mutate_active_kernel(&mut self, count: usize) {
        for _ in 0..count {
            if self.active_genes.len() <= self.layout.num_outputs() {
                return;
            }
            let node_id = self.random_active_function_node();
            let idx = self.layout.gene_index(node_id);
            self.mutate_in_bounds(idx);
        }
    }

    /// Mutate one connection gene of `count` active function nodes, the
    /// connection picked uniformly within the node's arity.
    ///
    /// Does nothing when no function node is active.
    pub fn mutate_active_connection(&mut self, count: usize) {
        for _ in 0..count {
            if self.active_genes.len() <= self.layout.num_outputs() {
                return;
            }
            let node_id = self.random_active_function_node();
            let offset = self.rng.random_range(1..=self.layout.arity_of(node_id));
            let idx = self.layout.gene_index(node_id) + offset;
            self.mutate_in_bounds(idx);
        }
    }

    /// Mutate `count` output genes, each picked uniformly among the output
    /// selectors (the single one directly when there is only one output).
    pub fn mutate_output(&mut self, count: usize) {
        let m = self.layout.num_outputs();
        for _ in 0..count {
            let len = self.active_genes.len();
            let pick = if m > 1 {
                self.rng.random_range(len - m..len)
            } else {
                len - 1
            };
            let idx = self.active_genes[pick];
            self.mutate_in_bounds(idx);
        }
    }
}
