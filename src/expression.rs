//! The expression: a chromosome, its kernel library, and the derived
//! active sets.
//!
//! An [`Expression`] owns everything needed to evaluate and mutate one CGP
//! program: the [`ChromosomeLayout`], the kernel library, the chromosome
//! itself, the derived active nodes/genes, and an instance-local seeded RNG.
//! Constructors and [`set`](Expression::set) establish all invariants before
//! returning; mutators re-establish them before returning. Reads
//! (`evaluate`, `loss`, the getters) take `&self` and are safe to call
//! concurrently as long as no mutator runs.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::ExpressionError;
use crate::kernel::Kernel;
use crate::layout::ChromosomeLayout;

/// A CGP expression over the scalar domain `T`.
///
/// Construct with [`new`](Expression::new) (uniform arity) or
/// [`with_column_arities`](Expression::with_column_arities), then evaluate,
/// mutate, or render. The chromosome is always within its per-gene bounds
/// and the active sets always reflect the current chromosome.
#[derive(Debug, Clone)]
pub struct Expression<T> {
    pub(crate) layout: ChromosomeLayout,
    pub(crate) kernels: Vec<Kernel<T>>,
    pub(crate) x: Vec<usize>,
    pub(crate) active_nodes: Vec<usize>,
    pub(crate) active_genes: Vec<usize>,
    pub(crate) rng: ChaCha8Rng,
}

impl<T> Expression<T> {
    /// Construct a random expression with the same arity in every column.
    ///
    /// Equivalent to [`with_column_arities`](Expression::with_column_arities)
    /// with `arity` repeated for each column.
    ///
    /// # Errors
    ///
    /// Returns an error for any zero shape parameter or an empty kernel
    /// library.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n: usize,
        m: usize,
        rows: usize,
        cols: usize,
        levels_back: usize,
        arity: usize,
        kernels: Vec<Kernel<T>>,
        seed: u64,
    ) -> Result<Self, ExpressionError> {
        Self::with_column_arities(
            n,
            m,
            rows,
            cols,
            levels_back,
            vec![arity; cols],
            kernels,
            seed,
        )
    }

    /// Construct a random expression with a per-column arity vector.
    ///
    /// The chromosome is filled by drawing every gene uniformly within its
    /// bounds from a `ChaCha8` generator seeded with `seed`, so equal
    /// parameters and seed give equal expressions.
    ///
    /// # Errors
    ///
    /// Returns an error for any zero shape parameter, an arity vector not
    /// matching the column count, a zero column arity, or an empty kernel
    /// library.
    #[allow(clippy::too_many_arguments)]
    pub fn with_column_arities(
        n: usize,
        m: usize,
        rows: usize,
        cols: usize,
        levels_back: usize,
        arities: Vec<usize>,
        kernels: Vec<Kernel<T>>,
        seed: u64,
    ) -> Result<Self, ExpressionError> {
        let layout = ChromosomeLayout::new(n, m, rows, cols, levels_back, arities, kernels.len())?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let x = layout
            .lower_bounds()
            .iter()
            .zip(layout.upper_bounds())
            .map(|(&lo, &hi)| rng.random_range(lo..=hi))
            .collect();

        let mut expression = Self {
            layout,
            kernels,
            x,
            active_nodes: Vec::new(),
            active_genes: Vec::new(),
            rng,
        };
        expression.update_active();
        Ok(expression)
    }

    /// The chromosome encoding the current expression.
    #[must_use]
    pub fn chromosome(&self) -> &[usize] {
        &self.x
    }

    /// Per-gene lower bounds.
    #[must_use]
    pub fn lower_bounds(&self) -> &[usize] {
        self.layout.lower_bounds()
    }

    /// Per-gene upper bounds.
    #[must_use]
    pub fn upper_bounds(&self) -> &[usize] {
        self.layout.upper_bounds()
    }

    /// Chromosome indices of the active genes, sorted per node, with the
    /// `m` output genes last.
    #[must_use]
    pub fn active_genes(&self) -> &[usize] {
        &self.active_genes
    }

    /// Ids of the nodes feeding at least one output, sorted and
    /// duplicate-free.
    #[must_use]
    pub fn active_nodes(&self) -> &[usize] {
        &self.active_nodes
    }

    /// Number of inputs.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.layout.num_inputs()
    }

    /// Number of outputs.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.layout.num_outputs()
    }

    /// Grid rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    /// Grid columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    /// Levels-back window.
    #[must_use]
    pub fn levels_back(&self) -> usize {
        self.layout.levels_back()
    }

    /// Per-column arities.
    #[must_use]
    pub fn arities(&self) -> &[usize] {
        self.layout.arities()
    }

    /// Arity of a function node.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InvalidNode`] if `node_id` does not name
    /// a function node.
    pub fn node_arity(&self, node_id: usize) -> Result<usize, ExpressionError> {
        self.layout.node_arity(node_id)
    }

    /// The kernel library.
    #[must_use]
    pub fn kernels(&self) -> &[Kernel<T>] {
        &self.kernels
    }

    /// Chromosome position of the kernel gene expressing each node (zero
    /// for input nodes, which have no gene representation).
    #[must_use]
    pub fn gene_indices(&self) -> &[usize] {
        self.layout.gene_indices()
    }

    /// The layout describing this expression's chromosome shape and bounds.
    #[must_use]
    pub fn layout(&self) -> &ChromosomeLayout {
        &self.layout
    }

    /// Whether a node currently feeds at least one output.
    #[must_use]
    pub fn is_active(&self, node_id: usize) -> bool {
        self.active_nodes.binary_search(&node_id).is_ok()
    }

    /// Whether a chromosome is compatible with this expression: right
    /// length, every gene within its bounds.
    #[must_use]
    pub fn is_valid(&self, x: &[usize]) -> bool {
        self.layout.is_valid(x)
    }

    /// Install a new chromosome and rebuild the active sets.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InvalidChromosome`] if the chromosome
    /// fails [`is_valid`](Expression::is_valid); the current state is left
    /// untouched.
    pub fn set(&mut self, x: &[usize]) -> Result<(), ExpressionError> {
        if !self.is_valid(x) {
            return Err(ExpressionError::InvalidChromosome);
        }
        self.x.clear();
        self.x.extend_from_slice(x);
        self.update_active();
        Ok(())
    }

    /// Point a function node at a different kernel.
    ///
    /// Connectivity is unchanged by a kernel swap, so the active sets are
    /// not rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InvalidKernel`] if `kernel_id` is outside
    /// the library, or [`ExpressionError::InvalidNode`] if `node_id` does
    /// not name a function node.
    pub fn set_kernel_gene(
        &mut self,
        node_id: usize,
        kernel_id: usize,
    ) -> Result<(), ExpressionError> {
        if kernel_id >= self.kernels.len() {
            return Err(ExpressionError::InvalidKernel {
                kernel_id,
                available: self.kernels.len(),
            });
        }
        self.layout.check_function_node(node_id)?;
        let idx = self.layout.gene_index(node_id);
        self.x[idx] = kernel_id;
        Ok(())
    }

    /// Reseed the instance RNG driving construction draws and mutations.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Rebuild `active_nodes` and `active_genes` from the chromosome.
    ///
    /// Walks a wave of node ids backwards from the output selectors: each
    /// wave contributes its members to the active set and expands into the
    /// nodes referenced by their connection genes. Connection bounds force
    /// every referenced node into a strictly earlier column, so each wave
    /// lowers the highest reachable column and the walk terminates.
    pub(crate) fn update_active(&mut self) {
        debug_assert_eq!(self.x.len(), self.layout.len());
        let n = self.layout.num_inputs();
        let m = self.layout.num_outputs();
        let s = self.x.len();

        self.active_nodes.clear();
        let mut current: Vec<usize> = self.x[s - m..].to_vec();
        let mut next: Vec<usize> = Vec::new();

        while !current.is_empty() {
            self.active_nodes.extend_from_slice(&current);
            for &node_id in &current {
                // Input nodes have no connection genes to follow.
                if node_id >= n {
                    let idx = self.layout.gene_index(node_id);
                    let arity = self.layout.arity_of(node_id);
                    next.extend_from_slice(&self.x[idx + 1..=idx + arity]);
                }
            }
            // Deduplicate the wave; revisiting shared operands would make
            // the walk exponential in the worst case.
            next.sort_unstable();
            next.dedup();
            std::mem::swap(&mut current, &mut next);
            next.clear();
        }

        self.active_nodes.sort_unstable();
        self.active_nodes.dedup();

        self.active_genes.clear();
        for &node_id in &self.active_nodes {
            if node_id >= n {
                let idx = self.layout.gene_index(node_id);
                let arity = self.layout.arity_of(node_id);
                self.active_genes.extend(idx..=idx + arity);
            }
        }
        // Output genes are always active.
        self.active_genes.extend(s - m..s);
    }
}

impl<T> fmt::Display for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CGP expression:")?;
        writeln!(f, "\tnumber of inputs:\t{}", self.num_inputs())?;
        writeln!(f, "\tnumber of outputs:\t{}", self.num_outputs())?;
        writeln!(f, "\tnumber of rows:\t\t{}", self.rows())?;
        writeln!(f, "\tnumber of columns:\t{}", self.cols())?;
        writeln!(f, "\tlevels-back allowed:\t{}", self.levels_back())?;
        writeln!(f, "\tcolumn arities:\t\t{:?}", self.arities())?;
        writeln!(f, "\tgene indices:\t\t{:?}", self.gene_indices())?;
        writeln!(f, "\tlower bounds:\t\t{:?}", self.lower_bounds())?;
        writeln!(f, "\tupper bounds:\t\t{:?}", self.upper_bounds())?;
        writeln!(f, "\tchromosome:\t\t{:?}", self.chromosome())?;
        writeln!(f, "\tactive nodes:\t\t{:?}", self.active_nodes())?;
        writeln!(f, "\tactive genes:\t\t{:?}", self.active_genes())?;
        write!(f, "\tkernels:\t\t")?;
        for (i, kernel) in self.kernels.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kernel}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelSet;

    fn kernels(names: &[&str]) -> Vec<Kernel<f64>> {
        KernelSet::from_names(names).unwrap().build()
    }

    /// Reference reachability: reverse traversal without the wave
    /// machinery, for cross-checking `update_active`.
    fn reachable_nodes(expr: &Expression<f64>) -> Vec<usize> {
        let n = expr.num_inputs();
        let s = expr.chromosome().len();
        let m = expr.num_outputs();
        let mut seen = vec![false; expr.layout().node_count()];
        let mut stack: Vec<usize> = expr.chromosome()[s - m..].to_vec();
        while let Some(node_id) = stack.pop() {
            if seen[node_id] {
                continue;
            }
            seen[node_id] = true;
            if node_id >= n {
                let idx = expr.gene_indices()[node_id];
                let arity = expr.arities()[(node_id - n) / expr.rows()];
                stack.extend_from_slice(&expr.chromosome()[idx + 1..=idx + arity]);
            }
        }
        seen.iter()
            .enumerate()
            .filter_map(|(id, &hit)| hit.then_some(id))
            .collect()
    }

    #[test]
    fn test_construction_respects_bounds() {
        let expr =
            Expression::new(2, 4, 2, 3, 4, 2, kernels(&["sum", "diff", "mul", "div"]), 123)
                .unwrap();
        assert_eq!(expr.chromosome().len(), 2 * 3 + 2 * 3 * 2 + 4);
        for ((&g, &lo), &hi) in expr
            .chromosome()
            .iter()
            .zip(expr.lower_bounds())
            .zip(expr.upper_bounds())
        {
            assert!(g >= lo && g <= hi);
        }
        assert!(expr.is_valid(expr.chromosome()));
    }

    #[test]
    fn test_same_seed_same_expression() {
        let a = Expression::new(2, 1, 3, 5, 2, 2, kernels(&["sum", "mul"]), 7).unwrap();
        let b = Expression::new(2, 1, 3, 5, 2, 2, kernels(&["sum", "mul"]), 7).unwrap();
        assert_eq!(a.chromosome(), b.chromosome());

        let c = Expression::new(2, 1, 3, 5, 2, 2, kernels(&["sum", "mul"]), 8).unwrap();
        assert_ne!(a.chromosome(), c.chromosome());
    }

    #[test]
    fn test_uniform_arity_matches_per_column() {
        let a = Expression::new(2, 1, 2, 3, 2, 2, kernels(&["sum", "mul"]), 42).unwrap();
        let b = Expression::with_column_arities(
            2,
            1,
            2,
            3,
            2,
            vec![2, 2, 2],
            kernels(&["sum", "mul"]),
            42,
        )
        .unwrap();
        assert_eq!(a.chromosome(), b.chromosome());
        assert_eq!(a.arities(), b.arities());
    }

    #[test]
    fn test_active_sets_match_reference_traversal() {
        for seed in 0..20 {
            let expr = Expression::new(
                3,
                2,
                2,
                4,
                3,
                2,
                kernels(&["sum", "diff", "mul", "pdiv"]),
                seed,
            )
            .unwrap();
            assert_eq!(expr.active_nodes(), reachable_nodes(&expr).as_slice());
        }
    }

    #[test]
    fn test_active_genes_cover_active_nodes_and_outputs() {
        let expr = Expression::new(2, 3, 2, 3, 4, 2, kernels(&["sum", "diff"]), 99).unwrap();
        let s = expr.chromosome().len();
        let m = expr.num_outputs();
        let n = expr.num_inputs();

        // The final m entries are exactly the output-gene indices.
        assert_eq!(
            &expr.active_genes()[expr.active_genes().len() - m..],
            (s - m..s).collect::<Vec<_>>().as_slice()
        );

        // Every active function node contributes its whole gene range.
        for &node_id in expr.active_nodes() {
            if node_id >= n {
                let idx = expr.gene_indices()[node_id];
                let arity = expr.node_arity(node_id).unwrap();
                for k in idx..=idx + arity {
                    assert!(expr.active_genes().contains(&k));
                }
            }
        }
    }

    #[test]
    fn test_set_round_trip_is_noop() {
        let mut expr = Expression::new(2, 1, 2, 3, 2, 2, kernels(&["sum", "mul"]), 5).unwrap();
        let before = expr.chromosome().to_vec();
        let active_before = expr.active_nodes().to_vec();
        expr.set(&before.clone()).unwrap();
        assert_eq!(expr.chromosome(), before.as_slice());
        assert_eq!(expr.active_nodes(), active_before.as_slice());
    }

    #[test]
    fn test_set_rejects_invalid_chromosome() {
        let mut expr = Expression::new(2, 1, 1, 1, 1, 2, kernels(&["sum", "diff"]), 1).unwrap();
        let before = expr.chromosome().to_vec();

        assert_eq!(
            expr.set(&[0, 0, 1]),
            Err(ExpressionError::InvalidChromosome)
        );
        assert_eq!(
            expr.set(&[9, 0, 1, 2]),
            Err(ExpressionError::InvalidChromosome)
        );
        // Failed set leaves the state untouched.
        assert_eq!(expr.chromosome(), before.as_slice());
    }

    #[test]
    fn test_set_kernel_gene_preserves_active_sets() {
        let mut expr =
            Expression::new(2, 1, 2, 3, 2, 2, kernels(&["sum", "diff", "mul"]), 11).unwrap();
        let nodes_before = expr.active_nodes().to_vec();
        let genes_before = expr.active_genes().to_vec();

        let node_id = expr.num_inputs(); // first function node
        let idx = expr.gene_indices()[node_id];
        let new_kernel = (expr.chromosome()[idx] + 1) % expr.kernels().len();
        expr.set_kernel_gene(node_id, new_kernel).unwrap();

        assert_eq!(expr.chromosome()[idx], new_kernel);
        assert_eq!(expr.active_nodes(), nodes_before.as_slice());
        assert_eq!(expr.active_genes(), genes_before.as_slice());
    }

    #[test]
    fn test_set_kernel_gene_rejects_bad_ids() {
        let mut expr = Expression::new(2, 1, 1, 1, 1, 2, kernels(&["sum", "diff"]), 1).unwrap();
        assert_eq!(
            expr.set_kernel_gene(2, 7),
            Err(ExpressionError::InvalidKernel {
                kernel_id: 7,
                available: 2
            })
        );
        assert_eq!(
            expr.set_kernel_gene(0, 0),
            Err(ExpressionError::InvalidNode {
                node_id: 0,
                first: 2,
                last: 2
            })
        );
        assert_eq!(
            expr.set_kernel_gene(3, 0),
            Err(ExpressionError::InvalidNode {
                node_id: 3,
                first: 2,
                last: 2
            })
        );
    }

    #[test]
    fn test_is_active() {
        let mut expr = Expression::new(2, 1, 1, 1, 2, 2, kernels(&["sum"]), 3).unwrap();
        // Output can only select the single function node or, with
        // levels-back past the grid, an input.
        expr.set(&[0, 0, 1, 2]).unwrap();
        assert!(expr.is_active(0));
        assert!(expr.is_active(1));
        assert!(expr.is_active(2));

        expr.set(&[0, 0, 1, 0]).unwrap();
        assert!(expr.is_active(0));
        assert!(!expr.is_active(1));
        assert!(!expr.is_active(2));
    }

    #[test]
    fn test_display_lists_state() {
        let expr = Expression::new(2, 1, 1, 2, 1, 2, kernels(&["sum", "mul"]), 17).unwrap();
        let dump = expr.to_string();
        assert!(dump.contains("number of inputs:\t2"));
        assert!(dump.contains("chromosome:"));
        assert!(dump.contains("active nodes:"));
        assert!(dump.contains("sum, mul"));
    }
}
