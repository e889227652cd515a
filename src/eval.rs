//! Evaluation of the encoded program.
//!
//! Numeric and symbolic evaluation are the same traversal instantiated with
//! a different node application: walk the active nodes in ascending id
//! order (a topological order, because connection bounds only ever point at
//! strictly earlier columns), materialize each node into a scratch buffer,
//! and read the outputs through the output selectors. Inactive nodes are
//! never touched.

use crate::error::ExpressionError;
use crate::expression::Expression;

impl<T> Expression<T> {
    /// Run the shared traversal: `apply(kernel_id, args)` produces the
    /// value of a function node from its operands.
    fn propagate<V, F>(&self, point: &[V], mut apply: F) -> Result<Vec<V>, ExpressionError>
    where
        V: Clone,
        F: FnMut(usize, &[V]) -> V,
    {
        let n = self.layout.num_inputs();
        if point.len() != n {
            return Err(ExpressionError::InputLengthMismatch {
                expected: n,
                got: point.len(),
            });
        }
        let m = self.layout.num_outputs();
        let s = self.x.len();

        let mut node: Vec<Option<V>> = vec![None; self.layout.node_count()];
        let mut args: Vec<V> = Vec::new();
        for &node_id in &self.active_nodes {
            if node_id < n {
                node[node_id] = Some(point[node_id].clone());
            } else {
                let idx = self.layout.gene_index(node_id);
                let arity = self.layout.arity_of(node_id);
                args.clear();
                for j in 1..=arity {
                    let operand = node[self.x[idx + j]]
                        .as_ref()
                        .expect("connection bounds materialize operands before their node");
                    args.push(operand.clone());
                }
                node[node_id] = Some(apply(self.x[idx], &args));
            }
        }

        let mut out = Vec::with_capacity(m);
        for i in 0..m {
            let value = node[self.x[s - m + i]]
                .as_ref()
                .expect("output selectors point at active nodes");
            out.push(value.clone());
        }
        Ok(out)
    }

    /// Evaluate the expression at a point.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InputLengthMismatch`] if the point does
    /// not have one value per input.
    pub fn evaluate(&self, point: &[T]) -> Result<Vec<T>, ExpressionError>
    where
        T: Clone,
    {
        self.propagate(point, |kernel_id, args| self.kernels[kernel_id].call(args))
    }

    /// Render the expression over symbolic input names, one formula per
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InputLengthMismatch`] if there is not one
    /// name per input.
    pub fn evaluate_symbolic(&self, inputs: &[String]) -> Result<Vec<String>, ExpressionError> {
        self.propagate(inputs, |kernel_id, args| {
            self.kernels[kernel_id].pretty(args)
        })
    }
}
