//! Model loss over single points and batches.
//!
//! Two loss kinds are supported: mean squared error for regression and a
//! max-stabilized cross-entropy for classification. The batch path averages
//! the per-point loss either sequentially or by splitting the batch into
//! equal contiguous slabs fanned out over the rayon pool.

use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ExpressionError;
use crate::expression::Expression;
use crate::scalar::Scalar;

/// The loss kinds an expression can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossKind {
    /// Mean squared error over the outputs.
    Mse,
    /// Cross-entropy of the softmaxed outputs against the prediction.
    CrossEntropy,
}

impl FromStr for LossKind {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MSE" => Ok(Self::Mse),
            "CE" => Ok(Self::CrossEntropy),
            other => Err(ExpressionError::UnknownLoss(other.to_string())),
        }
    }
}

impl<T: Scalar> Expression<T> {
    /// Loss of the expression on a single data point.
    ///
    /// # Errors
    ///
    /// Returns a shape-mismatch error if `point` does not have one value
    /// per input or `prediction` one value per output.
    pub fn loss(
        &self,
        point: &[T],
        prediction: &[T],
        kind: LossKind,
    ) -> Result<T, ExpressionError> {
        let m = self.layout.num_outputs();
        if prediction.len() != m {
            return Err(ExpressionError::PredictionLengthMismatch {
                expected: m,
                got: prediction.len(),
            });
        }
        let outputs = self.evaluate(point)?;

        match kind {
            LossKind::Mse => {
                let mut acc = T::zero();
                for (o, p) in outputs.into_iter().zip(prediction) {
                    let d = o - p.clone();
                    acc = acc + d.clone() * d;
                }
                Ok(acc / T::from_f64(m as f64))
            }
            LossKind::CrossEntropy => {
                // Subtracting the max keeps the exponentials bounded.
                let mut max = outputs[0].clone();
                for o in &outputs[1..] {
                    max = max.maximum(o.clone());
                }
                let exps: Vec<T> = outputs
                    .into_iter()
                    .map(|o| (o - max.clone()).exp())
                    .collect();
                let mut z = T::zero();
                for e in &exps {
                    z = z + e.clone();
                }
                let mut acc = T::zero();
                for (e, p) in exps.into_iter().zip(prediction) {
                    acc = acc + (e / z.clone()).ln() * p.clone();
                }
                Ok(T::zero() - acc)
            }
        }
    }

    /// Average loss over a batch, optionally in parallel.
    ///
    /// `parallel == 0` folds the batch sequentially. `parallel == p > 0`
    /// requires the batch size to be a multiple of `p`, splits it into `p`
    /// contiguous slabs, reduces each slab on its own worker and sums the
    /// slab totals. The two paths agree up to floating-point associativity.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched or empty batches, an indivisible
    /// slab count, an unknown `kind` string, or a shape mismatch in any
    /// point/label pair.
    pub fn batch_loss(
        &self,
        points: &[Vec<T>],
        labels: &[Vec<T>],
        kind: &str,
        parallel: usize,
    ) -> Result<T, ExpressionError>
    where
        T: Send + Sync,
    {
        if points.len() != labels.len() {
            return Err(ExpressionError::BatchSizeMismatch {
                points: points.len(),
                labels: labels.len(),
            });
        }
        if points.is_empty() {
            return Err(ExpressionError::EmptyBatch);
        }
        let kind = LossKind::from_str(kind)?;
        let batch = points.len();

        let total = if parallel > 0 {
            if batch % parallel != 0 {
                return Err(ExpressionError::IndivisibleBatch { batch, parallel });
            }
            let slab = batch / parallel;
            points
                .par_chunks(slab)
                .zip(labels.par_chunks(slab))
                .map(|(ps, ls)| {
                    let mut acc = T::zero();
                    for (p, l) in ps.iter().zip(ls) {
                        acc = acc + self.loss(p, l, kind)?;
                    }
                    Ok(acc)
                })
                .try_reduce(T::zero, |a, b| Ok(a + b))?
        } else {
            let mut acc = T::zero();
            for (p, l) in points.iter().zip(labels) {
                acc = acc + self.loss(p, l, kind)?;
            }
            acc
        };

        Ok(total / T::from_f64(batch as f64))
    }
}
