//! Scalar domain abstraction.
//!
//! An expression is generic over the numbers flowing through its nodes. The
//! [`Scalar`] trait captures exactly what the kernel bodies and the loss
//! computations need: ring arithmetic, the transcendentals used by the
//! primitive kernels, and the two domain-specific guards (finiteness for
//! protected division, sign for the rectifier family). Plain `f64` is the
//! reference implementation; richer algebras such as truncated power series
//! implement the same surface, answering the guards from their constant
//! coefficient.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

/// Capability set required of the numbers an expression operates on.
pub trait Scalar:
    Clone
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// Embed a plain real into the domain.
    fn from_f64(v: f64) -> Self;

    /// e^self
    fn exp(self) -> Self;

    /// Natural logarithm.
    fn ln(self) -> Self;

    fn sin(self) -> Self;

    fn cos(self) -> Self;

    fn tanh(self) -> Self;

    fn sqrt(self) -> Self;

    /// Whether the value is finite. Protected division falls back to one
    /// when this is false. Series domains answer for their constant
    /// coefficient.
    fn is_finite(&self) -> bool;

    /// Whether the value is negative, deciding the rectifier branch.
    /// Series domains answer for their constant coefficient.
    fn is_negative(&self) -> bool;

    /// The larger of two values, used to stabilize the cross-entropy
    /// softmax.
    fn maximum(self, other: Self) -> Self;
}

impl Scalar for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn sin(self) -> Self {
        f64::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        f64::cos(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        f64::tanh(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    #[inline]
    fn is_negative(&self) -> bool {
        *self < 0.0
    }

    #[inline]
    fn maximum(self, other: Self) -> Self {
        f64::max(self, other)
    }
}
