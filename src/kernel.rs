//! Kernels: the primitive operators a function node can apply.
//!
//! A [`Kernel`] pairs a value function with a printer over symbolic argument
//! names, so numeric and symbolic evaluation share one node library. The
//! [`KernelSet`] builder assembles the `Vec<Kernel<T>>` an
//! [`Expression`](crate::Expression) consumes, either from the built-in
//! primitive names or from user-supplied callables.

use std::fmt;
use std::sync::Arc;

use crate::error::ExpressionError;
use crate::ops;
use crate::scalar::Scalar;

type ValueFn<T> = Arc<dyn Fn(&[T]) -> T + Send + Sync>;
type PrintFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// A primitive operator: a value function, its symbolic printer, and a name.
///
/// Kernels receive exactly as many arguments as the arity of the column
/// their node sits in; implementations must tolerate any count of at least
/// one (the built-in n-ary families fold over all arguments, the unary ones
/// read only the first).
pub struct Kernel<T> {
    eval: ValueFn<T>,
    print: PrintFn,
    name: String,
}

impl<T> Kernel<T> {
    /// Build a kernel from a value function, a printer and a name.
    pub fn new<F, P>(eval: F, print: P, name: impl Into<String>) -> Self
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
        P: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        Self {
            eval: Arc::new(eval),
            print: Arc::new(print),
            name: name.into(),
        }
    }

    /// Apply the kernel to values.
    #[inline]
    pub fn call(&self, args: &[T]) -> T {
        (self.eval)(args)
    }

    /// Apply the kernel to symbolic argument names.
    #[inline]
    pub fn pretty(&self, args: &[String]) -> String {
        (self.print)(args)
    }

    /// The kernel name, e.g. `"sum"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Kernel<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Arc::clone(&self.eval),
            print: Arc::clone(&self.print),
            name: self.name.clone(),
        }
    }
}

impl<T> fmt::Debug for Kernel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel").field("name", &self.name).finish()
    }
}

impl<T> fmt::Display for Kernel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for the kernel library of an expression.
#[derive(Clone, Debug)]
pub struct KernelSet<T> {
    kernels: Vec<Kernel<T>>,
}

impl<T> Default for KernelSet<T> {
    fn default() -> Self {
        Self {
            kernels: Vec::new(),
        }
    }
}

impl<T: Scalar + 'static> KernelSet<T> {
    /// Build a set from built-in kernel names.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::UnknownKernel`] for a name with no
    /// built-in implementation.
    pub fn from_names(names: &[&str]) -> Result<Self, ExpressionError> {
        let mut set = Self::new();
        for name in names {
            set.push_named(name)?;
        }
        Ok(set)
    }

    /// Append a built-in kernel by name.
    ///
    /// Available names: `sum`, `diff`, `mul`, `div`, `pdiv`, `sig`, `tanh`,
    /// `ReLu`, `ELU`, `ISRU`, `sin`, `cos`, `log`, `exp`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::UnknownKernel`] for any other name.
    pub fn push_named(&mut self, name: &str) -> Result<(), ExpressionError> {
        let kernel = match name {
            "sum" => Kernel::new(ops::sum::<T>, ops::print_sum, name),
            "diff" => Kernel::new(ops::diff::<T>, ops::print_diff, name),
            "mul" => Kernel::new(ops::mul::<T>, ops::print_mul, name),
            "div" => Kernel::new(ops::div::<T>, ops::print_div, name),
            "pdiv" => Kernel::new(ops::pdiv::<T>, ops::print_pdiv, name),
            "sig" => Kernel::new(ops::sig::<T>, ops::print_sig, name),
            "tanh" => Kernel::new(ops::tanh::<T>, ops::print_tanh, name),
            "ReLu" => Kernel::new(ops::relu::<T>, ops::print_relu, name),
            "ELU" => Kernel::new(ops::elu::<T>, ops::print_elu, name),
            "ISRU" => Kernel::new(ops::isru::<T>, ops::print_isru, name),
            "sin" => Kernel::new(ops::sin::<T>, ops::print_sin, name),
            "cos" => Kernel::new(ops::cos::<T>, ops::print_cos, name),
            "log" => Kernel::new(ops::log::<T>, ops::print_log, name),
            "exp" => Kernel::new(ops::exp::<T>, ops::print_exp, name),
            other => return Err(ExpressionError::UnknownKernel(other.to_string())),
        };
        self.kernels.push(kernel);
        Ok(())
    }
}

impl<T> KernelSet<T> {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user-supplied kernel.
    pub fn push(&mut self, kernel: Kernel<T>) {
        self.kernels.push(kernel);
    }

    /// Remove all kernels.
    pub fn clear(&mut self) {
        self.kernels.clear();
    }

    /// Number of kernels in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// The kernels as a slice.
    #[must_use]
    pub fn kernels(&self) -> &[Kernel<T>] {
        &self.kernels
    }

    /// Clone out the library vector an [`Expression`](crate::Expression)
    /// constructor consumes.
    #[must_use]
    pub fn build(&self) -> Vec<Kernel<T>> {
        self.kernels.clone()
    }
}

impl<T> fmt::Display for KernelSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

    #[test]
    fn test_from_names_builds_in_order() {
        let set: KernelSet<f64> = KernelSet::from_names(&["sum", "diff", "mul", "div"]).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.kernels()[0].name(), "sum");
        assert_eq!(set.kernels()[3].name(), "div");
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = KernelSet::<f64>::from_names(&["sum", "cbrt"]).unwrap_err();
        assert_eq!(err, ExpressionError::UnknownKernel("cbrt".into()));
    }

    #[test]
    fn test_kernel_call_and_pretty() {
        let set: KernelSet<f64> = KernelSet::from_names(&["pdiv"]).unwrap();
        let pdiv = &set.kernels()[0];
        assert_eq!(pdiv.call(&[1.0, 0.0]), 1.0);
        assert_eq!(pdiv.pretty(&["x".into(), "y".into()]), "(x/y)");
    }

    #[test]
    fn test_user_kernel() {
        let mut set: KernelSet<f64> = KernelSet::new();
        set.push(Kernel::new(
            |args: &[f64]| args[0] * 2.0,
            |args: &[String]| format!("2*{}", args[0]),
            "double",
        ));
        assert_eq!(set.kernels()[0].call(&[3.0]), 6.0);
        assert_eq!(set.to_string(), "double");
    }

    #[test]
    fn test_display_joins_names() {
        let set: KernelSet<f64> = KernelSet::from_names(&["sin", "cos"]).unwrap();
        assert_eq!(set.to_string(), "sin, cos");
    }
}
