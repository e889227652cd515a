//! Primitive kernel functions and their printers.
//!
//! Every function here takes the full argument list its node was wired with
//! and tolerates any argument count of at least one: the n-ary families fold
//! over all arguments, the sum-then-activate family saturates its inputs
//! first, and the unary functions read only the first argument. Each value
//! function has a printer counterpart producing the infix form used by
//! symbolic evaluation.

use crate::scalar::Scalar;

fn fold_sum<T: Scalar>(args: &[T]) -> T {
    let mut acc = args[0].clone();
    for a in &args[1..] {
        acc = acc + a.clone();
    }
    acc
}

fn join(args: &[String], sep: &str) -> String {
    format!("({})", args.join(sep))
}

/// a + b + …
pub fn sum<T: Scalar>(args: &[T]) -> T {
    fold_sum(args)
}

pub fn print_sum(args: &[String]) -> String {
    join(args, "+")
}

/// a − b − …
pub fn diff<T: Scalar>(args: &[T]) -> T {
    let mut acc = args[0].clone();
    for a in &args[1..] {
        acc = acc - a.clone();
    }
    acc
}

pub fn print_diff(args: &[String]) -> String {
    join(args, "-")
}

/// a · b · …
pub fn mul<T: Scalar>(args: &[T]) -> T {
    let mut acc = args[0].clone();
    for a in &args[1..] {
        acc = acc * a.clone();
    }
    acc
}

pub fn print_mul(args: &[String]) -> String {
    join(args, "*")
}

/// a / b / …
pub fn div<T: Scalar>(args: &[T]) -> T {
    let mut acc = args[0].clone();
    for a in &args[1..] {
        acc = acc / a.clone();
    }
    acc
}

pub fn print_div(args: &[String]) -> String {
    join(args, "/")
}

/// Protected division: a / (b · c · …), falling back to one when the
/// result is not finite.
pub fn pdiv<T: Scalar>(args: &[T]) -> T {
    let mut denom = T::one();
    for a in &args[1..] {
        denom = denom * a.clone();
    }
    let retval = args[0].clone() / denom;
    if retval.is_finite() {
        retval
    } else {
        T::one()
    }
}

pub fn print_pdiv(args: &[String]) -> String {
    match args {
        [a] => format!("({a}/1)"),
        [a, b, ..] => format!("({a}/{b})"),
        [] => String::new(),
    }
}

/// Sigmoid of the saturated inputs: 1 / (1 + e^−(a+b+…)).
pub fn sig<T: Scalar>(args: &[T]) -> T {
    let s = fold_sum(args);
    T::one() / (T::one() + (T::zero() - s).exp())
}

pub fn print_sig(args: &[String]) -> String {
    format!("sig{}", join(args, "+"))
}

/// Hyperbolic tangent of the saturated inputs.
pub fn tanh<T: Scalar>(args: &[T]) -> T {
    fold_sum(args).tanh()
}

pub fn print_tanh(args: &[String]) -> String {
    format!("tanh{}", join(args, "+"))
}

/// Rectifier of the saturated inputs.
pub fn relu<T: Scalar>(args: &[T]) -> T {
    let s = fold_sum(args);
    if s.is_negative() {
        T::zero()
    } else {
        s
    }
}

pub fn print_relu(args: &[String]) -> String {
    format!("ReLu{}", join(args, "+"))
}

/// Exponential linear unit of the saturated inputs: e^s − 1 on the
/// negative branch, identity otherwise.
pub fn elu<T: Scalar>(args: &[T]) -> T {
    let s = fold_sum(args);
    if s.is_negative() {
        s.exp() - T::one()
    } else {
        s
    }
}

pub fn print_elu(args: &[String]) -> String {
    format!("ELU{}", join(args, "+"))
}

/// Inverse square root unit of the saturated inputs: s / √(1 + s²).
pub fn isru<T: Scalar>(args: &[T]) -> T {
    let s = fold_sum(args);
    s.clone() / (T::one() + s.clone() * s).sqrt()
}

pub fn print_isru(args: &[String]) -> String {
    format!("ISRU{}", join(args, "+"))
}

/// Sine of the first argument; further arguments are ignored.
pub fn sin<T: Scalar>(args: &[T]) -> T {
    args[0].clone().sin()
}

pub fn print_sin(args: &[String]) -> String {
    format!("sin({})", args[0])
}

/// Cosine of the first argument.
pub fn cos<T: Scalar>(args: &[T]) -> T {
    args[0].clone().cos()
}

pub fn print_cos(args: &[String]) -> String {
    format!("cos({})", args[0])
}

/// Natural logarithm of the first argument.
pub fn log<T: Scalar>(args: &[T]) -> T {
    args[0].clone().ln()
}

pub fn print_log(args: &[String]) -> String {
    format!("log({})", args[0])
}

/// Exponential of the first argument.
pub fn exp<T: Scalar>(args: &[T]) -> T {
    args[0].clone().exp()
}

pub fn print_exp(args: &[String]) -> String {
    format!("exp({})", args[0])
}
