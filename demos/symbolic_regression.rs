//! Symbolic regression with a 1+4 evolutionary strategy.
//!
//! Evolves a CGP expression to rediscover `f(x) = x³ − x` from sampled
//! data, mutating only active genes and accepting offspring that do not
//! regress (neutral drift included).
//!
//! Run with: `cargo run --example symbolic_regression`

use cgp_expression::{Expression, KernelSet};

fn main() {
    let kernels: KernelSet<f64> = KernelSet::from_names(&["sum", "diff", "mul", "pdiv"])
        .expect("built-in kernel names");

    let points: Vec<Vec<f64>> = (0..32)
        .map(|i| vec![f64::from(i) / 16.0 - 1.0])
        .collect();
    let labels: Vec<Vec<f64>> = points
        .iter()
        .map(|p| vec![p[0] * p[0] * p[0] - p[0]])
        .collect();

    let mut parent = Expression::new(1, 1, 1, 15, 15, 2, kernels.build(), 2718)
        .expect("valid grid parameters");
    let mut best = parent
        .batch_loss(&points, &labels, "MSE", 0)
        .expect("well-formed batch");

    println!("Symbolic regression of x^3 - x");
    println!("==============================\n");
    println!("Grid: 1x15, levels-back 15, kernels: {kernels}");
    println!("Initial loss: {best:.6}\n");

    let generations = 2000u64;
    let mut solved_at = None;

    for gen in 0..generations {
        // 1+4 ES: four mutated offspring, keep the best non-regressing one.
        for i in 0..4u64 {
            let mut child = parent.clone();
            child.reseed(gen * 4 + i + 1);
            child.mutate_active(2);
            let loss = child
                .batch_loss(&points, &labels, "MSE", 0)
                .expect("well-formed batch");
            if loss <= best {
                best = loss;
                parent = child;
            }
        }

        if gen % 100 == 0 {
            println!(
                "Gen {gen:4}: loss={best:.6}, active nodes={}",
                parent.active_nodes().len()
            );
        }
        if best < 1e-12 {
            solved_at = Some(gen);
            break;
        }
    }

    println!("\nEvolution complete");
    println!("==================");
    println!("Final loss: {best:.3e}");
    if let Some(gen) = solved_at {
        println!("Exact fit found at generation {gen}");
    }

    let formula = parent
        .evaluate_symbolic(&["x".to_string()])
        .expect("one name per input");
    println!("Champion: {}", formula[0]);

    for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        let predicted = parent.evaluate(&[x]).expect("one value per input")[0];
        let target = x * x * x - x;
        println!("  f({x:5.2}) = {predicted:8.4}  (target {target:8.4})");
    }
}
