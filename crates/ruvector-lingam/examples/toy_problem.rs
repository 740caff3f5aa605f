//! Five-variable toy problem.
//!
//! Samples `a -> b -> c -> d -> e` where every variable also depends directly
//! on all of its ancestors with weight 1, runs DirectLiNGAM, and prints the
//! ordering, the weight matrix, and a Graphviz rendering.
//!
//! ```text
//! RUST_LOG=debug cargo run --example toy_problem -- toy.dot
//! dot -Tpng toy.dot -o toy.png
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ruvector_lingam::{to_dot, DataMatrix, DirectLingam, DotOptions, LingamConfig};

const SAMPLES: usize = 500;

fn laplace(rng: &mut StdRng) -> f64 {
    let u: f64 = rng.gen_range(-0.5..0.5);
    -u.signum() * (1.0 - 2.0 * u.abs()).max(f64::MIN_POSITIVE).ln()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(5);
    for _ in 0..5 {
        let row: Vec<f64> = (0..SAMPLES)
            .map(|s| laplace(&mut rng) + rows.iter().map(|r| r[s]).sum::<f64>())
            .collect();
        rows.push(row);
    }
    let labels: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();

    let data = DataMatrix::from_rows(rows)?;
    let config = LingamConfig {
        prune_threshold: 0.1,
        ..LingamConfig::default()
    };
    let result = DirectLingam::new(config).fit(&data)?;

    let order: Vec<&str> = result
        .ordering
        .as_slice()
        .iter()
        .map(|&v| labels[v].as_str())
        .collect();
    println!("causal order: {}", order.join(" -> "));

    println!("weights B[child][parent]:");
    for (child, row) in result.adjacency.to_rows().iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|w| format!("{w:>7.3}")).collect();
        println!("  {} | {}", labels[child], cells.join(" "));
    }

    let dot = to_dot(
        &result.ordering,
        &result.adjacency,
        Some(labels.as_slice()),
        &DotOptions::default(),
    )?;
    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::write(&path, &dot)?;
            println!("wrote {path}");
        }
        None => print!("{dot}"),
    }

    println!("finished in {:.2?}", result.wall_time);
    Ok(())
}
