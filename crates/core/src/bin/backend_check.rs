//! Quick check against a running training backend

use ml_workbench_core::backend::{format_metric, Plot, TrainingClient, TrainingRequest};
use ml_workbench_core::{Algorithm, Dataset};

fn usage() -> ! {
    eprintln!("Usage: backend_check <csv-file> <feature,feature,...> <algorithm> [target]");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| usage());
    let features_arg = args.next().unwrap_or_else(|| usage());
    let algorithm_arg = args.next().unwrap_or_else(|| usage());
    let target = args.next().unwrap_or_default();

    let text = std::fs::read_to_string(&path).expect("Failed to read CSV file");
    let dataset = Dataset::parse(&text).expect("Failed to parse CSV");

    let algorithm: Algorithm = algorithm_arg.parse().unwrap_or_else(|_| {
        eprintln!("Unknown algorithm: {}", algorithm_arg);
        std::process::exit(1);
    });

    println!(
        "Dataset: {} columns, {} rows",
        dataset.headers().len(),
        dataset.row_count()
    );

    let request = TrainingRequest {
        csv_data: text.clone(),
        features: features_arg
            .split(',')
            .map(|f| f.trim().to_string())
            .collect(),
        target,
        algorithm,
        original_headers: dataset.headers().to_vec(),
    };

    let client = TrainingClient::from_env().expect("Failed to create client");
    println!("Posting to {}/train_model ...\n", client.base_url());

    match client.train(&request).await {
        Ok(report) => {
            if !report.metrics.is_empty() {
                println!("Metrics:");
                for (name, value) in &report.metrics {
                    println!("  {}: {}", name, format_metric(*value));
                }
            }
            match &report.plot {
                Plot::Scatter(points) => println!("Scatter plot with {} points", points.len()),
                Plot::ConfusionMatrix(_) => println!("Confusion matrix"),
                Plot::Cluster(plot) => println!(
                    "Cluster plot with {} points in {} clusters",
                    plot.points.len(),
                    plot.series().len()
                ),
                Plot::None => println!("No plot data"),
            }
        }
        Err(e) => {
            eprintln!("Training failed: {}", e);
            std::process::exit(1);
        }
    }
}
