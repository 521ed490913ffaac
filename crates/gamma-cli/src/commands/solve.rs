use crate::cli::SolveArgs;
use crate::config::PartialSolveConfig;
use crate::error::Result;
use gammafit::workflows::solve;
use tracing::info;

pub fn run(args: SolveArgs) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialSolveConfig::from_file(path)?,
        None => PartialSolveConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial.merge_with_cli(&args)?;

    println!("Starting gamma fit...");
    let report = solve::run(&config)?;

    let gamma_min = report.gamma.iter().cloned().fold(f64::INFINITY, f64::min);
    let gamma_max = report
        .gamma
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    println!(
        "Gamma computed from {} decoys ({} features), cutoff = {}.",
        report.num_decoys, report.num_features, report.cutoff
    );
    println!("  decoy artifact: {}", report.decoy_artifact);
    println!("  gamma range:    [{gamma_min:.5}, {gamma_max:.5}]");
    println!(
        "  artifacts:      {}_{{gamma,A,B,lamb,lamb_filtered,gamma_filtered}}",
        report.output_prefix.display()
    );
    Ok(())
}
