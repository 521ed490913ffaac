use crate::cli::InspectArgs;
use crate::error::Result;
use gammafit::workflows::energy;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Scoring {:?} against {:?}", args.decoys, args.gamma);
    let report = energy::score_artifacts(&args.gamma, &args.decoys, args.native.as_deref())?;

    if args.all_energies {
        for (i, e) in report.decoy_energies.iter().enumerate() {
            println!("{i}\t{e:.5}");
        }
    }

    println!(
        "Scored {} decoys: mean = {:.5}, std = {:.5}.",
        report.decoy_energies.len(),
        report.decoy_mean,
        report.decoy_std
    );
    if let Some(e_native) = report.native_energy {
        println!("  native energy: {e_native:.5}");
    }
    match report.z_score {
        Some(z) => println!("  Z-score:       {z:.5}"),
        None if args.native.is_some() => {
            println!("  Z-score:       undefined (zero decoy energy spread)");
        }
        None => {}
    }
    Ok(())
}
