use super::error::EngineError;
use crate::core::params::FeatureParameterization;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Score assigned to filenames that fail the basic pattern outright.
const SCORE_REJECT: i64 = -999;
/// Candidates at or below this score are dropped before ranking.
const CANDIDATE_FLOOR: i64 = -100;
/// The best candidate must score at least this to be trusted.
const CONFIDENCE_FLOOR: i64 = 0;

/// Substrings marking decoy/randomization provenance in artifact names.
const PROVENANCE_VOCABULARY: [&str; 3] = ["randomization", "CPLEX", "decoy"];

/// Scores a candidate filename against the representative protein and the
/// parameter-variant set; higher is better.
///
/// The rule set reproduces the naming heuristic the wider pipeline has grown
/// around, including its `len % 7` tie-breaker. It is an integration
/// convenience for matching artifacts written by loosely coordinated tools,
/// not a principled classifier; keep it bit-for-bit stable so resolution
/// stays deterministic across runs.
pub fn score_candidate(
    filename: &str,
    functional_name: &str,
    protein: &str,
    variants: &BTreeSet<String>,
) -> i64 {
    if !filename.starts_with(&format!("{functional_name}_")) {
        return SCORE_REJECT;
    }
    if !filename.contains(protein) {
        return SCORE_REJECT;
    }

    let mut score = 0i64;
    let param_matched = variants.iter().any(|v| filename.contains(v.as_str()));
    if param_matched {
        score += 50;
    }
    if PROVENANCE_VOCABULARY.iter().any(|w| filename.contains(w)) {
        score += 30;
    }
    if filename.contains("decoy") {
        score += 20;
    }
    if filename.contains("native") {
        score -= 5;
    }
    if filename.ends_with('_') || filename.ends_with('-') {
        score -= 1;
    }
    score += (filename.len() % 7) as i64;

    if param_matched { score } else { score - 20 }
}

/// Locates the decoy feature-matrix artifact for `protein` under `param`
/// among the files in `phis_dir`.
///
/// Fails with [`EngineError::Resolution`] carrying the full directory listing
/// and the computed variant set when nothing passes the basic pattern or the
/// best score falls below the confidence floor.
pub fn resolve(
    phis_dir: &Path,
    protein: &str,
    param: &FeatureParameterization,
) -> Result<String, EngineError> {
    let variants = param.name_variants();
    debug!(
        protein,
        param = %param.full_name(),
        ?variants,
        "resolving decoy artifact"
    );

    let mut filenames: Vec<String> = Vec::new();
    let entries = fs::read_dir(phis_dir).map_err(|source| EngineError::Directory {
        path: phis_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| EngineError::Directory {
            path: phis_dir.to_path_buf(),
            source,
        })?;
        if let Some(name) = entry.file_name().to_str() {
            filenames.push(name.to_string());
        }
    }

    let mut candidates: Vec<(i64, String)> = filenames
        .iter()
        .map(|name| {
            (
                score_candidate(name, param.functional.name, protein, &variants),
                name.clone(),
            )
        })
        .filter(|(score, _)| *score > CANDIDATE_FLOOR)
        .collect();

    if candidates.is_empty() {
        return Err(resolution_error(
            protein,
            param,
            &variants,
            &filenames,
            "no candidate files matched the basic pattern",
        ));
    }

    // Score descending, then filename descending; deterministic regardless
    // of directory enumeration order.
    candidates.sort_by(|a, b| b.cmp(a));
    let (best_score, best_name) = candidates[0].clone();

    if candidates.len() > 1 && candidates[1].0 == best_score {
        warn!(
            "multiple candidate decoy files tied at score {best_score}; \
             choosing highest-sorted filename"
        );
        for (score, name) in candidates.iter().take(5) {
            warn!("  score={score:3}  file={name}");
        }
    }

    if best_score < CONFIDENCE_FLOOR {
        let mut message = String::from("best candidate score is below the confidence floor:\n");
        for (score, name) in candidates.iter().take(10) {
            let _ = writeln!(message, "  score={score:3}  file={name}");
        }
        return Err(resolution_error(
            protein,
            param,
            &variants,
            &filenames,
            message.trim_end(),
        ));
    }

    info!(artifact = %best_name, score = best_score, "resolved decoy artifact");
    Ok(best_name)
}

fn resolution_error(
    protein: &str,
    param: &FeatureParameterization,
    variants: &BTreeSet<String>,
    filenames: &[String],
    reason: &str,
) -> EngineError {
    let mut details = format!("{reason}\nparameter variants searched: {variants:?}\n");
    let mut sorted = filenames.to_vec();
    sorted.sort_unstable();
    let _ = writeln!(details, "directory entries ({}):", sorted.len());
    for name in &sorted {
        let _ = writeln!(details, "  {name}");
    }
    EngineError::Resolution {
        protein: protein.to_string(),
        param_string: param.full_name(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::lookup_functional;
    use std::fs::File;
    use tempfile::TempDir;

    fn param() -> FeatureParameterization {
        FeatureParameterization::new(
            lookup_functional("phi_pairwise_contact_well").unwrap(),
            9.5,
            9.5,
            0.7,
            10,
        )
    }

    fn score(name: &str) -> i64 {
        score_candidate(
            name,
            "phi_pairwise_contact_well",
            "1urn",
            &param().name_variants(),
        )
    }

    fn touch(dir: &TempDir, name: &str) {
        File::create(dir.path().join(name)).unwrap();
    }

    #[test]
    fn rejects_wrong_prefix_and_wrong_protein() {
        assert_eq!(score("other_functional_1urn_decoys_9.5_9.5_0.7_10"), -999);
        assert_eq!(score("phi_pairwise_contact_well_2c4q_decoys_9.5_9.5_0.7_10"), -999);
    }

    #[test]
    fn decoy_artifact_outscores_native_artifact() {
        let decoy = score("phi_pairwise_contact_well_1urn_decoys_CPLEX_randomization_9.5_9.5_0.7_10");
        let native = score("phi_pairwise_contact_well_1urn_native_9.5_9.5_0.7_10");
        assert!(decoy > native);
        assert!(decoy >= 100); // 50 + 30 + 20 + len%7
    }

    #[test]
    fn missing_parameter_variant_is_penalized() {
        let matched = score("phi_pairwise_contact_well_1urn_decoys_9.5_9.5_0.7_10");
        let unmatched = score("phi_pairwise_contact_well_1urn_decoys_12.0_12.0_0.7_10");
        assert!(matched - unmatched >= 50);
    }

    #[test]
    fn trailing_separator_costs_one_point() {
        let clean = "phi_pairwise_contact_well_1urn_decoys_9.5_9.5_0.7_10";
        let malformed = format!("{clean}_");
        // Isolate the -1 from the len % 7 tie-breaker shift.
        let expected = score(clean) - (clean.len() % 7) as i64 + (malformed.len() % 7) as i64 - 1;
        assert_eq!(score(&malformed), expected);
    }

    #[test]
    fn resolves_the_expected_decoy_file() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "phi_pairwise_contact_well_1urn_native_9.5_9.5_0.7_10");
        touch(&dir, "phi_pairwise_contact_well_1urn_decoys_CPLEX_randomization_9.5_9.5_0.7_10");
        touch(&dir, "phi_pairwise_contact_well_1urn_decoys_CPLEX_randomization_12.0_12.0_0.7_10");
        touch(&dir, "unrelated_file.txt");

        let resolved = resolve(dir.path(), "1urn", &param()).unwrap();
        assert_eq!(
            resolved,
            "phi_pairwise_contact_well_1urn_decoys_CPLEX_randomization_9.5_9.5_0.7_10"
        );
    }

    #[test]
    fn resolution_is_deterministic_across_invocations() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "phi_pairwise_contact_well_1urn_decoys_9.5_9.5_0.7_10");
        touch(&dir, "phi_pairwise_contact_well_1urn_decoys_CPLEX_9.5_9.5_0.7_10");
        touch(&dir, "phi_pairwise_contact_well_1urn_decoys_randomization_9.5_9.5_0.7_10");

        let first = resolve(dir.path(), "1urn", &param()).unwrap();
        for _ in 0..5 {
            assert_eq!(resolve(dir.path(), "1urn", &param()).unwrap(), first);
        }
    }

    #[test]
    fn empty_directory_fails_with_listing_dump() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "completely_unrelated");

        let err = resolve(dir.path(), "1urn", &param()).unwrap_err();
        let EngineError::Resolution { details, .. } = err else {
            panic!("expected resolution error");
        };
        assert!(details.contains("completely_unrelated"));
        assert!(details.contains("9.5_9.5_0.7_10"));
    }

    #[test]
    fn low_confidence_match_is_rejected() {
        let dir = TempDir::new().unwrap();
        // Passes the basic pattern but has no param variant and no decoy
        // provenance: 0 - 5 (native) + len % 7 - 20 < 0 for this name.
        touch(&dir, "phi_pairwise_contact_well_1urn_native_summary");

        let name = "phi_pairwise_contact_well_1urn_native_summary";
        assert!(score(name) < 0);
        let err = resolve(dir.path(), "1urn", &param()).unwrap_err();
        assert!(matches!(err, EngineError::Resolution { .. }));
    }
}
