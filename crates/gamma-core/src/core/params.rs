use phf::{Map, phf_map};
use std::collections::BTreeSet;
use std::fmt;

/// Static description of one geometric interaction functional.
///
/// The original tooling selected functionals by evaluating an arbitrary name
/// string at call time; here every supported functional is registered up
/// front and unknown names are rejected when the phi list is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionalDescriptor {
    /// Canonical name, used as the leading component of every phi artifact
    /// filename written by the feature-extraction tools.
    pub name: &'static str,
    /// Number of feature-vector entries this functional contributes.
    pub feature_count: usize,
}

// phi_pairwise_contact_well accumulates a symmetric 24x24 residue-type
// matrix and emits its upper triangle including the diagonal: 24*25/2.
static FUNCTIONAL_REGISTRY: Map<&'static str, FunctionalDescriptor> = phf_map! {
    "phi_pairwise_contact_well" => FunctionalDescriptor {
        name: "phi_pairwise_contact_well",
        feature_count: 300,
    },
};

/// Looks up a registered interaction functional by its canonical name.
pub fn lookup_functional(name: &str) -> Option<&'static FunctionalDescriptor> {
    FUNCTIONAL_REGISTRY.get(name)
}

/// Names of all registered functionals, for diagnostics.
pub fn registered_functionals() -> Vec<&'static str> {
    let mut names: Vec<_> = FUNCTIONAL_REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// One instance of a geometric interaction functional: the functional itself
/// plus the numeric parameter tuple (interaction-well radii, steepness, and
/// minimum sequence separation). Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureParameterization {
    pub functional: &'static FunctionalDescriptor,
    pub r_min: f64,
    pub r_max: f64,
    pub kappa: f64,
    pub min_seq_sep: u32,
}

impl FeatureParameterization {
    pub fn new(
        functional: &'static FunctionalDescriptor,
        r_min: f64,
        r_max: f64,
        kappa: f64,
        min_seq_sep: u32,
    ) -> Self {
        Self {
            functional,
            r_min,
            r_max,
            kappa,
            min_seq_sep,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.functional.feature_count
    }

    /// The parameter tuple rendered with underscores, e.g. `9.5_9.5_0.7_10`.
    ///
    /// Integral radii keep a trailing `.0` (`12.0_12.0_0.7_10`) to match the
    /// rendering used by the upstream feature-extraction tools.
    pub fn parameter_string(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            format_param(self.r_min),
            format_param(self.r_max),
            format_param(self.kappa),
            self.min_seq_sep
        )
    }

    /// Canonical full name, e.g. `phi_pairwise_contact_well-9.5_9.5_0.7_10`.
    /// This string keys all output artifacts of a run.
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.functional.name, self.parameter_string())
    }

    /// Filename of the native phi vector for `protein` under this
    /// parameterization, as written by the feature-extraction tools.
    pub fn native_artifact_name(&self, protein: &str) -> String {
        format!(
            "{}_{}_native_{}",
            self.functional.name,
            protein,
            self.parameter_string()
        )
    }

    /// Parameter-string variants to search for in candidate filenames.
    ///
    /// The upstream feature-computation and decoy-generation tools do not
    /// agree on delimiter conventions, so matching accepts underscore and
    /// hyphen forms, leading-separator forms, and forms with trailing `.0`
    /// decimal artifacts removed.
    pub fn name_variants(&self) -> BTreeSet<String> {
        let mut stripped = self.full_name();
        if let Some(rest) = stripped.strip_prefix(self.functional.name) {
            stripped = rest.to_string();
        }
        let name = stripped.trim_start_matches(['_', '-']).to_string();

        let mut variants = BTreeSet::new();
        variants.insert(name.clone());
        variants.insert(name.replace('-', "_"));
        variants.insert(name.replace('_', "-"));
        variants.insert(format!("_{name}"));
        variants.insert(format!("-{name}"));
        variants.insert(name.replace(".0", ""));
        variants.insert(name.replace(".0", "").replace('_', "-"));
        variants.retain(|v| !v.is_empty());
        variants
    }
}

impl fmt::Display for FeatureParameterization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

fn format_param(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well(r_min: f64, r_max: f64, kappa: f64, sep: u32) -> FeatureParameterization {
        let functional = lookup_functional("phi_pairwise_contact_well").unwrap();
        FeatureParameterization::new(functional, r_min, r_max, kappa, sep)
    }

    #[test]
    fn registry_knows_pairwise_contact_well() {
        let descriptor = lookup_functional("phi_pairwise_contact_well").unwrap();
        assert_eq!(descriptor.feature_count, 300);
        assert!(lookup_functional("phi_unknown_functional").is_none());
    }

    #[test]
    fn canonical_full_name_matches_artifact_convention() {
        let param = well(9.5, 9.5, 0.7, 10);
        assert_eq!(param.full_name(), "phi_pairwise_contact_well-9.5_9.5_0.7_10");
        assert_eq!(param.parameter_string(), "9.5_9.5_0.7_10");
    }

    #[test]
    fn integral_radii_keep_trailing_decimal() {
        let param = well(12.0, 12.0, 0.7, 10);
        assert_eq!(param.parameter_string(), "12.0_12.0_0.7_10");
    }

    #[test]
    fn native_artifact_name_embeds_protein() {
        let param = well(9.5, 9.5, 0.7, 10);
        assert_eq!(
            param.native_artifact_name("1urn"),
            "phi_pairwise_contact_well_1urn_native_9.5_9.5_0.7_10"
        );
    }

    #[test]
    fn variant_set_covers_both_delimiter_styles() {
        let variants = well(9.5, 9.5, 0.7, 10).name_variants();
        assert!(variants.contains("9.5_9.5_0.7_10"));
        assert!(variants.contains("9.5-9.5-0.7-10"));
        assert!(variants.contains("_9.5_9.5_0.7_10"));
        assert!(variants.contains("-9.5_9.5_0.7_10"));
    }

    #[test]
    fn variant_set_drops_trailing_zero_artifacts() {
        let variants = well(12.0, 12.0, 0.7, 10).name_variants();
        assert!(variants.contains("12_12_0.7_10"));
        assert!(variants.contains("12-12-0.7-10"));
    }

    #[test]
    fn variant_set_contains_no_empty_strings() {
        for variants in [
            well(9.5, 9.5, 0.7, 10).name_variants(),
            well(12.0, 12.0, 0.7, 10).name_variants(),
        ] {
            assert!(variants.iter().all(|v| !v.is_empty()));
        }
    }
}
