use super::params::{FeatureParameterization, lookup_functional, registered_functionals};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Failed to read '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Training set '{path}' contains no proteins", path = path.display())]
    EmptyTrainingSet { path: PathBuf },

    #[error("Phi list '{path}' contains no entries", path = path.display())]
    EmptyPhiList { path: PathBuf },

    #[error(
        "Unknown functional '{name}' at {path}:{line} (registered: {known})",
        path = path.display(),
        known = registered_functionals().join(", ")
    )]
    UnknownFunctional {
        path: PathBuf,
        line: usize,
        name: String,
    },

    #[error("Malformed phi list entry at {path}:{line}: {message}", path = path.display())]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// An ordered list of training-set protein identifiers.
///
/// The solver treats the first protein as the representative for decoy
/// artifact resolution, while the native summary averages over all entries.
/// That asymmetry is inherited from the original pipeline and is enforced as
/// an explicit precondition by the workflow layer rather than patched here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSet {
    proteins: Vec<String>,
}

impl TrainingSet {
    /// Loads protein identifiers from `path`: the first whitespace-separated
    /// column of every non-empty, non-comment line.
    pub fn load(path: &Path) -> Result<Self, TrainingError> {
        let contents = fs::read_to_string(path).map_err(|source| TrainingError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let proteins: Vec<String> = contents
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();

        if proteins.is_empty() {
            return Err(TrainingError::EmptyTrainingSet {
                path: path.to_path_buf(),
            });
        }

        Ok(Self { proteins })
    }

    pub fn proteins(&self) -> &[String] {
        &self.proteins
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// The representative protein used for decoy-artifact resolution.
    pub fn representative(&self) -> &str {
        &self.proteins[0]
    }
}

/// An ordered list of feature parameterizations making up one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct PhiList {
    entries: Vec<FeatureParameterization>,
}

impl PhiList {
    /// Loads a phi list from `path`. Each non-empty, non-comment line reads
    /// `<functional> <r_min> <r_max> <kappa> <min_seq_sep>`.
    pub fn load(path: &Path) -> Result<Self, TrainingError> {
        let contents = fs::read_to_string(path).map_err(|source| TrainingError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            entries.push(parse_entry(path, index + 1, trimmed)?);
        }

        if entries.is_empty() {
            return Err(TrainingError::EmptyPhiList {
                path: path.to_path_buf(),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FeatureParameterization] {
        &self.entries
    }

    /// The parameterization whose canonical name keys artifact resolution and
    /// output naming. The pipeline runs one functional per training run, so
    /// this is simply the first entry.
    pub fn primary(&self) -> &FeatureParameterization {
        &self.entries[0]
    }

    /// Total feature count across all entries.
    pub fn total_features(&self) -> usize {
        self.entries.iter().map(|e| e.feature_count()).sum()
    }
}

fn parse_entry(
    path: &Path,
    line: usize,
    text: &str,
) -> Result<FeatureParameterization, TrainingError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(TrainingError::MalformedEntry {
            path: path.to_path_buf(),
            line,
            message: format!(
                "expected 'functional r_min r_max kappa min_seq_sep', found {} field(s)",
                fields.len()
            ),
        });
    }

    let functional =
        lookup_functional(fields[0]).ok_or_else(|| TrainingError::UnknownFunctional {
            path: path.to_path_buf(),
            line,
            name: fields[0].to_string(),
        })?;

    let parse_float = |field: &str, what: &str| {
        field
            .parse::<f64>()
            .map_err(|e| TrainingError::MalformedEntry {
                path: path.to_path_buf(),
                line,
                message: format!("invalid {what} '{field}': {e}"),
            })
    };
    let r_min = parse_float(fields[1], "r_min")?;
    let r_max = parse_float(fields[2], "r_max")?;
    let kappa = parse_float(fields[3], "kappa")?;
    let min_seq_sep = fields[4]
        .parse::<u32>()
        .map_err(|e| TrainingError::MalformedEntry {
            path: path.to_path_buf(),
            line,
            message: format!("invalid min_seq_sep '{}': {e}", fields[4]),
        })?;

    Ok(FeatureParameterization::new(
        functional, r_min, r_max, kappa, min_seq_sep,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn training_set_takes_first_column() {
        let file = write_temp("1urn chainA extra\n2c4q\n\n# comment\n8b3q x\n");
        let set = TrainingSet::load(file.path()).unwrap();
        assert_eq!(set.proteins(), ["1urn", "2c4q", "8b3q"]);
        assert_eq!(set.representative(), "1urn");
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let file = write_temp("\n  \n# only comments\n");
        let err = TrainingSet::load(file.path()).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyTrainingSet { .. }));
    }

    #[test]
    fn phi_list_parses_parameter_tuple() {
        let file = write_temp("phi_pairwise_contact_well 9.5 9.5 0.7 10\n");
        let list = PhiList::load(file.path()).unwrap();
        assert_eq!(list.entries().len(), 1);
        assert_eq!(list.total_features(), 300);
        assert_eq!(
            list.primary().full_name(),
            "phi_pairwise_contact_well-9.5_9.5_0.7_10"
        );
    }

    #[test]
    fn phi_list_rejects_unknown_functional() {
        let file = write_temp("phi_made_up_well 9.5 9.5 0.7 10\n");
        let err = PhiList::load(file.path()).unwrap_err();
        assert!(matches!(err, TrainingError::UnknownFunctional { line: 1, .. }));
    }

    #[test]
    fn phi_list_rejects_short_entries() {
        let file = write_temp("phi_pairwise_contact_well 9.5 9.5\n");
        let err = PhiList::load(file.path()).unwrap_err();
        assert!(matches!(err, TrainingError::MalformedEntry { line: 1, .. }));
    }

    #[test]
    fn empty_phi_list_is_rejected() {
        let file = write_temp("# nothing here\n");
        let err = PhiList::load(file.path()).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyPhiList { .. }));
    }
}
