//! Persisting experiment results.
//!
//! Layout under the output directory:
//!
//! ```text
//! <base>/<test_name>/
//!     results.json        configuration and per-rule statistics
//!     instances.json      seed -> instance record
//!     <rule>/
//!         solutions.json  seed -> run record (schedule included)
//!         validations.csv seed,makespan,validated_makespan,is_valid,violation_count,error_message
//! ```
//!
//! `results.json` is the input of external chart tooling, which reads
//! `algorithm_results.<rule>.{avg_makespan, makespan_std, avg_time, time_std}`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::{ExperimentConfig, RuleKind};
use crate::error::ResultsError;
use crate::experiment::{ExperimentResults, RuleStats, RunRecord};
use crate::models::InstanceRecord;

/// Summary document written to `results.json`.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    test_name: &'a str,
    configuration: &'a ExperimentConfig,
    algorithms: Vec<RuleKind>,
    algorithm_results: BTreeMap<RuleKind, RuleStats>,
}

/// Paths written by [`ResultsWriter::write`].
#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub summary: PathBuf,
    pub instances: PathBuf,
    /// `(solutions.json, validations.csv)` per rule.
    pub per_rule: BTreeMap<RuleKind, (PathBuf, PathBuf)>,
}

/// Writes one experiment's results below a base directory.
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    base: PathBuf,
}

impl ResultsWriter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Directory of one test.
    pub fn test_dir(&self, test_name: &str) -> PathBuf {
        self.base.join(test_name)
    }

    /// Writes every file of the layout, creating directories as needed.
    pub fn write(&self, results: &ExperimentResults) -> Result<WrittenFiles, ResultsError> {
        let test_name = results.config.experiment_parameters.test_name.as_str();
        let dir = self.test_dir(test_name);
        create_dir(&dir)?;

        let summary = Summary {
            test_name,
            configuration: &results.config,
            algorithms: results.runs.keys().copied().collect(),
            algorithm_results: results.stats(),
        };
        let mut written = WrittenFiles {
            summary: dir.join("results.json"),
            instances: dir.join("instances.json"),
            per_rule: BTreeMap::new(),
        };
        write_json(&written.summary, &summary)?;

        let instances: BTreeMap<u64, InstanceRecord> = results
            .instances
            .iter()
            .zip(results.config.seeds())
            .map(|(inst, seed)| (inst.seed().unwrap_or(seed), inst.to_record()))
            .collect();
        write_json(&written.instances, &instances)?;

        for (kind, runs) in &results.runs {
            let rule_dir = dir.join(kind.as_str());
            create_dir(&rule_dir)?;

            let solutions_path = rule_dir.join("solutions.json");
            let solutions: BTreeMap<u64, &RunRecord> = runs.iter().map(|r| (r.seed, r)).collect();
            write_json(&solutions_path, &solutions)?;

            let validations_path = rule_dir.join("validations.csv");
            write_file(&validations_path, &validations_csv(runs))?;

            written.per_rule.insert(*kind, (solutions_path, validations_path));
        }

        info!(dir = %dir.display(), rules = results.runs.len(), "results written");
        Ok(written)
    }
}

fn validations_csv(runs: &[RunRecord]) -> String {
    let mut out =
        String::from("seed,makespan,validated_makespan,is_valid,violation_count,error_message\n");
    for r in runs {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            r.seed,
            r.makespan,
            r.validated_makespan,
            r.is_valid,
            r.violation_count,
            quote_csv(r.first_violation.as_deref().unwrap_or(""))
        );
    }
    out
}

/// Quotes a CSV field, doubling embedded quotes.
fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn create_dir(path: &Path) -> Result<(), ResultsError> {
    fs::create_dir_all(path).map_err(|source| ResultsError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ResultsError> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, &json)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ResultsError> {
    fs::write(path, contents).map_err(|source| ResultsError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::Experiment;

    fn run_small() -> ExperimentResults {
        let config = ExperimentConfig::default()
            .with_num_seeds(2)
            .with_test_name("writer")
            .with_rule(RuleKind::LeastFlexibility);
        Experiment::new(config).unwrap().run().unwrap()
    }

    #[test]
    fn test_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let written = ResultsWriter::new(tmp.path()).write(&run_small()).unwrap();

        let dir = tmp.path().join("writer");
        assert_eq!(written.summary, dir.join("results.json"));
        assert!(written.summary.is_file());
        assert!(written.instances.is_file());
        for name in ["shortest_processing_time", "least_flexibility"] {
            assert!(dir.join(name).join("solutions.json").is_file());
            assert!(dir.join(name).join("validations.csv").is_file());
        }
        assert_eq!(written.per_rule.len(), 2);
    }

    #[test]
    fn test_summary_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let written = ResultsWriter::new(tmp.path()).write(&run_small()).unwrap();

        let text = fs::read_to_string(&written.summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["test_name"], "writer");
        assert_eq!(value["configuration"]["experiment_parameters"]["num_seeds"], 2);

        let spt = &value["algorithm_results"]["shortest_processing_time"];
        assert_eq!(spt["runs"], 2);
        for key in ["avg_makespan", "makespan_std", "avg_time", "time_std"] {
            assert!(spt[key].is_number(), "missing {key}");
        }
        assert!(value["algorithm_results"]["least_flexibility"].is_object());
    }

    #[test]
    fn test_instances_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let results = run_small();
        let written = ResultsWriter::new(tmp.path()).write(&results).unwrap();

        let text = fs::read_to_string(&written.instances).unwrap();
        let records: BTreeMap<u64, InstanceRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(records.len(), 2);
        let loaded = &records[&0];
        let expected = results.instances[0].to_record();
        assert_eq!(loaded.num_machines, expected.num_machines);
        assert_eq!(loaded.jobs.len(), expected.jobs.len());
        for (lj, ej) in loaded.jobs.iter().zip(&expected.jobs) {
            for (lo, eo) in lj.operations.iter().zip(&ej.operations) {
                assert_eq!(lo.eligible_machines, eo.eligible_machines);
                for (m, t) in &eo.processing_times {
                    assert!((lo.processing_times[m] - t).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_validations_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let written = ResultsWriter::new(tmp.path()).write(&run_small()).unwrap();

        let (_, csv) = &written.per_rule[&RuleKind::ShortestProcessingTime];
        let text = fs::read_to_string(csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "seed,makespan,validated_makespan,is_valid,violation_count,error_message"
        );
        assert!(lines[1].starts_with("0,"));
        assert!(lines[1].ends_with(",true,0,\"\""));
    }

    #[test]
    fn test_validations_csv_error_message() {
        let mut results = run_small();
        let runs = results
            .runs
            .get_mut(&RuleKind::ShortestProcessingTime)
            .unwrap();
        runs[0].is_valid = false;
        runs[0].violation_count = 1;
        runs[0].first_violation = Some("machine 0: job 1 op 0 [0, 3) overlaps \"x\"".to_string());

        let csv = validations_csv(runs);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",false,1,\"machine 0: job 1 op 0 [0, 3) overlaps \"\"x\"\"\""));
    }

    #[test]
    fn test_unwritable_base() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        fs::write(&file, "x").unwrap();
        let err = ResultsWriter::new(&file).write(&run_small()).unwrap_err();
        assert!(matches!(err, ResultsError::Io { .. }));
    }
}
