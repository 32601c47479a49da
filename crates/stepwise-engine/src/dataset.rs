//! Output dataset and the downstream queries experiment scripts run on it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::RunRecord;

/// Ordered collection of [`RunRecord`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<RunRecord>,
}

impl Dataset {
    /// Wraps records without reordering them.
    pub fn from_records(records: Vec<RunRecord>) -> Self {
        Self { records }
    }

    /// All records in emission order.
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Consumes the dataset, returning its records.
    pub fn into_records(self) -> Vec<RunRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, RunRecord> {
        self.records.iter()
    }

    /// Appends another dataset, keeping both orders.
    pub fn extend(&mut self, other: Dataset) {
        self.records.extend(other.records);
    }

    /// Rows matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&RunRecord) -> bool) -> Dataset {
        Dataset::from_records(self.records.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// Rows owned by experiment member `simulation`.
    pub fn for_simulation(&self, simulation: usize) -> Dataset {
        self.filter(|record| record.simulation == simulation)
    }

    /// Rows produced under configuration `subset`.
    pub fn for_subset(&self, subset: usize) -> Dataset {
        self.filter(|record| record.subset == subset)
    }

    /// Largest timestep present, if any.
    pub fn max_timestep(&self) -> Option<usize> {
        self.records.iter().map(|record| record.timestep).max()
    }

    /// Rows at the largest timestep present.
    pub fn final_rows(&self) -> Dataset {
        match self.max_timestep() {
            Some(last) => self.filter(|record| record.timestep == last),
            None => Dataset::default(),
        }
    }

    /// Mean of a numeric (or boolean) variable over all rows.
    ///
    /// Rows where the variable is absent or textual are skipped; `None` when
    /// no row contributes.
    pub fn mean(&self, variable: &str) -> Option<f64> {
        let values: Vec<f64> = self
            .records
            .iter()
            .filter_map(|record| record.state.get(variable).and_then(|v| v.as_f64()))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Per `(simulation, subset)` means of `variables` over the final rows.
    pub fn summarize(&self, variables: &[&str]) -> Vec<SubsetSummary> {
        let finals = self.final_rows();
        let mut groups: BTreeMap<(usize, usize), Vec<RunRecord>> = BTreeMap::new();
        for record in finals.records {
            groups
                .entry((record.simulation, record.subset))
                .or_default()
                .push(record);
        }
        groups
            .into_iter()
            .map(|((simulation, subset), records)| {
                let runs = records.len();
                let group = Dataset::from_records(records);
                let means = variables
                    .iter()
                    .filter_map(|name| group.mean(name).map(|mean| (name.to_string(), mean)))
                    .collect();
                SubsetSummary {
                    simulation,
                    subset,
                    runs,
                    means,
                }
            })
            .collect()
    }
}

impl IntoIterator for Dataset {
    type Item = RunRecord;
    type IntoIter = std::vec::IntoIter<RunRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a RunRecord;
    type IntoIter = std::slice::Iter<'a, RunRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Final-timestep means of one `(simulation, subset)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetSummary {
    /// Experiment member.
    pub simulation: usize,
    /// Resolved configuration.
    pub subset: usize,
    /// Number of runs averaged.
    pub runs: usize,
    /// Variable name to mean value.
    pub means: BTreeMap<String, f64>,
}

/// Whether larger or smaller means are better for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Larger is better.
    Maximize,
    /// Smaller is better.
    Minimize,
}

/// Outcome of an A/B comparison on one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// First dataset wins.
    A,
    /// Second dataset wins.
    B,
    /// Equal means, or the metric is missing from either side.
    Tie,
}

/// Per-metric A/B comparison of final-timestep means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Compared variable.
    pub metric: String,
    /// Mean over the final rows of the first dataset.
    pub mean_a: Option<f64>,
    /// Mean over the final rows of the second dataset.
    pub mean_b: Option<f64>,
    /// Direction used to pick the winner.
    pub objective: Objective,
    /// Better side.
    pub winner: Winner,
}

/// Compares final-timestep means of `metrics` between two datasets.
pub fn compare(a: &Dataset, b: &Dataset, metrics: &[(&str, Objective)]) -> Vec<Comparison> {
    let final_a = a.final_rows();
    let final_b = b.final_rows();
    metrics
        .iter()
        .map(|(metric, objective)| {
            let mean_a = final_a.mean(metric);
            let mean_b = final_b.mean(metric);
            let winner = match (mean_a, mean_b) {
                (Some(va), Some(vb)) => {
                    let (a_better, b_better) = match objective {
                        Objective::Maximize => (va > vb, vb > va),
                        Objective::Minimize => (va < vb, vb < va),
                    };
                    if a_better {
                        Winner::A
                    } else if b_better {
                        Winner::B
                    } else {
                        Winner::Tie
                    }
                }
                _ => Winner::Tie,
            };
            Comparison {
                metric: metric.to_string(),
                mean_a,
                mean_b,
                objective: *objective,
                winner,
            }
        })
        .collect()
}
