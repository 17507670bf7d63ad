//! The independence-test contract consumed by the learner and validator,
//! plus the column-addressable dataset they pass through to it.
//!
//! The statistical test itself (e.g. a robust linear regression producing a
//! coefficient and confidence interval) lives outside this crate; core only
//! needs `fit` + `is_independent`. A graph-backed oracle implementation is
//! provided for deterministic testing and dry runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{CausalDag, Path};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch { column: String, got: usize, expected: usize },
}

/// A failed test invocation. The learner and validator treat this as fatal
/// for the surrounding search: no retry, no per-candidate skip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndependenceError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("test fit failed: {0}")]
    FitFailed(String),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

/// A tabular dataset with named, equal-length numeric columns. Core reads
/// only the column names (to enumerate variables) and hands the table to
/// the independence test untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn from_columns<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Table::default();
        let mut expected = None;
        for (name, column) in columns {
            let name = name.into();
            if table.names.contains(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            match expected {
                Some(len) if column.len() != len => {
                    return Err(TableError::LengthMismatch {
                        column: name,
                        got: column.len(),
                        expected: len,
                    });
                }
                None => expected = Some(column.len()),
                _ => {}
            }
            table.names.push(name);
            table.columns.push(column);
        }
        Ok(table)
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let pos = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[pos])
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

/// The capability the structure learner and implication validator consume.
///
/// `fit` runs the test for "treatment independent of `outcome` given
/// `conditioning`" on `data`; `is_independent` reads the verdict of the most
/// recent successful fit. `categorical_outcome` lets regression-based
/// implementations switch the family (e.g. binomial instead of gaussian).
pub trait IndependenceTest {
    fn fit(
        &mut self,
        treatment: &[&str],
        outcome: &str,
        conditioning: &[&str],
        data: &Table,
        categorical_outcome: bool,
    ) -> Result<(), IndependenceError>;

    fn is_independent(&self) -> bool;
}

/// A ground-truth oracle: answers independence queries from d-separation in
/// a known DAG instead of from data. Useful for testing the learner against
/// a structure whose implications are known exactly, and for dry-running a
/// pipeline before real data is available.
#[derive(Debug, Clone)]
pub struct DSeparationOracle {
    dag: CausalDag,
    verdict: bool,
}

impl DSeparationOracle {
    pub fn new(dag: CausalDag) -> Self {
        Self { dag, verdict: true }
    }
}

impl IndependenceTest for DSeparationOracle {
    fn fit(
        &mut self,
        treatment: &[&str],
        outcome: &str,
        conditioning: &[&str],
        _data: &Table,
        _categorical_outcome: bool,
    ) -> Result<(), IndependenceError> {
        if treatment.len() != 1 {
            return Err(IndependenceError::FitFailed(format!(
                "oracle expects exactly one treatment variable, got {}",
                treatment.len()
            )));
        }
        let x = treatment[0];
        self.verdict = self
            .dag
            .all_simple_paths(x, outcome)
            .into_iter()
            .map(|p| Path::new(p, self.dag.as_graph()))
            .all(|p| p.is_dseparated(conditioning));
        Ok(())
    }

    fn is_independent(&self) -> bool {
        self.verdict
    }
}
