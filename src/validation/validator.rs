//! The validator that checks a causal DAG's independence implications
//! against observed data.

use std::collections::HashSet;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::graph::{CausalDag, Path};
use crate::independence::{IndependenceTest, Table};
use crate::sets;

/// One testable independence implication of a DAG: whether the graph claims
/// `treatment` and `outcome` are independent given `conditioning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implication {
    pub treatment: String,
    pub outcome: String,
    pub conditioning: Vec<String>,
    pub implied_independent: bool,
}

/// The outcome of checking every implication against data.
///
/// Buckets: `agreements` where graph and test concur; `weak_contradictions`
/// where the graph implied dependence but the test found none;
/// `strong_contradictions` where the graph implied independence but the test
/// found statistically significant dependence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub implications: Vec<Implication>,
    pub agreements: Vec<Implication>,
    pub weak_contradictions: Vec<Implication>,
    pub strong_contradictions: Vec<Implication>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} implications: {} agreements, {} weak contradictions, {} strong contradictions",
            self.implications.len(),
            self.agreements.len(),
            self.weak_contradictions.len(),
            self.strong_contradictions.len()
        )?;
        for imp in &self.strong_contradictions {
            writeln!(
                f,
                "  STRONG: graph implies {} _||_ {} | {:?}, test found dependence",
                imp.treatment, imp.outcome, imp.conditioning
            )?;
        }
        for imp in &self.weak_contradictions {
            writeln!(
                f,
                "  weak: graph implies {} and {} dependent given {:?}, test found none",
                imp.treatment, imp.outcome, imp.conditioning
            )?;
        }
        Ok(())
    }
}

/// Validates a user-provided causal DAG against data: enumerates every
/// (pair, conditioning set) implication the graph makes, tests each one, and
/// buckets agreements and contradictions.
///
/// Exhaustive by design (2^(n-2) subsets per pair) and intended for small
/// variable counts.
pub struct ImplicationValidator<'a, T: IndependenceTest> {
    dag: &'a CausalDag,
    test: T,
    categorical: HashSet<String>,
}

impl<'a, T: IndependenceTest> ImplicationValidator<'a, T> {
    pub fn new(dag: &'a CausalDag, test: T) -> Self {
        Self { dag, test, categorical: HashSet::new() }
    }

    /// Declares categorical variables; forwarded to the test whenever one of
    /// them is the outcome of an implication check.
    pub fn with_categorical<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical.extend(vars.into_iter().map(Into::into));
        self
    }

    pub fn validate(&mut self, data: &Table) -> Result<ValidationReport, ValidationError> {
        let implications = generate_implications(self.dag);
        let mut report = ValidationReport {
            implications: implications.clone(),
            ..ValidationReport::default()
        };

        for implication in implications {
            let conditioning: Vec<&str> =
                implication.conditioning.iter().map(String::as_str).collect();
            let categorical_outcome = self.categorical.contains(&implication.outcome);
            self.test
                .fit(
                    &[implication.treatment.as_str()],
                    &implication.outcome,
                    &conditioning,
                    data,
                    categorical_outcome,
                )
                .map_err(|source| ValidationError::Independence {
                    treatment: implication.treatment.clone(),
                    outcome: implication.outcome.clone(),
                    conditioning: implication.conditioning.clone(),
                    source,
                })?;
            let test_independent = self.test.is_independent();

            if test_independent == implication.implied_independent {
                report.agreements.push(implication);
            } else if test_independent {
                report.weak_contradictions.push(implication);
            } else {
                report.strong_contradictions.push(implication);
            }
        }
        Ok(report)
    }
}

/// Enumerates every testable implication of the DAG: for each unordered node
/// pair and each subset of the remaining nodes (empty set last), the pair is
/// implied independent when the subset d-separates every simple path between
/// them (vacuously true when no path exists).
///
/// Pure graph reads, so the per-pair work runs on the rayon pool; results
/// are collected in pair order to keep the output deterministic.
pub fn generate_implications(dag: &CausalDag) -> Vec<Implication> {
    let nodes: Vec<String> = dag.nodes().iter().map(|s| s.to_string()).collect();
    let node_pairs = sets::pairs(&nodes);

    let per_pair: Vec<Vec<Implication>> = node_pairs
        .par_iter()
        .map(|(a, b)| {
            let paths: Vec<Path> = dag
                .all_simple_paths(a, b)
                .into_iter()
                .map(|p| Path::new(p, dag.as_graph()))
                .collect();
            let others: Vec<String> = nodes
                .iter()
                .filter(|n| n.as_str() != a.as_str() && n.as_str() != b.as_str())
                .cloned()
                .collect();

            sets::all_possible_sets(&others, None, true)
                .into_iter()
                .map(|z| {
                    let implied_independent = paths.iter().all(|p| p.is_dseparated(&z));
                    Implication {
                        treatment: a.clone(),
                        outcome: b.clone(),
                        conditioning: z,
                        implied_independent,
                    }
                })
                .collect()
        })
        .collect();

    per_pair.into_iter().flatten().collect()
}
