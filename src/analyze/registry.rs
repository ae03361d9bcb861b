//! Problem registration and dependency scheduling.
//!
//! Problems are registered into a `RegistryBuilder`, then frozen into a
//! `ProblemRegistry` whose order is computed once: every problem comes after
//! all problems named in its `after` and `ifnot` lists. Ties keep
//! registration order. A dependency cycle is a fatal configuration error.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::problem::{Problem, PLACEHOLDER_RE};
use crate::error::RegistryError;

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    problems: Vec<Problem>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, problem: Problem) -> &mut Self {
        self.problems.push(problem);
        self
    }

    /// Validate the registered problems and compute their run order.
    pub fn freeze(self) -> Result<ProblemRegistry, RegistryError> {
        let mut index: HashMap<&'static str, usize> = HashMap::new();
        for (i, problem) in self.problems.iter().enumerate() {
            if index.insert(problem.code, i).is_some() {
                return Err(RegistryError::DuplicateCode(problem.code.to_string()));
            }
        }
        for problem in &self.problems {
            for dependency in problem.after.iter().chain(&problem.ifnot) {
                if !index.contains_key(dependency) {
                    return Err(RegistryError::UnknownDependency {
                        problem: problem.code.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
            check_templates(problem)?;
        }

        let order = schedule(&self.problems, &index)?;
        let mut slots: Vec<Option<Problem>> = self.problems.into_iter().map(Some).collect();
        let problems: Vec<Problem> = order.iter().filter_map(|&i| slots[i].take()).collect();
        let index = problems
            .iter()
            .enumerate()
            .map(|(i, p)| (p.code, i))
            .collect();
        Ok(ProblemRegistry { problems, index })
    }
}

fn check_templates(problem: &Problem) -> Result<(), RegistryError> {
    let responds = problem
        .default_actions
        .contains(&crate::config::ProblemAction::Respond);
    if responds && !problem.templates().iter().any(|(v, _)| v.is_empty()) {
        return Err(RegistryError::MissingTemplate {
            problem: problem.code.to_string(),
            variant: String::new(),
        });
    }
    for (_, template) in problem.templates() {
        for caps in PLACEHOLDER_RE.captures_iter(template) {
            if !problem.has_variable(&caps[1]) {
                return Err(RegistryError::UnknownVariable {
                    problem: problem.code.to_string(),
                    variable: caps[1].to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm over the `after` and `ifnot` edges. Among problems that
/// are ready, the earliest registered goes first.
fn schedule(problems: &[Problem], index: &HashMap<&'static str, usize>) -> Result<Vec<usize>, RegistryError> {
    let mut pending = vec![0usize; problems.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); problems.len()];
    for (i, problem) in problems.iter().enumerate() {
        let mut predecessors: Vec<usize> = problem
            .after
            .iter()
            .chain(&problem.ifnot)
            .filter_map(|code| index.get(code).copied())
            .collect();
        predecessors.sort_unstable();
        predecessors.dedup();
        pending[i] = predecessors.len();
        for p in predecessors {
            dependents[p].push(i);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..problems.len())
        .filter(|&i| pending[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(problems.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &d in &dependents[i] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.push(Reverse(d));
            }
        }
    }

    if order.len() < problems.len() {
        let remaining = (0..problems.len())
            .filter(|&i| pending[i] > 0)
            .map(|i| problems[i].code.to_string())
            .collect();
        return Err(RegistryError::Cycle { remaining });
    }
    Ok(order)
}

/// The frozen set of problems, in run order. Shared read-only by all
/// concurrent analyses.
#[derive(Debug)]
pub struct ProblemRegistry {
    problems: Vec<Problem>,
    index: HashMap<&'static str, usize>,
}

impl ProblemRegistry {
    /// Problems in dependency order.
    pub fn ordered(&self) -> &[Problem] {
        &self.problems
    }

    pub fn get(&self, code: &str) -> Option<&Problem> {
        self.index.get(code).map(|&i| &self.problems[i])
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
