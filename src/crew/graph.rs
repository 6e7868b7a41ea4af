use super::task::{Task, TaskId};
use crate::error::PipelineError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A validated set of tasks whose prerequisites form a DAG.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    order: Vec<usize>,
}

impl TaskGraph {
    /// Validate the declared tasks and fix their execution order.
    ///
    /// Ready tasks run in declaration order, so a linear chain keeps the
    /// order it was declared in.
    pub fn new(tasks: Vec<Task>) -> Result<Self, PipelineError> {
        if tasks.is_empty() {
            return Err(PipelineError::EmptyGraph);
        }

        let index = validate_nodes(&tasks)?;
        validate_edges(&tasks, &index)?;
        let order = topological_order(&tasks, &index)?;

        Ok(Self { tasks, order })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn execution_order(&self) -> Vec<&Task> {
        self.order.iter().map(|&i| &self.tasks[i]).collect()
    }

    /// Last task in execution order; its output is the run's final result.
    pub fn final_task(&self) -> Option<&Task> {
        self.order.last().map(|&i| &self.tasks[i])
    }
}

fn validate_nodes(tasks: &[Task]) -> Result<HashMap<&TaskId, usize>, PipelineError> {
    let mut index = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if task.id.as_str().trim().is_empty() {
            return Err(PipelineError::InvalidGraph("task id cannot be empty".into()));
        }
        if index.insert(&task.id, i).is_some() {
            return Err(PipelineError::InvalidGraph(format!(
                "duplicate task id: {}",
                task.id
            )));
        }
    }
    Ok(index)
}

fn validate_edges(tasks: &[Task], index: &HashMap<&TaskId, usize>) -> Result<(), PipelineError> {
    for task in tasks {
        let mut seen = HashSet::new();
        for prerequisite in &task.prerequisites {
            if !index.contains_key(prerequisite) {
                let known = tasks
                    .iter()
                    .map(|t| t.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(PipelineError::InvalidGraph(format!(
                    "task {} depends on unknown task {prerequisite} (known tasks: [{known}])",
                    task.id
                )));
            }
            if prerequisite == &task.id {
                return Err(PipelineError::InvalidGraph(format!(
                    "cycle detected: {0} -> {0}",
                    task.id
                )));
            }
            if !seen.insert(prerequisite) {
                return Err(PipelineError::InvalidGraph(format!(
                    "duplicate prerequisite: {prerequisite} -> {}",
                    task.id
                )));
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm with the ready set keyed by declaration index.
fn topological_order(
    tasks: &[Task],
    index: &HashMap<&TaskId, usize>,
) -> Result<Vec<usize>, PipelineError> {
    let mut in_degree = vec![0_usize; tasks.len()];
    let mut dependents: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (i, task) in tasks.iter().enumerate() {
        for prerequisite in &task.prerequisites {
            let from = index[prerequisite];
            in_degree[i] += 1;
            dependents.entry(from).or_default().push(i);
        }
    }

    let mut ready = in_degree
        .iter()
        .enumerate()
        .filter_map(|(i, degree)| (*degree == 0).then_some(i))
        .collect::<BTreeSet<_>>();

    let mut order = Vec::with_capacity(tasks.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &next in dependents.get(&i).into_iter().flatten() {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() != tasks.len() {
        let path = find_cycle(tasks, index)
            .map(|ids| ids.join(" -> "))
            .unwrap_or_else(|| "unresolved prerequisites".to_string());
        return Err(PipelineError::InvalidGraph(format!("cycle detected: {path}")));
    }

    Ok(order)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Visiting,
    Visited,
}

fn find_cycle(tasks: &[Task], index: &HashMap<&TaskId, usize>) -> Option<Vec<String>> {
    let mut states = vec![None; tasks.len()];
    let mut stack = Vec::new();
    (0..tasks.len()).find_map(|start| {
        if states[start].is_some() {
            return None;
        }
        detect_cycle(start, tasks, index, &mut states, &mut stack)
    })
}

fn detect_cycle(
    node: usize,
    tasks: &[Task],
    index: &HashMap<&TaskId, usize>,
    states: &mut [Option<NodeState>],
    stack: &mut Vec<usize>,
) -> Option<Vec<String>> {
    states[node] = Some(NodeState::Visiting);
    stack.push(node);

    for prerequisite in &tasks[node].prerequisites {
        let next = index[prerequisite];
        match states[next] {
            Some(NodeState::Visiting) => {
                let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..]
                    .iter()
                    .map(|&n| tasks[n].id.to_string())
                    .collect();
                cycle.push(tasks[next].id.to_string());
                return Some(cycle);
            }
            Some(NodeState::Visited) => {}
            None => {
                if let Some(path) = detect_cycle(next, tasks, index, states, stack) {
                    return Some(path);
                }
            }
        }
    }

    stack.pop();
    states[node] = Some(NodeState::Visited);
    None
}
