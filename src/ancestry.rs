//! Ancestry resolution: a process and its chain of parents.

use ahash::AHashSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{InspectError, Result};
use crate::process::{Process, ProcessTable};

/// How an ancestry walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestryEnd {
    /// The last process has parent id 0.
    Root,
    /// The parent of `pid` is not in the table.
    MissingParent { pid: u32, parent: u32 },
    /// Following the parent of `pid` would revisit a process.
    Cycle { pid: u32 },
}

/// A process followed by its successive parents, root last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestryChain {
    // Never empty: the first element is the starting process.
    processes: Vec<Process>,
    end: AncestryEnd,
}

impl AncestryChain {
    /// Processes in order, starting process first.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn pids(&self) -> Vec<u32> {
        self.processes.iter().map(|p| p.id).collect()
    }

    /// The process the chain was resolved from.
    pub fn process(&self) -> &Process {
        &self.processes[0]
    }

    /// The topmost ancestor that could be resolved.
    pub fn root(&self) -> &Process {
        &self.processes[self.processes.len() - 1]
    }

    pub fn end(&self) -> AncestryEnd {
        self.end
    }

    /// True when the walk reached a process without a parent.
    pub fn is_complete(&self) -> bool {
        self.end == AncestryEnd::Root
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Converts the chain into a nested child -> parent relation.
    pub fn into_relation(self) -> ProcessRelation {
        let mut ancestors = self.processes;
        let process = ancestors.remove(0);
        let parent = ancestors.into_iter().rev().fold(None, |parent, process| {
            Some(Box::new(ProcessRelation { process, parent }))
        });
        ProcessRelation { process, parent }
    }
}

/// A process linked to its parent, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRelation {
    pub process: Process,
    pub parent: Option<Box<ProcessRelation>>,
}

impl ProcessRelation {
    /// Depth of the relation, counting this process.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = &self.parent;
        while let Some(p) = current {
            depth += 1;
            current = &p.parent;
        }
        depth
    }
}

/// Resolves the ancestry of `pid` within `table`.
///
/// The walk ends at parent id 0, at a parent missing from the table, or when
/// a process would be visited twice. [`AncestryChain::end`] tells which.
pub fn resolve_ancestry(table: &ProcessTable, pid: u32) -> Result<AncestryChain> {
    let start = table.get(&pid).ok_or(InspectError::ProcessNotFound { pid })?;

    let mut processes = vec![start.clone()];
    let mut visited = AHashSet::new();
    visited.insert(pid);

    let mut current = start;
    let end = loop {
        let parent_id = current.parent_process;
        if parent_id == 0 {
            break AncestryEnd::Root;
        }
        let parent = match table.get(&parent_id) {
            Some(p) => p,
            None => {
                debug!("Ancestry of {} stops at unknown parent {}", pid, parent_id);
                break AncestryEnd::MissingParent {
                    pid: current.id,
                    parent: parent_id,
                };
            }
        };
        if !visited.insert(parent_id) {
            warn!("Cyclic parent link at {} while resolving {}", parent_id, pid);
            break AncestryEnd::Cycle { pid: current.id };
        }
        processes.push(parent.clone());
        current = parent;
    };

    Ok(AncestryChain { processes, end })
}

/// All processes whose command name equals `name`, ordered by pid.
pub fn find_processes_by_name<'a>(table: &'a ProcessTable, name: &str) -> Vec<&'a Process> {
    let mut found: Vec<&Process> = table.values().filter(|p| p.command_name == name).collect();
    found.sort_by_key(|p| p.id);
    found
}

/// Resolves the ancestry of the single process named `name`.
pub fn resolve_ancestry_by_name(table: &ProcessTable, name: &str) -> Result<AncestryChain> {
    match find_processes_by_name(table, name).as_slice() {
        [] => Err(InspectError::ProcessNameNotFound {
            name: name.to_string(),
        }),
        [only] => resolve_ancestry(table, only.id),
        many => Err(InspectError::AmbiguousProcessName {
            name: name.to_string(),
            pids: many.iter().map(|p| p.id).collect(),
        }),
    }
}
