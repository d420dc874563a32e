//! Dependency graph over columns.
//!
//! Edges run from a precedent column to the computed columns that read it,
//! possibly across tables when an expression aggregates over a relation.
//! Cycles are refused at registration time, so any recalculation walk over
//! the graph terminates.

use crate::table::{ColumnId, TableId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub table: TableId,
    pub column: ColumnId,
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// column -> columns its expression reads
    precedents: HashMap<ColumnKey, HashSet<ColumnKey>>,
    /// column -> computed columns that read it
    dependents: HashMap<ColumnKey, HashSet<ColumnKey>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// Would wiring `column` to read from `precedents` close a loop back
    /// to `column` itself?
    pub fn would_create_cycle(&self, column: ColumnKey, precedents: &HashSet<ColumnKey>) -> bool {
        if precedents.contains(&column) {
            return true;
        }
        // Walk downstream from `column`; reaching a proposed precedent
        // means that precedent already depends on `column`.
        let mut visited = HashSet::new();
        let mut queue: VecDeque<ColumnKey> = VecDeque::from([column]);
        while let Some(key) = queue.pop_front() {
            if !visited.insert(key) {
                continue;
            }
            if key != column && precedents.contains(&key) {
                return true;
            }
            if let Some(next) = self.dependents.get(&key) {
                queue.extend(next.iter().copied());
            }
        }
        false
    }

    /// Replace the precedent set of a computed column, rewiring the
    /// reverse edges. Callers check `would_create_cycle` first.
    pub fn register(&mut self, column: ColumnKey, precedents: HashSet<ColumnKey>) {
        self.unregister(column);
        for precedent in &precedents {
            self.dependents.entry(*precedent).or_default().insert(column);
        }
        self.precedents.insert(column, precedents);
    }

    pub fn unregister(&mut self, column: ColumnKey) {
        if let Some(old) = self.precedents.remove(&column) {
            for precedent in old {
                if let Some(set) = self.dependents.get_mut(&precedent) {
                    set.remove(&column);
                }
            }
        }
    }

    pub fn dependents_of(&self, column: ColumnKey) -> impl Iterator<Item = ColumnKey> + '_ {
        self.dependents.get(&column).into_iter().flatten().copied()
    }

    pub fn has_dependents(&self, column: ColumnKey) -> bool {
        self.dependents.get(&column).is_some_and(|s| !s.is_empty())
    }

    /// Every registered computed column, in a valid evaluation order.
    pub fn full_recalc_order(&self) -> Vec<ColumnKey> {
        let affected: HashSet<ColumnKey> = self.precedents.keys().copied().collect();
        self.topo_sort(affected)
    }

    /// The computed columns downstream of `changed`, ordered so each one
    /// appears after everything it reads. A changed column that is itself
    /// registered is included.
    pub fn recalc_order(&self, changed: &[ColumnKey]) -> Vec<ColumnKey> {
        let mut affected = HashSet::new();
        let mut queue: VecDeque<ColumnKey> = VecDeque::new();
        for key in changed {
            if self.precedents.contains_key(key) {
                affected.insert(*key);
            }
            queue.push_back(*key);
        }
        let mut visited = HashSet::new();
        while let Some(key) = queue.pop_front() {
            if !visited.insert(key) {
                continue;
            }
            for dependent in self.dependents_of(key) {
                affected.insert(dependent);
                queue.push_back(dependent);
            }
        }
        self.topo_sort(affected)
    }

    /// Kahn's algorithm over the affected subgraph, with ties broken by
    /// key order so recalculation is deterministic.
    fn topo_sort(&self, affected: HashSet<ColumnKey>) -> Vec<ColumnKey> {
        let mut in_degree: HashMap<ColumnKey, usize> = HashMap::new();
        for key in &affected {
            let degree = self
                .precedents
                .get(key)
                .map(|deps| deps.iter().filter(|d| affected.contains(d)).count())
                .unwrap_or(0);
            in_degree.insert(*key, degree);
        }

        let mut ready: BinaryHeap<Reverse<ColumnKey>> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(k, _)| Reverse(*k))
            .collect();

        let mut order = Vec::with_capacity(affected.len());
        while let Some(Reverse(key)) = ready.pop() {
            order.push(key);
            for dependent in self.dependents_of(key) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }
        order
    }
}
