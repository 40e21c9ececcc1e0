//! Independent sub-problems
//!
//! Two tasks interact only through workers eligible for both. Tasks are
//! joined whenever some worker has a variable on each, and every resulting
//! component can be searched on its own.

use linecrew_core::ConstraintModel;

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller index as root keeps component order stable
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Task index sets that share no worker, ordered by their first task
pub(crate) fn components(model: &ConstraintModel) -> Vec<Vec<usize>> {
    let task_count = model.tasks().len();
    let mut set = DisjointSet::new(task_count);

    for w in 0..model.workers().len() {
        let mut tasks = model
            .worker_vars(w)
            .iter()
            .map(|&var| model.candidates()[var].task);
        if let Some(first) = tasks.next() {
            for t in tasks {
                set.union(first, t);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slot_of_root = vec![usize::MAX; task_count];
    for t in 0..task_count {
        let root = set.find(t);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[root]].push(t);
    }
    groups
}
