use std::collections::{HashMap, HashSet, VecDeque};

use bstr::BString;
use svcs_hash::{hex, ObjectId};
use svcs_object::{Commit, Object};
use svcs_odb::ObjectStore;
use svcs_ref::RefStore;

use crate::node::{CommitNode, DagStatistics};
use crate::range::{CommitRange, TraversalOrder};
use crate::DagError;

/// The in-memory commit graph.
pub struct CommitDag {
    /// Node arena; edges are indices into this vector.
    nodes: Vec<CommitNode>,
    /// Lookup table: object id → arena index.
    by_oid: HashMap<ObjectId, usize>,
    /// Indices of nodes with no parents.
    roots: HashSet<usize>,
    /// Indices of nodes with no children.
    heads: HashSet<usize>,
    /// Branch tips captured at load time, for reference resolution.
    branch_tips: HashMap<String, ObjectId>,
}

impl CommitDag {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_oid: HashMap::new(),
            roots: HashSet::new(),
            heads: HashSet::new(),
            branch_tips: HashMap::new(),
        }
    }

    /// Build the graph by walking every branch tip transitively through
    /// parents.
    ///
    /// Insertion is parents-first so every edge resolves; re-encountering a
    /// known node stops the walk.
    pub fn load_from_repository(store: &ObjectStore, refs: &RefStore) -> Result<Self, DagError> {
        let mut dag = Self::new();
        let mut commit_cache: HashMap<ObjectId, Commit> = HashMap::new();

        for branch in refs.branch_list()? {
            dag.branch_tips.insert(branch.name.clone(), branch.oid);
            dag.load_walk(store, branch.oid, &mut commit_cache)?;
        }

        // A detached HEAD is a tip too.
        if let Some(oid) = refs.head_oid()? {
            dag.load_walk(store, oid, &mut commit_cache)?;
        }

        dag.recompute_depths();
        Ok(dag)
    }

    fn load_walk(
        &mut self,
        store: &ObjectStore,
        tip: ObjectId,
        cache: &mut HashMap<ObjectId, Commit>,
    ) -> Result<(), DagError> {
        let mut stack = vec![tip];

        while let Some(&oid) = stack.last() {
            if self.by_oid.contains_key(&oid) {
                stack.pop();
                continue;
            }

            if !cache.contains_key(&oid) {
                let commit = match store.read(&oid)? {
                    Object::Commit(c) => c,
                    _ => return Err(DagError::NotACommit(oid)),
                };
                cache.insert(oid, commit);
            }
            let commit = &cache[&oid];

            let missing: Vec<ObjectId> = commit
                .parents
                .iter()
                .filter(|p| !self.by_oid.contains_key(*p))
                .copied()
                .collect();

            if missing.is_empty() {
                let parents = commit.parents.clone();
                let author = format!("{} <{}>", commit.author.name, commit.author.email);
                let message = commit.message.clone();
                let when = commit.committer.when;
                self.add_commit(oid, message, author, when.seconds, when.tz_offset, &parents);
                stack.pop();
            } else {
                stack.extend(missing);
            }
        }

        Ok(())
    }

    /// Idempotent insert of a commit node.
    ///
    /// Links the node to every parent already present in the table; missing
    /// parents are not reified as placeholders. Maintains the roots set
    /// (no parents) and heads set (no children).
    pub fn add_commit(
        &mut self,
        oid: ObjectId,
        message: impl Into<BString>,
        author: impl Into<BString>,
        timestamp: i64,
        tz_offset: i32,
        parent_oids: &[ObjectId],
    ) {
        if self.by_oid.contains_key(&oid) {
            return;
        }

        let idx = self.nodes.len();
        let mut parents = Vec::new();
        for parent_oid in parent_oids {
            if let Some(&parent_idx) = self.by_oid.get(parent_oid) {
                parents.push(parent_idx);
            }
        }

        self.nodes.push(CommitNode {
            oid,
            message: message.into(),
            author: author.into(),
            timestamp,
            tz_offset,
            parents: parents.clone(),
            children: Vec::new(),
            depth: 0,
        });
        self.by_oid.insert(oid, idx);

        for &parent_idx in &parents {
            self.nodes[parent_idx].children.push(idx);
            // A parent gaining its first child leaves the heads set.
            self.heads.remove(&parent_idx);
        }

        if parents.is_empty() {
            self.roots.insert(idx);
        }
        self.heads.insert(idx);
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the graph empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the graph contains a commit.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.by_oid.contains_key(oid)
    }

    /// Get a node by id.
    pub fn get(&self, oid: &ObjectId) -> Option<&CommitNode> {
        self.by_oid.get(oid).map(|&idx| &self.nodes[idx])
    }

    /// Ids of root commits (no parents).
    pub fn roots(&self) -> Vec<ObjectId> {
        let mut oids: Vec<ObjectId> = self.roots.iter().map(|&i| self.nodes[i].oid).collect();
        oids.sort();
        oids
    }

    /// Ids of head commits (no children).
    pub fn heads(&self) -> Vec<ObjectId> {
        let mut oids: Vec<ObjectId> = self.heads.iter().map(|&i| self.nodes[i].oid).collect();
        oids.sort();
        oids
    }

    /// Recompute every node's depth: the shortest child-path distance from
    /// any root, via BFS over child edges.
    pub fn recompute_depths(&mut self) {
        let mut depths = vec![u32::MAX; self.nodes.len()];
        let mut queue: VecDeque<usize> = VecDeque::new();

        for &root in &self.roots {
            depths[root] = 0;
            queue.push_back(root);
        }

        while let Some(idx) = queue.pop_front() {
            let next_depth = depths[idx] + 1;
            let children = self.nodes[idx].children.clone();
            for child in children {
                if depths[child] == u32::MAX {
                    depths[child] = next_depth;
                    queue.push_back(child);
                }
            }
        }

        for (idx, depth) in depths.into_iter().enumerate() {
            self.nodes[idx].depth = if depth == u32::MAX { 0 } else { depth };
        }
    }

    /// Kahn's topological sort: parents always precede children.
    ///
    /// Zero-in-degree ties break by timestamp descending, then hex id
    /// ascending, for deterministic output.
    pub fn topological_sort(&self) -> Vec<&CommitNode> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.parents.len()).collect();
        let mut ready: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut result = Vec::with_capacity(self.nodes.len());

        while !ready.is_empty() {
            // Drain the best candidate: highest timestamp, then smallest hex.
            let best = (0..ready.len())
                .max_by(|&x, &y| {
                    let na = &self.nodes[ready[x]];
                    let nb = &self.nodes[ready[y]];
                    na.timestamp
                        .cmp(&nb.timestamp)
                        .then_with(|| nb.oid.cmp(&na.oid))
                })
                .unwrap();
            let idx = ready.swap_remove(best);
            result.push(&self.nodes[idx]);

            for &child in &self.nodes[idx].children {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.push(child);
                }
            }
        }

        result
    }

    /// All commits by timestamp descending, ties by hex id ascending.
    pub fn chronological_sort(&self) -> Vec<&CommitNode> {
        let mut result: Vec<&CommitNode> = self.nodes.iter().collect();
        result.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.oid.cmp(&b.oid))
        });
        result
    }

    /// Query commits per a [`CommitRange`]: filter merges if excluded, sort
    /// per the requested order, then truncate to `max_count`.
    pub fn commits_in_range(&self, range: &CommitRange) -> Vec<&CommitNode> {
        let sorted = match range.order {
            TraversalOrder::Chronological => self.chronological_sort(),
            TraversalOrder::Topological => self.topological_sort(),
        };

        let mut result: Vec<&CommitNode> = sorted
            .into_iter()
            .filter(|n| range.include_merges || !n.is_merge())
            .collect();

        if let Some(max) = range.max_count {
            result.truncate(max);
        }

        result
    }

    /// Resolve a commit reference string.
    ///
    /// Tries, in order: exact 64-hex id in the table, branch name, unique
    /// hex prefix. An ambiguous prefix is an error; no match is
    /// [`DagError::NotFound`].
    pub fn resolve_reference(&self, reference: &str) -> Result<&CommitNode, DagError> {
        if reference.len() == 64 && hex::is_hex(reference) {
            if let Ok(oid) = ObjectId::from_hex(reference) {
                if let Some(node) = self.get(&oid) {
                    return Ok(node);
                }
            }
        }

        if let Some(oid) = self.branch_tips.get(reference) {
            if let Some(node) = self.get(oid) {
                return Ok(node);
            }
        }

        if hex::is_hex(reference) && reference.len() >= 4 {
            let prefix = reference.to_ascii_lowercase();
            let matches: Vec<&CommitNode> = self
                .nodes
                .iter()
                .filter(|n| n.oid.to_hex().starts_with(&prefix))
                .collect();
            match matches.len() {
                1 => return Ok(matches[0]),
                0 => {}
                count => {
                    return Err(DagError::Ambiguous {
                        prefix,
                        count,
                    })
                }
            }
        }

        Err(DagError::NotFound(reference.to_string()))
    }

    /// Ancestors of a commit (excluding itself), BFS over parent edges.
    ///
    /// `max_depth` bounds the BFS distance; `None` walks to the roots.
    pub fn ancestors(
        &self,
        oid: &ObjectId,
        max_depth: Option<u32>,
    ) -> Result<Vec<&CommitNode>, DagError> {
        self.bfs_collect(oid, max_depth, |node| &node.parents)
    }

    /// Descendants of a commit (excluding itself), BFS over child edges.
    pub fn descendants(
        &self,
        oid: &ObjectId,
        max_depth: Option<u32>,
    ) -> Result<Vec<&CommitNode>, DagError> {
        self.bfs_collect(oid, max_depth, |node| &node.children)
    }

    fn bfs_collect(
        &self,
        oid: &ObjectId,
        max_depth: Option<u32>,
        edges: impl Fn(&CommitNode) -> &Vec<usize>,
    ) -> Result<Vec<&CommitNode>, DagError> {
        let &start = self
            .by_oid
            .get(oid)
            .ok_or_else(|| DagError::NotFound(oid.to_hex()))?;

        let mut visited = HashSet::from([start]);
        let mut queue: VecDeque<(usize, u32)> = VecDeque::from([(start, 0)]);
        let mut result = Vec::new();

        while let Some((idx, dist)) = queue.pop_front() {
            if let Some(max) = max_depth {
                if dist >= max {
                    continue;
                }
            }
            for &next in edges(&self.nodes[idx]) {
                if visited.insert(next) {
                    result.push(&self.nodes[next]);
                    queue.push_back((next, dist + 1));
                }
            }
        }

        Ok(result)
    }

    /// Is `ancestor` an ancestor of `descendant`? A commit is considered
    /// its own ancestor.
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool, DagError> {
        let &start = self
            .by_oid
            .get(descendant)
            .ok_or_else(|| DagError::NotFound(descendant.to_hex()))?;
        let &target = self
            .by_oid
            .get(ancestor)
            .ok_or_else(|| DagError::NotFound(ancestor.to_hex()))?;

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(idx) = queue.pop_front() {
            if idx == target {
                return Ok(true);
            }
            for &parent in &self.nodes[idx].parents {
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(false)
    }

    /// Find the merge base of two commits: collect the ancestor set of `a`
    /// (including `a`), then BFS from `b` over parent edges and return the
    /// first commit found in that set.
    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<&CommitNode, DagError> {
        let &a_idx = self
            .by_oid
            .get(a)
            .ok_or_else(|| DagError::NotFound(a.to_hex()))?;
        let &b_idx = self
            .by_oid
            .get(b)
            .ok_or_else(|| DagError::NotFound(b.to_hex()))?;

        let mut a_ancestors = HashSet::from([a_idx]);
        let mut queue = VecDeque::from([a_idx]);
        while let Some(idx) = queue.pop_front() {
            for &parent in &self.nodes[idx].parents {
                if a_ancestors.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        let mut visited = HashSet::from([b_idx]);
        let mut queue = VecDeque::from([b_idx]);
        while let Some(idx) = queue.pop_front() {
            if a_ancestors.contains(&idx) {
                return Ok(&self.nodes[idx]);
            }
            for &parent in &self.nodes[idx].parents {
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        Err(DagError::NoMergeBase(*a, *b))
    }

    /// Aggregate statistics over the loaded graph.
    pub fn statistics(&self) -> DagStatistics {
        let mut stats = DagStatistics {
            total_commits: self.nodes.len(),
            merge_commits: self.nodes.iter().filter(|n| n.is_merge()).count(),
            root_commits: self.roots.len(),
            head_commits: self.heads.len(),
            ..Default::default()
        };
        // Seed the timestamp extremes from the first node: any Unix second,
        // zero and negative included, is a legitimate commit time.
        if let Some(first) = self.nodes.first() {
            stats.earliest_commit = first.timestamp;
            stats.latest_commit = first.timestamp;
        }
        for node in &self.nodes {
            stats.max_depth = stats.max_depth.max(node.depth);
            stats.earliest_commit = stats.earliest_commit.min(node.timestamp);
            stats.latest_commit = stats.latest_commit.max(node.timestamp);
        }
        stats
    }
}

impl Default for CommitDag {
    fn default() -> Self {
        Self::new()
    }
}
