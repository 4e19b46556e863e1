use std::collections::HashMap;

use serde::Serialize;

use super::collate::locale_cmp;
use super::record::FileRecord;

/// Key of the synthetic root every tree hangs off
pub const ROOT_KEY: &str = "__root__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    // declaration order is display order
    Folder,
    File,
}

/// A node of the materialized drive tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// `dir-<path>` for folders, `file-<id>` for files
    pub key: String,
    pub label: String,
    pub kind: NodeKind,
    /// The backing record; synthesized folders have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<FileRecord>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

// Nodes live in an arena while the tree is assembled, since a directory
// can be reached both from its parent and from the path index.
struct Entry {
    key: String,
    label: String,
    kind: NodeKind,
    record: Option<FileRecord>,
    children: Vec<usize>,
}

struct Builder {
    nodes: Vec<Entry>,
    // normalized directory path -> arena index
    dirs: HashMap<String, usize>,
}

const ROOT: usize = 0;

impl Builder {
    fn new() -> Self {
        let root = Entry {
            key: ROOT_KEY.to_string(),
            label: "/".to_string(),
            kind: NodeKind::Folder,
            record: None,
            children: Vec::new(),
        };
        let mut dirs = HashMap::new();
        dirs.insert("/".to_string(), ROOT);
        Self {
            nodes: vec![root],
            dirs,
        }
    }

    fn push(&mut self, parent: usize, entry: Entry) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(entry);
        self.nodes[parent].children.push(idx);
        idx
    }

    /// Find or create the directory at `path`, creating missing ancestors
    fn ensure_dir(&mut self, path: &str) -> usize {
        let normalized = normalize_dir(path);
        if let Some(&idx) = self.dirs.get(&normalized) {
            return idx;
        }

        let mut current = ROOT;
        let mut current_path = String::new();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            current_path.push('/');
            current_path.push_str(segment);

            current = match self.dirs.get(&current_path) {
                Some(&idx) => idx,
                None => {
                    let entry = Entry {
                        key: format!("dir-{}", current_path),
                        label: segment.to_string(),
                        kind: NodeKind::Folder,
                        record: None,
                        children: Vec::new(),
                    };
                    let idx = self.push(current, entry);
                    self.dirs.insert(current_path.clone(), idx);
                    idx
                }
            };
        }
        current
    }

    fn add(&mut self, record: &FileRecord) {
        if record.is_folder() {
            let dir = self.ensure_dir(&join_dir(&record.path, &record.name));
            self.nodes[dir].record = Some(record.clone());
            return;
        }

        let parent = self.ensure_dir(&record.path);
        let key = format!("file-{}", record.id);
        let duplicate = self.nodes[parent]
            .children
            .iter()
            .any(|&child| self.nodes[child].key == key);
        if duplicate {
            tracing::debug!("skipping duplicate record {}", key);
            return;
        }

        self.push(
            parent,
            Entry {
                key,
                label: record.name.clone(),
                kind: NodeKind::File,
                record: Some(record.clone()),
                children: Vec::new(),
            },
        );
    }

    fn sort(&mut self, idx: usize) {
        let mut children = std::mem::take(&mut self.nodes[idx].children);
        children.sort_by(|&a, &b| {
            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            a.kind
                .cmp(&b.kind)
                .then_with(|| locale_cmp(&a.label, &b.label))
        });
        for &child in &children {
            self.sort(child);
        }
        self.nodes[idx].children = children;
    }

    fn materialize(&mut self, idx: usize) -> TreeNode {
        let children = std::mem::take(&mut self.nodes[idx].children);
        let children = children
            .into_iter()
            .map(|child| self.materialize(child))
            .collect();

        let entry = &mut self.nodes[idx];
        TreeNode {
            key: std::mem::take(&mut entry.key),
            label: std::mem::take(&mut entry.label),
            kind: entry.kind,
            record: entry.record.take(),
            children,
        }
    }
}

/// `/a/b` form used as the directory index key
fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn join_dir(parent: &str, name: &str) -> String {
    let parent = normalize_dir(parent);
    let segment = name.trim_end_matches('/');
    if parent == "/" {
        format!("/{}", segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}

/// Materialize a flat record list into an ordered tree
///
/// Returns the children of the synthetic root. Folder records attach to
/// the directory node for `path + name`; file records become leaves under
/// `path`. Any directory on the way that has no record of its own is
/// synthesized, once per path. Every level is sorted folders first, then
/// by label. The whole tree is rebuilt on each call.
pub fn build_tree(records: &[FileRecord]) -> Vec<TreeNode> {
    let mut builder = Builder::new();
    for record in records {
        builder.add(record);
    }
    builder.sort(ROOT);
    builder.materialize(ROOT).children
}

/// Every key in the tree, depth first, parents before their descendants
pub fn collect_keys(nodes: &[TreeNode]) -> Vec<String> {
    fn walk(nodes: &[TreeNode], keys: &mut Vec<String>) {
        for node in nodes {
            keys.push(node.key.clone());
            walk(&node.children, keys);
        }
    }

    let mut keys = Vec::new();
    walk(nodes, &mut keys);
    keys
}
