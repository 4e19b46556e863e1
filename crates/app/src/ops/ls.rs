use std::collections::{HashSet, VecDeque};

use clap::Args;

use client::api::file::ListFilesRequest;
use client::api::{ApiClient, ApiError};
use common::drive::{build_tree, locale_cmp, DrivePath, FileRecord, TreeNode};

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Folder to list (defaults to the root)
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Walk every subfolder and print the result as a tree
    #[arg(long)]
    pub tree: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = DrivePath::new(&self.path);

        let lines = if self.tree {
            let records = list_recursive(&ctx.client, &path).await?;
            let tree = build_tree(&records);
            let mut lines = Vec::new();
            render_tree(subtree(&tree, &path), 0, &mut lines);
            lines
        } else {
            let mut records = ctx.client.call(ListFilesRequest { path }).await?.files;
            records.sort_by(|a, b| {
                b.is_folder()
                    .cmp(&a.is_folder())
                    .then_with(|| locale_cmp(&a.name, &b.name))
            });
            records.iter().map(describe).collect()
        };

        if lines.is_empty() {
            Ok("No items found".to_string())
        } else {
            Ok(lines.join("\n"))
        }
    }
}

/// Every record at or below `root`, one listing call per folder
async fn list_recursive(client: &ApiClient, root: &DrivePath) -> Result<Vec<FileRecord>, ApiError> {
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(path) = queue.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }
        tracing::debug!("listing {}", path);
        let listed = client.call(ListFilesRequest { path: path.clone() }).await?;
        for record in listed.files {
            if record.is_folder() {
                queue.push_back(path.join(&record.name));
            }
            records.push(record);
        }
    }
    Ok(records)
}

/// Children of the folder at `path`, or nothing if the tree lacks it
fn subtree<'a>(tree: &'a [TreeNode], path: &DrivePath) -> &'a [TreeNode] {
    if path.is_root() {
        return tree;
    }
    let key = format!("dir-{}", path.as_str().trim_end_matches('/'));
    fn find<'a>(nodes: &'a [TreeNode], key: &str) -> Option<&'a TreeNode> {
        nodes.iter().find_map(|node| {
            if node.key == key {
                Some(node)
            } else {
                find(&node.children, key)
            }
        })
    }
    find(tree, &key).map(|node| node.children.as_slice()).unwrap_or(&[])
}

fn render_tree(nodes: &[TreeNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match &node.record {
            Some(record) => lines.push(format!("{}{}", indent, describe(record))),
            None => lines.push(format!("{}{}/", indent, node.label)),
        }
        render_tree(&node.children, depth + 1, lines);
    }
}

fn describe(record: &FileRecord) -> String {
    if record.is_folder() {
        format!("{}/", record.name)
    } else {
        format!("{} ({})", record.name, human_size(record.size))
    }
}

pub(crate) fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod test {
    use super::*;
    use common::drive::FOLDER_CONTENT_TYPE;

    fn record(id: i64, name: &str, path: &str, folder: bool, size: u64) -> FileRecord {
        FileRecord {
            id,
            name: name.to_string(),
            content_type: if folder {
                FOLDER_CONTENT_TYPE.to_string()
            } else {
                "text/plain".to_string()
            },
            size,
            oss_url: String::new(),
            created_at: String::new(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_render_tree_indents_children() {
        let records = vec![
            record(1, "readme.txt", "/", false, 2048),
            record(2, "docs", "/", true, 0),
            record(3, "a.txt", "/docs/", false, 10),
            // parent folder never listed as a record
            record(4, "b.txt", "/archive/", false, 0),
        ];
        let tree = build_tree(&records);
        let mut lines = Vec::new();
        render_tree(&tree, 0, &mut lines);
        assert_eq!(
            lines,
            vec![
                "archive/",
                "  b.txt (0 B)",
                "docs/",
                "  a.txt (10 B)",
                "readme.txt (2.0 KB)",
            ]
        );
    }

    #[test]
    fn test_subtree_lookup() {
        let records = vec![
            record(2, "docs", "/", true, 0),
            record(3, "a.txt", "/docs/", false, 10),
        ];
        let tree = build_tree(&records);
        let docs = subtree(&tree, &DrivePath::new("docs"));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].label, "a.txt");
        assert!(subtree(&tree, &DrivePath::new("missing")).is_empty());
        assert_eq!(subtree(&tree, &DrivePath::root()).len(), 1);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
