//! Logical drive layout
//!
//! The backend stores a flat list of records, each tagged with the folder
//! path it lives in. This module normalizes those paths and rebuilds the
//! folder hierarchy from them:
//!
//! ```text
//!  { path: "/",      name: "a.txt" }           docs/
//!  { path: "/docs/", name: "b.txt" }   ==>       b.txt
//!                                              a.txt
//! ```

mod collate;
mod path;
mod record;
mod tree;

pub use collate::locale_cmp;
pub use path::DrivePath;
pub use record::{FileRecord, FOLDER_CONTENT_TYPE};
pub use tree::{build_tree, collect_keys, NodeKind, TreeNode, ROOT_KEY};
