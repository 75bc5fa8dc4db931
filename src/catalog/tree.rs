//! Stock tree construction.
//!
//! Items are grouped by their `/`-separated category path into a tree.
//! Every node along an item's path lists the item's id, so a node's
//! `ids` is always the full set of items in its subtree.

use serde::Serialize;

/// One node of the stock tree.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub ids: Vec<i64>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ids: Vec::new(),
            children: Vec::new(),
        }
    }

    fn child_mut(&mut self, name: &str) -> &mut TreeNode {
        // Positional lookup keeps the borrow checker happy without a map.
        if let Some(index) = self.children.iter().position(|c| c.name == name) {
            &mut self.children[index]
        } else {
            self.children.push(TreeNode::new(name));
            let last = self.children.len() - 1;
            &mut self.children[last]
        }
    }
}

/// Build the stock tree from `(id, category)` pairs. Uncategorised items
/// land directly on the root.
pub fn build_tree(items: &[(i64, Option<String>)]) -> TreeNode {
    let mut root = TreeNode::new("stock");

    for (id, category) in items {
        let segments: Vec<&str> = category
            .as_deref()
            .unwrap_or("")
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            root.ids.push(*id);
            continue;
        }

        let mut node = &mut root;
        for segment in segments {
            node = node.child_mut(segment);
            node.ids.push(*id);
        }
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accumulate_along_path() {
        let items = vec![
            (1, Some("liquids/fruity".to_string())),
            (2, Some("liquids/menthol".to_string())),
            (3, Some("hardware".to_string())),
            (4, None),
        ];
        let tree = build_tree(&items);

        assert_eq!(tree.name, "stock");
        assert_eq!(tree.ids, vec![4]);
        assert_eq!(tree.children.len(), 2);

        let liquids = &tree.children[0];
        assert_eq!(liquids.name, "liquids");
        assert_eq!(liquids.ids, vec![1, 2]);
        assert_eq!(liquids.children.len(), 2);
        assert_eq!(liquids.children[0].name, "fruity");
        assert_eq!(liquids.children[0].ids, vec![1]);
        assert_eq!(liquids.children[1].name, "menthol");
        assert_eq!(liquids.children[1].ids, vec![2]);

        let hardware = &tree.children[1];
        assert_eq!(hardware.name, "hardware");
        assert_eq!(hardware.ids, vec![3]);
        assert!(hardware.children.is_empty());
    }

    #[test]
    fn test_shared_prefix_merges() {
        let items = vec![
            (1, Some("a/b".to_string())),
            (2, Some("a/c".to_string())),
            (3, Some("a/b".to_string())),
        ];
        let tree = build_tree(&items);
        assert_eq!(tree.children.len(), 1);
        let a = &tree.children[0];
        assert_eq!(a.ids, vec![1, 2, 3]);
        assert_eq!(a.children[0].ids, vec![1, 3]);
    }

    #[test]
    fn test_empty_segments_ignored() {
        let items = vec![(1, Some("/a//b/".to_string()))];
        let tree = build_tree(&items);
        assert_eq!(tree.children[0].name, "a");
        assert_eq!(tree.children[0].children[0].name, "b");
    }
}
