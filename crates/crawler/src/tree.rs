use std::collections::BTreeMap;

/// Bounds for [`render_directory_tree`] output.
#[derive(Debug, Clone, Copy)]
pub struct TreeLimits {
    pub max_items_per_level: usize,
    pub max_total_lines: usize,
    pub max_depth: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_items_per_level: 15,
            max_total_lines: 40,
            max_depth: 3,
        }
    }
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
    is_file: bool,
}

/// Render a bounded, deterministic directory-tree listing from relative
/// paths. Used verbatim in prompts and the index document, so the output
/// must be stable across runs.
#[must_use]
pub fn render_directory_tree(paths: &[&str], limits: TreeLimits) -> String {
    let mut root = TreeNode::default();
    for path in paths {
        let mut node = &mut root;
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        for (i, part) in parts.iter().enumerate() {
            node = node.children.entry((*part).to_string()).or_default();
            if i + 1 == parts.len() {
                node.is_file = true;
            }
        }
    }

    let mut lines = Vec::new();
    format_level(&root, "", 0, &limits, &mut lines);
    lines.truncate(limits.max_total_lines);
    lines.join("\n")
}

fn format_level(
    node: &TreeNode,
    prefix: &str,
    depth: usize,
    limits: &TreeLimits,
    lines: &mut Vec<String>,
) {
    if depth >= limits.max_depth {
        return;
    }

    let total = node.children.len();
    for (i, (name, child)) in node
        .children
        .iter()
        .take(limits.max_items_per_level)
        .enumerate()
    {
        let is_last = i + 1 == total.min(limits.max_items_per_level);
        let branch = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{branch}{name}"));

        if !child.children.is_empty() {
            let next_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            format_level(child, &next_prefix, depth + 1, limits, lines);
        }
    }

    if total > limits.max_items_per_level {
        lines.push(format!(
            "{prefix}... ({} more items)",
            total - limits.max_items_per_level
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_nested_tree() {
        let paths = ["src/main.rs", "src/lib.rs", "README.md"];
        let tree = render_directory_tree(&paths, TreeLimits::default());

        assert_eq!(
            tree,
            "├── README.md\n└── src\n    ├── lib.rs\n    └── main.rs"
        );
    }

    #[test]
    fn caps_items_per_level() {
        let paths = ["a.rs", "b.rs", "c.rs"];
        let limits = TreeLimits {
            max_items_per_level: 2,
            ..TreeLimits::default()
        };
        let tree = render_directory_tree(&paths, limits);

        assert!(tree.contains("... (1 more items)"));
    }

    #[test]
    fn is_deterministic() {
        let paths = ["b/z.rs", "a/y.rs", "a/x.rs"];
        let first = render_directory_tree(&paths, TreeLimits::default());
        let second = render_directory_tree(&paths, TreeLimits::default());
        assert_eq!(first, second);
    }
}
