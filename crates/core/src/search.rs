//! Search closure over a positioned layout.

use std::collections::{HashMap, HashSet};

use crate::model::{Node, PositionedNode};

/// Restrict `layout` to the closure of a case-insensitive substring query
/// over full paths: matches, every ancestor of a match, and every
/// descendant of a matching directory (to a fixed point, so directories
/// pulled in below a matching directory expand too).
///
/// An empty query returns the layout unchanged. The result is an
/// order-preserving subsequence of the input; the parent lookup is derived
/// from the layout itself.
pub fn filter_layout<'a>(
    layout: &[PositionedNode<'a>],
    query: &str,
) -> Vec<PositionedNode<'a>> {
    if query.is_empty() {
        return layout.to_vec();
    }
    let needle = query.to_lowercase();

    let parent_of: HashMap<*const Node, Option<&Node>> = layout
        .iter()
        .map(|p| (p.node as *const Node, p.parent))
        .collect();

    let matches: Vec<&Node> = layout
        .iter()
        .filter(|p| {
            p.node
                .path
                .to_string_lossy()
                .to_lowercase()
                .contains(&needle)
        })
        .map(|p| p.node)
        .collect();

    let mut included: HashSet<*const Node> =
        matches.iter().map(|n| *n as *const Node).collect();

    // Ancestors of matches give the partial view its context.
    for node in &matches {
        let mut cursor = parent_of.get(&(*node as *const Node)).copied().flatten();
        while let Some(parent) = cursor {
            if !included.insert(parent as *const Node) {
                break;
            }
            cursor = parent_of.get(&(parent as *const Node)).copied().flatten();
        }
    }

    // Descendants of matching directories, expanded to a fixed point.
    let mut expanded: HashSet<*const Node> = matches
        .iter()
        .filter(|n| n.is_dir)
        .map(|n| *n as *const Node)
        .collect();
    let mut changed = true;
    while changed {
        changed = false;
        for p in layout {
            let Some(parent) = p.parent else { continue };
            if !expanded.contains(&(parent as *const Node)) {
                continue;
            }
            let key = p.node as *const Node;
            if included.insert(key) {
                changed = true;
            }
            if p.node.is_dir && expanded.insert(key) {
                changed = true;
            }
        }
    }

    layout
        .iter()
        .filter(|p| included.contains(&(p.node as *const Node)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Rect};
    use crate::treemap::layout;
    use chrono::Utc;
    use std::path::PathBuf;

    fn leaf(name: &str, size: u64) -> Node {
        Node {
            path: PathBuf::from(name),
            size,
            is_dir: false,
            modified: Utc::now(),
            children: Vec::new(),
        }
    }

    fn branch(name: &str, children: Vec<Node>) -> Node {
        let size = children.iter().map(|c| c.size).sum();
        Node {
            path: PathBuf::from(name),
            size,
            is_dir: true,
            modified: Utc::now(),
            children,
        }
    }

    fn fixture() -> Node {
        branch(
            "/root",
            vec![
                branch(
                    "/root/photos",
                    vec![
                        leaf("/root/photos/cat.jpg", 60),
                        branch("/root/photos/trips", vec![leaf("/root/photos/trips/sea.jpg", 30)]),
                    ],
                ),
                branch("/root/docs", vec![leaf("/root/docs/cv.pdf", 20)]),
            ],
        )
    }

    fn names(tiles: &[PositionedNode]) -> Vec<String> {
        tiles.iter().map(|t| t.node.name()).collect()
    }

    #[test]
    fn empty_query_returns_input_unchanged() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let filtered = filter_layout(&tiles, "");
        assert_eq!(names(&tiles), names(&filtered));
    }

    #[test]
    fn match_pulls_in_all_ancestors() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let filtered = filter_layout(&tiles, "sea.jpg");
        let got = names(&filtered);
        assert!(got.contains(&"sea.jpg".to_string()));
        assert!(got.contains(&"trips".to_string()));
        assert!(got.contains(&"photos".to_string()));
        assert!(got.contains(&"root".to_string()));
        assert!(!got.contains(&"cv.pdf".to_string()));
    }

    #[test]
    fn matching_directory_includes_every_descendant() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let filtered = filter_layout(&tiles, "photos");
        let got = names(&filtered);
        assert!(got.contains(&"cat.jpg".to_string()));
        assert!(got.contains(&"trips".to_string()));
        assert!(got.contains(&"sea.jpg".to_string()));
        assert!(!got.contains(&"docs".to_string()));
    }

    #[test]
    fn query_is_case_insensitive() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let filtered = filter_layout(&tiles, "CAT.JPG");
        assert!(names(&filtered).contains(&"cat.jpg".to_string()));
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let filtered = filter_layout(&tiles, "jpg");
        let mut last = 0;
        for f in &filtered {
            let pos = tiles
                .iter()
                .position(|t| std::ptr::eq(t.node, f.node))
                .unwrap();
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn no_match_yields_empty_result() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        assert!(filter_layout(&tiles, "does-not-exist").is_empty());
    }

    #[test]
    fn filter_keeps_rectangles_intact() {
        let tree = fixture();
        let tiles = layout(&tree, Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let filtered = filter_layout(&tiles, "cv.pdf");
        for f in &filtered {
            let original = tiles
                .iter()
                .find(|t| std::ptr::eq(t.node, f.node))
                .unwrap();
            assert_eq!(original.rect, f.rect);
        }
    }
}
