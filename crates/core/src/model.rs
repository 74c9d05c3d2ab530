use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A filesystem entry in the scanned tree.
///
/// Directories own their children outright; there are no parent
/// back-pointers. Directory sizes are aggregates: at least the sum of the
/// children and at least the entry's own raw stat size. A tree is built once
/// per scan and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
    pub modified: DateTime<Utc>,
    /// Sorted descending by size after construction; ties keep scan order.
    pub children: Vec<Node>,
}

impl Node {
    /// Final path component, falling back to the whole path for roots like `/`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Pre-order traversal over this node and all of its descendants.
    pub fn iter_all(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find_by_path(&self, target: &Path) -> Option<&Node> {
        self.iter_all().find(|n| n.path == target)
    }
}

/// Axis-aligned rectangle used by the treemap layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Shrink by `padding` on every side, clamped to non-negative dimensions.
    pub fn inset(&self, padding: f64) -> Rect {
        Rect {
            x: self.x + padding,
            y: self.y + padding,
            width: (self.width - 2.0 * padding).max(0.0),
            height: (self.height - 2.0 * padding).max(0.0),
        }
    }
}

/// A node paired with its computed rectangle, produced by the layout engine.
///
/// Holds only references into an existing tree; a layout is derived fresh on
/// every draw. `parent` is the derived lookup used for ancestor walks, never
/// stored on [`Node`] itself.
#[derive(Debug, Clone, Copy)]
pub struct PositionedNode<'a> {
    pub node: &'a Node,
    pub rect: Rect,
    /// Root of the layout call is depth 0.
    pub depth: usize,
    pub parent: Option<&'a Node>,
}
