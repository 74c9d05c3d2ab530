//! Squarified treemap layout with a slice-and-dice safety valve.

use crate::model::{Node, PositionedNode, Rect};

/// Row passes allowed per directory before giving up on squarified packing.
/// Pathological sibling sets (huge, steeply skewed) fall back to a
/// single-pass slice-and-dice split so the layout always terminates.
const MAX_ROW_PASSES: usize = 512;

/// Compute absolutely positioned rectangles for `node` and its subtree
/// inside `bounds`, proportional to aggregated sizes.
///
/// The result is pre-order (each node before its subtree), which is the
/// paint order for rendering and the order [`crate::search::filter_layout`]
/// relies on for its derived parent lookup. When `depth_limit` is reached,
/// a node keeps its own rectangle but its children are not placed.
///
/// Pure and reentrant: identical inputs produce identical rectangles.
pub fn layout<'a>(
    node: &'a Node,
    bounds: Rect,
    depth_limit: Option<usize>,
) -> Vec<PositionedNode<'a>> {
    let mut out = Vec::new();
    place(node, bounds, 0, None, depth_limit, &mut out);
    out
}

fn place<'a>(
    node: &'a Node,
    rect: Rect,
    depth: usize,
    parent: Option<&'a Node>,
    depth_limit: Option<usize>,
    out: &mut Vec<PositionedNode<'a>>,
) {
    out.push(PositionedNode {
        node,
        rect,
        depth,
        parent,
    });
    if node.children.is_empty() || node.size == 0 {
        return;
    }
    if let Some(limit) = depth_limit {
        if depth >= limit {
            return;
        }
    }

    let mut order: Vec<&Node> = node.children.iter().collect();
    order.sort_by(|a, b| b.size.cmp(&a.size));
    // Zero-size children get a guaranteed sliver of weight so they stay
    // clickable instead of vanishing.
    let weights: Vec<f64> = order.iter().map(|c| c.size.max(1) as f64).collect();
    let rects = partition(&weights, rect, depth, MAX_ROW_PASSES);
    for (child, child_rect) in order.into_iter().zip(rects) {
        place(child, child_rect, depth + 1, Some(node), depth_limit, out);
    }
}

/// Split `bounds` into one rectangle per weight, areas proportional to the
/// weights, using greedy squarified rows.
fn partition(weights: &[f64], bounds: Rect, depth: usize, max_passes: usize) -> Vec<Rect> {
    let total: f64 = weights.iter().sum();
    let scale = if total > 0.0 {
        bounds.area() / total
    } else {
        0.0
    };
    let areas: Vec<f64> = weights.iter().map(|w| w * scale).collect();

    let mut rects = vec![Rect::default(); areas.len()];
    let mut remaining = bounds;
    let mut start = 0;
    let mut passes = 0;
    while start < areas.len() {
        passes += 1;
        if passes > max_passes {
            slice_rects(
                &areas[start..],
                remaining,
                depth % 2 == 0,
                &mut rects[start..],
            );
            break;
        }
        let end = row_end(&areas, start, remaining.short_side());
        let row_total: f64 = areas[start..end].iter().sum();
        lay_row(&areas[start..end], row_total, &mut remaining, &mut rects[start..end]);
        start = end;
    }
    rects
}

/// Grow the row starting at `start` while the worst aspect ratio does not
/// get worse; returns one past the last member.
fn row_end(areas: &[f64], start: usize, short_side: f64) -> usize {
    let mut end = start + 1;
    let mut sum = areas[start];
    let mut min = areas[start];
    let mut max = areas[start];
    while end < areas.len() {
        let next = areas[end];
        let current = worst_ratio(short_side, max, min, sum);
        let extended = worst_ratio(short_side, max.max(next), min.min(next), sum + next);
        if extended > current {
            break;
        }
        sum += next;
        min = min.min(next);
        max = max.max(next);
        end += 1;
    }
    end
}

/// Worst aspect ratio of a candidate row against the shorter side of the
/// remaining rectangle; lower is more square.
fn worst_ratio(short_side: f64, max_area: f64, min_area: f64, total: f64) -> f64 {
    if total <= 0.0 || short_side <= 0.0 || min_area <= 0.0 {
        return f64::INFINITY;
    }
    let s2 = short_side * short_side;
    let t2 = total * total;
    (s2 * max_area / t2).max(t2 / (s2 * min_area))
}

/// Lay one closed row as a band along the remaining rectangle's longer
/// side, then shrink the remaining rectangle by the band's thickness.
fn lay_row(areas: &[f64], row_total: f64, remaining: &mut Rect, out: &mut [Rect]) {
    let horizontal = remaining.width >= remaining.height;
    let long_side = remaining.long_side();
    let thickness = if long_side > 0.0 {
        row_total / long_side
    } else {
        0.0
    };

    let mut offset = 0.0;
    for (slot, area) in out.iter_mut().zip(areas) {
        let extent = if thickness > 0.0 { area / thickness } else { 0.0 };
        *slot = if horizontal {
            Rect::new(remaining.x + offset, remaining.y, extent, thickness)
        } else {
            Rect::new(remaining.x, remaining.y + offset, thickness, extent)
        };
        offset += extent;
    }

    if horizontal {
        remaining.y += thickness;
        remaining.height = (remaining.height - thickness).max(0.0);
    } else {
        remaining.x += thickness;
        remaining.width = (remaining.width - thickness).max(0.0);
    }
}

/// Single-pass proportional split along one axis. Fallback only; keeps the
/// layout terminating on inputs the greedy packer handles badly.
fn slice_rects(areas: &[f64], bounds: Rect, horizontal: bool, out: &mut [Rect]) {
    let total: f64 = areas.iter().sum();
    let mut offset = 0.0;
    for (slot, area) in out.iter_mut().zip(areas) {
        let fraction = if total > 0.0 { area / total } else { 0.0 };
        *slot = if horizontal {
            let width = bounds.width * fraction;
            let r = Rect::new(bounds.x + offset, bounds.y, width, bounds.height);
            offset += width;
            r
        } else {
            let height = bounds.height * fraction;
            let r = Rect::new(bounds.x, bounds.y + offset, bounds.width, height);
            offset += height;
            r
        };
    }
}
