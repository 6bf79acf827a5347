//! Cluster aggregate of the two-edge connectivity structure.
//!
//! Every tree edge has a cover level: the highest level of a non-tree edge whose tree path goes
//! through it, or [`UNCOVERED`]. Two vertices belong to the same level-i component if the tree
//! path between them only has edges covered at level i or more.
//!
//! For each level i a cluster keeps how many vertices and level-i labels can be reached:
//! - `whole[i]`: from its path, when every edge of the path can be crossed;
//! - `top[t][i]`: entering at the top of the path, crossing path edges only if covered at t or
//!   more;
//! - `bot[t][i]`: the same entering at the bottom.
//!
//! Edges off the path are always crossed only if covered at i or more. Path thresholds are
//! kept for every t in -1..=L, so covering or uncovering the path is a shuffle of rows.

use std::ops::{Add, AddAssign, Range, SubAssign};

use derivative::Derivative;

use super::EdgeHandle;
use crate::top_tree::{Cluster, Element, SearchData, SearchDirection};

pub const UNCOVERED: i32 = -1;
/// Cover level of a segment without edges.
const NO_EDGES: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reach {
    pub size: usize,
    pub labels: usize,
}

impl Add for Reach {
    type Output = Reach;

    fn add(self, rhs: Reach) -> Reach {
        Reach {
            size: self.size + rhs.size,
            labels: self.labels + rhs.labels,
        }
    }
}

impl AddAssign for Reach {
    fn add_assign(&mut self, rhs: Reach) {
        *self = *self + rhs;
    }
}

impl SubAssign for Reach {
    fn sub_assign(&mut self, rhs: Reach) {
        self.size -= rhs.size;
        self.labels -= rhs.labels;
    }
}

fn hang_at(hang: &[Reach], i: usize) -> Reach {
    hang.get(i).copied().unwrap_or_default()
}

/// Non-tree edges incident to a vertex, by level.
#[derive(Debug, Clone)]
pub struct VertexLabel {
    pub(crate) labels: Vec<Vec<EdgeHandle>>,
}

impl VertexLabel {
    pub fn new(levels: usize) -> Self {
        Self {
            labels: vec![Vec::new(); levels],
        }
    }

    pub fn labels(&self, level: usize) -> &[EdgeHandle] {
        &self.labels[level]
    }
}

#[derive(Debug, Clone)]
pub struct TreeEdge {
    pub edge: EdgeHandle,
    pub cover: i32,
    /// Number of levels of the structure.
    pub levels: usize,
}

impl TreeEdge {
    pub fn new(edge: EdgeHandle, levels: usize) -> Self {
        Self {
            edge,
            cover: UNCOVERED,
            levels,
        }
    }
}

/// Uncovers edges covered at `uncover` or less, then covers all edges at `cover` or more.
/// -1 in either field does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverTag {
    uncover: i32,
    cover: i32,
}

impl Default for CoverTag {
    fn default() -> Self {
        Self {
            uncover: UNCOVERED,
            cover: UNCOVERED,
        }
    }
}

impl CoverTag {
    pub fn cover(level: usize) -> Self {
        Self {
            cover: level as i32,
            ..Self::default()
        }
    }

    pub fn uncover(level: usize) -> Self {
        Self {
            uncover: level as i32,
            ..Self::default()
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
#[derive(Clone)]
pub struct Coverage {
    /// Minimum cover level of the edges of the path.
    cover: i32,
    /// Some edge of the path with the minimum cover level.
    bridge: Option<EdgeHandle>,
    levels: usize,
    whole: Vec<Reach>,
    /// Row t + 1 holds the entries for path threshold t.
    #[derivative(Debug = "ignore")]
    top: Vec<Reach>,
    #[derivative(Debug = "ignore")]
    bot: Vec<Reach>,
}

impl Coverage {
    fn row(levels: usize, t: i32) -> Range<usize> {
        let start = (t + 1) as usize * levels;
        start..start + levels
    }

    fn top_at(&self, t: i32, i: usize) -> Reach {
        self.top[Self::row(self.levels, t).start + i]
    }

    /// Minimum cover level of the path, `i32::MAX` if it has no edges.
    pub fn cover_level(&self) -> i32 {
        self.cover
    }

    /// An edge of the path that no non-tree edge covers, if any.
    pub fn bridge(&self) -> Option<EdgeHandle> {
        if self.cover == UNCOVERED {
            self.bridge
        } else {
            None
        }
    }

    /// Vertices in the level-i component of the path.
    pub fn size(&self, level: usize) -> usize {
        self.whole[level].size
    }

    /// Labels of the given level in the level-i component of the path.
    pub fn labels(&self, level: usize) -> usize {
        self.whole[level].labels
    }

    /// Labels of the given level reachable from the top vertex, crossing only edges covered at
    /// that level or more.
    pub fn labels_from_top(&self, level: usize) -> usize {
        self.top_at(level as i32, level).labels
    }

    fn uncover(&mut self, level: i32) {
        if self.cover != NO_EDGES && self.cover <= level {
            self.cover = UNCOVERED;
        }
        let levels = self.levels;
        let max_t = levels as i32;
        for grid in [&mut self.top, &mut self.bot] {
            for t in 0..=max_t {
                let from = t.max(level + 1).min(max_t);
                if from != t {
                    grid.copy_within(Self::row(levels, from), Self::row(levels, t).start);
                }
            }
        }
    }

    fn cover(&mut self, level: i32) {
        if self.cover != NO_EDGES {
            self.cover = self.cover.max(level);
        }
        let levels = self.levels;
        for grid in [&mut self.top, &mut self.bot] {
            for t in 0..=level.min(levels as i32) {
                grid.copy_within(Self::row(levels, -1), Self::row(levels, t).start);
            }
        }
    }
}

impl Cluster for Coverage {
    type Vertex = VertexLabel;
    type Edge = TreeEdge;
    /// Indexed by level, missing entries are empty.
    type Hang = Vec<Reach>;
    type Tag = CoverTag;

    fn point(vertex: &VertexLabel, hang: &Vec<Reach>) -> Self {
        let levels = vertex.labels.len();
        let whole: Vec<Reach> = (0..levels)
            .map(|i| {
                Reach {
                    size: 1,
                    labels: vertex.labels[i].len(),
                } + hang_at(hang, i)
            })
            .collect();
        let top: Vec<Reach> = whole
            .iter()
            .copied()
            .cycle()
            .take((levels + 2) * levels)
            .collect();
        Self {
            cover: NO_EDGES,
            bridge: None,
            levels,
            whole,
            bot: top.clone(),
            top,
        }
    }

    fn leaf(edge: &TreeEdge, hang: &Vec<Reach>) -> Self {
        let levels = edge.levels;
        let whole: Vec<Reach> = (0..levels).map(|i| hang_at(hang, i)).collect();
        let mut top = Vec::with_capacity((levels + 2) * levels);
        for t in -1..=levels as i32 {
            if edge.cover >= t {
                top.extend_from_slice(&whole);
            } else {
                top.resize(top.len() + levels, Reach::default());
            }
        }
        Self {
            cover: edge.cover,
            bridge: Some(edge.edge),
            levels,
            whole,
            bot: top.clone(),
            top,
        }
    }

    fn merge(above: &Self, below: &Self) -> Self {
        let levels = above.levels;
        debug_assert_eq!(levels, below.levels);
        let (cover, bridge) = if above.cover <= below.cover {
            (above.cover, above.bridge)
        } else {
            (below.cover, below.bridge)
        };
        let whole = above
            .whole
            .iter()
            .zip(&below.whole)
            .map(|(&a, &b)| a + b)
            .collect();
        let mut top = above.top.clone();
        let mut bot = below.bot.clone();
        for t in -1..=levels as i32 {
            if above.cover >= t {
                for k in Self::row(levels, t) {
                    top[k] += below.top[k];
                }
            }
            if below.cover >= t {
                for k in Self::row(levels, t) {
                    bot[k] += above.bot[k];
                }
            }
        }
        Self {
            cover,
            bridge,
            levels,
            whole,
            top,
            bot,
        }
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.top, &mut self.bot);
    }

    fn rake(hang: &mut Vec<Reach>, child: &Self) {
        if hang.len() < child.levels {
            hang.resize(child.levels, Reach::default());
        }
        for (i, h) in hang.iter_mut().enumerate().take(child.levels) {
            *h += child.top_at(i as i32, i);
        }
    }

    fn unrake(hang: &mut Vec<Reach>, child: &Self) {
        for (i, h) in hang.iter_mut().enumerate().take(child.levels) {
            *h -= child.top_at(i as i32, i);
        }
    }

    fn hang_keys(&self) -> Vec<usize> {
        (0..self.levels)
            .filter(|&i| self.labels_from_top(i) > 0)
            .collect()
    }

    fn apply(&mut self, tag: &CoverTag) {
        if tag.uncover >= 0 {
            self.uncover(tag.uncover);
        }
        if tag.cover >= 0 {
            self.cover(tag.cover);
        }
    }

    fn apply_edge(edge: &mut TreeEdge, tag: &CoverTag) {
        if edge.cover <= tag.uncover {
            edge.cover = UNCOVERED;
        }
        edge.cover = edge.cover.max(tag.cover);
    }

    fn compose(tag: &mut CoverTag, next: &CoverTag) {
        // Uncovering is absorbed by a higher pending cover.
        if next.uncover >= 0 && tag.cover <= next.uncover {
            tag.uncover = tag.uncover.max(next.uncover);
            tag.cover = UNCOVERED;
        }
        tag.cover = tag.cover.max(next.cover);
    }

    fn is_identity(tag: &CoverTag) -> bool {
        tag.uncover < 0 && tag.cover < 0
    }
}

/// Search for a vertex holding a label of the given level, in the level component of the
/// exposed path. Closer to the top of the path first.
#[derive(Debug)]
pub(crate) struct LabelSearch {
    level: usize,
    /// Inside a hanging cluster, entered from its top.
    hanging: bool,
}

impl LabelSearch {
    pub fn new(level: usize) -> Self {
        Self {
            level,
            hanging: false,
        }
    }

    fn labels(&self, c: Option<&Coverage>) -> usize {
        c.map_or(0, |c| {
            if self.hanging {
                c.labels_from_top(self.level)
            } else {
                c.labels(self.level)
            }
        })
    }

    pub fn step(&mut self, s: SearchData<'_, Coverage>) -> SearchDirection {
        let level = self.level;
        if self.labels(s.left_agg) > 0 {
            return SearchDirection::Left;
        }
        if self.hanging && s.left_agg.is_some_and(|l| l.cover < level as i32) {
            return SearchDirection::NotFound;
        }
        let passable = match s.element {
            Element::Vertex(label) => {
                if !label.labels[level].is_empty() {
                    return SearchDirection::Found;
                }
                true
            }
            Element::Edge(edge) => !self.hanging || edge.cover >= level as i32,
        };
        if !passable {
            return SearchDirection::NotFound;
        }
        if hang_at(s.hang, level).labels > 0 {
            self.hanging = true;
            SearchDirection::Hanging(level)
        } else if self.labels(s.right_agg) > 0 {
            SearchDirection::Right
        } else {
            SearchDirection::NotFound
        }
    }
}
