//! Level tree
//!
//! Levels form a binary tree: every level has one way up and up to two
//! staircases down (left/right). Child levels are generated lazily the
//! first time their staircase is taken and kept for backtracking.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::map::{Branch, Map};

/// Index of a level in the tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub usize);

/// One node of the tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelNode {
    pub id: LevelId,
    /// Id shown on the map overview
    pub display_id: u32,
    pub map: Map,
    pub parent: Option<LevelId>,
    pub left: Option<LevelId>,
    pub right: Option<LevelId>,
    /// Stairs exist on this side but the level below was never generated
    pub incomplete_left: bool,
    pub incomplete_right: bool,
}

/// Arena of all generated levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelTree {
    nodes: Vec<LevelNode>,
    display_pool: Vec<u32>,
    current: LevelId,
}

impl LevelTree {
    /// Create a tree rooted at the given level
    pub fn new(root: Map, rng: &mut impl Rng) -> Self {
        let mut display_pool: Vec<u32> = (1..100).collect();
        display_pool.shuffle(rng);
        let mut tree = Self {
            nodes: Vec::new(),
            display_pool,
            current: LevelId(0),
        };
        tree.push_node(root, None);
        tree.refresh_incomplete();
        tree
    }

    fn push_node(&mut self, map: Map, parent: Option<LevelId>) -> LevelId {
        let id = LevelId(self.nodes.len());
        let display_id = self
            .display_pool
            .pop()
            .unwrap_or(100 + self.nodes.len() as u32);
        self.nodes.push(LevelNode {
            id,
            display_id,
            map,
            parent,
            left: None,
            right: None,
            incomplete_left: false,
            incomplete_right: false,
        });
        id
    }

    /// Id the next attached level will get
    pub fn next_id(&self) -> LevelId {
        LevelId(self.nodes.len())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> LevelId {
        LevelId(0)
    }

    pub fn current(&self) -> LevelId {
        self.current
    }

    pub fn set_current(&mut self, id: LevelId) {
        if id.0 < self.nodes.len() {
            log::debug!("Current level {:?} -> {:?}", self.current, id);
            self.current = id;
        }
    }

    pub fn node(&self, id: LevelId) -> Option<&LevelNode> {
        self.nodes.get(id.0)
    }

    pub fn map(&self, id: LevelId) -> Option<&Map> {
        self.nodes.get(id.0).map(|n| &n.map)
    }

    pub fn map_mut(&mut self, id: LevelId) -> Option<&mut Map> {
        self.nodes.get_mut(id.0).map(|n| &mut n.map)
    }

    /// Map of the level the player is on. The tree always holds its root
    /// and `current` only ever points at an existing node.
    pub fn current_map(&self) -> &Map {
        &self.nodes[self.current.0].map
    }

    pub fn current_map_mut(&mut self) -> &mut Map {
        &mut self.nodes[self.current.0].map
    }

    pub fn nodes(&self) -> &[LevelNode] {
        &self.nodes
    }

    /// Child level through a down branch, if already generated
    pub fn child(&self, id: LevelId, branch: Branch) -> Option<LevelId> {
        let node = self.node(id)?;
        match branch {
            Branch::Left => node.left,
            Branch::Right => node.right,
            Branch::Up => node.parent,
        }
    }

    pub fn parent(&self, id: LevelId) -> Option<LevelId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Attach a freshly generated level below `parent` and link the stairs
    pub fn attach_child(&mut self, parent: LevelId, branch: Branch, mut map: Map) -> LevelId {
        let id = self.next_id();
        if let Some(up) = map.up.as_mut() {
            up.target = Some(parent);
        }
        self.push_node(map, Some(parent));

        if let Some(node) = self.nodes.get_mut(parent.0) {
            match branch {
                Branch::Left => node.left = Some(id),
                Branch::Right => node.right = Some(id),
                Branch::Up => {}
            }
            if let Some(stairs) = node.map.stairs_mut(branch) {
                stairs.target = Some(id);
            }
        }
        self.refresh_incomplete();
        log::info!(
            "Attached level {:?} (depth {}) below {:?} via {:?}",
            id,
            self.nodes[id.0].map.depth,
            parent,
            branch
        );
        id
    }

    /// Recompute the overview-only incomplete flags
    pub fn refresh_incomplete(&mut self) {
        for node in &mut self.nodes {
            node.incomplete_left = node.map.left.is_some() && node.left.is_none();
            node.incomplete_right = node.map.right.is_some() && node.right.is_none();
        }
    }

    /// Indented text view of the tree, current level marked with `*`
    pub fn overview(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.nodes.is_empty() {
            self.overview_node(self.root(), 0, "", &mut lines);
        }
        lines
    }

    fn overview_node(&self, id: LevelId, indent: usize, tag: &str, lines: &mut Vec<String>) {
        let Some(node) = self.node(id) else {
            return;
        };
        let marker = if id == self.current { "*" } else { "" };
        lines.push(format!(
            "{}{}[{}]{} depth {}",
            "  ".repeat(indent),
            tag,
            node.display_id,
            marker,
            node.map.depth
        ));
        for (child, incomplete, tag) in [
            (node.left, node.incomplete_left, "L "),
            (node.right, node.incomplete_right, "R "),
        ] {
            if let Some(child) = child {
                self.overview_node(child, indent + 1, tag, lines);
            } else if incomplete {
                lines.push(format!("{}{}?", "  ".repeat(indent + 1), tag));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Position;
    use crate::world::map::Stairs;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn map_with_stairs(depth: u32) -> Map {
        let mut map = Map::new(10, 10, depth);
        map.left = Some(Stairs::down(Position::new(2, 2), Branch::Left));
        map.right = Some(Stairs::down(Position::new(7, 7), Branch::Right));
        map
    }

    #[test]
    fn test_attach_links_both_ways() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = LevelTree::new(map_with_stairs(0), &mut rng);
        assert!(tree.node(tree.root()).map_or(false, |n| n.incomplete_left && n.incomplete_right));

        let mut child = map_with_stairs(1);
        child.up = Some(Stairs::up(Position::new(4, 4), Some(Position::new(2, 2))));
        let id = tree.attach_child(tree.root(), Branch::Left, child);

        assert_eq!(tree.child(tree.root(), Branch::Left), Some(id));
        assert_eq!(tree.parent(id), Some(tree.root()));
        assert_eq!(tree.map(tree.root()).and_then(|m| m.left.as_ref()).and_then(|s| s.target), Some(id));
        assert_eq!(tree.map(id).and_then(|m| m.up.as_ref()).and_then(|s| s.target), Some(tree.root()));

        let root = tree.node(tree.root()).map(|n| (n.incomplete_left, n.incomplete_right));
        assert_eq!(root, Some((false, true)));
    }

    #[test]
    fn test_display_ids_unique() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut tree = LevelTree::new(map_with_stairs(0), &mut rng);
        for _ in 0..10 {
            let parent = LevelId(tree.len() - 1);
            tree.attach_child(parent, Branch::Right, map_with_stairs(1));
        }
        let mut ids: Vec<u32> = tree.nodes().iter().map(|n| n.display_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn test_overview_marks_current() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = LevelTree::new(map_with_stairs(0), &mut rng);
        let id = tree.attach_child(tree.root(), Branch::Right, Map::new(5, 5, 1));
        tree.set_current(id);
        let lines = tree.overview();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("depth 0"));
        assert!(lines[1].trim_start().starts_with("L ?"));
        assert!(lines[2].contains("]* depth 1"));
    }
}
