use super::types::{ChildId, WadBox, WadCoord, WadNode};
use std::ops::ControlFlow;

const LEAF_BIT: ChildId = 0x8000;

/// A decoded child reference of a BSP node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    /// Index into the level's nodes.
    Node(usize),
    /// Index into the level's subsectors.
    Leaf(usize),
}

impl Child {
    pub fn from_wad(id: ChildId) -> Child {
        if id & LEAF_BIT != 0 {
            Child::Leaf((id & !LEAF_BIT) as usize)
        } else {
            Child::Node(id as usize)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

/// An infinite splitting line through `(x, y)` along `(dx, dy)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub x: WadCoord,
    pub y: WadCoord,
    pub dx: WadCoord,
    pub dy: WadCoord,
}

impl Partition {
    /// Points on the line itself are on the back side.
    pub fn side_of(&self, x: i32, y: i32) -> Side {
        let rel_x = i64::from(x) - i64::from(self.x);
        let rel_y = i64::from(y) - i64::from(self.y);
        let cross = rel_x * i64::from(self.dy) - rel_y * i64::from(self.dx);
        if cross <= 0 {
            Side::Back
        } else {
            Side::Front
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BspNode {
    pub partition: Partition,
    pub front_box: WadBox,
    pub back_box: WadBox,
    pub front: Child,
    pub back: Child,
}

impl BspNode {
    pub fn from_wad(node: &WadNode) -> BspNode {
        BspNode {
            partition: Partition {
                x: node.line_x,
                y: node.line_y,
                dx: node.step_x,
                dy: node.step_y,
            },
            front_box: node.front_box,
            back_box: node.back_box,
            front: Child::from_wad(node.front),
            back: Child::from_wad(node.back),
        }
    }

    pub fn side_of(&self, x: i32, y: i32) -> Side {
        self.partition.side_of(x, y)
    }

    pub fn child(&self, side: Side) -> Child {
        match side {
            Side::Front => self.front,
            Side::Back => self.back,
        }
    }

    pub fn bounding_box(&self, side: Side) -> &WadBox {
        match side {
            Side::Front => &self.front_box,
            Side::Back => &self.back_box,
        }
    }
}

/// A view of a level's BSP, rooted at the last node.
///
/// Child references are trusted: `Level` checks them when loading, but a cycle in the node graph
/// would make the walks below loop forever.
#[derive(Copy, Clone, Debug)]
pub struct BspTree<'a> {
    nodes: &'a [BspNode],
}

impl<'a> BspTree<'a> {
    pub fn new(nodes: &'a [BspNode]) -> BspTree<'a> {
        BspTree { nodes }
    }

    /// The last node, or subsector 0 for a level that was never split.
    pub fn root(&self) -> Child {
        if self.nodes.is_empty() {
            Child::Leaf(0)
        } else {
            Child::Node(self.nodes.len() - 1)
        }
    }

    pub fn node(&self, index: usize) -> Option<&'a BspNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the subsector containing `(x, y)`.
    pub fn locate(&self, x: i32, y: i32) -> usize {
        let mut child = self.root();
        loop {
            match child {
                Child::Leaf(index) => return index,
                Child::Node(index) => {
                    let node = &self.nodes[index];
                    child = node.child(node.side_of(x, y));
                }
            }
        }
    }

    /// Visits every subsector, nearest to `(x, y)` first.
    ///
    /// Returns `ControlFlow::Break` if `visit` stopped the walk early.
    pub fn front_to_back<F>(&self, x: i32, y: i32, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(usize) -> ControlFlow<()>,
    {
        let mut stack = Vec::with_capacity(32);
        stack.push(self.root());
        while let Some(child) = stack.pop() {
            match child {
                Child::Leaf(index) => visit(index)?,
                Child::Node(index) => {
                    let node = &self.nodes[index];
                    let (near, far) = match node.side_of(x, y) {
                        Side::Front => (node.front, node.back),
                        Side::Back => (node.back, node.front),
                    };
                    stack.push(far);
                    stack.push(near);
                }
            }
        }
        ControlFlow::Continue(())
    }
}
