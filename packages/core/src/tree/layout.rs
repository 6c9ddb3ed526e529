//! Tree Layout
//!
//! Positions a forest on an integer grid: member cards, spouse cards and the
//! connectors between them. The layout consumes `TreeNode`s as given and never
//! re-derives relationships.
//!
//! # Geometry
//!
//! - A *unit* is a member card, optionally followed by a spouse connector and the
//!   spouse card, on one row
//! - A unit with children gets a vertical parent connector down to a bar row;
//!   with two or more children a horizontal sibling bar spans from the first to
//!   the last child's centre, and a tick drops from the bar to every child
//! - Children sit left to right on the next row band, each laid out recursively
//!   by the same rules; a subtree is as wide as the wider of its unit and its
//!   children row, and both are centred in it
//! - Each forest root becomes an independent block; blocks are stacked top to
//!   bottom in forest order, centred horizontally in the forest width
//!
//! Layout is a pure function: the same forest and config always produce the same
//! placements. Traversal is iterative (pre-order flatten, reverse pass to measure,
//! forward pass to place), so depth is bounded only by memory.

use crate::models::{Forest, PersonRecord, TreeNode};
use serde::{Deserialize, Serialize};

/// Distances used by the layout, in abstract pixels
///
/// Horizontal measures must be even so that centres land on whole units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub card_width: u32,
    pub card_height: u32,
    /// Length of the horizontal line between a member and their spouse
    pub spouse_connector: u32,
    /// Horizontal space between adjacent sibling subtrees
    pub sibling_gap: u32,
    /// Vertical line from the bottom of a unit to the sibling bar row
    pub parent_connector: u32,
    /// Tick from the sibling bar row down to each child card
    pub child_drop: u32,
    /// Vertical space between stacked root blocks
    pub root_gap: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 220,
            card_height: 120,
            spouse_connector: 32,
            sibling_gap: 48,
            parent_connector: 32,
            child_drop: 16,
            root_gap: 64,
        }
    }
}

impl LayoutConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.card_width == 0 || self.card_height == 0 {
            return Err("card dimensions must be greater than 0".to_string());
        }

        for (name, value) in [
            ("card_width", self.card_width),
            ("spouse_connector", self.spouse_connector),
            ("sibling_gap", self.sibling_gap),
        ] {
            if value % 2 != 0 {
                return Err(format!("{} must be even, got {}", name, value));
            }
        }

        Ok(())
    }

    fn unit_width(&self, node: &TreeNode) -> u32 {
        match node.spouse {
            Some(_) => self.card_width * 2 + self.spouse_connector,
            None => self.card_width,
        }
    }

    /// Vertical distance from the top of a unit to the top of its children row
    fn row_pitch(&self) -> u32 {
        self.card_height + self.parent_connector + self.child_drop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> u32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> u32 {
        self.y + self.height / 2
    }
}

/// Whether a card shows the placed member or the spouse next to them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardRole {
    Member,
    Spouse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlacement {
    pub member_id: String,
    pub name: String,
    pub rect: Rect,
    pub role: CardRole,
    /// Generation below the block's root (root is 0)
    pub depth: usize,
    /// Root marker; only the member card of a forest root carries it
    pub is_root: bool,
    /// Whether edit/delete actions are offered for this card
    pub editable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Horizontal line joining a member and their spouse
    Spouse,
    /// Vertical line from a unit down to its children's bar row
    Parent,
    /// Horizontal line across the children row (two or more children)
    SiblingBar,
    /// Vertical drop from the bar row to one child
    ChildTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub from: Point,
    pub to: Point,
}

impl Connector {
    fn new(kind: ConnectorKind, from: Point, to: Point) -> Self {
        Self { kind, from, to }
    }
}

/// Layout of one forest root and everything beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayout {
    pub root_id: String,
    pub bounds: Rect,
    pub cards: Vec<CardPlacement>,
    pub connectors: Vec<Connector>,
}

/// Positioned forest, blocks in forest order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestLayout {
    pub width: u32,
    pub height: u32,
    pub blocks: Vec<BlockLayout>,
}

impl ForestLayout {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardPlacement> {
        self.blocks.iter().flat_map(|block| block.cards.iter())
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.blocks.iter().flat_map(|block| block.connectors.iter())
    }

    /// Member card of the given record, if it was placed
    pub fn member_card(&self, member_id: &str) -> Option<&CardPlacement> {
        self.cards()
            .find(|card| card.role == CardRole::Member && card.member_id == member_id)
    }
}

/// Lay out a forest with no edit actions offered
pub fn layout_forest(forest: &Forest, config: &LayoutConfig) -> ForestLayout {
    layout_forest_with(forest, config, |_| false)
}

/// Lay out a forest, asking `can_edit` whether each card offers edit actions
///
/// The predicate is typically an edit policy bound to the current session.
pub fn layout_forest_with<F>(forest: &Forest, config: &LayoutConfig, can_edit: F) -> ForestLayout
where
    F: Fn(&PersonRecord) -> bool,
{
    let measured: Vec<Vec<Slot<'_>>> = forest
        .roots
        .iter()
        .map(|root| measure(root, config))
        .collect();

    let width = measured
        .iter()
        .filter_map(|slots| slots.first().map(|root| root.width))
        .max()
        .unwrap_or(0);

    let mut blocks = Vec::with_capacity(measured.len());
    let mut top = 0;
    for mut slots in measured {
        let (block_width, block_height) = match slots.first() {
            Some(root) => (root.width, root.height),
            None => continue,
        };
        if !blocks.is_empty() {
            top += config.root_gap;
        }
        let left = (width - block_width) / 2;

        blocks.push(place(&mut slots, left, top, config, &can_edit));
        top += block_height;
    }

    ForestLayout {
        width,
        height: top,
        blocks,
    }
}

/// One tree node during layout
struct Slot<'t> {
    node: &'t TreeNode,
    depth: usize,
    children: Vec<usize>,
    width: u32,
    height: u32,
    left: u32,
    top: u32,
}

/// Flatten a tree in pre-order and compute subtree sizes bottom-up
///
/// In pre-order every child follows its parent, so a reverse sweep sees all
/// children before the parent that needs their sizes.
fn measure<'t>(root: &'t TreeNode, config: &LayoutConfig) -> Vec<Slot<'t>> {
    let mut slots: Vec<Slot<'t>> = Vec::new();
    let mut stack: Vec<(&'t TreeNode, Option<usize>, usize)> = vec![(root, None, 0)];

    while let Some((node, parent, depth)) = stack.pop() {
        let index = slots.len();
        slots.push(Slot {
            node,
            depth,
            children: Vec::with_capacity(node.children.len()),
            width: 0,
            height: 0,
            left: 0,
            top: 0,
        });
        if let Some(parent) = parent {
            slots[parent].children.push(index);
        }
        for child in node.children.iter().rev() {
            stack.push((child, Some(index), depth + 1));
        }
    }

    for index in (0..slots.len()).rev() {
        let unit = config.unit_width(slots[index].node);
        let (row, tallest) = children_extent(&slots, &slots[index].children, config);

        let slot = &mut slots[index];
        slot.width = unit.max(row);
        slot.height = if slot.children.is_empty() {
            config.card_height
        } else {
            config.row_pitch() + tallest
        };
    }

    slots
}

/// Width of a children row and the height of its tallest subtree
fn children_extent(slots: &[Slot<'_>], children: &[usize], config: &LayoutConfig) -> (u32, u32) {
    if children.is_empty() {
        return (0, 0);
    }

    let widths: u32 = children.iter().map(|&c| slots[c].width).sum();
    let gaps = config.sibling_gap * (children.len() as u32 - 1);
    let tallest = children.iter().map(|&c| slots[c].height).max().unwrap_or(0);

    (widths + gaps, tallest)
}

/// Assign positions top-down and emit cards and connectors
fn place<F>(
    slots: &mut [Slot<'_>],
    left: u32,
    top: u32,
    config: &LayoutConfig,
    can_edit: &F,
) -> BlockLayout
where
    F: Fn(&PersonRecord) -> bool,
{
    let mut cards = Vec::new();
    let mut connectors = Vec::new();

    if let Some(root) = slots.first_mut() {
        root.left = left;
        root.top = top;
    }

    for index in 0..slots.len() {
        let slot = &slots[index];
        let node = slot.node;
        let center = slot.left + slot.width / 2;
        let unit_left = center - config.unit_width(node) / 2;
        let row_top = slot.top;

        let member_rect = Rect::new(unit_left, row_top, config.card_width, config.card_height);
        cards.push(CardPlacement {
            member_id: node.member.id.clone(),
            name: node.member.name.clone(),
            rect: member_rect,
            role: CardRole::Member,
            depth: slot.depth,
            is_root: slot.depth == 0,
            editable: can_edit(&node.member),
        });

        if let Some(spouse) = &node.spouse {
            let line_y = member_rect.center_y();
            let line_end = member_rect.right() + config.spouse_connector;
            connectors.push(Connector::new(
                ConnectorKind::Spouse,
                Point::new(member_rect.right(), line_y),
                Point::new(line_end, line_y),
            ));
            cards.push(CardPlacement {
                member_id: spouse.id.clone(),
                name: spouse.name.clone(),
                rect: Rect::new(line_end, row_top, config.card_width, config.card_height),
                role: CardRole::Spouse,
                depth: slot.depth,
                is_root: false,
                editable: can_edit(spouse),
            });
        }

        if slot.children.is_empty() {
            continue;
        }

        let bar_y = member_rect.bottom() + config.parent_connector;
        let child_top = row_top + config.row_pitch();
        connectors.push(Connector::new(
            ConnectorKind::Parent,
            Point::new(center, member_rect.bottom()),
            Point::new(center, bar_y),
        ));

        let children = slot.children.clone();
        let (row_width, _) = children_extent(slots, &children, config);
        let mut cursor = slots[index].left + (slots[index].width - row_width) / 2;
        let mut centers = Vec::with_capacity(children.len());

        for &child in &children {
            let child_slot = &mut slots[child];
            child_slot.left = cursor;
            child_slot.top = child_top;
            centers.push(cursor + child_slot.width / 2);
            cursor += child_slot.width + config.sibling_gap;
        }

        if let (Some(&first), Some(&last)) = (centers.first(), centers.last()) {
            if centers.len() > 1 {
                connectors.push(Connector::new(
                    ConnectorKind::SiblingBar,
                    Point::new(first, bar_y),
                    Point::new(last, bar_y),
                ));
            }
        }
        for x in centers {
            connectors.push(Connector::new(
                ConnectorKind::ChildTick,
                Point::new(x, bar_y),
                Point::new(x, child_top),
            ));
        }
    }

    let (root_id, bounds) = match slots.first() {
        Some(root) => (
            root.node.member.id.clone(),
            Rect::new(root.left, root.top, root.width, root.height),
        ),
        None => (String::new(), Rect::new(left, top, 0, 0)),
    };

    BlockLayout {
        root_id,
        bounds,
        cards,
        connectors,
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
