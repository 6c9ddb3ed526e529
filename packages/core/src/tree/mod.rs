//! Tree construction and rendering
//!
//! - [`builder`] - Flat record list → forest of `TreeNode`s
//! - [`layout`] - Forest → positioned cards and connectors
//! - [`text`] - Forest → indented text outline
//!
//! Both renderers are pure functions of the forest they are given.

pub mod builder;
pub mod layout;
pub mod text;

pub use builder::{build_forest, build_forest_with, descendant_ids, BuildOptions, CyclePolicy};
pub use layout::{
    layout_forest, layout_forest_with, BlockLayout, CardPlacement, CardRole, Connector,
    ConnectorKind, ForestLayout, LayoutConfig, Point, Rect,
};
pub use text::{member_label, render_text, EMPTY_FOREST_MESSAGE};
