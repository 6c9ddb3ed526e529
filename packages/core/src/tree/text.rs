//! Plain-text rendering of a forest for terminals and logs
//!
//! One line per unit, children indented under box-drawing branches, roots
//! separated by a blank line. Output depends only on the forest and `today`.

use crate::models::display::{age_on, format_short};
use crate::models::{Forest, PersonRecord, TreeNode};
use chrono::NaiveDate;

/// Shown for a successfully loaded forest with no members
pub const EMPTY_FOREST_MESSAGE: &str = "No family members yet";

const ROOT_MARKER: &str = "[root]";
const SPOUSE_JOIN: &str = " ── ";

/// Render the whole forest
pub fn render_text(forest: &Forest, today: NaiveDate) -> String {
    if forest.is_empty() {
        return format!("{}\n", EMPTY_FOREST_MESSAGE);
    }

    let blocks: Vec<String> = forest
        .roots
        .iter()
        .map(|root| render_block(root, today))
        .collect();
    blocks.join("\n")
}

/// Card text for one member: name, birth date, age and occupation
pub fn member_label(member: &PersonRecord, today: NaiveDate) -> String {
    let mut label = format!(
        "{} (b. {}, age {}",
        member.name,
        format_short(member.date_of_birth),
        age_on(member.date_of_birth, today)
    );
    if let Some(occupation) = &member.occupation {
        label.push_str(", ");
        label.push_str(occupation);
    }
    label.push(')');
    label
}

fn unit_label(node: &TreeNode, today: NaiveDate, is_root: bool) -> String {
    let mut line = member_label(&node.member, today);
    if is_root {
        line.push(' ');
        line.push_str(ROOT_MARKER);
    }
    if let Some(spouse) = &node.spouse {
        line.push_str(SPOUSE_JOIN);
        line.push_str(&member_label(spouse, today));
    }
    line
}

fn render_block(root: &TreeNode, today: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&unit_label(root, today, true));
    out.push('\n');

    // (node, indent for its branch, is last sibling)
    let mut stack: Vec<(&TreeNode, String, bool)> = Vec::new();
    push_children(&mut stack, root, String::new());

    while let Some((node, indent, last)) = stack.pop() {
        out.push_str(&indent);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&unit_label(node, today, false));
        out.push('\n');

        let child_indent = format!("{}{}", indent, if last { "    " } else { "│   " });
        push_children(&mut stack, node, child_indent);
    }

    out
}

fn push_children<'t>(stack: &mut Vec<(&'t TreeNode, String, bool)>, node: &'t TreeNode, indent: String) {
    let count = node.children.len();
    for (position, child) in node.children.iter().enumerate().rev() {
        stack.push((child, indent.clone(), position + 1 == count));
    }
}
