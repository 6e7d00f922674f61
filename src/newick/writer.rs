//! Writer for Newick strings with optional jplace edge-number tags.

use crate::tree::Tree;
use crate::tree::element::{LinkIndex, NodeIndex};

/// Characters that force a label to be quoted on output.
const QUOTE_TRIGGERS: &[char] =
    &['(', ')', ',', ':', ';', '{', '}', '[', ']', '\'', ' ', '\t', '\n', '\r'];

/// Controls whether branches carry `{N}` edge number tags in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewickFlavor {
    /// Plain Newick: labels and branch lengths only
    Plain,
    /// jplace reference tree style: every branch gets its `{N}` tag
    EdgeNums,
}

/// Serializes a tree to a Newick string terminated with `;`.
///
/// Children are written in the circular link order around each node, so a
/// parse/write round trip reproduces the input ordering. Labels containing
/// structural characters or whitespace are single-quoted with `''` escaping.
///
/// Returns `";"` for an empty tree.
///
/// # Example
/// ```
/// use phylomass::newick::{self, NewickFlavor};
///
/// let tree = newick::parse("((A:1,B:2):3,C:4);").unwrap();
/// assert_eq!(newick::write(&tree, NewickFlavor::Plain), "((A:1,B:2):3,C:4);");
/// ```
pub fn write(tree: &Tree, flavor: NewickFlavor) -> String {
    let mut out = String::new();
    if !tree.is_empty() {
        write_node(tree, tree.root_node().index(), None, flavor, &mut out);
    }
    out.push(';');
    out
}

/// Recursively writes one node; `entry` is the node's upward link, `None`
/// for the root.
fn write_node(
    tree: &Tree,
    node: NodeIndex,
    entry: Option<LinkIndex>,
    flavor: NewickFlavor,
    out: &mut String,
) {
    let children: Vec<LinkIndex> = tree
        .links_around(node)
        .map(|l| l.index())
        .filter(|&l| Some(l) != entry)
        .collect();

    if !children.is_empty() {
        out.push('(');
        for (i, link) in children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let down = tree.link(*link);
            let child = tree.link(down.outer()).node();
            write_node(tree, child, Some(down.outer()), flavor, out);

            let edge = tree.edge(down.edge());
            out.push(':');
            out.push_str(&format!("{}", *edge.branch_length()));
            if flavor == NewickFlavor::EdgeNums {
                out.push_str(&format!("{{{}}}", edge.edge_num()));
            }
        }
        out.push(')');
    }

    write_label(tree.node(node).name(), out);
}

/// Writes a label, quoting it if it contains structural characters.
fn write_label(label: &str, out: &mut String) {
    if label.is_empty() {
        return;
    }
    if label.contains(QUOTE_TRIGGERS) {
        out.push('\'');
        out.push_str(&label.replace('\'', "''"));
        out.push('\'');
    } else {
        out.push_str(label);
    }
}
