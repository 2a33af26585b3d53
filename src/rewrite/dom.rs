//! HTML text-node selection and in-place marking.
//!
//! # Responsibilities
//! - Walk the parsed document in document order
//! - Select text nodes eligible for word marking
//! - Re-serialize the mutated tree
//!
//! # Design Decisions
//! - Eligibility is a pure predicate over (node kind, parent tag); comments
//!   and doctypes never qualify, nor does text inside script, link, style or
//!   meta elements, where mutation would corrupt code or invisible metadata
//! - Serialization uses the standard html5ever entity-escaping policy

use scraper::node::Node;
use scraper::Html;

use crate::rewrite::marker::WordMarker;

/// Parent tags whose text is never human-visible prose.
const NON_CONTENT_PARENTS: [&str; 4] = ["script", "link", "style", "meta"];

/// True when a node is a text leaf eligible for word marking.
fn is_markable(node: &Node, parent_tag: Option<&str>) -> bool {
    // Comments, doctypes, elements and PIs all fail the text check.
    if !node.is_text() {
        return false;
    }
    match parent_tag {
        Some(tag) => !NON_CONTENT_PARENTS.contains(&tag),
        None => true,
    }
}

/// Parse `html`, mark every eligible text node, and re-serialize.
///
/// The doctype does not survive element-level serialization, so it is
/// re-emitted from the parsed tree when the source carried one.
pub fn mark_document(html: &str, marker: &WordMarker) -> String {
    let mut document = Html::parse_document(html);

    let eligible: Vec<_> = document
        .tree
        .root()
        .descendants()
        .filter(|node| {
            let parent_tag = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name().to_string()));
            is_markable(node.value(), parent_tag.as_deref())
        })
        .map(|node| node.id())
        .collect();

    for id in eligible {
        let Some(mut node) = document.tree.get_mut(id) else {
            continue;
        };
        if let Node::Text(text) = node.value() {
            let marked = marker.mark(&text.text);
            text.text = marked.as_str().into();
        }
    }

    let doctype = document
        .tree
        .root()
        .children()
        .find_map(|node| match node.value() {
            Node::Doctype(doctype) => Some(format!("<!DOCTYPE {}>", doctype.name())),
            _ => None,
        });

    let serialized = document.root_element().html();
    match doctype {
        Some(doctype) => format!("{}{}", doctype, serialized),
        None => serialized,
    }
}
