//! Mutation helpers over the kuchiki tree: text splitting, element wrapping
//! and DOM-style normalization of adjacent text nodes.

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::{Attribute, ExpandedName, NodeRef};

use crate::error::{FindError, Result};
use crate::fragment::Fragment;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Splits `fragment` at `offset` (in chars), `Text.splitText` style: the
/// fragment keeps `[0, offset)` and the returned sibling, inserted right
/// after it, holds the rest.
pub fn split_text(fragment: &Fragment, offset: usize) -> Result<Fragment> {
    let cell = fragment.node().as_text().ok_or(FindError::NotText)?;
    if fragment.parent().is_none() {
        return Err(fragment.detached());
    }
    let tail = {
        let mut text = cell.borrow_mut();
        let len = text.chars().count();
        if offset > len {
            return Err(FindError::SplitOutOfBounds {
                offset,
                len,
                content: text.clone(),
            });
        }
        let at = text
            .char_indices()
            .nth(offset)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        text.split_off(at)
    };
    let node = NodeRef::new_text(tail);
    fragment.node().insert_after(node.clone());
    Ok(Fragment::from_text_node(node))
}

pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
    let name = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag));
    let attributes = attributes.iter().map(|(name, value)| {
        (
            ExpandedName::new(Namespace::from(""), LocalName::from(*name)),
            Attribute {
                prefix: None,
                value: (*value).to_string(),
            },
        )
    });
    NodeRef::new_element(name, attributes)
}

/// Puts `wrapper` where `fragment` was and moves `fragment` into it.
pub fn wrap(fragment: &Fragment, wrapper: &NodeRef) -> Result<()> {
    if fragment.parent().is_none() {
        return Err(fragment.detached());
    }
    fragment.node().insert_before(wrapper.clone());
    wrapper.append(fragment.node().clone());
    Ok(())
}

/// Moves the children of `wrapper` to its position and detaches it.
/// Returns the former parent.
pub fn unwrap(wrapper: &NodeRef) -> Result<NodeRef> {
    let parent = wrapper.parent().ok_or_else(|| FindError::Detached {
        content: wrapper.text_contents(),
    })?;
    while let Some(child) = wrapper.first_child() {
        wrapper.insert_before(child);
    }
    wrapper.detach();
    Ok(parent)
}

/// Descendant elements of `root` named `tag` (case-insensitive), in
/// document order.
pub fn elements_by_tag(root: &NodeRef, tag: &str) -> Vec<NodeRef> {
    root.descendants()
        .filter(|node| {
            node.as_element()
                .is_some_and(|el| (*el.name.local).eq_ignore_ascii_case(tag))
        })
        .collect()
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    node.as_element().is_some_and(|el| {
        el.attributes
            .borrow()
            .get("class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    })
}

/// Merges every run of adjacent text children of `parent` into the first
/// node of the run. That node survives even when it is empty, so a fragment
/// split earlier gets its identity and full text back. Empty text children
/// with no text neighbour are dropped.
pub fn normalize_children(parent: &NodeRef) {
    let mut child = parent.first_child();
    while let Some(node) = child {
        child = node.next_sibling();
        let Some(text) = node.as_text() else {
            continue;
        };
        let mut merged = false;
        while let Some(sibling) = child.clone() {
            let Some(more) = sibling.as_text() else {
                break;
            };
            let more = more.borrow().clone();
            text.borrow_mut().push_str(&more);
            child = sibling.next_sibling();
            sibling.detach();
            merged = true;
        }
        if !merged && text.borrow().is_empty() {
            node.detach();
        }
    }
}

pub fn normalize(root: &NodeRef) {
    let parents: Vec<NodeRef> = root
        .inclusive_descendants()
        .filter(|node| node.as_text().is_none())
        .collect();
    for parent in parents {
        normalize_children(&parent);
    }
}

#[cfg(test)]
mod tests {
    use kuchiki::traits::*;

    use super::*;

    fn body(html: &str) -> NodeRef {
        let doc = kuchiki::parse_html().one(html.to_string());
        doc.select_first("body").unwrap().as_node().clone()
    }

    fn texts(parent: &NodeRef) -> Vec<String> {
        parent
            .children()
            .filter_map(|c| c.as_text().map(|t| t.borrow().clone()))
            .collect()
    }

    #[test]
    fn split_keeps_head_in_original_node() {
        let body = body("<p>foobar</p>");
        let p = body.first_child().unwrap();
        let fragment = Fragment::new(p.first_child().unwrap()).unwrap();
        let tail = split_text(&fragment, 2).unwrap();
        assert_eq!(fragment.text(), "fo");
        assert_eq!(tail.text(), "obar");
        assert_eq!(texts(&p), vec!["fo", "obar"]);
    }

    #[test]
    fn split_counts_chars() {
        let body = body("<p>ééé</p>");
        let fragment = Fragment::new(body.first_child().unwrap().first_child().unwrap()).unwrap();
        let tail = split_text(&fragment, 1).unwrap();
        assert_eq!(fragment.text(), "é");
        assert_eq!(tail.text(), "éé");
    }

    #[test]
    fn split_out_of_bounds_is_an_error() {
        let body = body("<p>abc</p>");
        let fragment = Fragment::new(body.first_child().unwrap().first_child().unwrap()).unwrap();
        let err = split_text(&fragment, 4).unwrap_err();
        assert!(matches!(
            err,
            FindError::SplitOutOfBounds { offset: 4, len: 3, .. }
        ));
    }

    #[test]
    fn split_detached_is_an_error() {
        let fragment = Fragment::new(NodeRef::new_text("loose")).unwrap();
        assert!(matches!(
            split_text(&fragment, 1),
            Err(FindError::Detached { .. })
        ));
    }

    #[test]
    fn normalize_merges_into_first_node() {
        let body = body("<p>foobar</p>");
        let p = body.first_child().unwrap();
        let fragment = Fragment::new(p.first_child().unwrap()).unwrap();
        let tail = split_text(&fragment, 3).unwrap();
        split_text(&tail, 0).unwrap();
        normalize_children(&p);
        assert_eq!(texts(&p), vec!["foobar"]);
        assert_eq!(p.first_child().unwrap(), *fragment.node());
    }

    #[test]
    fn normalize_keeps_empty_head_of_run() {
        let body = body("<p>foo</p>");
        let p = body.first_child().unwrap();
        let fragment = Fragment::new(p.first_child().unwrap()).unwrap();
        split_text(&fragment, 0).unwrap();
        assert_eq!(fragment.text(), "");
        normalize_children(&p);
        assert_eq!(fragment.text(), "foo");
        assert_eq!(p.children().count(), 1);
    }

    #[test]
    fn normalize_drops_lonely_empty_text() {
        let body = body("<p>a<b>x</b></p>");
        let p = body.first_child().unwrap();
        p.last_child().unwrap().insert_after(NodeRef::new_text(""));
        normalize(&body);
        assert_eq!(p.children().count(), 2);
    }

    #[test]
    fn wrap_then_unwrap_restores_position() {
        let body = body("<p>foo</p>");
        let p = body.first_child().unwrap();
        let fragment = Fragment::new(p.first_child().unwrap()).unwrap();
        let mark = new_element("mark", &[("class", "hit")]);
        wrap(&fragment, &mark).unwrap();
        assert_eq!(p.to_string(), r#"<p><mark class="hit">foo</mark></p>"#);
        assert!(has_class(&mark, "hit"));
        assert!(!has_class(&mark, "hi"));
        assert_eq!(elements_by_tag(&body, "MARK").len(), 1);
        let parent = unwrap(&mark).unwrap();
        assert_eq!(parent, p);
        assert_eq!(p.to_string(), "<p>foo</p>");
    }

    #[test]
    fn elements_by_tag_in_document_order() {
        let body = body("<mark>a</mark><p><MARK>b</MARK></p><i>c</i><mark>d</mark>");
        let found: Vec<String> = elements_by_tag(&body, "Mark")
            .iter()
            .map(|m| m.text_contents())
            .collect();
        assert_eq!(found, vec!["a", "b", "d"]);
        assert!(elements_by_tag(&body, "span").is_empty());
    }
}
