use crate::dom::DomNode;

/// Build an XPath expression for `element`.
///
/// An element with an id short-circuits to `//tag[@id="..."]` and the
/// document body to `/html/body`. Anything else is its parent's XPath plus
/// `/tag[n]`, where `n` is found by scanning the parent's child nodes: the
/// scan stops at the element itself (identity), and every earlier element
/// with the same raw tag name bumps the index.
///
/// Returns `None` when the element has no parent or is missing from its
/// parent's child list. For an element under `<body>` or under an ancestor
/// with an id this cannot happen; it does happen for `<html>`, `<head>` and
/// their descendants without ids, whose ancestry reaches the document.
pub fn xpath<N: DomNode>(element: &N) -> Option<String> {
    let tag = element.tag_name().to_lowercase();

    if let Some(id) = element.id() {
        return Some(format!("//{}[@id=\"{}\"]", tag, id));
    }
    if element.is_document_body() {
        return Some("/html/body".to_string());
    }

    let parent = element.parent()?;
    let raw_tag = element.tag_name();
    let mut ix = 0;
    for sibling in parent.child_nodes() {
        if sibling.is_same(element) {
            return xpath(&parent).map(|base| format!("{}/{}[{}]", base, tag, ix + 1));
        }
        if sibling.is_element() && sibling.tag_name() == raw_tag {
            ix += 1;
        }
    }
    None
}
