use crate::dom::DomNode;

/// Build a `" > "`-separated CSS selector path for `element`.
///
/// Walks parent links while the current node is an element. A node with an
/// id contributes `tag#id` and ends the walk; any other node contributes its
/// lowercase tag, qualified with `:nth-of-type(n)` when it is not the first
/// element of that tag among its siblings.
pub fn css_path<N: DomNode>(element: &N) -> String {
    let mut path = Vec::new();
    let mut current = Some(element.clone());

    while let Some(node) = current {
        if !node.is_element() {
            break;
        }

        let mut selector = node.tag_name().to_lowercase();
        if let Some(id) = node.id() {
            selector.push('#');
            selector.push_str(&id);
            path.push(selector);
            break;
        }

        let mut nth = 1;
        let mut sibling = node.previous_element_sibling();
        while let Some(sib) = sibling {
            if sib.tag_name().to_lowercase() == selector {
                nth += 1;
            }
            sibling = sib.previous_element_sibling();
        }
        if nth != 1 {
            selector.push_str(&format!(":nth-of-type({})", nth));
        }

        path.push(selector);
        current = node.parent();
    }

    path.reverse();
    path.join(" > ")
}
