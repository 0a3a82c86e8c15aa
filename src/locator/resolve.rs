//! Replay derived locators against an owned [`DomTree`].
//!
//! Only the grammar the derivers emit is understood: CSS paths made of
//! `tag`, `tag#id` and `tag:nth-of-type(n)` segments joined by `" > "`, and
//! XPaths starting with `//tag[@id="v"]` or `/html/body` followed by
//! `/tag[n]` steps.

use crate::dom::{DomNode, DomTree, TreeNode};
use crate::error::{InspectorError, Result};
use crate::locator::Locator;
use serde::{Deserialize, Serialize};

const NTH_OF_TYPE: &str = ":nth-of-type(";

#[derive(Debug, PartialEq)]
struct CssSegment {
    tag: String,
    id: Option<String>,
    nth: Option<usize>,
}

impl CssSegment {
    fn parse(locator: &str, raw: &str) -> Result<Self> {
        let (tag, id, nth) = if let Some((tag, id)) = raw.split_once('#') {
            if id.is_empty() {
                return Err(InspectorError::invalid_locator(locator, format!("empty id in '{}'", raw)));
            }
            (tag, Some(id.to_string()), None)
        } else if let Some((tag, rest)) = raw.split_once(NTH_OF_TYPE) {
            let n = rest
                .strip_suffix(')')
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&n| n >= 1)
                .ok_or_else(|| InspectorError::invalid_locator(locator, format!("bad nth-of-type in '{}'", raw)))?;
            (tag, None, Some(n))
        } else {
            (raw, None, None)
        };

        if tag.is_empty() || tag.contains(char::is_whitespace) {
            return Err(InspectorError::invalid_locator(locator, format!("bad tag in '{}'", raw)));
        }

        Ok(Self {
            tag: tag.to_lowercase(),
            id,
            nth,
        })
    }

    fn matches(&self, node: &TreeNode<'_>) -> bool {
        if !node.is_element() || node.tag_name().to_lowercase() != self.tag {
            return false;
        }
        if let Some(id) = &self.id {
            if node.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        match self.nth {
            Some(n) => position_of_type(node) == n,
            None => true,
        }
    }
}

/// 1-based position among element siblings with the same lowercase tag
fn position_of_type(node: &TreeNode<'_>) -> usize {
    let tag = node.tag_name().to_lowercase();
    let mut position = 1;
    let mut sibling = node.previous_element_sibling();
    while let Some(sib) = sibling {
        if sib.tag_name().to_lowercase() == tag {
            position += 1;
        }
        sibling = sib.previous_element_sibling();
    }
    position
}

/// Return every element matched by a derived CSS path, in document order
pub fn resolve_css<'a>(tree: &'a DomTree, path: &str) -> Result<Vec<TreeNode<'a>>> {
    if path.trim().is_empty() {
        return Err(InspectorError::invalid_locator(path, "empty path"));
    }
    let segments = path
        .split(" > ")
        .map(|raw| CssSegment::parse(path, raw))
        .collect::<Result<Vec<_>>>()?;

    let Some((last, ancestors)) = segments.split_last() else {
        return Ok(Vec::new());
    };

    let matches = tree
        .elements()
        .filter(|candidate| {
            if !last.matches(candidate) {
                return false;
            }
            let mut current = *candidate;
            for segment in ancestors.iter().rev() {
                match current.parent() {
                    Some(parent) if segment.matches(&parent) => current = parent,
                    _ => return false,
                }
            }
            true
        })
        .collect();

    Ok(matches)
}

/// Return every element matched by a derived XPath, in document order
pub fn resolve_xpath<'a>(tree: &'a DomTree, xpath: &str) -> Result<Vec<TreeNode<'a>>> {
    let (mut context, steps) = if let Some(rest) = xpath.strip_prefix("//") {
        let (tag, rest) = rest
            .split_once("[@id=\"")
            .ok_or_else(|| InspectorError::invalid_locator(xpath, "expected //tag[@id=\"...\"]"))?;
        let (id, steps) = rest
            .split_once("\"]")
            .ok_or_else(|| InspectorError::invalid_locator(xpath, "unterminated id predicate"))?;

        let heads = tree
            .elements()
            .filter(|n| n.tag_name().eq_ignore_ascii_case(tag) && n.attribute("id") == Some(id))
            .collect::<Vec<_>>();
        (heads, steps)
    } else if let Some(steps) = xpath.strip_prefix("/html/body") {
        (tree.body().into_iter().collect(), steps)
    } else {
        return Err(InspectorError::invalid_locator(
            xpath,
            "expected //tag[@id=\"...\"] or /html/body",
        ));
    };

    if steps.is_empty() {
        return Ok(context);
    }
    let steps = steps
        .strip_prefix('/')
        .ok_or_else(|| InspectorError::invalid_locator(xpath, "steps must start with '/'"))?;

    for step in steps.split('/') {
        let (tag, n) = parse_step(xpath, step)?;
        context = context
            .iter()
            .filter_map(|parent| {
                parent
                    .element_children()
                    .into_iter()
                    .filter(|child| child.tag_name().eq_ignore_ascii_case(tag))
                    .nth(n - 1)
            })
            .collect();
    }

    Ok(context)
}

fn parse_step<'s>(xpath: &str, step: &'s str) -> Result<(&'s str, usize)> {
    let (tag, index) = step
        .strip_suffix(']')
        .and_then(|s| s.split_once('['))
        .ok_or_else(|| InspectorError::invalid_locator(xpath, format!("expected tag[n] in '{}'", step)))?;
    let n = index
        .parse::<usize>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| InspectorError::invalid_locator(xpath, format!("bad index in '{}'", step)))?;
    if tag.is_empty() {
        return Err(InspectorError::invalid_locator(xpath, format!("missing tag in '{}'", step)));
    }
    Ok((tag, n))
}

/// A derived locator together with how many elements each form matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedElement {
    #[serde(flatten)]
    pub locator: Locator,
    pub css_matches: usize,
    pub xpath_matches: usize,
}

impl LocatedElement {
    /// Replay both forms of `locator` against `tree`
    pub fn replay(tree: &DomTree, locator: Locator) -> Result<Self> {
        let css_matches = resolve_css(tree, &locator.css)?.len();
        let xpath_matches = resolve_xpath(tree, &locator.xpath)?.len();
        Ok(Self {
            locator,
            css_matches,
            xpath_matches,
        })
    }

    /// Both forms select exactly one element
    pub fn is_unique(&self) -> bool {
        self.css_matches == 1 && self.xpath_matches == 1
    }
}

/// Derive and replay locators for every picked element of `tree`.
///
/// Elements whose XPath cannot be derived are skipped. A derived form that
/// falls outside the replay grammar (an id containing `"]` or `" > "`) is
/// kept with 0 matches.
pub fn locate_picked(tree: &DomTree) -> Vec<LocatedElement> {
    let mut located = Vec::new();
    for element in tree.picked() {
        let locator = match Locator::derive(&element) {
            Ok(locator) => locator,
            Err(e) => {
                log::warn!("Skipping <{}>: {}", element.tag_name().to_lowercase(), e);
                continue;
            }
        };
        let css_matches = count_matches(resolve_css(tree, &locator.css));
        let xpath_matches = count_matches(resolve_xpath(tree, &locator.xpath));
        located.push(LocatedElement {
            locator,
            css_matches,
            xpath_matches,
        });
    }
    located
}

fn count_matches(resolved: Result<Vec<TreeNode<'_>>>) -> usize {
    match resolved {
        Ok(nodes) => nodes.len(),
        Err(e) => {
            log::warn!("Cannot replay: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;

    fn create_test_tree() -> DomTree {
        DomTree::new(ElementNode::new("html").with_children(vec![
            ElementNode::new("head"),
            ElementNode::new("body").with_children(vec![
                ElementNode::new("div").with_id("x").with_children(vec![
                    ElementNode::new("p").with_children(vec![ElementNode::text("a")]),
                    ElementNode::new("p").with_children(vec![ElementNode::text("b")]),
                ]),
                ElementNode::new("div").with_children(vec![ElementNode::new("p"), ElementNode::new("p")]),
            ]),
        ]))
    }

    #[test]
    fn test_segment_parsing() {
        assert_eq!(
            CssSegment::parse("p", "p:nth-of-type(3)").unwrap(),
            CssSegment {
                tag: "p".to_string(),
                id: None,
                nth: Some(3)
            }
        );
        assert_eq!(
            CssSegment::parse("DIV#x", "DIV#x").unwrap(),
            CssSegment {
                tag: "div".to_string(),
                id: Some("x".to_string()),
                nth: None
            }
        );
        assert!(CssSegment::parse("p:nth-of-type(0)", "p:nth-of-type(0)").is_err());
        assert!(CssSegment::parse("#x", "#x").is_err());
        assert!(CssSegment::parse("p#", "p#").is_err());
    }

    #[test]
    fn test_css_child_combinator() {
        let tree = create_test_tree();

        let matches = resolve_css(&tree, "div#x > p:nth-of-type(2)").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].child_nodes()[0].text_content(), Some("b"));

        // Without the id anchor both second paragraphs match
        assert_eq!(resolve_css(&tree, "div > p:nth-of-type(2)").unwrap().len(), 2);
        // A bare tag matches every element of that tag
        assert_eq!(resolve_css(&tree, "p").unwrap().len(), 4);
    }

    #[test]
    fn test_css_rejects_garbage() {
        let tree = create_test_tree();

        assert!(matches!(
            resolve_css(&tree, ""),
            Err(InspectorError::InvalidLocator { .. })
        ));
        assert!(resolve_css(&tree, "div >> p").is_err());
    }

    #[test]
    fn test_xpath_id_head_with_steps() {
        let tree = create_test_tree();

        let matches = resolve_xpath(&tree, r#"//div[@id="x"]/p[2]"#).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].child_nodes()[0].text_content(), Some("b"));

        assert_eq!(resolve_xpath(&tree, r#"//div[@id="x"]"#).unwrap().len(), 1);
        assert!(resolve_xpath(&tree, r#"//div[@id="missing"]"#).unwrap().is_empty());
    }

    #[test]
    fn test_xpath_body_head() {
        let tree = create_test_tree();

        let body = resolve_xpath(&tree, "/html/body").unwrap();
        assert_eq!(body, vec![tree.body().unwrap()]);

        let second_div_first_p = resolve_xpath(&tree, "/html/body/div[2]/p[1]").unwrap();
        assert_eq!(second_div_first_p.len(), 1);
        assert!(resolve_xpath(&tree, "/html/body/div[3]").unwrap().is_empty());
    }

    #[test]
    fn test_locate_picked() {
        let tree = DomTree::new(ElementNode::new("html").with_children(vec![
            ElementNode::new("head").picked(),
            ElementNode::new("body").with_children(vec![
                ElementNode::new("div").with_children(vec![ElementNode::new("p").picked()]),
                ElementNode::new("div").with_children(vec![ElementNode::new("p").picked()]),
            ]),
        ]));

        let located = locate_picked(&tree);
        assert_eq!(located.len(), 2);

        // The first div carries no qualifier, so its CSS path also matches the second div's <p>
        assert_eq!(located[0].locator, Locator::new("html > body > div > p", "/html/body/div[1]/p[1]"));
        assert_eq!(located[0].css_matches, 2);
        assert_eq!(located[0].xpath_matches, 1);
        assert!(!located[0].is_unique());

        assert_eq!(
            located[1].locator,
            Locator::new("html > body > div:nth-of-type(2) > p", "/html/body/div[2]/p[1]")
        );
        assert!(located[1].is_unique());
    }

    #[test]
    fn test_locate_picked_keeps_unreplayable_ids() {
        let tree = DomTree::new(ElementNode::new("html").with_children(vec![
            ElementNode::new("body").with_children(vec![
                ElementNode::new("p").picked(),
                ElementNode::new("div").with_id("a\"]b").picked(),
            ]),
        ]));

        let located = locate_picked(&tree);
        assert_eq!(located.len(), 2);

        assert_eq!(located[0].locator, Locator::new("html > body > p", "/html/body/p[1]"));
        assert!(located[0].is_unique());

        assert_eq!(located[1].locator, Locator::new("div#a\"]b", r#"//div[@id="a"]b"]"#));
        assert_eq!(located[1].css_matches, 1);
        assert_eq!(located[1].xpath_matches, 0);
        assert!(LocatedElement::replay(&tree, located[1].locator.clone()).is_err());
    }

    #[test]
    fn test_located_element_serializes_flat() {
        let located = LocatedElement {
            locator: Locator::new("p", "/html/body/p[1]"),
            css_matches: 3,
            xpath_matches: 1,
        };
        let value = serde_json::to_value(&located).unwrap();

        assert_eq!(value["css"], "p");
        assert_eq!(value["xpath"], "/html/body/p[1]");
        assert_eq!(value["css_matches"], 3);
        assert!(!located.is_unique());
    }

    #[test]
    fn test_xpath_rejects_garbage() {
        let tree = create_test_tree();

        assert!(resolve_xpath(&tree, "html/body").is_err());
        assert!(resolve_xpath(&tree, "/html/body/div").is_err());
        assert!(resolve_xpath(&tree, "/html/body/div[0]").is_err());
        assert!(resolve_xpath(&tree, "//div[@id=\"x").is_err());
        assert!(resolve_xpath(&tree, "/html/bodyx").is_err());
    }
}
