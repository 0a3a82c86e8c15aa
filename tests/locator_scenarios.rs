use selector_inspector::dom::{DomNode, DomTree, ElementNode, NodeType, SnapshotNode};
use selector_inspector::locator::{css_path, resolve_css, resolve_xpath, xpath};
use selector_inspector::Locator;

fn document(body_children: Vec<ElementNode>) -> DomTree {
    DomTree::new(ElementNode::new("html").with_children(vec![
        ElementNode::new("head").with_children(vec![ElementNode::new("title").with_children(vec![
            ElementNode::text("Picker"),
        ])]),
        ElementNode::text("\n"),
        ElementNode::new("body").with_children(body_children),
    ]))
}

#[test]
fn test_second_paragraph_under_id() {
    let tree = document(vec![ElementNode::new("div").with_id("x").with_children(vec![
        ElementNode::new("p").with_children(vec![ElementNode::text("a")]),
        ElementNode::new("p").with_children(vec![ElementNode::text("b")]),
    ])]);
    let second = tree.find_by_id("x").unwrap().element_children()[1];

    let locator = Locator::derive(&second).unwrap();
    assert_eq!(locator.css, "div#x > p:nth-of-type(2)");
    assert_eq!(locator.xpath, r#"//div[@id="x"]/p[2]"#);
}

#[test]
fn test_id_three_levels_deep() {
    let tree = document(vec![ElementNode::new("main").with_children(vec![
        ElementNode::new("section").with_children(vec![
            ElementNode::new("article"),
            ElementNode::new("article").with_children(vec![ElementNode::new("span").with_id("foo")]),
        ]),
    ])]);
    let target = tree.find_by_id("foo").unwrap();

    let css = css_path(&target);
    assert!(css.ends_with("#foo"));
    assert!(!css.contains("nth-of-type"));
    assert!(!css.contains("article"), "ancestors above the id must not appear: {}", css);
    assert_eq!(css, "span#foo");

    assert_eq!(xpath(&target).as_deref(), Some(r#"//span[@id="foo"]"#));
}

#[test]
fn test_id_below_positional_ancestors_stops_css_walk_only_at_id() {
    let tree = document(vec![
        ElementNode::new("div"),
        ElementNode::new("div").with_id("panel").with_children(vec![ElementNode::new("ul").with_children(vec![
            ElementNode::new("li"),
            ElementNode::new("li"),
            ElementNode::new("li"),
        ])]),
    ]);
    let third = tree.find_by_id("panel").unwrap().element_children()[0].element_children()[2];

    assert_eq!(css_path(&third), "div#panel > ul > li:nth-of-type(3)");
    assert_eq!(xpath(&third).as_deref(), Some(r#"//div[@id="panel"]/ul[1]/li[3]"#));
}

#[test]
fn test_nth_of_type_for_each_sibling() {
    let siblings = (0..5)
        .map(|i| ElementNode::new("li").with_children(vec![ElementNode::text(format!("item {}", i))]))
        .collect();
    let tree = document(vec![ElementNode::new("ol").with_children(siblings)]);
    let list = tree.body().unwrap().element_children()[0];

    for (k, item) in list.element_children().iter().enumerate() {
        let k = k + 1;
        let css = css_path(item);
        if k == 1 {
            assert_eq!(css, "html > body > ol > li");
        } else {
            assert_eq!(css, format!("html > body > ol > li:nth-of-type({})", k));
        }
        assert_eq!(xpath(item), Some(format!("/html/body/ol[1]/li[{}]", k)));
    }
}

#[test]
fn test_body_xpath_literal() {
    let tree = document(vec![ElementNode::new("p")]);
    let body = tree.body().unwrap();

    assert_eq!(xpath(&body).as_deref(), Some("/html/body"));
    assert_eq!(css_path(&body), "html > body");
}

#[test]
fn test_derivers_are_pure() {
    let tree = document(vec![
        ElementNode::new("p"),
        ElementNode::new("div").with_children(vec![ElementNode::new("p"), ElementNode::new("p")]),
    ]);
    let target = tree.body().unwrap().element_children()[1].element_children()[1];

    assert_eq!(css_path(&target), css_path(&target));
    assert_eq!(xpath(&target), xpath(&target));
    assert_eq!(Locator::derive(&target).unwrap(), Locator::derive(&target).unwrap());
}

#[test]
fn test_derived_locators_replay_to_target() {
    let tree = document(vec![
        ElementNode::new("header").with_children(vec![ElementNode::new("nav").with_id("top")]),
        ElementNode::new("div").with_children(vec![
            ElementNode::new("span"),
            ElementNode::comment("spacer"),
            ElementNode::new("span").with_children(vec![ElementNode::new("a")]),
        ]),
        ElementNode::new("div").with_children(vec![ElementNode::new("a")]),
    ]);

    for element in tree.elements() {
        let Ok(locator) = Locator::derive(&element) else {
            // <html>, <head> and <title> have no XPath
            continue;
        };

        let by_xpath = resolve_xpath(&tree, &locator.xpath).unwrap();
        assert_eq!(by_xpath, vec![element], "xpath {} did not replay", locator.xpath);

        let by_css = resolve_css(&tree, &locator.css).unwrap();
        assert!(by_css.contains(&element), "css {} did not replay", locator.css);
    }
}

#[test]
fn test_elements_outside_body_have_no_xpath() {
    let tree = document(vec![]);
    let unresolved: Vec<String> = tree
        .elements()
        .filter(|e| Locator::derive(e).is_err())
        .map(|e| e.tag_name())
        .collect();

    assert_eq!(unresolved, vec!["html", "head", "title"]);
}

#[test]
fn test_page_snapshot_into_tree() {
    let json = r##"[
        {"node_type": 1, "tag_name": "HTML"},
        {"parent": 0, "node_type": 1, "tag_name": "HEAD"},
        {"parent": 0, "node_type": 1, "tag_name": "BODY"},
        {"parent": 2, "node_type": 3, "tag_name": "#text", "text_content": " "},
        {"parent": 2, "node_type": 1, "tag_name": "DIV", "attributes": {"id": "x"}},
        {"parent": 4, "node_type": 1, "tag_name": "P"},
        {"parent": 4, "node_type": 1, "tag_name": "P", "picked": true}
    ]"##;
    let nodes: Vec<SnapshotNode> = serde_json::from_str(json).unwrap();
    let tree = DomTree::from_snapshot(nodes).unwrap();

    let picked = tree.picked();
    assert_eq!(picked.len(), 1);
    assert_eq!(
        Locator::derive(&picked[0]).unwrap(),
        Locator::new("div#x > p:nth-of-type(2)", r#"//div[@id="x"]/p[2]"#)
    );
}

#[test]
fn test_locators_for_deeply_nested_page() {
    const DEPTH: usize = 150;

    let mut nodes = vec![
        SnapshotNode {
            node_type: NodeType::Element,
            tag_name: "HTML".to_string(),
            ..Default::default()
        },
        SnapshotNode {
            parent: Some(0),
            tag_name: "BODY".to_string(),
            ..Default::default()
        },
    ];
    for i in 0..DEPTH {
        nodes.push(SnapshotNode {
            parent: Some(i + 1),
            tag_name: "SECTION".to_string(),
            picked: i + 1 == DEPTH,
            ..Default::default()
        });
    }

    // Through JSON, as the page script delivers it
    let json = serde_json::to_string(&nodes).unwrap();
    let tree = DomTree::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

    let located = selector_inspector::locator::locate_picked(&tree);
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].locator.xpath, format!("/html/body{}", "/section[1]".repeat(DEPTH)));
    assert!(located[0].is_unique());
}
