//! Fragment parsing tests for sipa-html
//!
//! Component templates go through `parse_fragment` on every render, so the
//! parse -> serialize cycle has to be stable.

use sipa_html::{parse, parse_fragment};

// ============================================================================
// STABILITY
// ============================================================================

#[test]
fn test_reserialize_is_stable() {
    let inputs = [
        r#"<example-card class="card big" sipa-id="3"><h1>Title</h1><slot name="footer"></slot></example-card>"#,
        "Text with &amp; entity and &lt;tags&gt;",
        r#"<input type="text" value="a &quot;quoted&quot; value"><br>"#,
        "<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>",
    ];

    for input in inputs {
        let once = parse_fragment(input).unwrap().to_html();
        let twice = parse_fragment(&once).unwrap().to_html();
        assert_eq!(once, twice, "unstable serialization for {input:?}");
    }
}

#[test]
fn test_custom_elements_keep_attribute_order() {
    let fragment =
        parse_fragment(r#"<todo-item sipa-alias="first" title="'Buy milk'" done="false"></todo-item>"#)
            .unwrap();
    let root = fragment.first_element().unwrap();
    let elem = fragment.tree().get(root).unwrap().as_element().unwrap();

    let names: Vec<&str> = elem.attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["sipa-alias", "title", "done"]);
    assert_eq!(elem.get_attr("title"), Some("'Buy milk'"));
}

#[test]
fn test_tag_names_are_lowercased() {
    let fragment = parse_fragment("<My-Widget></My-Widget>").unwrap();
    assert_eq!(fragment.to_html(), "<my-widget></my-widget>");
}

// ============================================================================
// EDGE CASES
// ============================================================================

#[test]
fn test_empty_fragment() {
    let fragment = parse_fragment("").unwrap();
    assert!(fragment.is_empty());
    assert!(fragment.first_element().is_none());
}

#[test]
fn test_whitespace_is_preserved() {
    let fragment = parse_fragment("  <b>x</b>  ").unwrap();
    assert_eq!(fragment.to_html(), "  <b>x</b>  ");
}

#[test]
fn test_table_rows_keep_their_elements() {
    let fragment = parse_fragment("<tr><td>x</td></tr>").unwrap();
    let row = fragment.first_element().unwrap();

    assert_eq!(fragment.tree().tag_name(row), Some("tr"));
    assert_eq!(fragment.to_html(), "<tr><td>x</td></tr>");
}

#[test]
fn test_malformed_fragment_recovers() {
    let fragment = parse_fragment("<div><p>Unclosed<span>text").unwrap();
    assert_eq!(fragment.to_html(), "<div><p>Unclosed<span>text</span></p></div>");
}

#[test]
fn test_full_document_parse() {
    let doc = parse(r#"<!DOCTYPE html><html><head><title>App</title></head><body><div id="app"></div></body></html>"#)
        .unwrap();
    assert_eq!(doc.title(), "App");
    assert!(doc.get_element_by_id("app").is_some());
}
