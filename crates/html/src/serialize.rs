//! Markup serialization — turn a [`Document`] subtree back into HTML text.

use dom::{Document, NodeData, NodeId};

use crate::tokenizer::RAW_TEXT_ELEMENTS;
use crate::tree_builder::VOID_ELEMENTS;

/// Serialize `node` including its own tags (the "outer HTML").
pub fn outer_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

/// Serialize the children of `node` (the "inner HTML").
pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_children(doc, node, &mut out);
    out
}

/// Serialize a whole document.
pub fn serialize(doc: &Document) -> String {
    inner_html(doc, doc.root())
}

fn write_children(doc: &Document, node: NodeId, out: &mut String) {
    for child in doc.children(node) {
        write_node(doc, child, out);
    }
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    let Some(n) = doc.node(node) else {
        return;
    };
    match &n.data {
        NodeData::Document => write_children(doc, node, out),
        NodeData::DocumentType { name } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Comment { data } => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        NodeData::Text { data } => {
            let raw = doc
                .parent(node)
                .and_then(|p| doc.element(p))
                .is_some_and(|e| RAW_TEXT_ELEMENTS.contains(&e.tag_name.as_str()));
            if raw {
                out.push_str(data);
            } else {
                escape_into(data, false, out);
            }
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.tag_name);
            for attr in &element.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
                return;
            }
            write_children(doc, node, out);
            out.push_str("</");
            out.push_str(&element.tag_name);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn round_trips_simple_markup() {
        let source = r#"<!DOCTYPE html><html><head></head><body><div id="a" class="x y"><p>Hi <b>there</b></p><br><!-- note --></div></body></html>"#;
        assert_eq!(serialize(&parse(source)), source);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let doc = parse(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p>"#);
        let p = doc.get_elements_by_tag(doc.root(), "p")[0];
        assert_eq!(
            outer_html(&doc, p),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn style_content_is_not_escaped() {
        let doc = parse("<div><style scoped>div > p { content: \"&\" }</style></div>");
        let div = doc.get_elements_by_tag(doc.root(), "div")[0];
        assert_eq!(
            inner_html(&doc, div),
            "<style scoped=\"\">div > p { content: \"&\" }</style>"
        );
    }
}
