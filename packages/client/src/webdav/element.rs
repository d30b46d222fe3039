use quick_xml::events::Event;
use quick_xml::Reader;

/// A namespace-agnostic XML element tree.
///
/// Names are local names: `D:getcontentlength` and `lp1:getcontentlength`
/// both become `getcontentlength`.
#[derive(Debug, Default)]
pub(crate) struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("body is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("document has no root element")]
    Empty,
    #[error("document ended inside element <{0}>")]
    Unterminated(String),
}

/// Parses `body` into its root element.
pub(crate) fn parse_document(body: &[u8]) -> Result<Element, ParseError> {
    let text = std::str::from_utf8(body)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element {
                name: local_name(start.local_name().as_ref()),
                ..Element::default()
            }),
            Event::Empty(empty) => {
                let element = Element {
                    name: local_name(empty.local_name().as_ref()),
                    ..Element::default()
                };
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unterminated(open.name));
    }
    root.ok_or(ParseError::Empty)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // Only the first top-level element counts.
        None if root.is_none() => *root = Some(element),
        None => {}
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tree_with_local_names() {
        let root = parse_document(
            br#"<?xml version="1.0"?><D:a xmlns:D="DAV:"><D:b>one &amp; two</D:b><lp1:c xmlns:lp1="DAV:"/></D:a>"#,
        )
        .expect("well-formed document");
        assert_eq!(root.name, "a");
        assert_eq!(root.child("b").expect("b").trimmed_text(), "one & two");
        assert!(root.child("c").is_some());
    }

    #[test]
    fn rejects_truncated_documents() {
        assert!(parse_document(b"<D:multistatus xmlns:D=\"DAV:\"><D:response>").is_err());
        assert!(parse_document(b"").is_err());
        assert!(parse_document(b"<a><b></a>").is_err());
    }
}
