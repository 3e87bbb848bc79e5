pub const MMD_NAMESPACE: &str = "http://www.met.no/schema/mmd";
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml";

/// An element of the document tree; names carry their namespace prefix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// An element in the `mmd` namespace.
    pub fn mmd(local_name: &str) -> Self {
        Self::new(format!("mmd:{}", local_name))
    }

    /// An element in the `gml` namespace.
    pub fn gml(local_name: &str) -> Self {
        Self::new(format!("gml:{}", local_name))
    }

    /// The root `mmd:mmd` element with both namespace declarations.
    pub fn mmd_root() -> Self {
        Self::mmd("mmd")
            .with_attribute("xmlns:mmd", MMD_NAMESPACE)
            .with_attribute("xmlns:gml", GML_NAMESPACE)
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The first child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// `mmd:{name}` holding `text`.
pub fn text_element(local_name: &str, text: impl Into<String>) -> Element {
    Element::mmd(local_name).with_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let rectangle = Element::mmd("rectangle")
            .with_attribute("srsName", "EPSG:4326")
            .with_child(text_element("north", "61.0"))
            .with_child(text_element("south", "60.0"));

        assert_eq!(rectangle.name, "mmd:rectangle");
        assert_eq!(rectangle.attribute("srsName"), Some("EPSG:4326"));
        assert_eq!(
            rectangle.child("mmd:south").and_then(|e| e.text.as_deref()),
            Some("60.0")
        );
        assert!(rectangle.child("mmd:east").is_none());
    }

    #[test]
    fn root_declares_namespaces() {
        let root = Element::mmd_root();

        assert_eq!(root.name, "mmd:mmd");
        assert_eq!(root.attribute("xmlns:mmd"), Some(MMD_NAMESPACE));
        assert_eq!(root.attribute("xmlns:gml"), Some(GML_NAMESPACE));
    }
}
