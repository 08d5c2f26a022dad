/// ScriptElement: an already-parsed markup element of a scene script.
///
/// Reading script text is left to the caller (any XML reader can build this
/// tree). Element and attribute names compare case-insensitively.
///
/// # Example
///
/// ```ignore
/// let pass = ScriptElement::new("Pass")
///     .with_attribute("Name", "main")
///     .with_child(ScriptElement::new("C").with_attribute("S", "render"));
/// ```

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<ScriptElement>,
    /// Concatenated text content
    pub text: String,
}

impl ScriptElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: ScriptElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Shorthand for `<name>text</name>`
    pub fn text_element(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    /// Whether this element is named `name` (case-insensitive)
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Attribute value, trimmed (case-insensitive lookup)
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
    }

    /// First child named `name`
    pub fn child(&self, name: &str) -> Option<&ScriptElement> {
        self.children.iter().find(|c| c.is(name))
    }

    /// Trimmed text of the first child named `name`
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}
