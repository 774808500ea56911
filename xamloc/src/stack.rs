//! Ancestry tracking during a single streaming pass: which elements are open,
//! what attributes they carried, and how property-element tags fold back onto
//! the element that owns them.

use crate::uid::Position;

/// How far up the stack ancestor lookups search. Covers the
/// `Style / Style.Setters / Setter` nesting without walking the whole tree.
pub const ANCESTOR_SEARCH_DEPTH: usize = 3;

/// One open element. Lives only while its closing tag has not been consumed.
#[derive(Debug, Clone)]
pub struct ElementContext {
    pub namespace: String,
    pub local_name: String,
    attributes: Vec<(String, String, Position)>,
}

impl ElementContext {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        ElementContext {
            namespace: namespace.into(),
            local_name: local_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Records an attribute for later cross-node lookups. An attribute written
    /// as `ClassName.PropertyName` where the class matches this element is
    /// folded to just `PropertyName`.
    pub fn record_attribute(&mut self, name: &str, value: &str, position: Position) {
        let name = match name.split_once('.') {
            Some((class, property)) if class == self.local_name => property,
            _ => name,
        };
        self.attributes
            .push((name.to_string(), value.to_string(), position));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, v, _)| v.as_str())
    }

    pub fn attribute_with_position(&self, name: &str) -> Option<(&str, Position)> {
        self.attributes
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, v, p)| (v.as_str(), *p))
    }
}

/// Effective target of a text run observed inside a property-element tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTarget {
    /// Namespace the localizability check runs against.
    pub namespace: String,
    /// Class name the localizability check runs against.
    pub class_name: String,
    /// Property name the localizability check runs against.
    pub check_property: String,
    /// Property name the text is recorded under.
    pub property: String,
}

#[derive(Debug, Default)]
pub struct ElementStack {
    items: Vec<ElementContext>,
}

impl ElementStack {
    pub fn new() -> Self {
        ElementStack::default()
    }

    pub fn push(&mut self, context: ElementContext) {
        self.items.push(context);
    }

    pub fn pop(&mut self) -> Option<ElementContext> {
        self.items.pop()
    }

    pub fn top(&self) -> Option<&ElementContext> {
        self.items.last()
    }

    /// Nearest ancestor matching `(namespace, local_name)`, searching at most
    /// [`ANCESTOR_SEARCH_DEPTH`] levels down from the top.
    pub fn find_ancestor(&self, namespace: &str, local_name: &str) -> Option<&ElementContext> {
        self.items
            .iter()
            .rev()
            .take(ANCESTOR_SEARCH_DEPTH)
            .find(|c| c.namespace == namespace && c.local_name == local_name)
    }

    /// Resolves where text observed under the top element belongs, assuming
    /// the top element is a property-element tag (`Button.ToolTip`).
    ///
    /// When the dotted class part matches the owning element below it (same
    /// namespace, same class), the text is the owner's `ToolTip` property.
    /// When it does not match (an attached property from another class), the
    /// full dotted name is kept verbatim as the property name and the check
    /// runs against the attaching class instead.
    pub fn resolve_text_target(&self) -> Option<TextTarget> {
        let top = self.items.last()?;
        let (class, property) = top.local_name.split_once('.')?;
        if class.is_empty() || property.is_empty() {
            return None;
        }
        let owner = self.items.get(self.items.len().checked_sub(2)?)?;
        if owner.local_name == class && owner.namespace == top.namespace {
            Some(TextTarget {
                namespace: owner.namespace.clone(),
                class_name: owner.local_name.clone(),
                check_property: property.to_string(),
                property: property.to_string(),
            })
        } else {
            Some(TextTarget {
                namespace: top.namespace.clone(),
                class_name: class.to_string(),
                check_property: property.to_string(),
                property: top.local_name.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:test";

    fn at(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_attribute_redirection() {
        let mut context = ElementContext::new(NS, "Setter");
        context.record_attribute("Setter.Property", "Content", at(1, 10));
        context.record_attribute("Other.Thing", "x", at(1, 30));

        assert_eq!(context.attribute("Property"), Some("Content"));
        assert_eq!(context.attribute("Setter.Property"), None);
        // A non-matching class is kept verbatim.
        assert_eq!(context.attribute("Other.Thing"), Some("x"));
    }

    #[test]
    fn test_find_ancestor_within_depth() {
        let mut stack = ElementStack::new();
        stack.push(ElementContext::new(NS, "Style"));
        stack.push(ElementContext::new(NS, "Style.Setters"));
        stack.push(ElementContext::new(NS, "Setter"));

        let style = stack.find_ancestor(NS, "Style").unwrap();
        assert_eq!(style.local_name, "Style");
    }

    #[test]
    fn test_find_ancestor_beyond_depth_fails() {
        let mut stack = ElementStack::new();
        stack.push(ElementContext::new(NS, "Style"));
        stack.push(ElementContext::new(NS, "A"));
        stack.push(ElementContext::new(NS, "B"));
        stack.push(ElementContext::new(NS, "C"));

        assert!(stack.find_ancestor(NS, "Style").is_none());
    }

    #[test]
    fn test_text_target_matching_owner() {
        let mut stack = ElementStack::new();
        stack.push(ElementContext::new(NS, "Button"));
        stack.push(ElementContext::new(NS, "Button.ToolTip"));

        let target = stack.resolve_text_target().unwrap();
        assert_eq!(target.class_name, "Button");
        assert_eq!(target.property, "ToolTip");
    }

    #[test]
    fn test_text_target_attached_property() {
        let mut stack = ElementStack::new();
        stack.push(ElementContext::new(NS, "Button"));
        stack.push(ElementContext::new(NS, "ToolTipService.ToolTip"));

        let target = stack.resolve_text_target().unwrap();
        assert_eq!(target.class_name, "ToolTipService");
        assert_eq!(target.check_property, "ToolTip");
        assert_eq!(target.property, "ToolTipService.ToolTip");
    }

    #[test]
    fn test_text_target_requires_dotted_top() {
        let mut stack = ElementStack::new();
        stack.push(ElementContext::new(NS, "Window"));
        stack.push(ElementContext::new(NS, "Button"));

        assert!(stack.resolve_text_target().is_none());
    }
}
