//! Streaming structural walk of one markup file, producing the ordered
//! [`UidCollector`] the check/assign/remove and extraction operations consume.
//!
//! Elements whose tag name contains a dot are property-element tags: they
//! never get a record of their own, their content folds into the record of
//! the element that owns them. All other elements get a record iff they carry
//! an explicit `x:Uid`, or any localizable content was extracted for them.

use crate::{
    error::Error,
    policy::LocalizabilityPolicy,
    reader::{
        MarkupReader, Namespaces, StartTagToken, Token, XAML_NS_DEFAULT, XAML_NS_X,
        split_qualified,
    },
    stack::{ElementContext, ElementStack},
    uid::{
        CONTENT_PROPERTY, EntryKind, InsertionSide, LocalizableEntry, Position, UidCollector,
        UidRecord,
    },
};

/// A string is worth extracting iff it is non-empty after trimming and
/// contains at least one alphabetic character. Pure punctuation, markup, and
/// numbers are noise, not translations.
pub fn is_significant(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().any(char::is_alphabetic)
}

/// Scans one file and returns its populated collector.
pub fn scan(source: &str, policy: &LocalizabilityPolicy) -> Result<UidCollector, Error> {
    let mut state = ScanState {
        reader: MarkupReader::new(source),
        namespaces: Namespaces::new(),
        stack: ElementStack::new(),
        policy,
        collector: UidCollector::new(),
    };

    let mut seen_root = false;
    while let Some(token) = state.reader.next_token()? {
        match token {
            Token::StartTag(tag) => {
                if seen_root {
                    return Err(Error::markup(
                        "more than one root element",
                        tag.position.line,
                        tag.position.column,
                    ));
                }
                seen_root = true;
                state.collector.set_root_name_end(tag.name_end);
                state.process_element(tag, None)?;
            }
            Token::Text { position, .. } => {
                return Err(Error::markup(
                    "text outside the root element",
                    position.line,
                    position.column,
                ));
            }
            Token::EndTag { name, position } => {
                return Err(Error::markup(
                    format!("unexpected closing tag `</{name}>`"),
                    position.line,
                    position.column,
                ));
            }
        }
    }

    state.collector.finish();
    Ok(state.collector)
}

struct ScanState<'a, 'p> {
    reader: MarkupReader<'a>,
    namespaces: Namespaces,
    stack: ElementStack,
    policy: &'p LocalizabilityPolicy,
    collector: UidCollector,
}

impl ScanState<'_, '_> {
    /// Walks one element and its subtree. `parent` is the record of the
    /// nearest enclosing non-dotted element; property-element tags report back
    /// whether they folded any localizable content into it.
    fn process_element(
        &mut self,
        tag: StartTagToken,
        parent: Option<&mut UidRecord>,
    ) -> Result<bool, Error> {
        self.namespaces.push_scope();
        for attr in &tag.attributes {
            if attr.name == "xmlns" {
                self.namespaces.declare("", &attr.value);
            } else if let Some(prefix) = attr.name.strip_prefix("xmlns:") {
                self.namespaces.declare(prefix, &attr.value);
                self.collector.add_namespace_prefix(prefix);
            }
        }
        let (prefix, local) = split_qualified(&tag.name);
        let namespace = self.namespaces.lookup(prefix).unwrap_or("").to_string();
        let local = local.to_string();

        let result = if local.contains('.') {
            self.process_property_element(&tag, namespace, local, parent)
        } else {
            self.process_content_element(&tag, namespace, local).map(|()| false)
        };
        self.namespaces.pop_scope();
        result
    }

    fn process_property_element(
        &mut self,
        tag: &StartTagToken,
        namespace: String,
        local: String,
        mut parent: Option<&mut UidRecord>,
    ) -> Result<bool, Error> {
        let mut context = ElementContext::new(namespace, local);
        for attr in &tag.attributes {
            if !is_xmlns(&attr.name) {
                context.record_attribute(&attr.name, &attr.value, attr.position);
            }
        }
        self.stack.push(context);

        let mut contributed = false;
        if !tag.self_closing {
            loop {
                let Some(token) = self.reader.next_token()? else {
                    return Err(unclosed(tag));
                };
                match token {
                    Token::EndTag { name, position } => {
                        check_closing(tag, &name, position)?;
                        break;
                    }
                    Token::Text { text, position } => {
                        if let Some(record) = parent.as_deref_mut() {
                            contributed |= self.collect_property_text(record, &text, position);
                        }
                    }
                    Token::StartTag(child) => {
                        contributed |= self.process_element(child, parent.as_deref_mut())?;
                    }
                }
            }
        }
        self.stack.pop();
        Ok(contributed)
    }

    fn process_content_element(
        &mut self,
        tag: &StartTagToken,
        namespace: String,
        local: String,
    ) -> Result<(), Error> {
        let slot = self.collector.reserve();
        let (position, side) = match tag.attributes.first() {
            Some(attr) => (attr.position, InsertionSide::After),
            None => (tag.name_end, InsertionSide::Before),
        };
        let mut record = UidRecord::new(tag.name.clone(), position, side);
        let mut requires = false;
        let mut context = ElementContext::new(namespace.clone(), local.clone());

        for attr in &tag.attributes {
            if is_xmlns(&attr.name) {
                continue;
            }
            let (attr_prefix, attr_local) = split_qualified(&attr.name);
            let attr_namespace = self.namespaces.lookup(attr_prefix).unwrap_or("").to_string();
            context.record_attribute(&attr.name, &attr.value, attr.position);

            if attr_namespace == XAML_NS_X && attr_local == "Uid" {
                // Presence alone forces registration, whatever the value.
                record.value = Some(attr.value.clone());
                record.position = attr.position;
                requires = true;
            } else if attr_local == "Name"
                && (attr_namespace == XAML_NS_X || attr_namespace == XAML_NS_DEFAULT)
            {
                record.framework_name = Some(attr.value.clone());
            } else if self.attribute_localizable(&namespace, &local, attr_local, &attr_namespace) {
                let value = attr.value.trim();
                if !value.starts_with('{') && is_significant(value) {
                    record.entries.push(LocalizableEntry {
                        kind: EntryKind::Attribute,
                        namespace: attr_namespace,
                        name: effective_attribute_name(&local, attr_local).to_string(),
                        text: value.to_string(),
                        position: attr.position,
                    });
                }
            }
        }
        self.stack.push(context);

        if !tag.self_closing {
            loop {
                let Some(token) = self.reader.next_token()? else {
                    return Err(unclosed(tag));
                };
                match token {
                    Token::EndTag { name, position } => {
                        check_closing(tag, &name, position)?;
                        break;
                    }
                    Token::Text { text, position } => {
                        let trimmed = text.trim();
                        if self.policy.is_content_localizable(&namespace, &local)
                            && !trimmed.starts_with('{')
                            && is_significant(trimmed)
                        {
                            record.entries.push(LocalizableEntry {
                                kind: EntryKind::Text,
                                namespace: namespace.clone(),
                                name: CONTENT_PROPERTY.to_string(),
                                text: trimmed.to_string(),
                                position,
                            });
                        }
                    }
                    Token::StartTag(child) => {
                        requires |= self.process_element(child, Some(&mut record))?;
                    }
                }
            }
        }

        self.collect_setter_value(&mut record, &namespace, &local);
        self.stack.pop();

        requires |= !record.entries.is_empty();
        if requires {
            record.namespace_prefix = self.namespaces.prefix_of(XAML_NS_X).map(str::to_string);
            self.collector.register(slot, record);
        }
        Ok(())
    }

    /// Text inside a property-element tag: resolve which element and property
    /// it belongs to, run the attribute localizability check, and fold it into
    /// the owning record.
    fn collect_property_text(
        &mut self,
        record: &mut UidRecord,
        text: &str,
        position: Position,
    ) -> bool {
        let Some(target) = self.stack.resolve_text_target() else {
            return false;
        };
        let trimmed = text.trim();
        if trimmed.starts_with('{') || !is_significant(trimmed) {
            return false;
        }
        if !self.policy.is_attribute_localizable(
            &target.namespace,
            &target.class_name,
            &target.check_property,
        ) {
            return false;
        }
        record.entries.push(LocalizableEntry {
            kind: EntryKind::Text,
            namespace: target.namespace,
            name: target.property,
            text: trimmed.to_string(),
            position,
        });
        true
    }

    /// An attribute written as `ClassName.PropertyName` is an attached
    /// property: the check runs against the attaching class, not the element
    /// carrying the attribute.
    fn attribute_localizable(
        &self,
        element_namespace: &str,
        element_local: &str,
        attr_local: &str,
        attr_namespace: &str,
    ) -> bool {
        match attr_local.split_once('.') {
            Some((class, property)) => {
                self.policy
                    .is_attribute_localizable(attr_namespace, class, property)
            }
            None => {
                self.policy
                    .is_attribute_localizable(element_namespace, element_local, attr_local)
            }
        }
    }

    /// A `Setter` under the default namespace with `Property` and `Value`
    /// attributes contributes its `Value` when the enclosing `Style`'s
    /// `TargetType` makes `(targetType, Property)` attribute-localizable.
    fn collect_setter_value(&self, record: &mut UidRecord, namespace: &str, local: &str) {
        if namespace != XAML_NS_DEFAULT || local != "Setter" {
            return;
        }
        let Some(context) = self.stack.top() else {
            return;
        };
        let Some(property) = context.attribute("Property") else {
            return;
        };
        let Some((value, value_position)) = context.attribute_with_position("Value") else {
            return;
        };
        let Some(style) = self.stack.find_ancestor(XAML_NS_DEFAULT, "Style") else {
            return;
        };
        let Some(target_type) = style.attribute("TargetType") else {
            return;
        };
        let (target_namespace, target_local) = self.resolve_target_type(target_type);
        if !self
            .policy
            .is_attribute_localizable(&target_namespace, &target_local, property)
        {
            return;
        }
        let value = value.trim();
        if value.starts_with('{') || !is_significant(value) {
            return;
        }
        record.entries.push(LocalizableEntry {
            kind: EntryKind::Attribute,
            namespace: namespace.to_string(),
            name: "Value".to_string(),
            text: value.to_string(),
            position: value_position,
        });
    }

    /// Strips an `{x:Type Button}` wrapper and resolves the prefix, yielding
    /// the (namespace, local name) the Setter check runs against.
    fn resolve_target_type(&self, raw: &str) -> (String, String) {
        let mut text = raw.trim();
        if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
            text = inner.trim();
            if let Some((_, rest)) = text.split_once(char::is_whitespace) {
                text = rest.trim();
            }
        }
        let (prefix, local) = split_qualified(text);
        let namespace = self.namespaces.lookup(prefix).unwrap_or("").to_string();
        (namespace, local.to_string())
    }
}

fn is_xmlns(attribute_name: &str) -> bool {
    attribute_name == "xmlns" || attribute_name.starts_with("xmlns:")
}

fn effective_attribute_name<'n>(element_local: &str, attr_local: &'n str) -> &'n str {
    match attr_local.split_once('.') {
        Some((class, property)) if class == element_local => property,
        _ => attr_local,
    }
}

fn unclosed(tag: &StartTagToken) -> Error {
    Error::markup(
        format!("element `{}` is never closed", tag.name),
        tag.position.line,
        tag.position.column,
    )
}

fn check_closing(tag: &StartTagToken, closing: &str, position: Position) -> Result<(), Error> {
    if closing != tag.name {
        return Err(Error::markup(
            format!("closing tag `</{closing}>` does not match `<{}>`", tag.name),
            position.line,
            position.column,
        ));
    }
    Ok(())
}
