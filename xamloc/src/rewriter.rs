//! Position-synchronized rewrite of the original source text.
//!
//! The rewriter replays the source character by character, copying everything
//! verbatim until the next edit position, then applies exactly one of the four
//! per-record actions. Everything outside the edited spans is reproduced
//! byte for byte, whitespace and formatting included.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    reader::{Cursor, XAML_NS_X},
    uid::{InsertionSide, Position, UidCollector, UidStatus},
};

lazy_static! {
    static ref XML_SPECIAL: Regex = Regex::new(r#"[<>&"']"#).unwrap();
}

/// Escapes the five XML special characters to their named entities.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    XML_SPECIAL.replace_all(value, |captures: &regex::Captures| {
        match captures.get(0).map(|m| m.as_str()) {
            Some("<") => "&lt;",
            Some(">") => "&gt;",
            Some("&") => "&amp;",
            Some("\"") => "&quot;",
            _ => "&apos;",
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// Insert missing identifiers and replace duplicated ones.
    Assign,
    /// Delete every identifier attribute present.
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidAction {
    Skip,
    Add,
    UpdateValue,
    Remove,
}

/// Per-record action by requested mode and status. An `Unknown` status at
/// rewrite time means a record was never registered, which the scanner
/// guarantees cannot happen.
pub fn action_for(mode: RewriteMode, status: UidStatus) -> Result<UidAction, Error> {
    match (mode, status) {
        (RewriteMode::Assign, UidStatus::Valid) => Ok(UidAction::Skip),
        (RewriteMode::Assign, UidStatus::Duplicate) => Ok(UidAction::UpdateValue),
        (RewriteMode::Assign, UidStatus::Absent) => Ok(UidAction::Add),
        (RewriteMode::Remove, UidStatus::Valid | UidStatus::Duplicate) => Ok(UidAction::Remove),
        (RewriteMode::Remove, UidStatus::Absent) => Ok(UidAction::Skip),
        (_, UidStatus::Unknown) => Err(Error::internal("unregistered uid record at rewrite time")),
    }
}

/// Rewrites `source` according to the collector's records and the requested
/// mode. Before calling this in `Assign` mode, the caller must have run
/// [`UidCollector::resolve_uid_errors`] so that every record carries a value.
///
/// Any error aborts the whole rewrite; the caller must not commit partial
/// output.
pub fn rewrite(source: &str, collector: &UidCollector, mode: RewriteMode) -> Result<String, Error> {
    let mut editor = TextEditor::new(source);

    if mode == RewriteMode::Assign {
        if let Some(prefix) = collector.generated_namespace_prefix() {
            let target = collector
                .root_name_end()
                .ok_or_else(|| Error::Rewrite("no root element was recorded".to_string()))?;
            editor.write_till(target);
            editor.insert(&format!(" xmlns:{prefix}=\"{XAML_NS_X}\""));
        }
    }

    for record in collector.records() {
        match action_for(mode, record.status)? {
            UidAction::Skip => {}
            UidAction::Add => {
                let prefix = record.namespace_prefix.as_deref().ok_or_else(|| {
                    Error::internal("uid record has no namespace prefix to add with")
                })?;
                let value = record
                    .value
                    .as_deref()
                    .ok_or_else(|| Error::internal("uid record has no value to add"))?;
                editor.write_till(record.position);
                let attribute = format!("{prefix}:Uid=\"{}\"", escape_xml(value));
                match record.insertion_side {
                    InsertionSide::Before => editor.insert(&format!(" {attribute}")),
                    InsertionSide::After => editor.insert(&format!("{attribute} ")),
                }
            }
            UidAction::UpdateValue => {
                let value = record
                    .value
                    .as_deref()
                    .ok_or_else(|| Error::internal("uid record has no replacement value"))?;
                editor.write_till(record.position);
                editor.replace_attribute_value(value)?;
            }
            UidAction::Remove => {
                // Aim one column early to take the separating space with us.
                let target = Position::new(
                    record.position.line,
                    record.position.column.saturating_sub(1),
                );
                editor.write_till(target);
                editor.remove_attribute()?;
            }
        }
    }

    Ok(editor.finish())
}

/// Low-level edit primitives shared by the Uid rewrite and the
/// translation-applying rewrite.
pub(crate) struct TextEditor<'a> {
    cursor: Cursor<'a>,
    output: String,
}

impl<'a> TextEditor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut output = String::with_capacity(source.len() + 128);
        // The cursor skips a leading byte-order mark; keep it in the output.
        if source.starts_with('\u{feff}') {
            output.push('\u{feff}');
        }
        TextEditor {
            cursor: Cursor::new(source),
            output,
        }
    }

    /// Copies source verbatim until the cursor reaches (or passes) `target`.
    pub(crate) fn write_till(&mut self, target: Position) {
        while self.cursor.position() < target {
            match self.cursor.bump() {
                Some(ch) => self.output.push(ch),
                None => break,
            }
        }
    }

    pub(crate) fn insert(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// With the cursor at (or just before) an attribute name: copies the name
    /// and `=` through, then swaps the quoted value for `value`, escaped.
    /// The original quote character is kept.
    pub(crate) fn replace_attribute_value(&mut self, value: &str) -> Result<(), Error> {
        self.copy_through_equals()?;
        while let Some(ch) = self.cursor.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.cursor.bump();
            self.output.push(ch);
        }
        let quote = match self.cursor.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.desync("expected a quoted attribute value")),
        };
        self.cursor.bump();
        self.output.push(quote);
        self.skip_value(quote)?;
        self.output.push_str(&escape_xml(value));
        self.output.push(quote);
        Ok(())
    }

    /// With the cursor at (or just before) an attribute name: drops the name,
    /// `=`, and quoted value from the output entirely.
    pub(crate) fn remove_attribute(&mut self) -> Result<(), Error> {
        loop {
            match self.cursor.peek() {
                Some('=') => {
                    self.cursor.bump();
                    break;
                }
                Some('>') | Some('/') | None => {
                    return Err(self.desync("attribute to remove not found"));
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        while let Some(ch) = self.cursor.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.cursor.bump();
        }
        let quote = match self.cursor.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.desync("expected a quoted attribute value")),
        };
        self.cursor.bump();
        self.skip_value(quote)
    }

    /// With the cursor at the start of a text run: drops the run from the
    /// output and writes `value`, escaped, in its place.
    pub(crate) fn replace_text_run(&mut self, value: &str) -> Result<(), Error> {
        loop {
            match self.cursor.peek() {
                Some('<') => break,
                Some(_) => {
                    self.cursor.bump();
                }
                None => return Err(self.desync("text run runs past the end of the file")),
            }
        }
        self.output.push_str(&escape_xml(value));
        Ok(())
    }

    /// Copies everything left and returns the finished output.
    pub(crate) fn finish(mut self) -> String {
        while let Some(ch) = self.cursor.bump() {
            self.output.push(ch);
        }
        self.output
    }

    fn copy_through_equals(&mut self) -> Result<(), Error> {
        loop {
            match self.cursor.peek() {
                Some('=') => {
                    self.cursor.bump();
                    self.output.push('=');
                    return Ok(());
                }
                Some('>' | '/') => {
                    return Err(self.desync("attribute to update not found"));
                }
                Some(ch) => {
                    self.cursor.bump();
                    self.output.push(ch);
                }
                None => return Err(self.desync("attribute to update not found")),
            }
        }
    }

    fn skip_value(&mut self, quote: char) -> Result<(), Error> {
        loop {
            match self.cursor.bump() {
                Some(ch) if ch == quote => return Ok(()),
                Some(_) => {}
                None => return Err(self.desync("unterminated attribute value")),
            }
        }
    }

    fn desync(&self, message: &str) -> Error {
        let at = self.cursor.position();
        Error::Rewrite(format!("{message} at line {}, column {}", at.line, at.column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{LocalizabilityPolicy, LocalizabilityRule};
    use crate::scanner::scan;
    use crate::settings::UidGenerationMode;
    use indoc::indoc;

    fn test_policy() -> LocalizabilityPolicy {
        LocalizabilityPolicy::new(vec![LocalizabilityRule {
            namespace: "*".to_string(),
            name: "Button".to_string(),
            content_localizable: false,
            attributes: vec!["Content".to_string()],
        }])
    }

    fn assign(source: &str) -> String {
        let mut collector = scan(source, &test_policy()).unwrap();
        collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
        rewrite(source, &collector, RewriteMode::Assign).unwrap()
    }

    fn remove(source: &str) -> String {
        let collector = scan(source, &test_policy()).unwrap();
        rewrite(source, &collector, RewriteMode::Remove).unwrap()
    }

    const HEADER: &str = concat!(
        "<Window xmlns=\"http://schemas.microsoft.com/winfx/2006/xaml/presentation\"\n",
        "        xmlns:x=\"http://schemas.microsoft.com/winfx/2006/xaml\">\n",
    );

    #[test]
    fn test_add_before_existing_attributes() {
        let source = format!("{HEADER}<Button Content=\"OK\"/>\n</Window>\n");
        let output = assign(&source);
        assert!(
            output.contains("<Button x:Uid=\"Button_OK\" Content=\"OK\"/>"),
            "unexpected output: {output}"
        );
    }

    #[test]
    fn test_update_duplicate_value_in_place() {
        let source = format!(
            "{HEADER}<Button x:Uid=\"b\" Content=\"OK\"/>\n<Button x:Uid = 'b' Content=\"Go\"/>\n</Window>\n"
        );
        let output = assign(&source);
        assert!(output.contains("x:Uid=\"b\""), "first stays: {output}");
        // Name, spacing, and quote style survive; only the value changes.
        assert!(
            output.contains("x:Uid = 'Button_Go'"),
            "second updated: {output}"
        );
    }

    #[test]
    fn test_remove_deletes_attribute_and_space() {
        let source = format!("{HEADER}<Button x:Uid=\"b\" Content=\"OK\"/>\n</Window>\n");
        let output = remove(&source);
        assert!(output.contains("<Button Content=\"OK\"/>"), "{output}");
        assert!(!output.contains("Uid"));
    }

    #[test]
    fn test_untouched_input_is_reproduced_exactly() {
        let source = format!("{HEADER}<Button x:Uid=\"b\" Content=\"OK\"/>\r\n  <Border/>\n</Window>\n");
        let collector = scan(&source, &test_policy()).unwrap();
        let output = rewrite(&source, &collector, RewriteMode::Assign).unwrap();
        assert_eq!(source, output);
    }

    #[test]
    fn test_bom_prefixed_source_is_edited_and_keeps_its_bom() {
        let source = format!("\u{feff}{HEADER}<Button Content=\"OK\"/>\n</Window>\n");
        let output = assign(&source);
        assert!(output.starts_with('\u{feff}'), "{output}");
        assert!(output.contains("<Button x:Uid=\"Button_OK\" Content=\"OK\"/>"));

        let untouched = format!("\u{feff}{HEADER}<Button x:Uid=\"b\" Content=\"OK\"/>\n</Window>\n");
        let collector = scan(&untouched, &test_policy()).unwrap();
        let output = rewrite(&untouched, &collector, RewriteMode::Assign).unwrap();
        assert_eq!(untouched, output);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let source = format!(
            "{HEADER}<Button Content=\"OK\"/>\n<Button Content=\"OK\"/>\n</Window>\n"
        );
        let first = assign(&source);
        let second = assign(&first);
        assert_eq!(first, second);

        let collector = scan(&first, &test_policy()).unwrap();
        assert!(collector.all_are_valid());
    }

    #[test]
    fn test_generated_namespace_declaration() {
        let source = indoc! {r#"
            <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation">
              <Button Content="OK"/>
            </Window>
        "#};
        let output = assign(source);
        assert!(
            output.starts_with(
                "<Window xmlns:x=\"http://schemas.microsoft.com/winfx/2006/xaml\" xmlns="
            ),
            "{output}"
        );
        assert!(output.contains("<Button x:Uid=\"Button_OK\" Content=\"OK\"/>"));
    }

    #[test]
    fn test_generated_prefix_avoids_collision() {
        let source = indoc! {r#"
            <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
                    xmlns:x="urn:something-else">
              <Button Content="OK"/>
            </Window>
        "#};
        let output = assign(source);
        assert!(output.contains(" xmlns:x1=\"http://schemas.microsoft.com/winfx/2006/xaml\""));
        assert!(output.contains("<Button x1:Uid=\"Button_OK\" Content=\"OK\"/>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let source = format!("{HEADER}<Button x:Uid=\"a\"/>\n<Button x:Uid=\"a\" Content=\"A &amp; B\"/>\n</Window>\n");
        let mut collector = scan(&source, &test_policy()).unwrap();
        // Force a value with specials through the update path.
        collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
        let output = rewrite(&source, &collector, RewriteMode::Assign).unwrap();
        assert!(!output.contains("x:Uid=\"a\" Content"), "duplicate got a new value: {output}");

        assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_remove_mode_keeps_everything_else() {
        let source = format!(
            "{HEADER}<Button x:Uid=\"b\" Content=\"OK\"/>\n<Border Padding=\"4\"/>\n</Window>\n"
        );
        let output = remove(&source);
        assert!(output.contains("<Border Padding=\"4\"/>"));
        let again = remove(&output);
        assert_eq!(output, again);
    }

    #[test]
    fn test_decision_table() {
        use RewriteMode::*;
        use UidAction as A;
        use UidStatus as S;
        assert_eq!(action_for(Assign, S::Valid).unwrap(), A::Skip);
        assert_eq!(action_for(Assign, S::Duplicate).unwrap(), A::UpdateValue);
        assert_eq!(action_for(Assign, S::Absent).unwrap(), A::Add);
        assert_eq!(action_for(Remove, S::Valid).unwrap(), A::Remove);
        assert_eq!(action_for(Remove, S::Duplicate).unwrap(), A::Remove);
        assert_eq!(action_for(Remove, S::Absent).unwrap(), A::Skip);
        assert!(action_for(Assign, S::Unknown).is_err());
        assert!(action_for(Remove, S::Unknown).is_err());
    }
}
