//! End-to-end runs of the scan / assign / extract / translate pipeline.

use indoc::indoc;
use xamloc::{
    LocalizabilityPolicy, LocalizabilityRule, RewriteMode, TranslationCatalog, TranslationFormat,
    UidGenerationMode, UidStatus, apply_translations, collect_resources, rewrite, scan,
};

fn policy() -> LocalizabilityPolicy {
    LocalizabilityPolicy::new(vec![
        LocalizabilityRule {
            namespace: "*".to_string(),
            name: "Button".to_string(),
            content_localizable: true,
            attributes: vec!["Content".to_string(), "ToolTip".to_string()],
        },
        LocalizabilityRule {
            namespace: "*".to_string(),
            name: "TextBlock".to_string(),
            content_localizable: true,
            attributes: vec!["Text".to_string()],
        },
        LocalizabilityRule {
            namespace: "*".to_string(),
            name: "Setter".to_string(),
            content_localizable: false,
            attributes: vec![],
        },
    ])
}

const SOURCE: &str = indoc! {r#"
    <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
            xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">
      <StackPanel>
        <TextBlock Text="Welcome to the app"/>
        <Button x:Uid="ok_button" Content="OK"/>
        <Button Content="Cancel" ToolTip="Abandon changes"/>
      </StackPanel>
    </Window>
"#};

#[test]
fn assign_then_rescan_is_valid_and_idempotent() {
    let mut collector = scan(SOURCE, &policy()).unwrap();
    assert!(collector.has_uid_errors());

    collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
    let first = rewrite(SOURCE, &collector, RewriteMode::Assign).unwrap();

    let rescanned = scan(&first, &policy()).unwrap();
    assert!(rescanned.all_are_valid());
    assert!(first.contains("x:Uid=\"ok_button\""));
    assert!(first.contains("x:Uid=\"TextBlock_WelcomeToTheApp\""));
    assert!(first.contains("x:Uid=\"Button_Cancel\""));

    // A second assign pass has nothing to change.
    let second = rewrite(&first, &rescanned, RewriteMode::Assign).unwrap();
    assert_eq!(second, first);
}

#[test]
fn assign_touches_nothing_but_uid_attributes() {
    let source = SOURCE.replace('\n', "\r\n");
    let mut collector = scan(&source, &policy()).unwrap();
    collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
    let rewritten = rewrite(&source, &collector, RewriteMode::Assign).unwrap();

    // Removing the added attributes restores the input byte for byte,
    // line endings included.
    let stripped = rewritten
        .replace("x:Uid=\"TextBlock_WelcomeToTheApp\" ", "")
        .replace("x:Uid=\"Button_Cancel\" ", "");
    assert_eq!(stripped, source);
}

#[test]
fn remove_then_rescan_finds_no_uids() {
    let collector = scan(SOURCE, &policy()).unwrap();
    let removed = rewrite(SOURCE, &collector, RewriteMode::Remove).unwrap();
    assert!(!removed.contains("x:Uid"));

    let rescanned = scan(&removed, &policy()).unwrap();
    assert!(rescanned.all_are_absent());
    assert!(
        rescanned
            .records()
            .iter()
            .all(|r| r.status == UidStatus::Absent)
    );
}

#[test]
fn duplicate_uids_are_renamed_in_registration_order() {
    let source = indoc! {r#"
        <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
                xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">
          <Button x:Uid="btn" Content="First"/>
          <Button x:Uid="btn" Content="Second"/>
        </Window>
    "#};
    let mut collector = scan(source, &policy()).unwrap();
    collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
    let rewritten = rewrite(source, &collector, RewriteMode::Assign).unwrap();

    // The first occurrence keeps its value, the second gets a fresh one.
    assert!(rewritten.contains("x:Uid=\"btn\" Content=\"First\""));
    assert!(rewritten.contains("Content=\"Second\""));
    assert!(!rewritten.contains("x:Uid=\"btn\" Content=\"Second\""));
    assert!(scan(&rewritten, &policy()).unwrap().all_are_valid());
}

#[test]
fn extract_translate_and_apply_through_a_csv_file() {
    let mut collector = scan(SOURCE, &policy()).unwrap();
    collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
    let assigned = rewrite(SOURCE, &collector, RewriteMode::Assign).unwrap();

    let collector = scan(&assigned, &policy()).unwrap();
    let entries = collect_resources(&collector, "app/window1");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("App.fr.csv");
    TranslationFormat::Delimited
        .write_entries_to_path(&path, &entries)
        .unwrap();

    let mut translated = TranslationFormat::Delimited
        .read_entries_from_path(&path)
        .unwrap();
    for entry in &mut translated {
        if let Some(resource) = &mut entry.resource {
            if resource.content == "OK" {
                resource.content = "Valider".to_string();
            }
        }
    }

    let catalog = TranslationCatalog::from_entries(translated);
    let localized = apply_translations(&assigned, &collector, "app/window1", &catalog).unwrap();
    assert!(localized.contains("Content=\"Valider\""));
    // Untranslated units keep their extracted content verbatim.
    assert!(localized.contains("ToolTip=\"Abandon changes\""));
    assert!(localized.contains("Text=\"Welcome to the app\""));
}

#[test]
fn setter_values_are_extracted_with_the_target_type_property() {
    let source = indoc! {r#"
        <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
                xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">
          <Style x:Uid="button_style" TargetType="{x:Type Button}">
            <Setter Property="Content" Value="Apply"/>
          </Style>
        </Window>
    "#};
    let collector = scan(source, &policy()).unwrap();
    let setter = collector
        .records()
        .iter()
        .find(|r| r.element_name.ends_with("Setter"))
        .expect("setter record");
    assert_eq!(setter.entries.len(), 1);
    assert_eq!(setter.entries[0].name, "Value");
    assert_eq!(setter.entries[0].text, "Apply");
}

#[test]
fn generated_prefix_declaration_survives_a_rescan() {
    // No xaml-x namespace declared anywhere: assigning must declare one.
    let source = indoc! {r#"
        <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation">
          <Button Content="Go"/>
        </Window>
    "#};
    let mut collector = scan(source, &policy()).unwrap();
    collector.resolve_uid_errors(UidGenerationMode::Smart).unwrap();
    let rewritten = rewrite(source, &collector, RewriteMode::Assign).unwrap();

    assert!(rewritten.contains("xmlns:x=\"http://schemas.microsoft.com/winfx/2006/xaml\""));
    assert!(rewritten.contains("x:Uid=\"Button_Go\""));
    assert!(scan(&rewritten, &policy()).unwrap().all_are_valid());
}
