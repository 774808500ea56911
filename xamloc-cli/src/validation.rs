use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use unic_langid::LanguageIdentifier;
use xamloc::{LocalizabilityPolicy, TranslationFormat};

/// Validate that an input path exists (file or directory)
pub fn validate_input_path(path: &str) -> Result<(), String> {
    if !Path::new(path).exists() {
        return Err(format!("Input path does not exist: {}", path));
    }
    Ok(())
}

/// Validate that a path names an existing, readable file
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }
    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }
    Ok(())
}

/// Validate output path, creating missing parent directories
pub fn validate_output_path(path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }
    Ok(())
}

/// Validate a culture identifier using unic-langid
pub fn validate_culture(culture: &str) -> Result<(), String> {
    if culture.is_empty() {
        return Err("Culture cannot be empty".to_string());
    }
    culture.parse::<LanguageIdentifier>().map_err(|_| {
        format!(
            "Invalid culture: {}. Expected a BCP 47 language identifier",
            culture
        )
    })?;
    Ok(())
}

/// Load the localizability rule table: the built-in defaults, or a JSON rule
/// file when one was given.
pub fn load_policy(rules: Option<&str>) -> Result<LocalizabilityPolicy, String> {
    match rules {
        None => Ok(LocalizabilityPolicy::with_default_rules()),
        Some(path) => {
            validate_file_path(path)?;
            let file = File::open(path).map_err(|e| format!("Cannot open rule file: {}", e))?;
            LocalizabilityPolicy::from_json_reader(BufReader::new(file))
                .map_err(|e| format!("Invalid rule file {}: {}", path, e))
        }
    }
}

/// Pick the translation wire format: `--mode ms|resx` overrides the
/// extension-based choice.
pub fn translation_format(path: &str, mode: Option<&str>) -> Result<TranslationFormat, String> {
    match mode {
        Some(m) if m.eq_ignore_ascii_case("ms") => Ok(TranslationFormat::MsDelimited),
        Some(m) if m.eq_ignore_ascii_case("resx") => Ok(TranslationFormat::ResourceXml),
        Some(other) => Err(format!(
            "Unsupported mode: {}. Supported modes: ms, resx",
            other
        )),
        None => TranslationFormat::from_path(Path::new(path)).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_culture() {
        assert!(validate_culture("fr").is_ok());
        assert!(validate_culture("fr-CA").is_ok());
        assert!(validate_culture("zh-Hant-TW").is_ok());
        assert!(validate_culture("").is_err());
        assert!(validate_culture("not a culture").is_err());
    }

    #[test]
    fn test_translation_format_selection() {
        assert_eq!(
            translation_format("out.csv", None).unwrap(),
            TranslationFormat::Delimited
        );
        assert_eq!(
            translation_format("out.csv", Some("ms")).unwrap(),
            TranslationFormat::MsDelimited
        );
        assert_eq!(
            translation_format("out.txt", Some("RESX")).unwrap(),
            TranslationFormat::ResourceXml
        );
        assert!(translation_format("out.bin", None).is_err());
        assert!(translation_format("out.csv", Some("weird")).is_err());
    }

    #[test]
    fn test_default_policy_loads() {
        assert!(load_policy(None).is_ok());
        assert!(load_policy(Some("/no/such/rules.json")).is_err());
    }
}
