//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that configuration loaded from TOML changes how
//! filters, sorts and pages compile.

mod common;

use std::io::Write;

use common::{Person, ids, people};
use pretty_assertions::assert_eq;
use sift::prelude::*;
use sift::{ErrorCode, SiftConfig, StringComparison};

/// Test that an empty document yields the built-in defaults
#[test]
fn test_config_minimal() {
    let config = SiftConfig::from_str("").expect("Failed to parse config");
    assert_eq!(config.filter.culture, "invariant");
    assert_eq!(config.sort, SortConfiguration::default());
    assert!(!config.page.ignore_parse_exceptions);
}

/// Test a configuration that replaces the operator tokens
#[test]
fn test_config_custom_operator_tokens() {
    let config = SiftConfig::from_str(
        r#"
        [filter]
        value_separator_chars = ";"
        string_comparison = "ignore_case"

        [filter.filter_operator_map]
        "eq:" = "EqualCaseInsensitive"
        "not:" = "NotEqual"
        "gt:" = "GreaterThan"
        "none" = "IsNull"
        "#,
    )
    .expect("Failed to parse config");

    let mut filter = EntityFilter::<Person>::new().with_configuration(config.filter.clone());
    filter.add_syntax("LastName", "eq:smith;eq:adams");
    let items = people();
    assert_eq!(ids(filter.compile().unwrap().filter(&items).unwrap()), vec![1, 2, 6]);

    let mut filter = EntityFilter::<Person>::new().with_configuration(config.filter.clone());
    filter.add_syntax("Gender", "NONE");
    assert_eq!(ids(filter.compile().unwrap().filter(&items).unwrap()), vec![4]);

    let mut filter = EntityFilter::<Person>::new().with_configuration(config.filter);
    filter.add_syntax("Salary", ">5000");
    let err = filter.compile().unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidFilterValue);
}

/// Test custom sort markers
#[test]
fn test_config_sort_markers() {
    let config = SiftConfig::from_str(
        r#"
        [sort]
        ascending_prefixes = []
        ascending_postfixes = [":asc"]
        descending_prefixes = []
        descending_postfixes = [":desc"]
        ignore_property_name_case = true
        conditional_access = "always"
        "#,
    )
    .expect("Failed to parse config");

    let mut sort = EntitySort::<Person>::new().with_configuration(config.sort);
    sort.add_syntax("lastname:asc,firstname:desc").unwrap();
    let mut items = people();
    sort.compile().unwrap().sort(&mut items).unwrap();
    assert_eq!(ids(&items), vec![6, 4, 3, 5, 1, 2]);
}

/// Test loading from a file on disk
#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
        [filter]
        culture = "de-DE"
        value_separator_chars = ";"
        string_comparison = "ordinal"

        [page]
        ignore_parse_exceptions = true
        "#
    )
    .expect("Failed to write config");

    let config = SiftConfig::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.filter.string_comparison, StringComparison::Ordinal);

    let mut filter = EntityFilter::<Person>::new().with_configuration(config.filter);
    filter.add_syntax("Salary", ">6000,5;5200");
    let items = people();
    assert_eq!(ids(filter.compile().unwrap().filter(&items).unwrap()), vec![1, 2, 6]);

    let page = EntityPage::new("", "lots").with_configuration(config.page);
    assert_eq!(page.paginate(&items).unwrap().len(), 6);
}

/// Test that bad files are reported as configuration errors
#[test]
fn test_config_errors() {
    let err = SiftConfig::from_file("/nonexistent/sift.toml").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);

    let err = SiftConfig::from_str("[filter]\nescape_char = \",\"\nvalue_separator_chars = \",\"")
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);

    let err = SiftConfig::from_str("[sort]\nconditional_access = \"sometimes\"").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test publishing process-wide defaults; the only test in this binary that does
#[test]
fn test_config_install_defaults() {
    let config = SiftConfig::from_str(
        r#"
        [page]
        ignore_parse_exceptions = true
        "#,
    )
    .unwrap();
    config.clone().install().expect("first install succeeds");

    assert!(PageConfiguration::current().ignore_parse_exceptions);
    assert!(EntityPage::new("1", "").resolve().is_ok());

    let err = config.install().unwrap_err();
    assert_eq!(err.code, ErrorCode::DefaultAlreadySet);
}
