//! Behavior tests for company-name resolution.

mod support;

use stocknav_core::{DirectoryError, SymbolDirectory};
use support::{directory, sym};

// =============================================================================
// Exact resolution
// =============================================================================

#[test]
fn when_company_is_listed_system_returns_its_ticker() {
    // Given: The directory loaded from CSV
    let directory = directory();

    // When / Then: Each listed name maps to exactly one ticker
    assert_eq!(directory.resolve("Apple Inc.").expect("listed"), &sym("AAPL"));
    assert_eq!(directory.resolve("Tesla, Inc.").expect("quoted name"), &sym("TSLA"));
    assert_eq!(directory.len(), 3);
}

#[test]
fn when_company_is_not_listed_system_reports_not_found() {
    let directory = directory();

    let err = directory.resolve("NVIDIA Corporation").expect_err("unknown company");

    match err {
        DirectoryError::NotFound { company } => assert_eq!(company, "NVIDIA Corporation"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn when_name_differs_only_in_case_system_does_not_guess() {
    let directory = directory();

    assert!(directory.resolve("apple inc.").is_err());
    assert!(directory.resolve("  Apple Inc.  ").is_ok());
}

// =============================================================================
// Multi-selection
// =============================================================================

#[test]
fn when_selection_repeats_a_company_system_resolves_it_once() {
    let directory = directory();

    let resolution = directory.resolve_all(["Apple Inc.", "Microsoft Corporation", "Apple Inc.", "Acme"]);

    assert_eq!(resolution.symbols(), vec![sym("AAPL"), sym("MSFT")]);
    assert_eq!(resolution.unresolved, vec![String::from("Acme")]);
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn when_bundled_company_list_is_loaded_every_row_resolves() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/companies.csv");

    let directory = SymbolDirectory::from_path(path).expect("bundled list loads");

    assert!(!directory.is_empty());
    for entry in directory.entries() {
        assert_eq!(
            directory.resolve(&entry.company_name).expect("round trip"),
            &entry.symbol
        );
    }
}

#[test]
fn when_rows_are_blank_system_skips_them() {
    let csv = "Company Name,Symbol\nApple Inc.,AAPL\n,\nMicrosoft Corporation,MSFT\n";

    let directory = SymbolDirectory::from_reader(csv.as_bytes()).expect("valid");

    assert_eq!(directory.company_names().collect::<Vec<_>>(), vec!["Apple Inc.", "Microsoft Corporation"]);
}

#[test]
fn when_directory_file_is_missing_system_fails_to_load() {
    let dir = tempfile::tempdir().expect("tempdir");

    let err = SymbolDirectory::from_path(dir.path().join("missing.csv")).expect_err("missing file");

    assert!(matches!(err, DirectoryError::Io(_)));
}
