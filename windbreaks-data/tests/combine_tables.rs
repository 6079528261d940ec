//! Multi-file table assembly over scratch directories.

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use windbreaks_core::AttributeValue;
use windbreaks_data::{
    COLSOM_HEADERS, CombineError, CombineOptions, STATE_COLUMN, YEAR_COLUMN, colsom_year_file,
    combine_prefixed_csv, combine_years,
};

mod support;

use support::{scratch_dir, write_fixture};

const HEADERS: &str = "\
1,Commodity Year Identifier
2,State Abbreviation
3,Year of Loss
4,Indemnity Amount
";

/// A cause-of-loss tree with files for 2011 and 2012 only.
#[fixture]
fn colsom_tree() -> (TempDir, Utf8PathBuf) {
    let (dir, root) = scratch_dir();
    write_fixture(&root, COLSOM_HEADERS, HEADERS);
    write_fixture(
        &root,
        &colsom_year_file(2011),
        "2011|NE|2011|1500.5\n2011|KS|2011|900\n2011|NE||12\n",
    );
    write_fixture(
        &root,
        &colsom_year_file(2012),
        "2012|NE|2012.0|300\n2012|IA|2013|75\n",
    );
    (dir, root)
}

fn column(table: &windbreaks_core::Table, name: &str) -> Vec<String> {
    table
        .records()
        .iter()
        .map(|record| record.get(name).map(ToString::to_string).unwrap_or_default())
        .collect()
}

#[rstest]
fn combines_requested_years_with_injected_headers(colsom_tree: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = colsom_tree;
    let options = CombineOptions {
        years: Some(vec![2011, 2012]),
        states: None,
    };
    let table = combine_years(&root, &options).expect("years combine");
    assert_eq!(
        table.columns(),
        [
            "Commodity Year Identifier",
            STATE_COLUMN,
            YEAR_COLUMN,
            "Indemnity Amount"
        ]
    );
    assert_eq!(column(&table, YEAR_COLUMN), ["2011", "2011", "2012"]);
    assert_eq!(
        table.records()[0].get(YEAR_COLUMN),
        Some(&AttributeValue::Text("2011".into()))
    );
}

#[rstest]
fn filters_by_state(colsom_tree: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = colsom_tree;
    let options = CombineOptions {
        years: Some(vec![2011, 2012, 2013]),
        states: Some(vec!["NE".into(), "IA".into()]),
    };
    let table = combine_years(&root, &options).expect("years combine");
    assert_eq!(column(&table, STATE_COLUMN), ["NE", "NE", "IA"]);
    assert_eq!(column(&table, YEAR_COLUMN), ["2011", "2012", "2013"]);
}

#[rstest]
fn missing_year_files_are_skipped(colsom_tree: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = colsom_tree;
    let options = CombineOptions {
        years: Some(vec![2010, 2011]),
        states: None,
    };
    let table = combine_years(&root, &options).expect("years combine");
    assert_eq!(table.len(), 2);
}

#[rstest]
fn no_year_files_is_an_error(colsom_tree: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = colsom_tree;
    let options = CombineOptions {
        years: Some(vec![1999]),
        states: None,
    };
    assert!(matches!(
        combine_years(&root, &options),
        Err(CombineError::NoYearFiles { .. })
    ));
}

#[cfg(unix)]
#[rstest]
fn unreadable_year_entries_are_errors_not_skips(colsom_tree: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = colsom_tree;
    let looping = root.join(colsom_year_file(2013));
    std::os::unix::fs::symlink(looping.as_std_path(), looping.as_std_path())
        .expect("create self-referencing link");
    let options = CombineOptions {
        years: Some(vec![2011, 2013]),
        states: None,
    };
    match combine_years(&root, &options) {
        Err(CombineError::Inspect { path, .. }) => assert_eq!(path, looping),
        other => panic!("expected Inspect error, got {:?}", other.map(|table| table.len())),
    }
}

#[rstest]
fn missing_headers_file_is_an_error() {
    let (_dir, root) = scratch_dir();
    assert!(matches!(
        combine_years(&root, &CombineOptions::default()),
        Err(CombineError::Headers(_))
    ));
}

fn write_loss_tables(root: &Utf8Path) {
    write_fixture(root, "loss_b.csv", "state,acres\nKS,12\n");
    write_fixture(root, "loss_a.csv", "state,amount\nNE,1.5\n");
    write_fixture(root, "other.csv", "state\nIA\n");
    write_fixture(root, "loss_notes.txt", "not a table\n");
}

#[rstest]
fn prefixed_files_concatenate_in_name_order() {
    let (_dir, root) = scratch_dir();
    write_loss_tables(&root);
    let table = combine_prefixed_csv(&root, "loss_").expect("files combine");
    assert_eq!(table.columns(), ["state", "amount", "acres"]);
    assert_eq!(column(&table, "state"), ["NE", "KS"]);
    assert_eq!(table.records()[0].get("acres"), None);
}

#[rstest]
fn unmatched_prefix_is_an_error() {
    let (_dir, root) = scratch_dir();
    write_loss_tables(&root);
    assert!(matches!(
        combine_prefixed_csv(&root, "yield_"),
        Err(CombineError::NoMatchingFiles { .. })
    ));
}
