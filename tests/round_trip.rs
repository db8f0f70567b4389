//! Integration tests for saving models and reading them back

mod common;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array};
use arrow::datatypes::{DataType as ArrowType, TimeUnit, TimestampMicrosecondType};
use chrono::NaiveDate;
use common::{author_model, column_strings, column_type, env};
use datasaurus::storage::GLOBAL_ENVIRONMENT_VAR;
use datasaurus::{
    Column, Error, FileFormat, IfExists, LocalStorage, Meta, MemoryStorage, Model, ModelDeclaration, ReadOptions,
    Recalculate, SaveOptions, Storage, StorageError, StorageGroup, StorageRef, Table, WriteOptions,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn authors() -> Vec<serde_json::Value> {
    vec![
        json!({"id": 1, "name": "ada", "score": 0.5}),
        json!({"id": 2, "name": "grace", "score": 1.25}),
    ]
}

fn save_and_read(format: FileFormat) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new("files", LocalStorage::new(dir.path()));
    let author = Model::new(
        ModelDeclaration::new("Author")
            .column("id", Column::integer())
            .column("name", Column::string())
            .column("score", Column::float())
            .column("active_at", Column::datetime())
            .column("joined", Column::date().with_format("%d/%m/%Y"))
            .meta(Meta::new().storage(storage).table_name("authors").format(format)),
    )
    .unwrap();

    author.from_data(vec![
        json!({"id": 1, "name": "ada", "score": 0.5, "active_at": "2021-03-04T05:06:07Z", "joined": "04/03/2021"}),
        json!({"id": 2, "name": "grace", "score": 1.25, "active_at": null, "joined": "31/12/1999"}),
    ]);
    let report = author.save(&SaveOptions::default()).unwrap();
    assert_eq!(report.rows, 2);
    assert_eq!(report.format, Some(format));
    assert!(dir.path().join(format!("authors.{}", format.extension())).exists());

    let table = author.df().unwrap();
    assert_eq!(table.num_rows(), 2);
    assert_eq!(column_type(&table, "id"), ArrowType::Int32);
    assert_eq!(column_type(&table, "score"), ArrowType::Float32);
    assert_eq!(column_strings(&table, "name"), vec!["ada", "grace"]);
    assert_eq!(column_strings(&table, "score"), vec!["0.5", "1.25"]);

    assert_eq!(column_type(&table, "joined"), ArrowType::Date32);
    assert_eq!(column_strings(&table, "joined"), vec!["2021-03-04", "1999-12-31"]);

    assert_eq!(
        column_type(&table, "active_at"),
        ArrowType::Timestamp(TimeUnit::Microsecond, None)
    );
    let active_at = table
        .column("active_at")
        .unwrap()
        .as_primitive::<TimestampMicrosecondType>();
    let expected = NaiveDate::from_ymd_opt(2021, 3, 4)
        .and_then(|date| date.and_hms_opt(5, 6, 7))
        .unwrap()
        .and_utc()
        .timestamp_micros();
    assert_eq!(active_at.value(0), expected);
    assert!(active_at.is_null(1));
}

#[test]
fn test_json_round_trip() {
    save_and_read(FileFormat::Json);
}

#[test]
fn test_csv_round_trip() {
    save_and_read(FileFormat::Csv);
}

#[test]
fn test_parquet_round_trip() {
    save_and_read(FileFormat::Parquet);
}

#[test]
fn test_save_table_name_override_applies_once() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new("files", LocalStorage::new(dir.path()));
    let author = author_model(Meta::new().storage(storage).table_name("authors.json"));

    author.from_data(authors());
    let report = author
        .save(&SaveOptions::default().table_name("authors_backup.csv"))
        .unwrap();
    assert_eq!(report.table_name, "authors_backup.csv");
    assert_eq!(report.format, Some(FileFormat::Csv));
    assert!(dir.path().join("authors_backup.csv").exists());
    assert!(!dir.path().join("authors.json").exists());

    author.from_data(authors());
    author.save(&SaveOptions::default()).unwrap();
    assert!(dir.path().join("authors.json").exists());
}

#[test]
fn test_local_storage_rejects_append() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new("files", LocalStorage::new(dir.path()));
    let author = author_model(Meta::new().storage(storage).table_name("authors.parquet"));

    author.from_data(authors());
    let options = SaveOptions::default().write(WriteOptions {
        if_exists: IfExists::Append,
    });
    assert!(matches!(
        author.save(&options).unwrap_err(),
        Error::Storage(StorageError::UnsupportedWriteMode { .. })
    ));
}

#[test]
fn test_memory_append_and_projection() {
    let author = author_model(
        Meta::new()
            .storage(Storage::new("mem", MemoryStorage::new("mem")))
            .table_name("authors"),
    );

    author.from_data(authors());
    author.save(&SaveOptions::default()).unwrap();
    author.from_data(vec![json!({"id": 3, "name": "barbara", "score": 2.0, "extra": true})]);
    let append = SaveOptions::default().write(WriteOptions {
        if_exists: IfExists::Append,
    });
    assert!(author.save(&append).is_err(), "appending a table with another schema must fail");

    author.from_data(vec![json!({"id": 3, "name": "barbara", "score": 2.5})]);
    author.save(&append).unwrap();

    let table = author.df().unwrap();
    assert_eq!(table.column_names(), vec!["id", "name", "score"]);
    assert_eq!(column_strings(&table, "name"), vec!["ada", "grace", "barbara"]);
}

#[test]
fn test_save_to_another_environment() {
    let group = StorageGroup::new(
        "CommitsStorage",
        vec![
            Storage::new("local", MemoryStorage::new("local")),
            Storage::new("ci", MemoryStorage::new("ci")).with_environment("continuous-integration"),
        ],
    )
    .unwrap();
    let author = author_model(Meta::new().storage(Arc::clone(&group)).table_name("authors"));
    let vars = env(&[(GLOBAL_ENVIRONMENT_VAR, "local")]);

    author.from_data(authors());
    let report = author
        .save(&SaveOptions::with_env(&vars).environment("continuous-integration"))
        .unwrap();
    assert_eq!(report.storage, "ci");

    // The default environment has no such table; the saved one does
    assert!(author.df_with(&ReadOptions::with_env(&vars)).is_err());
    let table = author
        .df_with(&ReadOptions::with_env(&vars).environment("continuous-integration"))
        .unwrap();
    assert_eq!(table.num_rows(), 2);

    let member = StorageRef::member(&group, "continuous-integration").unwrap();
    let table = author.df_with(&ReadOptions::with_env(&vars).storage(member)).unwrap();
    assert_eq!(table.num_rows(), 2);
}

#[test]
fn test_recalculate_if_not_data_in_storage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let dir = tempfile::tempdir().unwrap();
    let totals = Model::new(
        ModelDeclaration::new("Totals")
            .column("total", Column::float())
            .meta(
                Meta::new()
                    .storage(Storage::new("files", LocalStorage::new(dir.path())))
                    .table_name("totals.parquet")
                    .recalculate(Recalculate::IfNotDataInStorage),
            )
            .calculate(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Table::from_columns(vec![(
                    "total",
                    Arc::new(Float64Array::from(vec![1.0, 2.0])) as ArrayRef,
                )])?)
            }),
    )
    .unwrap();

    assert_eq!(totals.df().unwrap().num_rows(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Save calculates once more, then reads come from storage
    totals.save(&SaveOptions::default()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(totals.df().unwrap().num_rows(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
