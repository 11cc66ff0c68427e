use anyhow::Result;
use chrono::NaiveDate;
use csv_etl::config::EtlConfig;
use csv_etl::dataset::{ColumnData, ColumnType, Value};
use csv_etl::pipeline::{etl_process, load_csv, load_data_to_db, run, transform_data};
use csv_etl::schema::{infer_schema, DestinationType};
use csv_etl::storage::InMemorySink;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config_for(path: &Path, table: &str) -> EtlConfig {
    let mut config = EtlConfig::default();
    config.input.path = path.to_path_buf();
    config.output.table = table.to_string();
    config
}

#[test]
fn test_full_pipeline_into_memory_sink() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("superstore.csv");
    // Latin-1 bytes: "Côte" with 0xF4
    let mut bytes = b" id ,Country,Order_Date, City ,Sales,Quantity\n".to_vec();
    bytes.extend_from_slice(b"1,US,2016-11-08,C\xF4te,261.96,2\n");
    bytes.extend_from_slice(b"2,FR,not a date,Paris,,3\n");
    fs::write(&csv_path, bytes)?;

    let config = config_for(&csv_path, "orders");
    let mut sink = InMemorySink::new();
    let report = etl_process(&config, || Ok(&mut sink))?.expect("dataset was loaded");

    assert!(report.succeeded());
    assert_eq!(report.rows_written, 2);

    let table = sink.table("orders").expect("table was created");
    assert_eq!(
        table.schema.column_names(),
        vec!["Order_Date", "City", "Sales", "Quantity"]
    );
    let types: Vec<DestinationType> = table.schema.columns.iter().map(|c| c.data_type).collect();
    assert_eq!(
        types,
        vec![
            DestinationType::Date,
            DestinationType::Varchar,
            DestinationType::Numeric,
            DestinationType::Integer
        ]
    );
    assert_eq!(
        table.rows[0],
        vec![
            Value::Date(NaiveDate::from_ymd_opt(2016, 11, 8).unwrap()),
            Value::Text("C\u{f4}te".to_string()),
            Value::Real(261.96),
            Value::Integer(2),
        ]
    );
    assert_eq!(
        table.rows[1],
        vec![
            Value::Missing,
            Value::Text("Paris".to_string()),
            Value::Missing,
            Value::Integer(3),
        ]
    );
    Ok(())
}

#[test]
fn test_columns_follow_trimmed_header_minus_denylist() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("input.csv");
    fs::write(
        &csv_path,
        " Region,user_id ,Segment , state_id,Profit\nWest,7,Consumer,3,1.5\n",
    )?;

    let config = EtlConfig::default();
    let dataset = transform_data(load_csv(&csv_path, &config.input), &config.transform)
        .expect("dataset was loaded");
    assert_eq!(dataset.column_names(), vec!["Region", "Segment", "Profit"]);
    Ok(())
}

#[test]
fn test_missing_file_makes_no_sink_calls() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = config_for(&temp_dir.path().join("absent.csv"), "orders");

    let mut connected = false;
    let mut sink = InMemorySink::new();
    let report = etl_process(&config, || {
        connected = true;
        Ok(&mut sink)
    })?;

    assert!(report.is_none());
    assert!(!connected);
    assert_eq!(sink.replace_calls, 0);
    assert_eq!(sink.write_calls, 0);
    Ok(())
}

#[test]
fn test_postgres_run_skips_connecting_when_load_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut config = config_for(&temp_dir.path().join("absent.csv"), "orders");
    // Nothing listens here, so any connection attempt would surface as an error
    config.database.host = "127.0.0.1".to_string();
    config.database.port = 1;

    assert!(run(&config)?.is_none());
    Ok(())
}

#[test]
fn test_malformed_file_makes_no_sink_calls() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("broken.csv");
    fs::write(&csv_path, "a,b\n1,2\n1,2,3,4\n")?;

    let config = config_for(&csv_path, "orders");
    let mut sink = InMemorySink::new();
    let report = etl_process(&config, || Ok(&mut sink))?;

    assert!(report.is_none());
    assert_eq!(sink.replace_calls, 0);
    Ok(())
}

#[test]
fn test_denylisted_columns_leave_sales_as_numeric() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("sales.csv");
    fs::write(&csv_path, "id,Country,Sales\n1,US,10.5\n2,FR,20.0\n")?;

    let mut config = EtlConfig::default();
    config.transform.drop_columns = vec!["id".to_string(), "Country".to_string()];
    let dataset = transform_data(load_csv(&csv_path, &config.input), &config.transform)
        .expect("dataset was loaded");

    assert_eq!(dataset.column_names(), vec!["Sales"]);
    assert_eq!(
        dataset.column("Sales").unwrap().data,
        ColumnData::Real(vec![Some(10.5), Some(20.0)])
    );
    let schema = infer_schema(&dataset);
    assert_eq!(schema.columns[0].data_type, DestinationType::Numeric);
    Ok(())
}

#[test]
fn test_order_dates_are_dates_or_null() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("dates.csv");
    fs::write(
        &csv_path,
        "Order_Date,Sales\n11/8/2016,1\n6/12/2016,2\n13/45/2016,3\n,4\n",
    )?;

    let config = EtlConfig::default();
    let dataset = transform_data(load_csv(&csv_path, &config.input), &config.transform)
        .expect("dataset was loaded");

    let column = dataset.column("Order_Date").unwrap();
    assert_eq!(column.column_type(), ColumnType::Date);
    assert_eq!(
        column.data,
        ColumnData::Date(vec![
            NaiveDate::from_ymd_opt(2016, 11, 8),
            NaiveDate::from_ymd_opt(2016, 6, 12),
            None,
            None,
        ])
    );
    Ok(())
}

#[test]
fn test_sink_runs_replace_table_schema() -> Result<()> {
    let temp_dir = tempdir()?;
    let first = temp_dir.path().join("first.csv");
    let second = temp_dir.path().join("second.csv");
    fs::write(&first, "a,b\n1,x\n2,y\n")?;
    fs::write(&second, "x\n2024-01-02\n")?;

    let mut config = EtlConfig::default();
    config.transform.date_column = "x".to_string();
    let mut sink = InMemorySink::new();

    let dataset = transform_data(load_csv(&first, &config.input), &config.transform);
    load_data_to_db(dataset.as_ref(), &mut sink, "results")?;
    let dataset = transform_data(load_csv(&second, &config.input), &config.transform);
    load_data_to_db(dataset.as_ref(), &mut sink, "results")?;

    let table = sink.table("results").expect("table was created");
    assert_eq!(table.schema.column_names(), vec!["x"]);
    assert_eq!(table.schema.columns[0].data_type, DestinationType::Date);
    assert_eq!(
        table.rows,
        vec![vec![Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())]]
    );
    Ok(())
}

#[test]
fn test_write_failure_does_not_fail_the_run() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("input.csv");
    fs::write(&csv_path, "Sales\n1.5\n")?;

    let config = config_for(&csv_path, "orders");
    let mut sink = InMemorySink::failing_writes();
    let report = etl_process(&config, || Ok(&mut sink))?.expect("dataset was loaded");

    assert!(!report.succeeded());
    assert_eq!(sink.replace_calls, 1);
    Ok(())
}

#[test]
fn test_table_creation_failure_fails_the_run() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv_path = temp_dir.path().join("input.csv");
    fs::write(&csv_path, "Sales\n1.5\n")?;

    let config = config_for(&csv_path, "orders");
    let mut sink = InMemorySink::failing_replace();
    let result = etl_process(&config, || Ok(&mut sink));

    assert!(result.is_err());
    assert_eq!(sink.write_calls, 0);
    Ok(())
}
