//! End-to-end scenarios over CSV-loaded data.

use data_portal::aggregate::{group_aggregate, AggOp, GroupByParams};
use data_portal::correlation::{correlate, Correlation};
use data_portal::csv_parser::CsvParser;
use data_portal::dataframe::{Column, DataFrame, DataType, Value};
use data_portal::describe::{describe, head_rows, tail_rows, Statistic};
use data_portal::frequency::{value_counts, ValueCountsParams};
use data_portal::schema::inspect;
use data_portal::PortalError;

fn region_sales() -> DataFrame {
    DataFrame::from_columns([
        (
            "region",
            Column::from_texts([Some("east"), Some("east"), Some("west")]),
        ),
        (
            "sales",
            Column::from_numbers([Some(10.0), Some(20.0), Some(30.0)]),
        ),
    ])
    .unwrap()
}

#[test]
fn sum_by_region() {
    let result = group_aggregate(
        &region_sales(),
        &GroupByParams::new(["region"], "sales", AggOp::Sum),
    )
    .unwrap();
    let rows: Vec<(Value, Option<f64>)> = result
        .rows
        .iter()
        .map(|r| (r.keys[0].clone(), r.value))
        .collect();
    assert_eq!(
        rows,
        vec![
            (Value::Text("east".into()), Some(30.0)),
            (Value::Text("west".into()), Some(30.0)),
        ]
    );
}

#[test]
fn top_region_by_count() {
    let table = value_counts(&region_sales(), &ValueCountsParams::new("region", 1)).unwrap();
    assert_eq!(table.entries.len(), 1);
    assert_eq!(table.entries[0].value, Value::Text("east".into()));
    assert_eq!(table.entries[0].count, 2);
}

#[test]
fn describe_column_with_missing() {
    let df = CsvParser::new().parse_str("v\n1\n2\nNA\n4\n").unwrap();
    let v = describe(&df).summary("v").cloned().unwrap();
    assert_eq!(v.get(Statistic::Count), Some(3.0));
    assert!((v.get(Statistic::Mean).unwrap() - 7.0 / 3.0).abs() < 1e-12);
    assert_eq!(v.get(Statistic::Min), Some(1.0));
    assert_eq!(v.get(Statistic::Max), Some(4.0));
}

#[test]
fn single_numeric_column_is_not_applicable() {
    assert_eq!(
        correlate(&region_sales()),
        Correlation::NotApplicable { numeric_columns: 1 }
    );
}

#[test]
fn uploaded_csv_walkthrough() {
    let csv = "\
order_date,region,product,units,price,returned
2024-01-03,east,widget,3,2.50,no
2024-01-04,west,gadget,1,10.00,no
2024-01-04,east,gadget,,10.00,yes
2024-01-05,NA,widget,7,2.50,no
2024-01-06,west,widget,2,2.75,
";
    let df = CsvParser::new().parse_str(csv).unwrap();

    let schema = inspect(&df);
    assert_eq!(schema.row_count, 5);
    assert_eq!(
        schema.column_types(),
        vec![
            ("order_date", DataType::Datetime),
            ("region", DataType::Text),
            ("product", DataType::Text),
            ("units", DataType::Numeric),
            ("price", DataType::Numeric),
            ("returned", DataType::Boolean),
        ]
    );
    assert_eq!(
        schema.null_counts(),
        vec![
            ("order_date", 0),
            ("region", 1),
            ("product", 0),
            ("units", 1),
            ("price", 0),
            ("returned", 1),
        ]
    );

    let head = head_rows(&df, 2);
    let tail = tail_rows(&df, 2);
    assert_eq!(head.row(0).unwrap()[2], Value::Text("widget".into()));
    assert_eq!(tail.row(1).unwrap()[3], Value::number(2.0));

    let by_day = group_aggregate(
        &df,
        &GroupByParams::new(["order_date"], "units", AggOp::Count),
    )
    .unwrap();
    assert_eq!(by_day.rows.len(), 4);
    assert_eq!(by_day.rows[1].value, Some(1.0));

    let by_region = group_aggregate(
        &df,
        &GroupByParams::new(["region", "product"], "price", AggOp::Max),
    )
    .unwrap();
    let csv_out = String::from_utf8(by_region.to_csv_bytes().unwrap()).unwrap();
    assert_eq!(
        csv_out,
        "region,product,price_max\n\
         east,gadget,10\n\
         east,widget,2.5\n\
         west,gadget,10\n\
         west,widget,2.75\n\
         ,widget,2.5\n"
    );

    let err = group_aggregate(
        &df,
        &GroupByParams::new(["region"], "product", AggOp::Sum),
    )
    .unwrap_err();
    assert!(matches!(err, PortalError::TypeMismatch { .. }));

    let corr = correlate(&df);
    let matrix = corr.matrix().unwrap();
    assert_eq!(matrix.names, vec!["units", "price"]);
    assert_eq!(
        matrix.get_by_name("units", "price"),
        matrix.get_by_name("price", "units")
    );
}
