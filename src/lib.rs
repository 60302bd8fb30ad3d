//! # data-portal
//!
//! Aggregation and summarization engine for interactive tabular-data
//! exploration.
//!
//! A presentation layer hands over a parsed [`DataFrame`](dataframe::DataFrame);
//! every engine reads it immutably and returns a serializable result. No
//! engine depends on another, and none keeps state between calls.
//!
//! ## Modules
//!
//! - [`dataframe`] — Column-major tabular data model (DataFrame, Column, DataType, Value)
//! - [`missing`] — The is-missing predicate and the per-engine missing-value policy
//! - [`csv_parser`] — Delimited-text ingestion with automatic type inference
//! - [`schema`] — Type inference rules and the schema report (shape, types, null counts)
//! - [`describe`] — Descriptive statistics, head/tail row windows
//! - [`frequency`] — Value counts with deterministic tie-breaking
//! - [`aggregate`] — Group-by aggregation and CSV export
//! - [`correlation`] — Pairwise-complete Pearson correlation matrix
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use data_portal::aggregate::{group_aggregate, AggOp, GroupByParams};
//! use data_portal::correlation::{correlate, Correlation};
//! use data_portal::csv_parser::CsvParser;
//! use data_portal::describe::describe;
//! use data_portal::frequency::{value_counts, ValueCountsParams};
//! use data_portal::schema::inspect;
//!
//! let csv = "region,sales,units\neast,10,1\neast,20,2\nwest,30,NA\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//!
//! let schema = inspect(&df);
//! assert_eq!((schema.row_count, schema.column_count), (3, 3));
//!
//! let stats = describe(&df);
//! assert_eq!(stats.column_names(), vec!["sales", "units"]);
//!
//! let counts = value_counts(&df, &ValueCountsParams::new("region", 5)).unwrap();
//! assert_eq!(counts.entries[0].count, 2);
//!
//! let grouped = group_aggregate(&df, &GroupByParams::new(["region"], "sales", AggOp::Sum)).unwrap();
//! let csv_out = String::from_utf8(grouped.to_csv_bytes().unwrap()).unwrap();
//! assert_eq!(csv_out, "region,sales_sum\neast,30\nwest,30\n");
//!
//! assert!(matches!(correlate(&df), Correlation::Matrix(_)));
//! ```

pub mod aggregate;
pub mod correlation;
pub mod csv_parser;
pub mod dataframe;
pub mod describe;
pub mod error;
pub mod frequency;
pub mod missing;
pub mod schema;

pub use error::{PortalError, Result};
