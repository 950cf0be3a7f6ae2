use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::DataLoadError;
use super::model::{Record, RecordStore, TrafficLevel, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the delivery table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-delimited with a header row
/// * `.tsv`     – tab-delimited with a header row
/// * `.parquet` – Parquet file with the required columns
/// * `.json`    – `[{ "order_id": ..., "distance_km": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<RecordStore, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_delimited(path, b',')?,
        "tsv" => load_delimited(path, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    RecordStore::from_records(records)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn check_columns<S: AsRef<str>>(headers: &[S]) -> Result<(), DataLoadError> {
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.as_ref().trim() == required) {
            return Err(DataLoadError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV / TSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; extra columns are ignored.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Vec<Record>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    check_columns(&headers)?;

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<Record>().enumerate() {
        let row = i + 1;
        let record = result.map_err(|e| DataLoadError::malformed(row, e.to_string()))?;
        record.validate(row)?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// `order_id` may be a string or a number.
fn load_json(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;

    let rows = root
        .as_array()
        .ok_or_else(|| DataLoadError::malformed(0, "expected a top-level JSON array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, value) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = value
            .as_object()
            .ok_or_else(|| DataLoadError::malformed(row, "not a JSON object"))?;
        if row == 1 {
            check_columns(&obj.keys().collect::<Vec<_>>())?;
        }

        let record = Record {
            order_id: json_text(obj, "order_id", row)?,
            distance_km: json_number(obj, "distance_km", row)?,
            delivery_time_min: json_number(obj, "delivery_time_min", row)?,
            traffic_level: TrafficLevel::parse(&json_text(obj, "traffic_level", row)?),
            delivery_mode: json_text(obj, "delivery_mode", row)?,
            weather: json_text(obj, "weather", row)?,
            restaurant_zone: json_text(obj, "restaurant_zone", row)?,
            customer_zone: json_text(obj, "customer_zone", row)?,
        };
        record.validate(row)?;
        records.push(record);
    }
    Ok(records)
}

fn json_field<'v>(
    obj: &'v Map<String, JsonValue>,
    col: &str,
) -> Result<&'v JsonValue, DataLoadError> {
    obj.get(col)
        .ok_or_else(|| DataLoadError::MissingColumn(col.to_string()))
}

fn json_text(obj: &Map<String, JsonValue>, col: &str, row: usize) -> Result<String, DataLoadError> {
    match json_field(obj, col)? {
        JsonValue::String(s) => Ok(s.trim().to_string()),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(DataLoadError::malformed(
            row,
            format!("'{col}' must be text, got {other}"),
        )),
    }
}

fn json_number(obj: &Map<String, JsonValue>, col: &str, row: usize) -> Result<f64, DataLoadError> {
    json_field(obj, col)?
        .as_f64()
        .ok_or_else(|| DataLoadError::malformed(row, format!("'{col}' is not a number")))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// Numeric columns may be Float64/Float32/Int64/Int32; text columns
/// Utf8/LargeUtf8 (`order_id` may also be an integer column).
fn load_parquet(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut row_base = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let names: Vec<String> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        check_columns(&names)?;

        let order_id = column(&batch, "order_id")?;
        let distance = column(&batch, "distance_km")?;
        let time = column(&batch, "delivery_time_min")?;
        let traffic = column(&batch, "traffic_level")?;
        let mode = column(&batch, "delivery_mode")?;
        let weather = column(&batch, "weather")?;
        let restaurant = column(&batch, "restaurant_zone")?;
        let customer = column(&batch, "customer_zone")?;

        for i in 0..batch.num_rows() {
            let row = row_base + i + 1;
            let record = Record {
                order_id: text_cell(order_id, i, "order_id", row)?,
                distance_km: numeric_cell(distance, i, "distance_km", row)?,
                delivery_time_min: numeric_cell(time, i, "delivery_time_min", row)?,
                traffic_level: TrafficLevel::parse(&text_cell(traffic, i, "traffic_level", row)?),
                delivery_mode: text_cell(mode, i, "delivery_mode", row)?,
                weather: text_cell(weather, i, "weather", row)?,
                restaurant_zone: text_cell(restaurant, i, "restaurant_zone", row)?,
                customer_zone: text_cell(customer, i, "customer_zone", row)?,
            };
            record.validate(row)?;
            records.push(record);
        }
        row_base += batch.num_rows();
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef, DataLoadError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
}

fn numeric_cell(col: &ArrayRef, i: usize, name: &str, row: usize) -> Result<f64, DataLoadError> {
    if col.is_null(i) {
        return Err(DataLoadError::malformed(row, format!("'{name}' is null")));
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(i),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(i) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(i) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(i) as f64,
        other => {
            return Err(DataLoadError::malformed(
                row,
                format!("'{name}' has unsupported type {other:?}"),
            ))
        }
    };
    Ok(value)
}

fn text_cell(col: &ArrayRef, i: usize, name: &str, row: usize) -> Result<String, DataLoadError> {
    if col.is_null(i) {
        return Err(DataLoadError::malformed(row, format!("'{name}' is null")));
    }
    let value = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(i).trim().to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(i).trim().to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(i).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(i).to_string(),
        other => {
            return Err(DataLoadError::malformed(
                row,
                format!("'{name}' has unsupported type {other:?}"),
            ))
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::{Builder, NamedTempFile};

    use super::*;

    const HEADER: &str =
        "order_id,distance_km,delivery_time_min,traffic_level,delivery_mode,weather,restaurant_zone,customer_zone";

    fn temp_with(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_csv_with_extra_columns() {
        let content = format!(
            "{HEADER},rating\n\
             1,3.5,25.0,Low,Bike,Sunny,Zone A,Zone B,4\n\
             2,12.25,48.0,High,Car,Rainy,Zone C,Zone A,5\n"
        );
        let file = temp_with(".csv", &content);

        let store = load_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        let first = &store.records()[0];
        assert_eq!(first.order_id, "1");
        assert_eq!(first.distance_km, 3.5);
        assert_eq!(first.traffic_level, TrafficLevel::Low);
        assert_eq!(first.restaurant_zone, "Zone A");
        assert_eq!(store.distance_bounds(), (3, 12));
    }

    #[test]
    fn loads_tsv() {
        let content = format!(
            "{}\n7\t2.0\t15.0\tMedium\tScooter\tCloudy\tNorth\tSouth\n\
             8\t6.5\t29.0\tLow\tBike\tSunny\tEast\tWest\n",
            HEADER.replace(',', "\t")
        );
        let file = temp_with(".tsv", &content);
        let store = load_file(file.path()).unwrap();
        assert_eq!(store.records()[0].delivery_mode, "Scooter");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let file = temp_with(
            ".csv",
            "order_id,distance_km,delivery_time_min,traffic_level,delivery_mode,restaurant_zone,customer_zone\n\
             1,3.5,25.0,Low,Bike,Zone A,Zone B\n",
        );
        match load_file(file.path()) {
            Err(DataLoadError::MissingColumn(col)) => assert_eq!(col, "weather"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_distance_is_malformed() {
        let content = format!("{HEADER}\n1,far,25.0,Low,Bike,Sunny,Zone A,Zone B\n");
        let file = temp_with(".csv", &content);
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::Malformed { row: 1, .. })
        ));
    }

    #[test]
    fn negative_time_is_malformed() {
        let content = format!("{HEADER}\n1,2.0,-3.0,Low,Bike,Sunny,Zone A,Zone B\n");
        let file = temp_with(".csv", &content);
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::Malformed { .. })
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let file = temp_with(".csv", &format!("{HEADER}\n"));
        assert!(matches!(load_file(file.path()), Err(DataLoadError::Empty)));
    }

    #[test]
    fn single_kilometre_band_is_rejected() {
        let content = format!(
            "{HEADER}\n1,3.1,25.0,Low,Bike,Sunny,Zone A,Zone B\n2,3.9,30.0,High,Car,Rainy,Zone C,Zone A\n"
        );
        let file = temp_with(".csv", &content);
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::NarrowDistanceSpan { bound: 3 })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = temp_with(".xlsx", "");
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_json_records_with_numeric_ids() {
        let file = temp_with(
            ".json",
            r#"[
                {"order_id": 101, "distance_km": 4, "delivery_time_min": 31.5,
                 "traffic_level": "High", "delivery_mode": "Bike", "weather": "Windy",
                 "restaurant_zone": "Centro", "customer_zone": "Norte"},
                {"order_id": "102", "distance_km": 7.25, "delivery_time_min": 40,
                 "traffic_level": "Low", "delivery_mode": "Car", "weather": "Sunny",
                 "restaurant_zone": "Sur", "customer_zone": "Centro"}
            ]"#,
        );
        let store = load_file(file.path()).unwrap();
        let r = &store.records()[0];
        assert_eq!(r.order_id, "101");
        assert_eq!(r.distance_km, 4.0);
        assert_eq!(r.weather, "Windy");
        assert_eq!(store.records()[1].order_id, "102");
    }

    #[test]
    fn loads_parquet_with_integer_ids() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("order_id", DataType::Int64, false),
            Field::new("distance_km", DataType::Float64, false),
            Field::new("delivery_time_min", DataType::Float64, false),
            Field::new("traffic_level", DataType::Utf8, false),
            Field::new("delivery_mode", DataType::Utf8, false),
            Field::new("weather", DataType::Utf8, false),
            Field::new("restaurant_zone", DataType::Utf8, false),
            Field::new("customer_zone", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![2.5, 8.0])),
                Arc::new(Float64Array::from(vec![20.0, 41.0])),
                Arc::new(StringArray::from(vec!["Low", "Medium"])),
                Arc::new(StringArray::from(vec!["Bike", "Car"])),
                Arc::new(StringArray::from(vec!["Sunny", "Rainy"])),
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec!["C", "D"])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let store = load_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[1].order_id, "2");
        assert_eq!(store.records()[1].traffic_level, TrafficLevel::Medium);
        assert_eq!(store.delivery_modes(), ["Bike", "Car"]);
    }
}
