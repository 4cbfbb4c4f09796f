use bigdecimal::BigDecimal;
use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use pretty_assertions::assert_eq;
use sqlcell::prelude::*;

/// Encode as a one-element array so quoted literals go through the same
/// unquoting path the server's array output does, then decode.
fn round_trip(value: &Value, type_text: &str) -> Value {
    let literal = encode(&vec![value.clone()]).expect("encode failed");
    let ty = parse_type(&format!("Array(Nullable({}))", type_text));
    let decoded = decode(&literal, &ty).unwrap_or_else(|e| panic!("decode of {} failed: {}", literal, e));
    match decoded {
        Value::Sequence(mut items) if items.len() == 1 => items.remove(0),
        other => panic!("expected one element, got {:?}", other),
    }
}

fn assert_round_trips(type_text: &str, values: Vec<Value>) {
    for value in values {
        assert_eq!(round_trip(&value, type_text), value, "type {}", type_text);
    }
}

#[test]
fn test_integer_round_trips() {
    assert_round_trips(
        "Int8",
        vec![i8::MIN.into(), i8::MAX.into(), 0i8.into(), (-1i8).into(), Value::Null],
    );
    assert_round_trips(
        "Int16",
        vec![i16::MIN.into(), i16::MAX.into(), 0i16.into(), (-7i16).into(), Value::Null],
    );
    assert_round_trips(
        "Int32",
        vec![i32::MIN.into(), i32::MAX.into(), 0i32.into(), (-42i32).into(), Value::Null],
    );
    assert_round_trips(
        "Int64",
        vec![i64::MIN.into(), i64::MAX.into(), 0i64.into(), (-42i64).into(), Value::Null],
    );
    assert_round_trips("UInt8", vec![u8::MIN.into(), u8::MAX.into(), Value::Null]);
    assert_round_trips("UInt16", vec![u16::MIN.into(), u16::MAX.into(), Value::Null]);
    assert_round_trips("UInt32", vec![u32::MIN.into(), u32::MAX.into(), Value::Null]);
    assert_round_trips("UInt64", vec![u64::MIN.into(), u64::MAX.into(), Value::Null]);
}

#[test]
fn test_float_round_trips() {
    assert_round_trips(
        "Float32",
        vec![f32::MIN.into(), f32::MAX.into(), 0f32.into(), (-1.5f32).into(), f32::INFINITY.into()],
    );
    assert_round_trips(
        "Float64",
        vec![
            f64::MIN.into(),
            f64::MAX.into(),
            f64::MIN_POSITIVE.into(),
            (-0.1f64).into(),
            f64::NEG_INFINITY.into(),
            Value::Null,
        ],
    );

    let nan = round_trip(&f64::NAN.into(), "Float64");
    assert!(nan.as_f64().is_some_and(f64::is_nan));
}

#[test]
fn test_decimal_bool_string_round_trips() {
    let decimals = ["0", "-0.000000001", "99999999999999999999999999999.999999999", "1E+5"];
    assert_round_trips(
        "Decimal(38,9)",
        decimals
            .iter()
            .map(|d| Value::Scalar(Scalar::Decimal(d.parse::<BigDecimal>().unwrap())))
            .collect(),
    );
    assert_round_trips("Boolean", vec![true.into(), false.into(), Value::Null]);
    assert_round_trips(
        "String",
        vec![
            "".into(),
            "plain".into(),
            "it's".into(),
            "a,b".into(),
            r"back\slash".into(),
            "[x]".into(),
            "(y)".into(),
            "NULL".into(),
            r"\N".into(),
            Value::Null,
        ],
    );
    assert_round_trips(
        "Bytea",
        vec![Value::Scalar(Scalar::Bytes(vec![])), Value::Scalar(Scalar::Bytes(vec![0, 0xff, 0x10]))],
    );
}

#[test]
fn test_temporal_round_trips() {
    let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let late = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();
    assert_round_trips("Date", vec![date.into(), late.into(), Value::Null]);

    let whole = late.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap());
    assert_round_trips("DateTime", vec![whole.into(), Value::Null]);

    let tokyo = chrono_tz::Asia::Tokyo;
    let micros = late.and_time(NaiveTime::from_hms_micro_opt(1, 2, 3, 456).unwrap());
    let nanos = late.and_time(NaiveTime::from_hms_nano_opt(1, 2, 3, 1).unwrap());
    assert_round_trips(
        "DateTime64(9, 'Asia/Tokyo')",
        vec![
            tokyo.from_local_datetime(&micros).unwrap().into(),
            tokyo.from_local_datetime(&nanos).unwrap().into(),
            tokyo.from_local_datetime(&whole).unwrap().into(),
        ],
    );

    let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    assert_round_trips(
        "TimestampTz",
        vec![offset.from_local_datetime(&micros).unwrap().into(), Value::Null],
    );
}

#[test]
fn test_flat_array_with_null_sentinel() {
    let ty = parse_type("Array(Int32)");
    let v = decode("[1,2,3,\\N,5]", &ty).unwrap();
    assert_eq!(
        v,
        Value::Sequence(vec![1i32.into(), 2i32.into(), 3i32.into(), Value::Null, 5i32.into()])
    );
}

#[test]
fn test_comma_inside_quotes() {
    let ty = parse_type("Array(String)");
    assert_eq!(decode("['1','2,','3']", &ty).unwrap(), Value::from(vec!["1", "2,", "3"]));
}

#[test]
fn test_array_of_tuples() {
    let ty = parse_type("Array(Tuple(Int32,String))");
    assert_eq!(
        decode("[(1,'a'),(2,'b')]", &ty).unwrap(),
        Value::Sequence(vec![
            Value::Tuple(vec![1i32.into(), "a".into()]),
            Value::Tuple(vec![2i32.into(), "b".into()]),
        ])
    );
}

#[test]
fn test_nested_arrays() {
    let ty = parse_type("Array(Array(Int32))");
    assert_eq!(
        decode("[[1,2],[3]]", &ty).unwrap(),
        Value::Sequence(vec![
            Value::from(vec![1i32, 2]),
            Value::from(vec![3i32]),
        ])
    );
}

#[test]
fn test_nullable_scalar() {
    let ty = parse_type("NULLABLE(Int32)");
    let scalar = ty.as_scalar().unwrap();
    assert_eq!(scalar.kind, Kind::Int32);
    assert!(scalar.nullable);
    assert_eq!(decode("\\N", &ty).unwrap(), Value::Null);
}

#[test]
fn test_decimal_arguments() {
    let ty = parse_type("Decimal(18,4)");
    let s = ty.as_scalar().unwrap();
    assert_eq!((s.precision, s.scale), (18, 4));

    let ty = parse_type("Decimal");
    let s = ty.as_scalar().unwrap();
    assert_eq!((s.precision, s.scale), Kind::Decimal.default_precision_scale());
}

#[test]
fn test_unknown_type_is_not_an_error() {
    let ty = parse_type("Blob");
    assert_eq!(ty.as_scalar().unwrap().kind, Kind::Unknown);
    assert_eq!(decode("\\x00", &ty).unwrap(), Value::from("\\x00"));
}

#[test]
fn test_injection_attempt_is_escaped() {
    assert_eq!(encode("105' OR 1=1--'").unwrap(), r"'105\' OR 1=1--\''");
    // a trailing backslash must not swallow the closing quote
    assert_eq!(encode(r"x\").unwrap(), r"'x\\'");
}

#[test]
fn test_brackets_in_quoted_tuple_strings() {
    let ty = parse_type("Array(Array(Tuple(Int32,String)))");
    let v = decode("[[(1,'(a))'),(2,'[b]')],[(3,'d')]]", &ty).unwrap();
    assert_eq!(
        v,
        Value::Sequence(vec![
            Value::Sequence(vec![
                Value::Tuple(vec![1i32.into(), "(a))".into()]),
                Value::Tuple(vec![2i32.into(), "[b]".into()]),
            ]),
            Value::Sequence(vec![Value::Tuple(vec![3i32.into(), "d".into()])]),
        ])
    );
}

#[test]
fn test_encode_nested_strings() {
    assert_eq!(encode(&vec![vec!["a", "b"], vec!["c"]]).unwrap(), "[['a','b'],['c']]");
}

#[test]
fn test_nested_round_trip() {
    let value = Value::Sequence(vec![
        Value::Tuple(vec![1i32.into(), Value::from(vec!["x'", "]"])]),
        Value::Null,
    ]);
    let literal = encode(&value).unwrap();
    assert_eq!(literal, r"[(1,['x\'',']']),\N]");
    let ty = parse_type("Array(Nullable(Tuple(Int32, Array(String))))");
    assert_eq!(decode(&literal, &ty).unwrap(), value);
}

#[test]
fn test_multi_dimension_tuple_array_fields_round_trip() {
    let pair = |a: i32, b: i32| Value::Tuple(vec![Value::from(vec![a]), Value::from(vec![b])]);
    let value = Value::Sequence(vec![
        Value::Sequence(vec![pair(1, 2), pair(3, 4)]),
        Value::Sequence(vec![pair(5, 6)]),
    ]);
    let literal = encode(&value).unwrap();
    assert_eq!(literal, "[[([1],[2]),([3],[4])],[([5],[6])]]");

    let ty = parse_type("Array(Array(Tuple(Array(Int32), Array(Int32))))");
    assert_eq!(decode(&literal, &ty).unwrap(), value);

    let single = Value::Sequence(vec![Value::Sequence(vec![pair(1, 2)])]);
    assert_eq!(decode(&encode(&single).unwrap(), &ty).unwrap(), single);
}

#[test]
fn test_deeply_wrapped_type_text_is_capped() {
    let text = format!("{}Int32{}", "Nullable(".repeat(5_000), ")".repeat(5_000));
    let schema = ResultSchema::new(&[ColumnDescriptor::new("x", text)]);
    let ty = schema.column_type(0).unwrap();
    assert_eq!(ty.as_scalar().unwrap().kind, Kind::Unknown);
    assert_eq!(schema.decode_row(&["\\N"]).unwrap().get(0), Some(&Value::Null));
}

#[test]
fn test_result_set_decoding() {
    let schema = ResultSchema::new(&[
        ColumnDescriptor::new("id", "Int64"),
        ColumnDescriptor::new("created", "DateTime64(3, 'Europe/Berlin')"),
        ColumnDescriptor::new("labels", "Array(Nullable(String))"),
    ]);
    let rows = [
        ["1", "2024-07-01 12:00:00.5", "['a',NULL]"],
        ["2", "2024-07-01 12:00:01", "[]"],
    ];
    let decoded: Vec<Row> = rows.iter().map(|r| schema.decode_row(r).unwrap()).collect();

    assert_eq!(decoded[0].get_by_name("ID"), Some(&Value::from(1i64)));
    assert_eq!(decoded[1].get(2), Some(&Value::Sequence(vec![])));

    let berlin = chrono_tz::Europe::Berlin;
    let expected = berlin
        .from_local_datetime(
            &NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_hms_milli_opt(12, 0, 0, 500)
                .unwrap(),
        )
        .unwrap();
    assert_eq!(decoded[0].get(1), Some(&Value::from(expected)));
}

#[test]
fn test_schema_shared_across_threads() {
    let schema = std::sync::Arc::new(ResultSchema::new(&[ColumnDescriptor::new(
        "n",
        "Array(UInt32)",
    )]));
    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let schema = std::sync::Arc::clone(&schema);
            std::thread::spawn(move || {
                let cell = format!("[{},{}]", i, i + 1);
                schema.decode_row(&[cell.as_str()]).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let row = handle.join().unwrap();
        let i = i as u32;
        assert_eq!(row.get(0), Some(&Value::from(vec![i, i + 1])));
    }
}

#[test]
fn test_error_messages_carry_context() {
    let schema = ResultSchema::new(&[ColumnDescriptor::new("ids", "Array(Int32)")]);
    let err = schema.decode_row(&["[1,two]"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Column 0 ('ids'): Cannot convert 'two' to Array(Int32) (element Int32): invalid digit found in string"
    );
}
