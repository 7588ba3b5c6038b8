use super::*;

#[test]
fn check_enforces_range_and_type() {
    let k = ParamDesc::float("k1", 0.0, -1.0, 1.0);
    assert_eq!(k.check(ParamValue::Float(0.25)).unwrap(), 0.25);
    assert_eq!(k.check(ParamValue::Int(1)).unwrap(), 1.0);
    assert!(matches!(
        k.check(ParamValue::Float(1.5)),
        Err(WarpError::Validation(_))
    ));
    assert!(k.check(ParamValue::Float(f64::NAN)).is_err());

    let it = ParamDesc::int("iterations", 20, 4, 64);
    assert_eq!(it.check(ParamValue::Float(8.0)).unwrap(), 8.0);
    assert!(it.check(ParamValue::Float(8.5)).is_err());
    assert!(it.check(ParamValue::Int(3)).is_err());
    assert_eq!(it.value(12.0), ParamValue::Int(12));
}

#[test]
fn values_parse_untagged() {
    let v: Vec<ParamValue> = serde_json::from_str("[3, 0.5]").unwrap();
    assert_eq!(v, vec![ParamValue::Int(3), ParamValue::Float(0.5)]);
}

#[test]
fn direction_inverse_round_trips() {
    for d in [Direction::Distort, Direction::Undistort] {
        assert_ne!(d.inverse(), d);
        assert_eq!(d.inverse().inverse(), d);
    }
}
