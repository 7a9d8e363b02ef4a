use crate::{
    MAX_POINT_PER_ORDER,
    aggregate::{
        AggregateFunction, ColumnType, OrderRow, PointAttribution, PointBuffer, Points,
        fold_rows, points_for_quantity,
    },
};

fn rows(quantities: &[Option<i32>]) -> Vec<OrderRow> {
    quantities.iter().copied().map(OrderRow::from).collect()
}

#[test]
fn initialize_starts_at_zero() {
    let buffer = PointAttribution.initialize();

    assert_eq!(buffer.sum(), 0);
    assert_eq!(buffer, PointBuffer::default());
}

#[test]
fn cap_policy_boundaries() {
    assert_eq!(points_for_quantity(0), 0);
    assert_eq!(points_for_quantity(1), 1);
    assert_eq!(points_for_quantity(2), 2);
    assert_eq!(points_for_quantity(MAX_POINT_PER_ORDER), 3);
    assert_eq!(points_for_quantity(4), 3);
    assert_eq!(points_for_quantity(i32::MAX), 3);
}

#[test]
fn negative_quantities_pass_through_uncapped() {
    let agg = PointAttribution;
    let mut buffer = fold_rows(&agg, &rows(&[Some(5)]));
    agg.update(&mut buffer, &OrderRow::new(-2));

    assert_eq!(points_for_quantity(-2), -2);
    assert_eq!(buffer.sum(), 1);
}

#[test]
fn null_quantity_leaves_buffer_unchanged() {
    let agg = PointAttribution;
    let mut buffer = fold_rows(&agg, &rows(&[Some(2), Some(7)]));
    let before = buffer;

    agg.update(&mut buffer, &OrderRow::null());

    assert_eq!(buffer, before);
}

#[test]
fn zero_updates_keep_initial_value() {
    let agg = PointAttribution;
    let buffer = fold_rows(&agg, &rows(&[]));

    assert_eq!(agg.evaluate(&buffer), Points::from(0));
}

#[test]
fn merge_with_fresh_buffer_is_identity() {
    let agg = PointAttribution;
    let built = fold_rows(&agg, &rows(&[Some(1), Some(9), None]));

    let mut left = agg.initialize();
    agg.merge(&mut left, built);
    let mut right = built;
    agg.merge(&mut right, agg.initialize());

    assert_eq!(left, built);
    assert_eq!(right, built);
}

#[test]
fn evaluate_is_an_idempotent_read() {
    let agg = PointAttribution;
    let buffer = fold_rows(&agg, &rows(&[Some(3), Some(1)]));

    let first = agg.evaluate(&buffer);
    let second = agg.evaluate(&buffer);

    assert_eq!(first, second);
    assert_eq!(first.get(), buffer.sum());
}

#[test]
fn end_to_end_single_buffer_and_two_partitions_agree() {
    let agg = PointAttribution;
    let all = rows(&[Some(1), Some(5), Some(3), None, Some(2)]);

    let single = fold_rows(&agg, &all);
    assert_eq!(single.sum(), 9);

    let mut first = fold_rows(&agg, &all[..3]);
    let second = fold_rows(&agg, &all[3..]);
    assert_eq!(first.sum(), 7);
    assert_eq!(second.sum(), 2);

    agg.merge(&mut first, second);
    assert_eq!(agg.evaluate(&first), Points::from(9));
}

#[test]
fn sum_wraps_instead_of_overflowing() {
    let agg = PointAttribution;
    let mut buffer = fold_rows(&agg, &rows(&[Some(i32::MIN)]));
    for _ in 0..32 {
        let copy = buffer;
        agg.merge(&mut buffer, copy);
    }
    assert_eq!(buffer.sum(), i64::MIN);

    let copy = buffer;
    agg.merge(&mut buffer, copy);
    assert_eq!(buffer.sum(), 0);
}

#[test]
fn signature_declares_nullable_int_input_and_determinism() {
    let signature = PointAttribution.signature();

    assert_eq!(signature.name, PointAttribution::NAME);
    assert_eq!(signature.input.len(), 1);
    assert_eq!(signature.input[0].ty, ColumnType::Int32);
    assert!(signature.input[0].nullable);
    assert_eq!(signature.buffer[0].name, "sum");
    assert_eq!(signature.output, ColumnType::Int64);
    assert!(signature.deterministic);
    assert!(signature.allows_reordering());
}

#[test]
fn points_serialize_as_plain_integers() {
    let json = serde_json::to_string(&Points::from(9)).expect("points should serialize");
    assert_eq!(json, "9");

    let row: OrderRow =
        serde_json::from_str(r#"{"quantity":null}"#).expect("null quantity should parse");
    assert_eq!(row, OrderRow::null());
}

#[test]
fn points_sum_across_groups() {
    let total: Points = [Points::from(3), Points::from(4), Points::from(-1)]
        .into_iter()
        .sum();

    assert_eq!(total, Points::from(6));
}
