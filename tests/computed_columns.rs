//! Computed columns: installation, dependency-driven recalculation, and
//! the evaluation semantics visible through them.

mod common;

use common::{col, init_logging, TableBuilder};
use tablecore::{
    BinaryOp, Error, Expr, RowVersion, StorageType, TableId, TableSet, Value,
};

fn setup() -> (TableSet, TableId) {
    init_logging();
    let mut set = TableSet::new();
    let items = TableBuilder::new("items")
        .column("price", StorageType::Int32)
        .column("doubled", StorageType::Int32)
        .column("ratio", StorageType::Double)
        .build(&mut set);
    (set, items)
}

#[test]
fn test_computed_on_insert() {
    let (mut set, items) = setup();
    set.set_computed_column(
        items,
        "doubled",
        Expr::binary(
            BinaryOp::Multiply,
            Expr::column("price"),
            Expr::value(Value::Int32(2)),
        ),
    )
    .unwrap();

    let row = set.insert(items, vec![Value::Int32(21)]).unwrap();
    let doubled = col(&set, items, "doubled");
    assert_eq!(
        set.value(items, row, doubled, RowVersion::Default),
        Ok(Value::Int32(42))
    );
}

#[test]
fn test_installation_computes_existing_rows() {
    let (mut set, items) = setup();
    let row = set.insert(items, vec![Value::Int32(10)]).unwrap();

    set.set_computed_column(
        items,
        "doubled",
        Expr::binary(
            BinaryOp::Multiply,
            Expr::column("price"),
            Expr::value(Value::Int32(2)),
        ),
    )
    .unwrap();

    let doubled = col(&set, items, "doubled");
    assert_eq!(
        set.value(items, row, doubled, RowVersion::Default),
        Ok(Value::Int32(20))
    );
}

#[test]
fn test_recalc_on_set_value() {
    let (mut set, items) = setup();
    set.set_computed_column(
        items,
        "doubled",
        Expr::binary(
            BinaryOp::Multiply,
            Expr::column("price"),
            Expr::value(Value::Int32(2)),
        ),
    )
    .unwrap();
    let row = set.insert(items, vec![Value::Int32(1)]).unwrap();

    let price = col(&set, items, "price");
    let doubled = col(&set, items, "doubled");
    set.set_value(items, row, price, Value::Int32(5)).unwrap();
    assert_eq!(
        set.value(items, row, doubled, RowVersion::Default),
        Ok(Value::Int32(10))
    );

    // Writing the same value again leaves the result unchanged.
    set.set_value_silent(items, row, price, Value::Int32(5))
        .unwrap();
    assert_eq!(
        set.value(items, row, doubled, RowVersion::Default),
        Ok(Value::Int32(10))
    );
}

#[test]
fn test_chained_recalculation_order() {
    init_logging();
    let mut set = TableSet::new();
    let t = TableBuilder::new("chain")
        .column("a", StorageType::Int32)
        .column("b", StorageType::Int32)
        .column("c", StorageType::Int32)
        .build(&mut set);

    // b = a + 1, c = b * 2; c must see the fresh b.
    set.set_computed_column(
        t,
        "b",
        Expr::binary(BinaryOp::Add, Expr::column("a"), Expr::value(Value::Int32(1))),
    )
    .unwrap();
    set.set_computed_column(
        t,
        "c",
        Expr::binary(
            BinaryOp::Multiply,
            Expr::column("b"),
            Expr::value(Value::Int32(2)),
        ),
    )
    .unwrap();

    let row = set.insert(t, vec![Value::Int32(3)]).unwrap();
    assert_eq!(
        set.value(t, row, col(&set, t, "b"), RowVersion::Default),
        Ok(Value::Int32(4))
    );
    assert_eq!(
        set.value(t, row, col(&set, t, "c"), RowVersion::Default),
        Ok(Value::Int32(8))
    );

    let a = col(&set, t, "a");
    set.set_value(t, row, a, Value::Int32(10)).unwrap();
    assert_eq!(
        set.value(t, row, col(&set, t, "c"), RowVersion::Default),
        Ok(Value::Int32(22))
    );
}

#[test]
fn test_cycles_are_refused_at_bind() {
    init_logging();
    let mut set = TableSet::new();
    let t = TableBuilder::new("cyclic")
        .column("x", StorageType::Int32)
        .column("y", StorageType::Int32)
        .build(&mut set);

    set.set_computed_column(
        t,
        "y",
        Expr::binary(BinaryOp::Add, Expr::column("x"), Expr::value(Value::Int32(1))),
    )
    .unwrap();
    assert_eq!(
        set.set_computed_column(
            t,
            "x",
            Expr::binary(BinaryOp::Add, Expr::column("y"), Expr::value(Value::Int32(1))),
        ),
        Err(Error::ExpressionCircular("x".to_string()))
    );
    // Direct self-reference is refused too.
    assert_eq!(
        set.set_computed_column(
            t,
            "x",
            Expr::binary(BinaryOp::Add, Expr::column("x"), Expr::value(Value::Int32(1))),
        ),
        Err(Error::ExpressionCircular("x".to_string()))
    );
}

#[test]
fn test_integer_division_yields_double() {
    let (mut set, items) = setup();
    set.set_computed_column(
        items,
        "ratio",
        Expr::binary(
            BinaryOp::Divide,
            Expr::column("price"),
            Expr::value(Value::Int32(2)),
        ),
    )
    .unwrap();

    let row = set.insert(items, vec![Value::Int32(7)]).unwrap();
    assert_eq!(
        set.value(items, row, col(&set, items, "ratio"), RowVersion::Default),
        Ok(Value::Double(3.5))
    );
}

#[test]
fn test_modulo_narrowing_overflow_surfaces_on_insert() {
    init_logging();
    let mut set = TableSet::new();
    let t = TableBuilder::new("mods")
        .column("u", StorageType::UInt16)
        .column("m", StorageType::UInt16)
        .build(&mut set);
    // The lone literal adopts the unsigned column type; the signed
    // intermediate remainder is negative and cannot narrow into it.
    set.set_computed_column(
        t,
        "m",
        Expr::binary(
            BinaryOp::Modulo,
            Expr::value(Value::Int16(-5)),
            Expr::column("u"),
        ),
    )
    .unwrap();

    assert_eq!(
        set.insert(t, vec![Value::UInt16(3)]),
        Err(Error::Overflow(StorageType::UInt16))
    );
}

#[test]
fn test_null_operand_propagates_into_the_result() {
    init_logging();
    let mut set = TableSet::new();
    let t = TableBuilder::new("flags")
        .column("a", StorageType::Int32)
        .column("is_five", StorageType::Boolean)
        .build(&mut set);
    set.set_computed_column(
        t,
        "is_five",
        Expr::binary(BinaryOp::Equal, Expr::column("a"), Expr::value(Value::Int32(5))),
    )
    .unwrap();

    let with_null = set.insert(t, vec![Value::Null]).unwrap();
    let with_five = set.insert(t, vec![Value::Int32(5)]).unwrap();

    let is_five = col(&set, t, "is_five");
    assert_eq!(
        set.value(t, with_null, is_five, RowVersion::Default),
        Ok(Value::Null)
    );
    assert_eq!(
        set.value(t, with_five, is_five, RowVersion::Default),
        Ok(Value::Boolean(true))
    );
}

#[test]
fn test_computed_columns_are_read_only() {
    let (mut set, items) = setup();
    set.set_computed_column(
        items,
        "doubled",
        Expr::binary(
            BinaryOp::Multiply,
            Expr::column("price"),
            Expr::value(Value::Int32(2)),
        ),
    )
    .unwrap();
    let row = set.insert(items, vec![Value::Int32(1)]).unwrap();

    let doubled = col(&set, items, "doubled");
    assert_eq!(
        set.set_value(items, row, doubled, Value::Int32(99)),
        Err(Error::ReadOnly("doubled".to_string()))
    );
}

#[test]
fn test_unknown_column_reference() {
    let (mut set, items) = setup();
    assert_eq!(
        set.set_computed_column(items, "doubled", Expr::column("missing")),
        Err(Error::ColumnNotFound("missing".to_string()))
    );
}

#[test]
fn test_membership_and_logic_through_columns() {
    init_logging();
    let mut set = TableSet::new();
    let t = TableBuilder::new("screen")
        .column("code", StorageType::Int32)
        .column("flag", StorageType::Boolean)
        .build(&mut set);
    // flag = code In (1, 2, 3) And code <> 2
    set.set_computed_column(
        t,
        "flag",
        Expr::binary(
            BinaryOp::And,
            Expr::in_list(
                Expr::column("code"),
                vec![
                    Expr::value(Value::Int32(1)),
                    Expr::value(Value::Int32(2)),
                    Expr::value(Value::Int32(3)),
                ],
            ),
            Expr::binary(
                BinaryOp::NotEqual,
                Expr::column("code"),
                Expr::value(Value::Int32(2)),
            ),
        ),
    )
    .unwrap();

    let one = set.insert(t, vec![Value::Int32(1)]).unwrap();
    let two = set.insert(t, vec![Value::Int32(2)]).unwrap();
    let nine = set.insert(t, vec![Value::Int32(9)]).unwrap();
    let null = set.insert(t, vec![Value::Null]).unwrap();

    let flag = col(&set, t, "flag");
    let read = |set: &TableSet, row| set.value(t, row, flag, RowVersion::Default);
    assert_eq!(read(&set, one), Ok(Value::Boolean(true)));
    assert_eq!(read(&set, two), Ok(Value::Boolean(false)));
    assert_eq!(read(&set, nine), Ok(Value::Boolean(false)));
    // Null code: In yields Null, And(Null, Null-ish) stays Null.
    assert_eq!(read(&set, null), Ok(Value::Null));
}

#[test]
fn test_case_folding_follows_table_options() {
    init_logging();
    let mut set = TableSet::new();
    let mut table = tablecore::Table::new("names").with_string_compare(
        tablecore::StringCompareOptions {
            case_sensitive: false,
            ordinal: false,
        },
    );
    table.add_column(tablecore::Column::new("name", StorageType::String));
    table.add_column(tablecore::Column::new("is_ada", StorageType::Boolean));
    let t = set.add_table(table).unwrap();

    set.set_computed_column(
        t,
        "is_ada",
        Expr::binary(
            BinaryOp::Equal,
            Expr::column("name"),
            Expr::value(Value::String("ada".into())),
        ),
    )
    .unwrap();

    let row = set.insert(t, vec![Value::String("Ada".into())]).unwrap();
    assert_eq!(
        set.value(t, row, col(&set, t, "is_ada"), RowVersion::Default),
        Ok(Value::Boolean(true))
    );
}
