mod common;

use common::*;
use insta::assert_snapshot;
use shardline_binder::BindEngine;
use shardline_binder::binder::InsertColumns;
use shardline_binder::condition::{EncryptMarkerKind, GeneratedKeyValue};
use shardline_binder::context::{CommonStatementContext, InsertValue, StatementContext};
use shardline_binder::error::BindError;
use shardline_binder::options::AncestorLookup;
use shardline_common::value::ScalarValue;
use sql_ast::ast::*;
use sql_ast::span::Spanned;
use sql_ast::visit::collect_columns;

fn bind(statement: &Statement) -> Result<StatementContext, BindError> {
    let catalog = catalog();
    let rules = rules();
    let options = options();
    BindEngine::new(&catalog, &rules, &options).bind(statement)
}

fn bind_select(select: SelectStatement) -> shardline_binder::context::SelectStatementContext {
    match bind(&Statement::Select(select)).unwrap() {
        StatementContext::Select(context) => context,
        other => panic!("expected a select context, got {other:?}"),
    }
}

fn bind_insert(insert: InsertStatement) -> shardline_binder::context::InsertStatementContext {
    match bind(&Statement::Insert(insert)).unwrap() {
        StatementContext::Insert(context) => context,
        other => panic!("expected an insert context, got {other:?}"),
    }
}

#[test]
fn test_input_is_left_untouched() {
    let statement = Statement::Select(select(
        vec![projection(col("status"))],
        vec![table("t_order", None)],
        Some(eq(col("user_id"), int(1))),
    ));
    let snapshot = statement.clone();
    let context = bind(&statement).unwrap();
    assert_eq!(statement, snapshot);
    assert!(collect_columns(&statement).iter().all(|c| c.bound.is_none()));

    let StatementContext::Select(context) = context else {
        panic!("expected a select context");
    };
    let bound = Statement::Select(context.statement().clone());
    assert_ne!(bound, statement);
    let original_spans: Vec<_> = collect_columns(&statement)
        .iter()
        .map(|c| c.name.span())
        .collect();
    let bound_spans: Vec<_> = collect_columns(&bound)
        .iter()
        .map(|c| c.name.span())
        .collect();
    assert_eq!(original_spans, bound_spans);
}

#[test]
fn test_every_column_is_fully_bound() {
    let context = bind_select(select(
        vec![projection(qcol("o", "status")), projection(col("item_id"))],
        vec![join(
            table("t_order", Some("o")),
            JoinKind::Inner,
            table("t_order_item", Some("i")),
            Some(JoinConstraint::On(eq(
                qcol("o", "order_id"),
                qcol("i", "order_id"),
            ))),
        )],
        Some(eq(qcol("i", "user_id"), int(10))),
    ));
    let statement = Statement::Select(context.statement().clone());
    let columns = collect_columns(&statement);
    assert_eq!(columns.len(), 5);
    for column in columns {
        let bound = column.bound.as_ref().unwrap();
        assert!(!bound.original_database.is_empty());
        assert!(!bound.original_schema.is_empty());
        assert!(!bound.original_table.is_empty());
        assert!(!bound.original_column.is_empty());
        assert_eq!(bound.table_source, TableSourceType::PhysicalTable);
    }
    let tables: Vec<_> = context.tables().iter().map(|t| t.table.as_str()).collect();
    assert_eq!(tables, ["t_order", "t_order_item"]);
    assert_snapshot!(context.routing_conditions(), @"(t_order_item.user_id = 10)");
}

#[test]
fn test_routing_conditions_in_source_order() {
    let predicate = and(
        and(
            eq(col("status"), int(1)),
            in_list(col("order_id"), vec![int(1), int(3)]),
        ),
        between(col("ts"), int(5), int(20)),
    );
    let context = bind_select(select(
        vec![star()],
        vec![table("t_order", None)],
        Some(predicate),
    ));
    let routing = context.routing_conditions();
    assert_eq!(routing.and_conditions.len(), 1);
    assert_eq!(routing.and_conditions[0].conditions.len(), 3);
    assert_snapshot!(
        routing,
        @"(t_order.status = 1 AND t_order.order_id IN (1, 3) AND t_order.ts BETWEEN 5 AND 20)"
    );
}

#[test]
fn test_function_operand_does_not_narrow() {
    let context = bind_select(select(
        vec![star()],
        vec![table("t_order", None)],
        Some(eq(function("f", vec![col("status")]), int(1))),
    ));
    assert!(context.routing_conditions().is_empty());
}

#[test]
fn test_or_branch_without_sharding_column_clears_routing() {
    let context = bind_select(select(
        vec![star()],
        vec![table("t_order", None)],
        Some(or(
            eq(col("user_id"), param(0)),
            eq(function("lower", vec![col("status")]), string("ok")),
        )),
    ));
    assert!(context.routing_conditions().is_empty());
}

#[test]
fn test_star_expands_visible_columns() {
    let context = bind_select(select(vec![star()], vec![table("t_user", Some("u"))], None));
    let labels: Vec<_> = context
        .projections()
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(labels, ["user_id", "name", "pwd"]);
}

#[test]
fn test_insert_without_columns_derives_them() {
    let context = bind_insert(insert_values(
        "t_order",
        &[],
        vec![row(vec![int(1), int(1), string("OK")])],
    ));
    assert_eq!(
        context.columns(),
        &InsertColumns::Derived(vec!["order_id".into(), "user_id".into(), "status".into()])
    );
    assert!(!context.contains_insert_columns());
    let generated = context.generated_key().unwrap();
    assert!(!generated.generated);
    assert_eq!(
        generated.conditions[0].value,
        GeneratedKeyValue::Literal(ScalarValue::Int64(1))
    );
    assert_snapshot!(
        context.routing_conditions(),
        @"(t_order.order_id = 1 AND t_order.user_id = 1 AND t_order.status = 'OK')"
    );
}

#[test]
fn test_insert_parameters_grouped_by_row() {
    let context = bind_insert(insert_values(
        "t_order",
        &["user_id", "status"],
        vec![
            row(vec![param(0), param(1)]),
            row(vec![param(2), param(3)]),
        ],
    ));
    assert_eq!(context.value_list_count(), 2);
    let generated = context.generated_key().unwrap();
    assert!(generated.generated);
    assert!(generated.conditions.is_empty());

    let parameters: Vec<ScalarValue> = vec![1i32.into(), "a".into(), 2i32.into(), "b".into()];
    let grouped = context.grouped_parameters(&parameters);
    assert_eq!(grouped, [&parameters[0..2], &parameters[2..4]]);
    assert_eq!(
        context.parameter_columns(),
        [(0, "user_id"), (1, "status"), (2, "user_id"), (3, "status")]
    );
    assert_eq!(context.value_contexts()[1].parameters_offset(), 2);
    assert_eq!(
        context.value_contexts()[0].value(0),
        Some(&InsertValue::Parameter(0))
    );
    assert_snapshot!(
        context.routing_conditions(),
        @"(t_order.user_id = $1 AND t_order.status = $2) OR (t_order.user_id = $3 AND t_order.status = $4)"
    );
}

#[test]
fn test_insert_set_names_columns() {
    let insert = InsertStatement {
        table: simple_table("t_user", None),
        columns: vec![],
        source: InsertSource::Set(vec![
            assignment(column_ref(None, "user_id"), int(7)),
            assignment(column_ref(None, "pwd"), string("secret")),
        ]),
    };
    let context = bind_insert(insert);
    assert_eq!(
        context.columns(),
        &InsertColumns::Explicit(vec!["user_id".into(), "pwd".into()])
    );
    assert_eq!(context.value_list_count(), 1);
    assert_eq!(context.generated_key(), None);
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].kind, EncryptMarkerKind::InsertValue);
    assert_eq!(markers[0].encryptor, "aes");
}

#[test]
fn test_insert_column_count_mismatch() {
    let err = bind(&Statement::Insert(insert_values(
        "t_order",
        &["order_id", "user_id"],
        vec![row(vec![int(1)])],
    )))
    .unwrap_err();
    assert!(matches!(
        err,
        BindError::ColumnCountMismatch {
            columns: 2,
            values: 1,
            ..
        }
    ));

    let insert_select = InsertStatement {
        table: simple_table("t_order", None),
        columns: vec![column_ref(None, "order_id")],
        source: InsertSource::Select(Box::new(Spanned(
            select(
                vec![projection(col("user_id")), projection(col("name"))],
                vec![table("t_user", None)],
                None,
            ),
            0..0,
        ))),
    };
    let err = bind(&Statement::Insert(insert_select)).unwrap_err();
    assert!(matches!(
        err,
        BindError::ColumnCountMismatch {
            columns: 1,
            values: 2,
            ..
        }
    ));
}

#[test]
fn test_insert_select_exposes_query_context() {
    let context = bind_insert(InsertStatement {
        table: simple_table("t_order_item", None),
        columns: vec![column_ref(None, "order_id"), column_ref(None, "user_id")],
        source: InsertSource::Select(Box::new(Spanned(
            select(
                vec![projection(col("order_id")), projection(col("user_id"))],
                vec![table("t_order", None)],
                Some(eq(col("user_id"), int(3))),
            ),
            0..0,
        ))),
    });
    assert_eq!(context.value_list_count(), 0);
    let tables: Vec<_> = context.tables().iter().map(|t| t.table.as_str()).collect();
    assert_eq!(tables, ["t_order_item", "t_order"]);
    let select = context.insert_select().unwrap();
    assert_snapshot!(select.routing_conditions(), @"(t_order.user_id = 3)");
}

#[test]
fn test_merge_binds_both_sides() {
    let merge = MergeStatement {
        target: simple_table("t_order", Some("a")),
        source: table("t_order_item", Some("b")),
        on: eq(qcol("a", "id"), qcol("b", "order_id")),
        when_matched: Some(MergeUpdate {
            assignments: vec![assignment(
                column_ref(Some("a"), "status"),
                qcol("b", "status"),
            )],
            where_clause: None,
        }),
        when_not_matched: None,
    };
    let context = bind(&Statement::Merge(merge)).unwrap();
    let StatementContext::Common(CommonStatementContext::Merge(context)) = context else {
        panic!("expected a merge context");
    };
    let update = context.statement().when_matched.as_ref().unwrap();
    let Assignment { column, value } = update.assignments[0].value();
    let target = column.value().bound.as_ref().unwrap();
    assert_eq!(target.original_table, "t_order");
    let Expr::Column(source) = value.value() else {
        panic!("expected a column");
    };
    assert_eq!(source.bound.as_ref().unwrap().original_table, "t_order_item");

    let tables: Vec<_> = context.tables().iter().map(|t| t.visible_name()).collect();
    assert_eq!(tables, ["a", "b"]);
    assert!(context.routing_conditions().is_empty());
}

#[test]
fn test_using_column_binds_to_both_sides() {
    let using = |name: &str| {
        let name = ident(name);
        let span = name.span();
        JoinConstraint::Using(vec![Spanned(UsingColumn::new(name), span)])
    };
    let context = bind_select(select(
        vec![star()],
        vec![join(
            table("t_order", Some("o")),
            JoinKind::Inner,
            table("t_order_item", Some("i")),
            Some(using("order_id")),
        )],
        None,
    ));
    let TableRef::Join(join_table) = context.statement().from[0].value() else {
        panic!("expected a join");
    };
    let Some(JoinConstraint::Using(columns)) = &join_table.constraint else {
        panic!("expected USING");
    };
    let column = columns[0].value();
    assert_eq!(column.left.as_ref().unwrap().original_table, "t_order");
    assert_eq!(column.right.as_ref().unwrap().original_table, "t_order_item");

    let err = bind(&Statement::Select(select(
        vec![star()],
        vec![join(
            table("t_order", None),
            JoinKind::Inner,
            table("t_order_item", None),
            Some(using("item_id")),
        )],
        None,
    )))
    .unwrap_err();
    assert!(matches!(
        err,
        BindError::UsingColumnNotFound { ref column, .. } if column == "item_id"
    ));
}

#[test]
fn test_dual_needs_no_metadata() {
    let context = bind_select(select(
        vec![projection(int(1))],
        vec![table("DUAL", None)],
        None,
    ));
    assert!(!context.contains_tables());
    assert_eq!(context.projections()[0].label, "?column?");
}

#[test]
fn test_pseudo_column_stays_unbound() {
    let context = bind_select(select(
        vec![projection(col("ROWNUM"))],
        vec![table("t_order", None)],
        None,
    ));
    let statement = Statement::Select(context.statement().clone());
    assert!(collect_columns(&statement)[0].bound.is_none());
}

#[test]
fn test_binding_errors() {
    let err = bind(&Statement::Select(select(
        vec![star()],
        vec![table("t_missing", None)],
        None,
    )))
    .unwrap_err();
    assert!(matches!(err, BindError::TableNotFound { ref name, .. } if name == "t_missing"));

    let err = bind(&Statement::Select(select(
        vec![projection(qcol("x", "status"))],
        vec![table("t_order", Some("o"))],
        None,
    )))
    .unwrap_err();
    assert!(matches!(
        err,
        BindError::ColumnBinding { ref owner, ref column, .. } if owner == "x" && column == "status"
    ));
}

#[test]
fn test_ancestor_lookup_policy() {
    // SELECT * FROM t_user u WHERE EXISTS (SELECT 1 FROM t_order, t_order_item WHERE name = 'x')
    let statement = || {
        let subquery = select(
            vec![projection(int(1))],
            vec![table("t_order", None), table("t_order_item", None)],
            Some(eq(col("name"), string("x"))),
        );
        let exists = Spanned(
            Expr::Exists {
                query: Box::new(Spanned(subquery, 0..0)),
                negated: false,
            },
            0..0,
        );
        Statement::Select(select(
            vec![star()],
            vec![table("t_user", Some("u"))],
            Some(exists),
        ))
    };
    let bound_owner = |lookup: AncestorLookup| {
        let catalog = catalog();
        let rules = rules();
        let options = options().with_ancestor_lookup(lookup);
        let context = BindEngine::new(&catalog, &rules, &options)
            .bind(&statement())
            .unwrap();
        let StatementContext::Select(context) = context else {
            panic!("expected a select context");
        };
        let statement = Statement::Select(context.statement().clone());
        collect_columns(&statement)
            .into_iter()
            .find(|c| c.name.value().as_str() == "name")
            .and_then(|c| c.bound.clone())
            .map(|b| b.original_table)
    };
    assert_eq!(bound_owner(AncestorLookup::AllAncestors).as_deref(), Some("t_user"));
    assert_eq!(bound_owner(AncestorLookup::CurrentLevel), None);
}

#[test]
fn test_encrypt_markers() {
    let context = bind_select(select(
        vec![star()],
        vec![table("t_user", None)],
        Some(and(eq(col("pwd"), string("x")), eq(col("user_id"), int(1)))),
    ));
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].kind, EncryptMarkerKind::Predicate);
    assert_snapshot!(context.encrypt_conditions(), @"(t_user.pwd = 'x')");

    let pwd = column_ref(None, "pwd");
    let value = string("y");
    let span = pwd.1.start..value.1.end;
    let update = UpdateStatement {
        table: simple_table("t_user", None),
        assignments: vec![assignment(pwd, value)],
        where_clause: Some(eq(col("user_id"), int(1))),
    };
    let StatementContext::Common(context) = bind(&Statement::Update(update)).unwrap() else {
        panic!("expected a common context");
    };
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].kind, EncryptMarkerKind::Assignment);
    assert_eq!(markers[0].span, span);
    assert_eq!(context.routing_conditions().map(|r| r.is_empty()), Some(true));
}

#[test]
fn test_subquery_predicates_are_extracted() {
    let subquery = select(
        vec![projection(col("status"))],
        vec![table("t_order_item", None)],
        Some(eq(col("order_id"), int(5))),
    );
    let context = bind_select(select(
        vec![star()],
        vec![table("t_order", None)],
        Some(and(
            eq(col("user_id"), int(1)),
            in_subquery(col("status"), subquery),
        )),
    ));
    assert_snapshot!(
        context.routing_conditions(),
        @"(t_order.user_id = 1) OR (t_order_item.order_id = 5)"
    );

    let subquery = select(
        vec![projection(col("user_id"))],
        vec![table("t_user", None)],
        Some(eq(col("pwd"), string("x"))),
    );
    let context = bind_select(select(
        vec![star()],
        vec![table("t_order", None)],
        Some(in_subquery(col("user_id"), subquery)),
    ));
    assert!(context.routing_conditions().is_empty());
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].kind, EncryptMarkerKind::Predicate);
    assert_eq!(markers[0].column.to_string(), "t_user.pwd");
    assert_snapshot!(context.encrypt_conditions(), @"(t_user.pwd = 'x')");
}

#[test]
fn test_join_on_predicates_are_extracted() {
    let on = and(
        eq(qcol("o", "user_id"), qcol("u", "user_id")),
        eq(qcol("u", "pwd"), string("x")),
    );
    let context = bind_select(select(
        vec![star()],
        vec![join(
            table("t_order", Some("o")),
            JoinKind::Inner,
            table("t_user", Some("u")),
            Some(JoinConstraint::On(on)),
        )],
        Some(eq(qcol("o", "order_id"), int(3))),
    ));
    assert_snapshot!(context.routing_conditions(), @"(t_order.order_id = 3)");
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].column.to_string(), "t_user.pwd");
    assert_snapshot!(context.encrypt_conditions(), @"(t_user.pwd = 'x')");
}

#[test]
fn test_derived_table_and_exists_predicates_in_source_order() {
    let inner = select(
        vec![projection(col("user_id"))],
        vec![table("t_user", None)],
        Some(eq(col("pwd"), string("a"))),
    );
    let other_users = select(
        vec![projection(int(1))],
        vec![table("t_user", None)],
        Some(binary(col("pwd"), BinaryOp::Ne, string("b"))),
    );
    let context = bind_select(select(
        vec![star()],
        vec![derived(inner, "d")],
        Some(exists(other_users)),
    ));
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 2);
    assert!(markers[0].span.end <= markers[1].span.start);
    assert!(markers.iter().all(|m| m.kind == EncryptMarkerKind::Predicate));
    assert_snapshot!(
        context.encrypt_conditions(),
        @"(t_user.pwd = 'a') OR (t_user.pwd <> 'b')"
    );
}

#[test]
fn test_update_and_delete_extract_subquery_predicates() {
    let users = select(
        vec![projection(col("user_id"))],
        vec![table("t_user", None)],
        Some(eq(col("pwd"), string("p"))),
    );
    let update = UpdateStatement {
        table: simple_table("t_order", None),
        assignments: vec![assignment(column_ref(None, "status"), string("x"))],
        where_clause: Some(in_subquery(col("user_id"), users)),
    };
    let StatementContext::Common(context) = bind(&Statement::Update(update)).unwrap() else {
        panic!("expected a common context");
    };
    let markers = context.encrypt_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].kind, EncryptMarkerKind::Predicate);
    assert_eq!(markers[0].column.to_string(), "t_user.pwd");

    let orders = select(
        vec![projection(col("order_id"))],
        vec![table("t_order", None)],
        Some(eq(col("status"), string("OK"))),
    );
    let delete = DeleteStatement {
        table: simple_table("t_order_item", None),
        where_clause: Some(and(
            eq(col("user_id"), param(0)),
            in_subquery(col("order_id"), orders),
        )),
    };
    let context = bind(&Statement::Delete(delete)).unwrap();
    assert_snapshot!(
        context.routing_conditions().unwrap(),
        @"(t_order_item.user_id = $1) OR (t_order.status = 'OK')"
    );
}

#[test]
fn test_merge_routes_from_on() {
    let merge = MergeStatement {
        target: simple_table("t_order", Some("a")),
        source: table("t_order_item", Some("b")),
        on: and(
            eq(qcol("a", "order_id"), qcol("b", "order_id")),
            eq(qcol("a", "user_id"), int(7)),
        ),
        when_matched: Some(MergeUpdate {
            assignments: vec![assignment(
                column_ref(Some("a"), "status"),
                qcol("b", "status"),
            )],
            where_clause: None,
        }),
        when_not_matched: None,
    };
    let context = bind(&Statement::Merge(merge)).unwrap();
    assert_snapshot!(context.routing_conditions().unwrap(), @"(t_order.user_id = 7)");
}

#[test]
fn test_delete_routes_from_where() {
    let delete = DeleteStatement {
        table: simple_table("t_order_item", None),
        where_clause: Some(in_list(col("order_id"), vec![param(0), param(1)])),
    };
    let context = bind(&Statement::Delete(delete)).unwrap();
    assert_snapshot!(
        context.routing_conditions().unwrap(),
        @"(t_order_item.order_id IN ($1, $2))"
    );
}

#[test]
fn test_dispatch_by_statement_kind() {
    let close = bind(&Statement::CloseCursor(CloseCursorStatement { name: None })).unwrap();
    let StatementContext::Close(close) = close else {
        panic!("expected a close context");
    };
    assert!(close.is_close_all());

    let fetch = bind(&Statement::Fetch(FetchStatement {
        cursor: ident("C1"),
        direction: Direction::Forward(Some(10)),
    }))
    .unwrap();
    assert!(fetch.is_query());
    let StatementContext::Fetch(fetch) = fetch else {
        panic!("expected a fetch context");
    };
    assert_eq!(fetch.cursor(), "c1");

    let cursor = bind(&Statement::DeclareCursor(DeclareCursorStatement {
        name: ident("c1"),
        query: Box::new(Spanned(
            select(vec![star()], vec![table("t_order", None)], None),
            0..0,
        )),
    }))
    .unwrap();
    assert_eq!(cursor.tables().len(), 1);
    assert!(matches!(cursor, StatementContext::Cursor(_)));

    for statement in [Statement::Empty, Statement::Other("BEGIN".into())] {
        let context = bind(&statement).unwrap();
        let StatementContext::Common(common) = &context else {
            panic!("expected a common context");
        };
        assert_eq!(common.passthrough(), Some(&statement));
        assert!(context.routing_conditions().is_none());
    }
}
