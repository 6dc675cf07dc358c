use sqlscope::models::enums::{AnimationStep, JoinKind, StatementKind};
use sqlscope::models::structs::WhereCell;
use sqlscope::query_ast::analyze;
use sqlscope::StepPlan;

#[test]
fn no_from_clause_means_nothing_to_plan() {
    let inputs = [
        "",
        "   ",
        "SELECT 1",
        "UPDATE users SET name = 'x'",
        "not sql at all",
        "SELECT now();",
    ];
    for sql in inputs {
        let q = analyze(sql);
        assert!(q.tables.is_empty(), "tables for {sql:?}");
        assert!(StepPlan::for_query(&q).is_empty(), "plan for {sql:?}");
    }
}

#[test]
fn simple_select_plans_four_steps() {
    let q = analyze("SELECT id, name FROM users;");
    assert_eq!(q.kind, StatementKind::Select);
    assert_eq!(q.tables, vec!["users"]);
    assert_eq!(q.select_columns, vec!["id", "name"]);

    let plan = StepPlan::for_query(&q);
    assert_eq!(
        plan.steps(),
        &[AnimationStep::Parse, AnimationStep::Select, AnimationStep::From, AnimationStep::Result]
    );
    assert!(plan.is_minimal());
}

#[test]
fn join_where_order_by_query() {
    let q = analyze(
        "SELECT u.id FROM users u JOIN orders o ON u.id = o.user_id WHERE u.id = 1 ORDER BY u.id;",
    );
    assert_eq!(q.tables, vec!["u", "o"]);
    assert_eq!(q.joins.len(), 1);
    assert_eq!(q.joins[0].table, "o");
    assert_eq!(q.joins[0].condition, "u.id = o.user_id");
    assert_eq!(q.joins[0].kind, JoinKind::Inner);
    assert_eq!(q.where_conditions, vec!["u.id = 1"]);
    assert_eq!(q.where_cells, vec![WhereCell::new("u.id", "1")]);
    assert_eq!(q.order_by.as_deref(), Some("u.id"));

    let plan = StepPlan::for_query(&q);
    assert_eq!(
        plan.steps(),
        &[
            AnimationStep::Parse,
            AnimationStep::Select,
            AnimationStep::From,
            AnimationStep::Join,
            AnimationStep::Where,
            AnimationStep::OrderBy,
            AnimationStep::Result,
        ]
    );
    assert_eq!(plan.position(AnimationStep::GroupBy), None);
    assert_eq!(plan.position(AnimationStep::Having), None);
    assert_eq!(plan.position(AnimationStep::Where), Some(4));
}

#[test]
fn extraction_is_idempotent() {
    let sql = "select a.x, count(*) from a, b join c on c.id = a.id \
               where a.x = 'k' and b.y > 2 group by a.x having count(*) > 1 order by 2 desc";
    assert_eq!(analyze(sql), analyze(sql));
}

#[test]
fn full_clause_set() {
    let q = analyze(
        "SELECT DISTINCT c.region, SUM(o.total) FROM customers c \
         LEFT JOIN orders o ON o.customer_id = c.id \
         WHERE o.status = 'paid' AND o.total BETWEEN 10 AND 100 \
         GROUP BY c.region HAVING SUM(o.total) > 500 \
         ORDER BY c.region LIMIT 20",
    );
    assert!(q.distinct);
    assert_eq!(q.select_columns, vec!["c.region", "SUM(o.total)"]);
    assert_eq!(q.joins[0].kind, JoinKind::Left);
    assert_eq!(q.where_conditions, vec!["o.status = 'paid'", "o.total BETWEEN 10 AND 100"]);
    assert_eq!(q.where_cells, vec![WhereCell::new("o.status", "paid")]);
    assert_eq!(q.group_by_columns, vec!["c.region"]);
    assert_eq!(q.having_conditions, vec!["SUM(o.total) > 500"]);
    assert_eq!(q.order_by.as_deref(), Some("c.region"));
    assert_eq!(q.limit.as_deref(), Some("20"));
    assert_eq!(StepPlan::for_query(&q).len(), 9);
}

#[test]
fn parenthesised_and_literal_and_stay_whole() {
    let q = analyze("SELECT * FROM t WHERE (a = 1 AND b = 2) OR c = 3 AND note = 'this AND that'");
    assert_eq!(q.where_conditions, vec!["(a = 1 AND b = 2) OR c = 3", "note = 'this AND that'"]);
    assert_eq!(q.where_cells, vec![WhereCell::new("note", "this AND that")]);
}

#[test]
fn repeated_tables_are_deduplicated() {
    let q = analyze(
        "SELECT * FROM users JOIN users ON users.id = users.id \
         JOIN orders ON orders.user_id = users.id",
    );
    assert_eq!(q.tables, vec!["users", "orders"]);
    assert_eq!(q.joins.len(), 2);
}

#[test]
fn comments_do_not_confuse_boundaries() {
    let q = analyze("-- where clause below\nSELECT id /* from nowhere */ FROM items WHERE id = 7");
    assert_eq!(q.tables, vec!["items"]);
    assert_eq!(q.where_cells, vec![WhereCell::new("id", "7")]);
}

#[test]
fn unclosed_subquery_is_not_a_table() {
    for sql in ["SELECT * FROM (", "SELECT * FROM (SELECT id FROM t"] {
        let q = analyze(sql);
        assert!(q.tables.is_empty(), "tables for {sql:?}");
        assert!(StepPlan::for_query(&q).is_empty(), "plan for {sql:?}");
    }
}
