use sqlscope::diagram_layout::{LayoutDimensions, columns_per_row, compute_layout};
use sqlscope::models::structs::Position;
use sqlscope::query_ast::analyze;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("t{i}")).collect()
}

#[test]
fn five_tables_three_per_row() {
    let dims = LayoutDimensions::default();
    // 660 / (180 + 40) = 3 columns
    let layout = compute_layout(&names(5), 660.0, &dims);
    assert_eq!(layout.columns_per_row, 3);

    let fourth = &layout.positions[3];
    assert_eq!((fourth.row, fourth.col), (1, 0));
    assert_eq!(fourth.pos, Position { x: 40.0, y: 200.0 });
    assert_eq!(layout.get("t2"), Some(Position { x: 480.0, y: 40.0 }));
    assert_eq!(layout.get("t4"), Some(Position { x: 260.0, y: 200.0 }));
}

#[test]
fn narrow_canvas_still_gets_one_column() {
    let dims = LayoutDimensions::default();
    assert_eq!(columns_per_row(10.0, &dims), 1);
    assert_eq!(columns_per_row(f32::NAN, &dims), 1);
    let layout = compute_layout(&names(3), 0.0, &dims);
    assert!(layout.positions.iter().all(|p| p.col == 0));
    assert_eq!(layout.positions[2].row, 2);
}

#[test]
fn layout_is_deterministic() {
    let dims = LayoutDimensions::default();
    let tables = names(7);
    assert_eq!(compute_layout(&tables, 900.0, &dims), compute_layout(&tables, 900.0, &dims));
}

#[test]
fn layout_keys_follow_table_aliases() {
    let q = analyze("SELECT * FROM users u JOIN orders o ON o.user_id = u.id");
    let layout = compute_layout(&q.tables, 960.0, &LayoutDimensions::default());
    assert!(layout.get("u").is_some());
    assert!(layout.get("o").is_some());
    assert!(layout.get("users").is_none());
}
