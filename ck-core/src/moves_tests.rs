use crate::moves::{Move, Square};

#[test]
fn wire_shape_is_the_exact_tuple() {
    let mv = Move::capture(Square::new(5, 2), Square::new(3, 4), Square::new(4, 3));
    let v = serde_json::to_value(&mv).unwrap();
    assert_eq!(v, serde_json::json!([5, 2, 3, 4, [[4, 3]]]));

    let simple = Move::simple(Square::new(5, 0), Square::new(4, 1));
    let v = serde_json::to_value(&simple).unwrap();
    assert_eq!(v, serde_json::json!([5, 0, 4, 1, []]));
}

#[test]
fn wire_roundtrip_preserves_capture_order() {
    let mv = Move {
        from: Square::new(5, 2),
        to: Square::new(1, 2),
        captured: vec![Square::new(4, 3), Square::new(2, 3)],
    };
    let text = serde_json::to_string(&mv).unwrap();
    let back: Move = serde_json::from_str(&text).unwrap();
    assert_eq!(back, mv);
    assert_eq!(back.captured[0], Square::new(4, 3));
    assert_eq!(back.captured[1], Square::new(2, 3));
}

#[test]
fn is_capture_reflects_captured_squares() {
    assert!(!Move::simple(Square::new(5, 0), Square::new(4, 1)).is_capture());
    assert!(Move::capture(Square::new(4, 1), Square::new(2, 3), Square::new(3, 2)).is_capture());
}
