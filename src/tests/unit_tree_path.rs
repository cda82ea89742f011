use crate::domain::tree_path::{
    ancestor_prefixes, child_path, collapse_prefixes, depth_of, is_child_of, is_descendant_of,
    last_step_index, parent_path,
};

// test that sibling indexes are encoded as fixed-width base 36 steps
#[test]
fn test_child_path_encoding() {
    assert_eq!(child_path("", 1).unwrap(), "0001");
    assert_eq!(child_path("0001", 3).unwrap(), "00010003");
    assert_eq!(child_path("0001", 36).unwrap(), "00010010");
    assert_eq!(child_path("0001", 35).unwrap(), "0001000Z");
}

// test that an index outside of what a step can hold is refused
#[test]
fn test_child_path_out_of_range() {
    assert!(child_path("0001", 0).is_err());
    assert!(child_path("0001", 36 * 36 * 36 * 36).is_err());
    assert!(child_path("0001", 36 * 36 * 36 * 36 - 1).is_ok());
}

#[test]
fn test_last_step_index_reverses_child_path() {
    let path = child_path("0001", 1000).unwrap();
    assert_eq!(last_step_index(&path), Some(1000));
    assert_eq!(last_step_index("0001000A"), Some(10));
    assert_eq!(last_step_index(""), None);
}

#[test]
fn test_parent_and_depth() {
    assert_eq!(depth_of("0001"), 1);
    assert_eq!(depth_of("000100020003"), 3);
    assert_eq!(parent_path("0001"), None);
    assert_eq!(parent_path("00010002"), Some("0001"));
}

// test that descent is a strict prefix relation
#[test]
fn test_descendant_and_child_relations() {
    assert!(is_descendant_of("000100020003", "0001"));
    assert!(is_descendant_of("000100020003", "00010002"));
    assert!(!is_descendant_of("0001", "0001"));
    assert!(!is_descendant_of("00010003", "00010002"));

    assert!(is_child_of("00010002", "0001"));
    assert!(!is_child_of("000100020003", "0001"));
}

#[test]
fn test_ancestor_prefixes_include_self() {
    let prefixes: Vec<&str> = ancestor_prefixes("000100020003").collect();
    assert_eq!(prefixes, vec!["0001", "00010002", "000100020003"]);
}

// test that nested restriction roots collapse to their outermost subtree
#[test]
fn test_collapse_prefixes() {
    let prefixes = vec![
        "00010002".to_string(),
        "0001000200A1".to_string(),
        "00010003".to_string(),
        "00010002".to_string(),
    ];
    assert_eq!(collapse_prefixes(&prefixes), vec!["00010002", "00010003"]);
}
