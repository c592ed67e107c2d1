use super::*;

#[test]
fn test_new_rejects_mismatched_lengths() {
    let err = MigrationSet::new(["a", "b"], ["x"]).unwrap_err();
    assert!(matches!(err, CoreError::MismatchedPair { up: 2, down: 1 }));
    let msg = err.to_string();
    assert!(msg.contains("2 up scripts"), "{msg}");
    assert!(msg.contains("1 down scripts"), "{msg}");
}

#[test]
fn test_new_accepts_equal_lengths() {
    let set = MigrationSet::new(
        ["CREATE TABLE t1(n text);", "CREATE TABLE t2(n text);"],
        ["DROP TABLE t1;", "DROP TABLE t2;"],
    )
    .unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.max_version(), 2);
    assert!(!set.is_empty());
    assert_eq!(set.up_script(1), Some("CREATE TABLE t2(n text);"));
    assert_eq!(set.down_script(0), Some("DROP TABLE t1;"));
    assert_eq!(set.up_script(2), None);
}

#[test]
fn test_empty_set_is_valid() {
    let set = MigrationSet::new(Vec::<String>::new(), Vec::<String>::new()).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.max_version(), 0);
}

#[test]
fn test_accepts_owned_strings() {
    let up = vec!["CREATE TABLE a(x int);".to_string()];
    let down = vec!["DROP TABLE a;".to_string()];
    let set = MigrationSet::new(up, down).unwrap();
    assert_eq!(set.up_scripts(), ["CREATE TABLE a(x int);".to_string()]);
    assert_eq!(set.down_scripts(), ["DROP TABLE a;".to_string()]);
}
