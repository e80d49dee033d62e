use super::{Keyspace, escape_glob};

#[test]
fn key_is_prefix_followed_by_token() {
    let keyspace = Keyspace::new("scs:session:".to_string());
    assert_eq!(keyspace.key("abc"), "scs:session:abc");
    assert_eq!(keyspace.key(""), "scs:session:");
}

#[test]
fn token_strips_prefix_and_rejects_foreign_keys() {
    let keyspace = Keyspace::new("app:".to_string());
    assert_eq!(keyspace.token("app:t-1"), Some("t-1"));
    assert_eq!(keyspace.token("app:"), Some(""));
    assert_eq!(keyspace.token("other:t-1"), None);
}

#[test]
fn scan_pattern_escapes_glob_metacharacters() {
    let keyspace = Keyspace::new("tenant[1]*?:".to_string());
    assert_eq!(keyspace.scan_pattern(), r"tenant\[1\]\*\?:*");
}

#[test]
fn escape_glob_leaves_plain_text_untouched() {
    assert_eq!(escape_glob("scs:session:"), "scs:session:");
    assert_eq!(escape_glob(r"a\b{c}"), r"a\\b\{c\}");
}

#[test]
fn empty_prefix_scans_everything() {
    let keyspace = Keyspace::new(String::new());
    assert_eq!(keyspace.scan_pattern(), "*");
    assert_eq!(keyspace.token("anything"), Some("anything"));
}
