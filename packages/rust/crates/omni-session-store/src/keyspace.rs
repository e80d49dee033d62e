//! Key namespace: `prefix + token`.

const GLOB_SPECIAL_CHARS: [char; 7] = ['*', '?', '[', ']', '\\', '{', '}'];

/// Immutable prefix shared by every key the store touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Keyspace {
    prefix: String,
    scan_pattern: String,
}

impl Keyspace {
    pub(crate) fn new(prefix: String) -> Self {
        let scan_pattern = format!("{}*", escape_glob(&prefix));
        Self {
            prefix,
            scan_pattern,
        }
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn key(&self, token: &str) -> String {
        format!("{}{token}", self.prefix)
    }

    /// `SCAN MATCH` pattern selecting exactly this namespace.
    pub(crate) fn scan_pattern(&self) -> &str {
        &self.scan_pattern
    }

    pub(crate) fn token<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
    }
}

/// Backslash-escape glob metacharacters so the text only matches itself.
pub(crate) fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if GLOB_SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
#[path = "../tests/unit/keyspace.rs"]
mod tests;
