// Key naming: path flattening and sanitization

/// Name rewriting rules applied identically to every tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRules {
    /// Replace characters outside `[A-Za-z0-9_]` and guard a leading digit
    pub sanitize: bool,
    /// Uppercase the resulting name
    pub upcase: bool,
}

impl Default for KeyRules {
    fn default() -> Self {
        Self {
            sanitize: true,
            upcase: true,
        }
    }
}

impl KeyRules {
    pub fn new(sanitize: bool, upcase: bool) -> Self {
        Self { sanitize, upcase }
    }

    /// Apply sanitization then casing to a logical name
    pub fn apply(&self, name: &str) -> String {
        let name = if self.sanitize {
            sanitize(name)
        } else {
            name.to_string()
        };

        if self.upcase {
            name.to_uppercase()
        } else {
            name
        }
    }
}

/// Rewrite a name into a valid environment identifier
///
/// Idempotent: the output never starts with a digit and contains only
/// `[A-Za-z0-9_]`, so a second pass leaves it unchanged.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }

    out.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));

    out
}

/// Flatten a store path into a logical name relative to its scope root
///
/// `/config/system/web/nest1/nest2/key` under root `/config/system/web`
/// becomes `nest1_nest2_key`. Returns `None` for the root itself and for
/// paths outside the root.
pub fn logical_name(root: &str, path: &str) -> Option<String> {
    let relative = path.strip_prefix(root)?.strip_prefix('/')?;

    let name = relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize("db.host-name"), "db_host_name");
        assert_eq!(sanitize("a b:c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_leading_digit() {
        assert_eq!(sanitize("3scale"), "_3scale");
    }

    #[test]
    fn test_sanitize_non_ascii_is_one_underscore_per_char() {
        assert_eq!(sanitize("café"), "caf_");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for input in ["9lives", "x.y.z", "already_ok", "ü-ber", "__", "0"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
            assert!(once
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_'));
            assert!(!once.starts_with(|c: char| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_rules_apply_order() {
        let rules = KeyRules::new(true, true);
        assert_eq!(rules.apply("db.host"), "DB_HOST");

        let rules = KeyRules::new(false, false);
        assert_eq!(rules.apply("db.host"), "db.host");

        let rules = KeyRules::new(false, true);
        assert_eq!(rules.apply("db.host"), "DB.HOST");
    }

    #[test]
    fn test_logical_name_nested() {
        let root = "/config/system/systemtest";
        assert_eq!(
            logical_name(root, "/config/system/systemtest/nest1/nest2/key").as_deref(),
            Some("nest1_nest2_key")
        );
        assert_eq!(
            logical_name(root, "/config/system/systemtest/testKey").as_deref(),
            Some("testKey")
        );
    }

    #[test]
    fn test_logical_name_root_and_outside() {
        let root = "/config/host/env";
        assert_eq!(logical_name(root, "/config/host/env"), None);
        assert_eq!(logical_name(root, "/config/host/envy/key"), None);
        assert_eq!(logical_name(root, "/elsewhere/key"), None);
    }
}
