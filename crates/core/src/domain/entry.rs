// Raw store entry

/// A path/value pair as returned by a recursive store fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Store-absolute, slash-separated path
    pub path: String,
    pub value: String,
    /// Directories carry no value and are skipped during merging
    pub is_directory: bool,
}

impl RawEntry {
    pub fn value(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: String::new(),
            is_directory: true,
        }
    }
}
