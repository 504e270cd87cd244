use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Sort direction of index scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Ascending = 1,
    Descending = -1,
}

/// The str compared and hashed ignoring ASCII case.
#[repr(transparent)]
pub(crate) struct CaseInsensitiveStr(str);

impl CaseInsensitiveStr {
    pub(crate) fn new(s: &str) -> &Self {
        // SAFETY: CaseInsensitiveStr is repr(transparent) over str
        unsafe { &*(s as *const str as *const CaseInsensitiveStr) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for CaseInsensitiveStr {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for CaseInsensitiveStr {}

impl Hash for CaseInsensitiveStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl Debug for CaseInsensitiveStr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

#[derive(Clone)]
pub(crate) struct CaseInsensitiveString(String);

impl CaseInsensitiveString {
    pub fn new(s: String) -> Self {
        Self(s)
    }
}

impl Deref for CaseInsensitiveString {
    type Target = CaseInsensitiveStr;

    fn deref(&self) -> &Self::Target {
        CaseInsensitiveStr::new(&self.0)
    }
}

impl Borrow<CaseInsensitiveStr> for CaseInsensitiveString {
    fn borrow(&self) -> &CaseInsensitiveStr {
        self
    }
}

impl PartialEq for CaseInsensitiveString {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl Eq for CaseInsensitiveString {}

impl Hash for CaseInsensitiveString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state)
    }
}

impl Debug for CaseInsensitiveString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for CaseInsensitiveString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<String> for CaseInsensitiveString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CaseInsensitiveString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<CaseInsensitiveString> for String {
    fn from(value: CaseInsensitiveString) -> Self {
        value.0
    }
}

/// `[A-Za-z0-9_-]+`
pub(crate) fn is_word(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[test]
fn case_insensitive_eq() {
    use std::collections::HashSet;

    let mut set = HashSet::new();
    set.insert(CaseInsensitiveString::from("Users"));
    assert!(set.contains(CaseInsensitiveStr::new("users")));
    assert!(set.contains(CaseInsensitiveStr::new("USERS")));
    assert!(!set.contains(CaseInsensitiveStr::new("user")));
}

#[test]
fn word_check() {
    assert!(is_word("col_1-a"));
    assert!(!is_word(""));
    assert!(!is_word("a b"));
    assert!(!is_word("$system"));
}
