// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logical data addresses and the rules used to match them.
//!
//! An [`Address`] names a chunk of binary data (`Assets/Materials/unlit.mat`).
//! When used as a *query*, it is a pattern rather than an exact key:
//!
//! - A leading `*` (optionally followed by `/`) turns the rest of the address
//!   into a suffix: `*/unlit.mat` matches `Assets/Materials/unlit.mat`.
//! - A space in the query stands for `_` or `.` in the stored path.
//! - A `/` in the query stands for a `.` in the stored path, except the
//!   stored path's last `.` (its extension separator), so `a/b.ext` matches
//!   `a.b.ext` but `unlit/mat` does not match `unlit.mat`.
//!
//! Matching is case-sensitive and there is no infix wildcard.

use crate::error::ResolveError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::str::FromStr;

/// Maximum number of bytes an [`Address`] can hold.
pub const ADDRESS_CAPACITY: usize = 255;

/// The marker that turns an address into a suffix pattern.
pub const WILDCARD: u8 = b'*';

/// An immutable, fixed-capacity ASCII address.
///
/// Addresses are plain values: they are `Copy`, need no allocation, and compare
/// equal when their contents are equal. Equality is *not* matching; use
/// [`Address::matches`] to test a query against a stored path.
#[derive(Clone, Copy)]
pub struct Address {
    len: u8,
    bytes: [u8; ADDRESS_CAPACITY],
}

impl Address {
    /// Creates an address from a string, validating it.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidAddress`] when the value is empty, is not
    /// ASCII, exceeds [`ADDRESS_CAPACITY`], or is a wildcard with no suffix
    /// (`*`, `*/`).
    pub fn new(value: &str) -> Result<Self, ResolveError> {
        match check(value.as_bytes()) {
            Some(reason) => Err(ResolveError::InvalidAddress {
                address: value.to_owned(),
                reason,
            }),
            None => Ok(Self::copy_from(value.as_bytes())),
        }
    }

    /// Creates an address from a string known at compile time.
    ///
    /// Used in `const` position, an invalid literal fails the build.
    ///
    /// # Panics
    /// Panics if the literal would be rejected by [`Address::new`].
    pub const fn from_static(value: &'static str) -> Self {
        match check(value.as_bytes()) {
            Some(_) => panic!("invalid static address"),
            None => Self::copy_from(value.as_bytes()),
        }
    }

    /// Returns the address declared by a [`DataReference`] type.
    pub const fn of<R: DataReference>() -> Self {
        R::ADDRESS
    }

    const fn copy_from(value: &[u8]) -> Self {
        let mut bytes = [0u8; ADDRESS_CAPACITY];
        let mut i = 0;
        while i < value.len() {
            bytes[i] = value[i];
            i += 1;
        }
        Self {
            len: value.len() as u8,
            bytes,
        }
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction only accepts ASCII, so this never falls back.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Returns the raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Returns the address interpreted as a filesystem path.
    pub fn as_path(&self) -> &Path {
        Path::new(self.as_str())
    }

    /// Returns the length of the address in bytes. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if this address is a suffix pattern.
    pub fn is_wildcard(&self) -> bool {
        self.bytes[0] == WILDCARD
    }

    /// Returns `true` if `self`, used as a query, matches the stored `candidate`.
    pub fn matches(&self, candidate: &Address) -> bool {
        matches(self.as_str(), candidate.as_str())
    }
}

/// Validates raw address bytes, returning the rejection reason if any.
const fn check(value: &[u8]) -> Option<&'static str> {
    if value.is_empty() {
        return Some("address is empty");
    }
    if value.len() > ADDRESS_CAPACITY {
        return Some("address exceeds 255 bytes");
    }
    let mut i = 0;
    while i < value.len() {
        if !value[i].is_ascii() {
            return Some("address must be ASCII");
        }
        i += 1;
    }
    if value[0] == WILDCARD {
        let marker = if value.len() > 1 && value[1] == b'/' {
            2
        } else {
            1
        };
        if value.len() == marker {
            return Some("wildcard has no suffix");
        }
    }
    None
}

/// Returns the suffix of a wildcard query, or `None` if the query is exact.
fn wildcard_suffix(query: &[u8]) -> Option<&[u8]> {
    let rest = query.strip_prefix(&[WILDCARD])?;
    Some(rest.strip_prefix(b"/").unwrap_or(rest))
}

/// Tests a query pattern against a stored candidate path.
///
/// This is the function behind [`Address::matches`]; it works on any string so
/// hosts can test paths that never became an [`Address`].
pub fn matches(query: &str, candidate: &str) -> bool {
    let query = query.as_bytes();
    let candidate = candidate.as_bytes();
    let extension_dot = candidate.iter().rposition(|&c| c == b'.');

    let (pattern, offset) = match wildcard_suffix(query) {
        Some(suffix) => match candidate.len().checked_sub(suffix.len()) {
            Some(offset) => (suffix, offset),
            None => return false,
        },
        None if query.len() == candidate.len() => (query, 0),
        None => return false,
    };

    candidate[offset..]
        .iter()
        .zip(pattern)
        .enumerate()
        .all(|(i, (&c, &q))| chars_match(c, q, offset + i, extension_dot))
}

fn chars_match(c: u8, q: u8, index: usize, extension_dot: Option<usize>) -> bool {
    if c == q {
        return true;
    }
    match q {
        b' ' => c == b'_' || c == b'.',
        b'/' => c == b'.' && extension_dot != Some(index),
        _ => false,
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Address {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Address {
    type Error = ResolveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Address::new(&value).map_err(de::Error::custom)
    }
}

/// A type that names a well-known piece of data.
///
/// ```
/// use khora_core::address::{Address, DataReference};
///
/// struct DefaultMaterial;
///
/// impl DataReference for DefaultMaterial {
///     const ADDRESS: Address = Address::from_static("Assets/Materials/unlit.mat");
/// }
///
/// assert_eq!(Address::of::<DefaultMaterial>().as_str(), "Assets/Materials/unlit.mat");
/// ```
pub trait DataReference {
    /// The address of the referenced data.
    const ADDRESS: Address;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(value: &str) -> Address {
        Address::new(value).expect("test address should be valid")
    }

    #[test]
    fn exact_match_requires_equal_length() {
        assert!(matches("tomato", "tomato"));
        assert!(!matches("tomato", "tomatoX"));
        assert!(!matches("tomatoX", "tomato"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!matches("Tomato", "tomato"));
    }

    #[test]
    fn wildcard_matches_suffix() {
        assert!(matches("*/unlit.mat", "Assets/Materials/unlit.mat"));
        assert!(matches("*/unlit.mat", "unlit.mat"));
        assert!(matches("*/abacus", "abacus"));
        assert!(matches("*.shader", "Assets/Materials/unlit.shader"));
        assert!(!matches("*.shader", "Assets/Materials/unlit.mat"));
    }

    #[test]
    fn wildcard_longer_than_candidate_fails() {
        assert!(!matches("*/Materials/unlit.mat", "unlit.mat"));
    }

    #[test]
    fn space_stands_for_underscore_or_dot() {
        assert!(matches("unlit mat", "unlit.mat"));
        assert!(matches("my file.txt", "my_file.txt"));
        assert!(!matches("my file.txt", "my-file.txt"));
    }

    #[test]
    fn slash_never_stands_for_extension_dot() {
        assert!(!matches("unlit/mat", "unlit.mat"));
        assert!(matches("a/b.ext", "a.b.ext"));
        assert!(!matches("a.b/ext", "a.b.ext"));
    }

    #[test]
    fn wildcard_uses_candidate_indices_for_extension_dot() {
        assert!(matches("*/b.ext", "dir/a.b.ext"));
        assert!(matches("*b/ext", "a.b/ext"));
        assert!(!matches("*b/ext", "a.b.ext"));
    }

    #[test]
    fn address_matches_delegates_to_rules() {
        let query = addr("*/unlit.mat");
        assert!(query.matches(&addr("Assets/Materials/unlit.mat")));
        assert!(!query.matches(&addr("Assets/Materials/unlit.json")));
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        for value in ["", "*", "*/", "caf\u{e9}"] {
            let err = Address::new(value).expect_err("address should be rejected");
            assert!(matches!(err, ResolveError::InvalidAddress { .. }), "{value}");
        }
        let too_long = "a".repeat(ADDRESS_CAPACITY + 1);
        assert!(Address::new(&too_long).is_err());
        assert!(Address::new(&"a".repeat(ADDRESS_CAPACITY)).is_ok());
    }

    #[test]
    fn equality_is_by_content() {
        let a = addr("Assets/a.txt");
        let b = addr("Assets/a.txt");
        assert_eq!(a, b);
        assert_ne!(a, addr("Assets/b.txt"));
        assert_eq!(a.to_string(), "Assets/a.txt");
        assert_eq!(a.len(), 12);
        assert!(!a.is_wildcard());
        assert!(addr("*/a.txt").is_wildcard());
    }

    #[test]
    fn as_str_returns_the_full_address() {
        let longest = "z".repeat(ADDRESS_CAPACITY);
        assert_eq!(addr(&longest).as_str(), longest);
        assert_eq!(addr("Shaders/lit.shader").as_str(), "Shaders/lit.shader");
    }

    struct DefaultMaterial;

    impl DataReference for DefaultMaterial {
        const ADDRESS: Address = Address::from_static("Assets/Materials/unlit.mat");
    }

    #[test]
    fn data_reference_yields_static_address() {
        let address = Address::of::<DefaultMaterial>();
        assert_eq!(address.as_str(), "Assets/Materials/unlit.mat");
        assert!(addr("*/unlit.mat").matches(&address));
    }

    #[test]
    fn deserialization_validates() {
        let ok: Address = serde_json::from_str("\"Assets/a.txt\"").expect("valid address");
        assert_eq!(ok.as_str(), "Assets/a.txt");
        assert!(serde_json::from_str::<Address>("\"\"").is_err());
    }
}
