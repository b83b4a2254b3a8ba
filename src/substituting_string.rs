use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::de;
use std::{env, fmt, ops::Deref};

lazy_static! {
    static ref VARIABLE_RE: Regex =
        Regex::new(r"\$\{?([A-Z0-9_]+)\}?").expect("Invalid regex for VARIABLE_RE");
}

/// Config string with `$VAR` / `${VAR}` references resolved from the environment at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutingString {
    raw: String,
    resolved: String,
}

impl SubstitutingString {
    pub fn new(raw: String) -> Result<Self, env::VarError> {
        let mut missing = None;
        let resolved = VARIABLE_RE
            .replace_all(&raw, |caps: &Captures| match env::var(&caps[1]) {
                Ok(value) => value,
                Err(err) => {
                    missing.get_or_insert(err);
                    String::new()
                }
            })
            .into_owned();
        match missing {
            Some(err) => Err(err),
            None => Ok(Self { raw, resolved }),
        }
    }

    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for SubstitutingString {
    fn from(s: &str) -> Self {
        Self {
            raw: s.to_owned(),
            resolved: s.to_owned(),
        }
    }
}

impl fmt::Display for SubstitutingString {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.resolved)
    }
}

impl Deref for SubstitutingString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.resolved
    }
}

impl AsRef<str> for SubstitutingString {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.resolved
    }
}

struct SubstitutingStringVisitor;

impl<'de> de::Visitor<'de> for SubstitutingStringVisitor {
    type Value = SubstitutingString;

    #[inline]
    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string optionally containing $ENV variables")
    }

    #[inline]
    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        SubstitutingString::new(s.to_owned()).map_err(de::Error::custom)
    }
}

impl<'de> de::Deserialize<'de> for SubstitutingString {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(SubstitutingStringVisitor)
    }
}
