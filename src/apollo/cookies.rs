use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A single `name=value` pair of the user's Apollo session cookie set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
}

impl CookieEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The shape the cookie set was stored in. Determined at parse time and
/// preserved through the serialize round-trip.
#[derive(Debug, Clone, PartialEq)]
enum CookieStorageFormat {
    /// A JSON array of `{name, value}` objects.
    Entries,
    /// A JSON object wrapping the array under a `cookies` key; unrelated keys
    /// are carried through untouched.
    Wrapped(Map<String, Value>),
    /// A raw `name=value; name=value` cookie string.
    RawString,
}

/// A user's stored Apollo session cookies together with their storage format.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCookies {
    entries: Vec<CookieEntry>,
    format: CookieStorageFormat,
}

fn normalize_entry(value: &Value) -> Option<CookieEntry> {
    let name = value.get("name")?.as_str()?.trim();
    let cookie_value = value.get("value")?.as_str()?.trim();
    if name.is_empty() || cookie_value.is_empty() {
        None
    } else {
        Some(CookieEntry::new(name, cookie_value))
    }
}

fn normalize_entries(values: &[Value]) -> Vec<CookieEntry> {
    values.iter().filter_map(normalize_entry).collect()
}

fn parse_cookie_string(raw_value: &str) -> Vec<CookieEntry> {
    raw_value
        .split(';')
        .filter_map(|chunk| {
            let chunk = chunk.trim();
            let (name, value) = chunk.split_once('=')?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some(CookieEntry::new(name, value))
            }
        })
        .collect()
}

impl StoredCookies {
    /// Parses a stored cookie value, accepting a JSON array of entries, a JSON
    /// object wrapping such an array under `cookies`, or a raw cookie string.
    pub fn parse(raw_value: &str) -> anyhow::Result<Self> {
        if raw_value.trim().is_empty() {
            bail!("Stored Apollo cookie is empty.");
        }

        if let Ok(parsed) = serde_json::from_str::<Value>(raw_value) {
            match &parsed {
                Value::Array(values) => {
                    let entries = normalize_entries(values);
                    if !entries.is_empty() {
                        return Ok(Self {
                            entries,
                            format: CookieStorageFormat::Entries,
                        });
                    }
                }
                Value::Object(map) => {
                    if let Some(Value::Array(values)) = map.get("cookies") {
                        let entries = normalize_entries(values);
                        if !entries.is_empty() {
                            return Ok(Self {
                                entries,
                                format: CookieStorageFormat::Wrapped(map.clone()),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        let entries = parse_cookie_string(raw_value);
        if entries.is_empty() {
            bail!("Unable to parse Apollo cookie.");
        }

        Ok(Self {
            entries,
            format: CookieStorageFormat::RawString,
        })
    }

    /// Serializes the cookie set back into its original storage shape.
    pub fn serialize(&self) -> String {
        match &self.format {
            CookieStorageFormat::Entries => json!(self.entries).to_string(),
            CookieStorageFormat::Wrapped(map) => {
                let mut map = map.clone();
                map.insert("cookies".to_string(), json!(self.entries));
                Value::Object(map).to_string()
            }
            CookieStorageFormat::RawString => self.header(),
        }
    }

    /// Renders the cookie set as a `Cookie` request header value.
    pub fn header(&self) -> String {
        self.entries
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn entries(&self) -> &[CookieEntry] {
        &self.entries
    }

    /// Merges refreshed cookie values into the set, replacing entries whose
    /// value changed and appending previously unknown ones. Returns whether
    /// anything actually changed.
    pub fn apply_refreshed(&mut self, updates: &[CookieEntry]) -> bool {
        let mut changed = false;
        for update in updates {
            match self
                .entries
                .iter_mut()
                .find(|cookie| cookie.name == update.name)
            {
                Some(cookie) if cookie.value != update.value => {
                    cookie.value = update.value.clone();
                    changed = true;
                }
                Some(_) => {}
                None => {
                    self.entries.push(update.clone());
                    changed = true;
                }
            }
        }

        changed
    }
}
