/// Header entries from a `-headers` spec, kept in the order they were given.
/// A later entry replaces an earlier one whose name matches ignoring case,
/// which also makes `method=PUT,METHOD=DELETE` resolve to `DELETE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSpec {
    entries: Vec<(String, String)>,
}

impl HeaderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderSpec {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut spec = HeaderSpec::new();
        for (name, value) in iter {
            spec.insert(name, value);
        }
        spec
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Request-line fields a caller may set through the header spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoHeader {
    Method,
    Authority,
    Path,
}

impl PseudoHeader {
    /// Matches case-insensitively; the leading `:` is already stripped by the parser.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("method") {
            Some(PseudoHeader::Method)
        } else if name.eq_ignore_ascii_case("authority") {
            Some(PseudoHeader::Authority)
        } else if name.eq_ignore_ascii_case("path") {
            Some(PseudoHeader::Path)
        } else {
            None
        }
    }
}
