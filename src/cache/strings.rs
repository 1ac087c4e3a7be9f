use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Interned string handle. Only meaningful against the table that issued it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringId(pub u32);

impl StringId {
    pub const INVALID: StringId = StringId(0);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-cache string interning. Slot 0 is the empty string and backs
/// [`StringId::INVALID`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StringTable {
    strings: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, StringId>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        let mut table = Self {
            strings: vec![String::new()],
            lookup: HashMap::new(),
        };
        table.rebuild_lookup();
        table
    }

    pub fn get_string_id(&self, value: &str) -> Option<StringId> {
        self.lookup.get(value).copied()
    }

    pub fn intern(&mut self, value: &str) -> StringId {
        if let Some(id) = self.get_string_id(value) {
            return id;
        }

        let id = StringId(self.strings.len() as u32);
        self.strings.push(value.to_string());
        self.lookup.insert(value.to_string(), id);
        id
    }

    pub fn get_string(&self, id: StringId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Restores the reverse index after the table was deserialized.
    pub(crate) fn rebuild_lookup(&mut self) {
        self.lookup = self
            .strings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), StringId(i as u32)))
            .collect();
    }
}
