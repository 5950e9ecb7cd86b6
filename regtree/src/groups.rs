//! Group registry for tracking capture groups
//!
//! The parser owns one registry per parse. It is what lets backreferences
//! resolve in a single left-to-right pass:
//! - numbers are handed out when the opening paren is consumed, before the
//!   group body is parsed, so nested groups number outside-in
//! - `\N` only names a group if `N` groups have been opened so far
//! - `\k<name>` only resolves to names registered so far

use std::collections::HashMap;

use crate::error::ParseError;

/// Information about a capture group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo {
    /// The number of the group (1-based, as used by `\1`, `\2`, ...)
    pub number: u32,
    /// The name of the group, if it is a named group
    pub name: Option<String>,
}

/// Registry for tracking capture groups
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<GroupInfo>,
    name_to_number: HashMap<String, u32>,
    next_number: u32,
    allow_duplicates: bool,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}

impl GroupRegistry {
    /// Create an empty registry
    ///
    /// With `allow_duplicates` a repeated name keeps its first number.
    pub fn new(allow_duplicates: bool) -> Self {
        GroupRegistry {
            groups: Vec::new(),
            name_to_number: HashMap::new(),
            next_number: 1,
            allow_duplicates,
        }
    }

    /// Register a new capturing group and return its number
    ///
    /// # Errors
    /// Returns [`ParseError::DuplicateGroupName`] if the name is already in
    /// use and duplicates are not allowed.
    pub fn register_group(&mut self, name: Option<&str>) -> Result<u32, ParseError> {
        let number = self.next_number;

        if let Some(name) = name {
            if self.name_to_number.contains_key(name) {
                if !self.allow_duplicates {
                    return Err(ParseError::DuplicateGroupName(name.to_string()));
                }
            } else {
                self.name_to_number.insert(name.to_string(), number);
            }
        }

        self.next_number += 1;
        self.groups.push(GroupInfo {
            number,
            name: name.map(str::to_string),
        });
        Ok(number)
    }

    /// Number of the group called `name`
    pub fn get_by_name(&self, name: &str) -> Option<u32> {
        self.name_to_number.get(name).copied()
    }

    /// Number of capturing groups opened so far
    pub fn group_count(&self) -> u32 {
        self.next_number - 1
    }

    /// All registered groups, in order of appearance
    pub fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }
}
