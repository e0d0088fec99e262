// src/task/flags.rs

//! Trailing modifier characters on task and dependency names.
//!
//! - `?` marks a task optional: its failure does not stop dependents.
//! - `+` marks a task multi: every reference to it executes it again.
//! - `*` marks both.
//!
//! On a registered task name the flags apply to every reference to that
//! task. On a dependency string they apply to that edge only.

/// Characters recognised as flags at the end of a name.
pub const FLAG_CHARS: [char; 3] = ['?', '+', '*'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub multi: bool,
    pub optional: bool,
}

impl Flags {
    /// Flags set on either side.
    pub fn union(self, other: Flags) -> Flags {
        Flags {
            multi: self.multi || other.multi,
            optional: self.optional || other.optional,
        }
    }
}

/// Split `name` into its trailing flags and the remaining base name.
///
/// Scans backwards and stops at the first character outside
/// [`FLAG_CHARS`]. A name made only of flag characters yields an empty base.
pub fn parse_flags(name: &str) -> (Flags, &str) {
    let mut flags = Flags::default();
    let mut end = name.len();

    for c in name.chars().rev() {
        match c {
            '?' => flags.optional = true,
            '+' => flags.multi = true,
            '*' => {
                flags.multi = true;
                flags.optional = true;
            }
            _ => break,
        }
        end -= c.len_utf8();
    }

    (flags, &name[..end])
}

/// `name` without its trailing flags.
pub fn base_name(name: &str) -> &str {
    parse_flags(name).1
}
