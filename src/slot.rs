use std::fmt;

/// This identifies one of the two metadata files.  Odd versions of the
/// metadata record are always written to the first one, and even versions
/// to the second, so consecutive writes never touch the same file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::First, Slot::Second];

    pub fn of(version: u64) -> Self {
        if version % 2 == 1 {
            Slot::First
        } else {
            Slot::Second
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Slot::First => 1,
            Slot::Second => 2,
        }
    }

    pub fn file_name(
        self,
        prefix: &str,
    ) -> String {
        format!("{}{}", prefix, self.number())
    }
}

impl fmt::Display for Slot {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "slot {}", self.number())
    }
}
