use serde::{
    Deserialize,
    Serialize,
};

/// This holds the settings which control where a server's metadata
/// is kept within its data directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// This is prepended to the slot number (`1` or `2`) to form the names
    /// of the two metadata files.
    pub file_name_prefix: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            file_name_prefix: String::from("metadata"),
        }
    }
}
