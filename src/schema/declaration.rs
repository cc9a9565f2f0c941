use serde::{Deserialize, Serialize};
use std::fmt;

/// Which accessors a field exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionConfig {
    #[default]
    All,
    None,
    Load,
    Store,
}

impl fmt::Display for FunctionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "ALL",
            Self::None => "NONE",
            Self::Load => "LOAD",
            Self::Store => "STORE",
        };
        f.write_str(name)
    }
}

/// One persistent field as declared in a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDeclaration {
    /// Caller-assigned unique id
    pub id: u32,
    /// Field name
    pub key: String,
    /// Registry type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Number of elements; 1 for scalars, 0 for unbounded
    #[serde(default = "default_array_length")]
    pub array_length: u32,
    #[serde(default)]
    pub permission_id: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub function_config: FunctionConfig,
}

fn default_array_length() -> u32 {
    1
}

impl FieldDeclaration {
    /// Declare a scalar field with default metadata.
    pub fn new(id: u32, key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            type_name: type_name.into(),
            array_length: 1,
            permission_id: 0,
            description: String::new(),
            function_config: FunctionConfig::All,
        }
    }

    /// Set the element count (0 for unbounded).
    pub fn with_array_length(mut self, array_length: u32) -> Self {
        self.array_length = array_length;
        self
    }

    /// Set the permission id.
    pub fn with_permission_id(mut self, permission_id: u32) -> Self {
        self.permission_id = permission_id;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set which accessors are generated for the field.
    pub fn with_function_config(mut self, function_config: FunctionConfig) -> Self {
        self.function_config = function_config;
        self
    }

    /// Whether the field was declared with `arrayLength` 0.
    pub fn is_unbounded(&self) -> bool {
        self.array_length == 0
    }
}
