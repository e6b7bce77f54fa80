use serde::{Deserialize, Serialize};

/// An `[env.<name>]` table from the project manifest. Only identity fields
/// matter here; anything else in the table is ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Environment {
    pub name: Option<String>,
    pub account_id: Option<String>,
}
