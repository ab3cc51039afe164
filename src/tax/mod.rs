pub mod deductions;
pub mod fy;
pub mod levies;
pub mod regime;
pub mod slab;

pub use fy::FinancialYear;
pub use regime::{compare, Comparison, RegimeResult};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One of the two alternative statutory computation schemes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Old,
    New,
}

impl Regime {
    pub fn display(&self) -> &'static str {
        match self {
            Regime::Old => "old",
            Regime::New => "new",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
