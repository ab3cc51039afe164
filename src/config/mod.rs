//! Versioned statutory configuration: slab tables, caps and thresholds
//! keyed by financial year. Loaded once, then treated as immutable; the
//! engine itself never mutates a snapshot.

mod years;

use crate::error::{ConfigurationError, EngineError};
use crate::input::AgeBracket;
use crate::tax::deductions::{DeductionRule, GroupKey, Section};
use crate::tax::slab::SlabTable;
use crate::tax::{FinancialYear, Regime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Section 87A parameters for one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateConfig {
    pub threshold: Decimal,
    pub max_rebate: Decimal,
    /// The new regime phases the rebate out gradually past the threshold;
    /// the old regime cuts it off outright.
    pub marginal_relief: bool,
}

/// Surcharge applies to taxable income strictly above `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeSlab {
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// Everything that differs between the two regimes for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeConfig {
    /// Slab tables by age bracket. The old regime raises the basic
    /// exemption for seniors; the new regime carries the same table for
    /// every bracket.
    pub slabs: BTreeMap<AgeBracket, SlabTable>,
    pub standard_deduction: Decimal,
    pub rebate: RebateConfig,
    pub surcharge: Vec<SurchargeSlab>,
    /// Maximum house-property loss that may be set off against other heads.
    pub hp_loss_setoff_cap: Decimal,
}

impl RegimeConfig {
    pub fn slab_table(
        &self,
        age: AgeBracket,
        regime: Regime,
    ) -> Result<&SlabTable, ConfigurationError> {
        self.slabs
            .get(&age)
            .ok_or_else(|| ConfigurationError::MissingSlabTable {
                regime: regime.display().to_string(),
                age: age.display().to_string(),
            })
    }
}

/// One financial year's complete configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub year: FinancialYear,
    pub old: RegimeConfig,
    pub new: RegimeConfig,
    pub cess_rate: Decimal,
    pub rules: Vec<DeductionRule>,
    pub group_caps: BTreeMap<GroupKey, Decimal>,
}

impl TaxConfig {
    pub fn regime(&self, regime: Regime) -> &RegimeConfig {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }

    /// Rule for a section under a regime. `Ok(None)` means the section is
    /// known but not applicable to this regime (eligible amount is zero);
    /// a section with no rule at all is a configuration error.
    pub fn rule_for(
        &self,
        section: Section,
        regime: Regime,
    ) -> Result<Option<&DeductionRule>, ConfigurationError> {
        let mut known = false;
        for rule in self.rules.iter().filter(|rule| rule.section == section) {
            known = true;
            if rule.regimes.allows(regime) {
                return Ok(Some(rule));
            }
        }
        if known {
            Ok(None)
        } else {
            Err(ConfigurationError::MissingRule(section.code().to_string()))
        }
    }

    pub fn group_cap(&self, group: GroupKey) -> Result<Decimal, ConfigurationError> {
        self.group_caps
            .get(&group)
            .copied()
            .ok_or_else(|| ConfigurationError::MissingGroupCap(group.code().to_string()))
    }
}

/// Immutable map of financial year to configuration snapshot. Build it
/// once at startup; a reload swaps the whole registry, never a part.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    years: BTreeMap<FinancialYear, TaxConfig>,
}

impl ConfigRegistry {
    /// Registry with the embedded statutory tables.
    pub fn builtin() -> Self {
        let mut years = BTreeMap::new();
        for config in [years::fy_2023_24(), years::fy_2024_25()] {
            years.insert(config.year, config);
        }
        ConfigRegistry { years }
    }

    pub fn get(&self, year: FinancialYear) -> Result<&TaxConfig, ConfigurationError> {
        self.years
            .get(&year)
            .ok_or_else(|| ConfigurationError::UnknownFinancialYear(year.display()))
    }

    pub fn years(&self) -> impl Iterator<Item = &TaxConfig> {
        self.years.values()
    }

    /// Load year configurations from JSON, replacing any built-in year
    /// they collide with. Amounts stay data, not code.
    pub fn load_overrides<R: Read>(&mut self, reader: R) -> Result<usize, EngineError> {
        let configs: Vec<TaxConfig> = serde_json::from_reader(reader)
            .map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        let count = configs.len();
        for config in configs {
            log::info!("Loaded configuration override for {}", config.year);
            self.years.insert(config.year, config);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builtin_years_present() {
        let registry = ConfigRegistry::builtin();
        assert!(registry.get(FinancialYear(2023)).is_ok());
        assert!(registry.get(FinancialYear(2024)).is_ok());
        assert_eq!(
            registry.get(FinancialYear(2010)).unwrap_err(),
            ConfigurationError::UnknownFinancialYear("2010-11".to_string())
        );
    }

    #[test]
    fn builtin_tables_cover_all_age_brackets() {
        let registry = ConfigRegistry::builtin();
        let config = registry.get(FinancialYear(2024)).unwrap();
        for age in [AgeBracket::Below60, AgeBracket::SixtyTo80, AgeBracket::Above80] {
            config.old.slab_table(age, Regime::Old).unwrap();
            config.new.slab_table(age, Regime::New).unwrap();
        }
    }

    #[test]
    fn new_regime_is_age_invariant() {
        let registry = ConfigRegistry::builtin();
        let config = registry.get(FinancialYear(2024)).unwrap();
        let below = config
            .new
            .slab_table(AgeBracket::Below60, Regime::New)
            .unwrap();
        let above = config
            .new
            .slab_table(AgeBracket::Above80, Regime::New)
            .unwrap();
        assert_eq!(below, above);
    }

    #[test]
    fn standard_deductions_per_year() {
        let registry = ConfigRegistry::builtin();
        let fy24 = registry.get(FinancialYear(2024)).unwrap();
        assert_eq!(fy24.old.standard_deduction, dec!(50000));
        assert_eq!(fy24.new.standard_deduction, dec!(75000));
        let fy23 = registry.get(FinancialYear(2023)).unwrap();
        assert_eq!(fy23.new.standard_deduction, dec!(50000));
    }

    #[test]
    fn every_section_has_a_rule() {
        let registry = ConfigRegistry::builtin();
        let config = registry.get(FinancialYear(2024)).unwrap();
        for section in [
            Section::Sec80C,
            Section::Sec80Ccc,
            Section::Sec80Ccd1,
            Section::Sec80Ccd1b,
            Section::Sec80Ccd2,
            Section::Sec80D,
            Section::Sec80DParents,
            Section::Sec80Dd,
            Section::Sec80E,
            Section::Sec80G,
            Section::Sec80Gg,
            Section::Sec80Tta,
            Section::Sec80Ttb,
            Section::Sec80U,
            Section::Sec24B,
        ] {
            assert!(config.rule_for(section, Regime::Old).unwrap().is_some());
        }
        // Only the allow-listed section carries a new-regime rule.
        assert!(config
            .rule_for(Section::Sec80Ccd2, Regime::New)
            .unwrap()
            .is_some());
        assert!(config
            .rule_for(Section::Sec80C, Regime::New)
            .unwrap()
            .is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let registry = ConfigRegistry::builtin();
        let config = registry.get(FinancialYear(2024)).unwrap();
        let json = serde_json::to_string(&[config.clone()]).unwrap();

        let mut fresh = ConfigRegistry::builtin();
        let count = fresh.load_overrides(json.as_bytes()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(fresh.get(FinancialYear(2024)).unwrap(), config);
    }

    #[test]
    fn override_replaces_builtin_year() {
        let registry = ConfigRegistry::builtin();
        let mut config = registry.get(FinancialYear(2024)).unwrap().clone();
        config.cess_rate = dec!(0.05);
        let json = serde_json::to_string(&[config]).unwrap();

        let mut fresh = ConfigRegistry::builtin();
        fresh.load_overrides(json.as_bytes()).unwrap();
        assert_eq!(
            fresh.get(FinancialYear(2024)).unwrap().cess_rate,
            dec!(0.05)
        );
    }

    #[test]
    fn malformed_override_is_parse_error() {
        let mut registry = ConfigRegistry::builtin();
        let err = registry.load_overrides("not json".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Configuration(ConfigurationError::Parse(_))
        ));
    }
}
