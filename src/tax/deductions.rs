//! Chapter VI-A deduction rules and the per-regime aggregator.

use crate::config::TaxConfig;
use crate::error::EngineError;
use crate::input::{validate_entries, DeductionEntry, IncomeProfile, TaxpayerContext};
use crate::tax::Regime;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deduction section codes understood by the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Section {
    #[serde(rename = "80C")]
    Sec80C,
    #[serde(rename = "80CCC")]
    Sec80Ccc,
    #[serde(rename = "80CCD1")]
    Sec80Ccd1,
    #[serde(rename = "80CCD1B")]
    Sec80Ccd1b,
    #[serde(rename = "80CCD2")]
    Sec80Ccd2,
    #[serde(rename = "80D")]
    Sec80D,
    #[serde(rename = "80D-PARENTS")]
    Sec80DParents,
    #[serde(rename = "80DD")]
    Sec80Dd,
    #[serde(rename = "80E")]
    Sec80E,
    #[serde(rename = "80G")]
    Sec80G,
    #[serde(rename = "80GG")]
    Sec80Gg,
    #[serde(rename = "80TTA")]
    Sec80Tta,
    #[serde(rename = "80TTB")]
    Sec80Ttb,
    #[serde(rename = "80U")]
    Sec80U,
    #[serde(rename = "24B")]
    Sec24B,
    /// Applied automatically against salary income; never claimed directly.
    #[serde(rename = "STANDARD")]
    StandardDeduction,
}

impl Section {
    pub fn code(&self) -> &'static str {
        match self {
            Section::Sec80C => "80C",
            Section::Sec80Ccc => "80CCC",
            Section::Sec80Ccd1 => "80CCD1",
            Section::Sec80Ccd1b => "80CCD1B",
            Section::Sec80Ccd2 => "80CCD2",
            Section::Sec80D => "80D",
            Section::Sec80DParents => "80D-PARENTS",
            Section::Sec80Dd => "80DD",
            Section::Sec80E => "80E",
            Section::Sec80G => "80G",
            Section::Sec80Gg => "80GG",
            Section::Sec80Tta => "80TTA",
            Section::Sec80Ttb => "80TTB",
            Section::Sec80U => "80U",
            Section::Sec24B => "24B",
            Section::StandardDeduction => "STANDARD",
        }
    }

    pub fn parse(s: &str) -> Option<Section> {
        match s.to_uppercase().as_str() {
            "80C" => Some(Section::Sec80C),
            "80CCC" => Some(Section::Sec80Ccc),
            "80CCD1" => Some(Section::Sec80Ccd1),
            "80CCD1B" => Some(Section::Sec80Ccd1b),
            "80CCD2" => Some(Section::Sec80Ccd2),
            "80D" => Some(Section::Sec80D),
            "80D-PARENTS" => Some(Section::Sec80DParents),
            "80DD" => Some(Section::Sec80Dd),
            "80E" => Some(Section::Sec80E),
            "80G" => Some(Section::Sec80G),
            "80GG" => Some(Section::Sec80Gg),
            "80TTA" => Some(Section::Sec80Tta),
            "80TTB" => Some(Section::Sec80Ttb),
            "80U" => Some(Section::Sec80U),
            "24B" => Some(Section::Sec24B),
            "STANDARD" => Some(Section::StandardDeduction),
            _ => None,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which regimes a rule applies under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeFilter {
    Old,
    New,
    Both,
}

impl RegimeFilter {
    pub fn allows(&self, regime: Regime) -> bool {
        match self {
            RegimeFilter::Old => regime == Regime::Old,
            RegimeFilter::New => regime == Regime::New,
            RegimeFilter::Both => true,
        }
    }
}

/// Sections sharing one combined cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupKey {
    /// 80C + 80CCC + 80CCD(1) share a single statutory ceiling.
    #[serde(rename = "80C-BASKET")]
    Basket80C,
}

impl GroupKey {
    pub fn code(&self) -> &'static str {
        match self {
            GroupKey::Basket80C => "80C-BASKET",
        }
    }
}

/// Whose health insurance a `HealthInsurance` cap covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsuredParty {
    SelfOrSpouse,
    Parents,
}

/// Whose disability a `DisabilityFlat` rule keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisabledParty {
    Dependant,
    Taxpayer,
}

/// Age window for the mutually exclusive savings-interest sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeWindow {
    Below60,
    SixtyPlus,
}

/// Cap formula for one section. Each context-dependent cap is an explicit
/// rule, never inferred from the amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CapRule {
    Fixed { cap: Decimal },
    Unlimited,
    /// 80D: base cap, raised to `senior` when the covered person is 60+.
    HealthInsurance {
        base: Decimal,
        senior: Decimal,
        covers: InsuredParty,
    },
    /// 80DD / 80U: a fixed amount per disability severity, not a function
    /// of spend.
    DisabilityFlat {
        normal: Decimal,
        severe: Decimal,
        party: DisabledParty,
    },
    /// 80GG: min(flat amount by city tier, rent - 10% of GTI, 25% of GTI).
    RentPaid { metro: Decimal, non_metro: Decimal },
    /// 80TTA / 80TTB: capped interest, eligible in one age window only.
    SavingsInterest { cap: Decimal, window: AgeWindow },
    /// 80G: qualifying limit as a fraction of gross total income.
    PctOfIncome { pct: Decimal },
    /// 80CCD(2): employer NPS contribution up to a fraction of basic salary.
    EmployerNps { pct_of_basic: Decimal },
}

/// Eligibility + cap for one section under one or both regimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRule {
    pub section: Section,
    pub regimes: RegimeFilter,
    #[serde(default)]
    pub group: Option<GroupKey>,
    pub cap: CapRule,
}

impl DeductionRule {
    /// Eligible amount for a raw claim under this rule.
    pub fn eligible(
        &self,
        raw: Decimal,
        context: &TaxpayerContext,
        income: &IncomeProfile,
        gross_total_income: Decimal,
    ) -> Decimal {
        let gti = gross_total_income.max(Decimal::ZERO);
        match &self.cap {
            CapRule::Fixed { cap } => raw.min(*cap),
            CapRule::Unlimited => raw,
            CapRule::HealthInsurance {
                base,
                senior,
                covers,
            } => {
                let is_senior = match covers {
                    InsuredParty::SelfOrSpouse => {
                        context.age_bracket.is_senior() || context.spouse_age_bracket.is_senior()
                    }
                    InsuredParty::Parents => {
                        if !context.has_parents {
                            return Decimal::ZERO;
                        }
                        context.parents_age_bracket.is_senior()
                    }
                };
                let cap = if is_senior { *senior } else { *base };
                raw.min(cap)
            }
            CapRule::DisabilityFlat {
                normal,
                severe,
                party,
            } => {
                let disability = match party {
                    DisabledParty::Dependant => context.dependent_disability,
                    DisabledParty::Taxpayer => context.self_disability,
                };
                match disability {
                    crate::input::DisabilityType::None => Decimal::ZERO,
                    crate::input::DisabilityType::Normal => *normal,
                    crate::input::DisabilityType::Severe => *severe,
                }
            }
            CapRule::RentPaid { metro, non_metro } => {
                let flat = match context.city_tier {
                    crate::input::CityTier::Metro => *metro,
                    crate::input::CityTier::NonMetro => *non_metro,
                };
                let rent_excess = raw - gti * Decimal::new(10, 2);
                let income_share = gti * Decimal::new(25, 2);
                flat.min(rent_excess).min(income_share).max(Decimal::ZERO)
            }
            CapRule::SavingsInterest { cap, window } => {
                let eligible_age = match window {
                    AgeWindow::Below60 => !context.age_bracket.is_senior(),
                    AgeWindow::SixtyPlus => context.age_bracket.is_senior(),
                };
                if eligible_age {
                    raw.min(*cap)
                } else {
                    Decimal::ZERO
                }
            }
            CapRule::PctOfIncome { pct } => raw.min(gti * pct),
            CapRule::EmployerNps { pct_of_basic } => raw.min(income.salary.basic * pct_of_basic),
        }
    }
}

/// Per-section eligible amounts and their bounded total for one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionBreakdown {
    pub per_section: BTreeMap<Section, Decimal>,
    pub total: Decimal,
}

/// Apply the rule set to raw entries for one regime.
///
/// Per section: `eligible = min(sum of components, cap)`. Sections sharing
/// a group cap are then clamped together, the reduction distributed
/// proportionally (the last member absorbs the rounding remainder so the
/// group sum equals the cap exactly). The standard deduction is applied
/// automatically against salary income. Under the new regime, sections
/// outside the allow-list yield zero regardless of input.
pub fn aggregate(
    entries: &[DeductionEntry],
    context: &TaxpayerContext,
    income: &IncomeProfile,
    config: &TaxConfig,
    regime: Regime,
) -> Result<DeductionBreakdown, EngineError> {
    validate_entries(entries)?;

    let regime_config = config.regime(regime);
    let gti = income.gross_total_income(regime_config.hp_loss_setoff_cap);

    // Merge entries claiming the same section.
    let mut raw_by_section: BTreeMap<Section, Decimal> = BTreeMap::new();
    for entry in entries {
        *raw_by_section.entry(entry.section).or_insert(Decimal::ZERO) += entry.raw_total();
    }

    let mut per_section: BTreeMap<Section, Decimal> = BTreeMap::new();
    let mut groups: BTreeMap<GroupKey, Vec<Section>> = BTreeMap::new();
    for (&section, &raw) in &raw_by_section {
        let eligible = match config.rule_for(section, regime)? {
            Some(rule) => {
                if let Some(group) = rule.group {
                    groups.entry(group).or_default().push(section);
                }
                rule.eligible(raw, context, income, gti)
            }
            // Known section, not applicable under this regime.
            None => Decimal::ZERO,
        };
        log::debug!(
            "{} ({}): raw={}, eligible={}",
            section.code(),
            regime,
            raw,
            eligible
        );
        per_section.insert(section, eligible);
    }

    for (group, sections) in groups {
        let cap = config.group_cap(group)?;
        clamp_group(&mut per_section, &sections, cap);
    }

    // Standard deduction against salary, applied by the engine itself.
    let salary_total = income.salary.total();
    if salary_total > Decimal::ZERO && regime_config.standard_deduction > Decimal::ZERO {
        per_section.insert(
            Section::StandardDeduction,
            salary_total.min(regime_config.standard_deduction),
        );
    }

    let total = per_section.values().copied().sum();
    Ok(DeductionBreakdown { per_section, total })
}

/// Clamp a group's combined total to its cap, scaling members
/// proportionally. Proportional distribution keeps the result independent
/// of declaration order.
fn clamp_group(per_section: &mut BTreeMap<Section, Decimal>, sections: &[Section], cap: Decimal) {
    let group_total: Decimal = sections
        .iter()
        .filter_map(|s| per_section.get(s))
        .copied()
        .sum();
    if group_total <= cap {
        return;
    }
    log::debug!("group clamp: total {} exceeds cap {}", group_total, cap);
    let mut assigned = Decimal::ZERO;
    for (i, section) in sections.iter().enumerate() {
        let Some(amount) = per_section.get(section).copied() else {
            continue;
        };
        let scaled = if i == sections.len() - 1 {
            cap - assigned
        } else {
            (amount * cap / group_total).round_dp(2)
        };
        assigned += scaled;
        per_section.insert(*section, scaled);
    }
}
