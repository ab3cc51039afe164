//! Single-regime evaluation and the old-vs-new comparison.

use crate::config::{ConfigRegistry, TaxConfig};
use crate::error::EngineError;
use crate::input::{IncomeProfile, ResidentialStatus, TaxInput};
use crate::tax::deductions::{aggregate, Section};
use crate::tax::levies::{compute_cess, compute_rebate, compute_surcharge};
use crate::tax::slab::{compute_slab_tax, marginal_rate, SlabLine};
use crate::tax::Regime;
use crate::utils::format_inr;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Full computation for one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeResult {
    pub regime: Regime,
    pub gross_total_income: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_before_cess: Decimal,
    pub slab_breakdown: Vec<SlabLine>,
    pub rebate: Decimal,
    pub surcharge: Decimal,
    pub cess: Decimal,
    pub net_tax: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
    pub deductions: BTreeMap<Section, Decimal>,
}

/// Income heads as supplied by the caller, echoed back for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBreakdown {
    pub salary_total: Decimal,
    pub house_property: Decimal,
    pub short_term_capital_gains: Decimal,
    pub long_term_capital_gains: Decimal,
    pub interest_income: Decimal,
    pub other_income: Decimal,
    pub business_income: Decimal,
}

impl From<&IncomeProfile> for IncomeBreakdown {
    fn from(income: &IncomeProfile) -> Self {
        IncomeBreakdown {
            salary_total: income.salary.total(),
            house_property: income.house_property,
            short_term_capital_gains: income.short_term_capital_gains,
            long_term_capital_gains: income.long_term_capital_gains,
            interest_income: income.interest_income,
            other_income: income.other_income,
            business_income: income.business_income,
        }
    }
}

/// Two-regime comparison with a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub financial_year: String,
    #[serde(rename = "oldRegime")]
    pub old: RegimeResult,
    #[serde(rename = "newRegime")]
    pub new: RegimeResult,
    #[serde(rename = "recommendedRegime")]
    pub recommended: Regime,
    pub savings: Decimal,
    pub reason: String,
    pub income_breakdown: IncomeBreakdown,
}

/// Evaluate one regime: aggregate deductions, walk the slabs, then apply
/// rebate, surcharge and cess in that order. Pure function of its inputs;
/// any error aborts before a result exists.
pub fn evaluate_regime(
    input: &TaxInput,
    config: &TaxConfig,
    regime: Regime,
) -> Result<RegimeResult, EngineError> {
    let regime_config = config.regime(regime);
    let gross_total_income = input
        .income
        .gross_total_income(regime_config.hp_loss_setoff_cap);

    let deductions = aggregate(
        &input.deductions,
        &input.context,
        &input.income,
        config,
        regime,
    )?;
    let taxable_income = (gross_total_income - deductions.total).max(Decimal::ZERO);

    let table = regime_config.slab_table(input.context.age_bracket, regime)?;
    let slab = compute_slab_tax(taxable_income, table);

    // The 87A rebate is available to residents only.
    let rebate = if input.context.residential_status == ResidentialStatus::Resident {
        compute_rebate(slab.tax_before_cess, taxable_income, &regime_config.rebate)
    } else {
        Decimal::ZERO
    };
    let after_rebate = slab.tax_before_cess - rebate;
    let surcharge = compute_surcharge(after_rebate, taxable_income, &regime_config.surcharge, table);
    let cess = compute_cess(after_rebate + surcharge, config.cess_rate);
    let net_tax = (after_rebate + surcharge + cess).max(Decimal::ZERO).normalize();

    let effective_rate = if gross_total_income > Decimal::ZERO {
        (net_tax / gross_total_income).round_dp(4).normalize()
    } else {
        Decimal::ZERO
    };

    Ok(RegimeResult {
        regime,
        gross_total_income,
        total_deductions: deductions.total,
        taxable_income,
        tax_before_cess: slab.tax_before_cess,
        slab_breakdown: slab.breakdown,
        rebate: rebate.normalize(),
        surcharge: surcharge.normalize(),
        cess: cess.normalize(),
        net_tax,
        effective_rate,
        marginal_rate: marginal_rate(taxable_income, table),
        deductions: deductions.per_section,
    })
}

/// Run both regimes on one input and recommend the cheaper one.
pub fn compare(input: &TaxInput, registry: &ConfigRegistry) -> Result<Comparison, EngineError> {
    input.validate()?;
    let config = registry.get(input.financial_year)?;

    let old = evaluate_regime(input, config, Regime::Old)?;
    let new = evaluate_regime(input, config, Regime::New)?;

    let recommended = recommend(old.net_tax, new.net_tax);
    let savings = (old.net_tax - new.net_tax).abs().normalize();
    let reason = build_reason(&old, &new, recommended, savings);

    Ok(Comparison {
        financial_year: input.financial_year.display(),
        old,
        new,
        recommended,
        savings,
        reason,
        income_breakdown: IncomeBreakdown::from(&input.income),
    })
}

/// Ties go to the new regime: same tax, fewer compliance requirements.
fn recommend(old_net: Decimal, new_net: Decimal) -> Regime {
    if old_net < new_net {
        Regime::Old
    } else {
        Regime::New
    }
}

fn build_reason(
    old: &RegimeResult,
    new: &RegimeResult,
    recommended: Regime,
    savings: Decimal,
) -> String {
    match recommended {
        Regime::Old => {
            if old.total_deductions > new.total_deductions {
                format!(
                    "Old regime saves {}: deductions of {} outweigh the new regime's lower slab rates",
                    format_inr(savings),
                    format_inr(old.total_deductions)
                )
            } else {
                format!(
                    "Old regime saves {} for this profile",
                    format_inr(savings)
                )
            }
        }
        Regime::New => {
            if savings.is_zero() {
                "Both regimes produce the same tax; the new regime is recommended for its simpler compliance".to_string()
            } else if old.total_deductions > new.total_deductions {
                format!(
                    "New regime saves {}: lower slab rates outweigh {} of old-regime deductions",
                    format_inr(savings),
                    format_inr(old.total_deductions)
                )
            } else {
                format!(
                    "New regime saves {}: larger standard deduction and lower slab rates",
                    format_inr(savings)
                )
            }
        }
    }
}
