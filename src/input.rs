//! Caller-supplied input: taxpayer context, income profile and deduction claims.

use crate::error::ValidationError;
use crate::tax::deductions::Section;
use crate::tax::FinancialYear;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Unified JSON input format.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxInput {
    #[schemars(with = "String")]
    pub financial_year: FinancialYear,
    #[serde(rename = "taxpayerContext")]
    pub context: TaxpayerContext,
    #[serde(rename = "incomeProfile")]
    pub income: IncomeProfile,
    #[serde(rename = "deductionEntries", default)]
    pub deductions: Vec<DeductionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaxpayerCategory {
    #[default]
    Individual,
    Huf,
    Firm,
    Llp,
    Company,
}

impl TaxpayerCategory {
    pub fn display(&self) -> &'static str {
        match self {
            TaxpayerCategory::Individual => "individual",
            TaxpayerCategory::Huf => "huf",
            TaxpayerCategory::Firm => "firm",
            TaxpayerCategory::Llp => "llp",
            TaxpayerCategory::Company => "company",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default,
)]
pub enum AgeBracket {
    #[default]
    #[serde(rename = "below60")]
    Below60,
    #[serde(rename = "60to80")]
    SixtyTo80,
    #[serde(rename = "above80")]
    Above80,
}

impl AgeBracket {
    pub fn is_senior(&self) -> bool {
        matches!(self, AgeBracket::SixtyTo80 | AgeBracket::Above80)
    }

    pub fn display(&self) -> &'static str {
        match self {
            AgeBracket::Below60 => "below60",
            AgeBracket::SixtyTo80 => "60to80",
            AgeBracket::Above80 => "above80",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisabilityType {
    #[default]
    None,
    Normal,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum CityTier {
    #[serde(rename = "metro")]
    Metro,
    #[default]
    #[serde(rename = "non-metro")]
    NonMetro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum ResidentialStatus {
    #[default]
    #[serde(rename = "resident")]
    Resident,
    #[serde(rename = "non-resident")]
    NonResident,
    #[serde(rename = "not-ordinarily-resident")]
    NotOrdinarilyResident,
}

/// Who the taxpayer is. Immutable for the lifetime of one computation;
/// several deduction caps key off these fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxpayerContext {
    pub category: TaxpayerCategory,
    #[serde(default)]
    pub age_bracket: AgeBracket,
    #[serde(default)]
    pub spouse_age_bracket: AgeBracket,
    #[serde(default)]
    pub parents_age_bracket: AgeBracket,
    #[serde(default)]
    pub has_parents: bool,
    /// Disability of a dependant, for Section 80DD.
    #[serde(default)]
    pub dependent_disability: DisabilityType,
    /// Disability of the taxpayer, for Section 80U.
    #[serde(default)]
    pub self_disability: DisabilityType,
    /// City tier for the 80GG rent deduction.
    #[serde(default)]
    pub city_tier: CityTier,
    #[serde(default)]
    pub residential_status: ResidentialStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryIncome {
    #[serde(default)]
    #[schemars(with = "f64")]
    pub basic: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub hra: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub other_allowances: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub bonus: Decimal,
}

impl SalaryIncome {
    pub fn total(&self) -> Decimal {
        self.basic + self.hra + self.other_allowances + self.bonus
    }
}

/// All heads of income. Every field is non-negative except
/// `house_property`, which may carry a loss subject to set-off limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeProfile {
    #[serde(default)]
    pub salary: SalaryIncome,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub house_property: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub short_term_capital_gains: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub long_term_capital_gains: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub interest_income: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub business_income: Decimal,
}

impl IncomeProfile {
    /// Gross total income with the house-property loss set off against
    /// other heads, capped at `hp_loss_setoff_cap` (a non-negative amount).
    pub fn gross_total_income(&self, hp_loss_setoff_cap: Decimal) -> Decimal {
        let house_property = self.house_property.max(-hp_loss_setoff_cap);
        self.salary.total()
            + house_property
            + self.short_term_capital_gains
            + self.long_term_capital_gains
            + self.interest_income
            + self.other_income
            + self.business_income
    }
}

/// One claimed deduction: a section code plus named component amounts
/// (e.g., `"ppfContribution": 80000`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeductionEntry {
    pub section: Section,
    #[schemars(with = "BTreeMap<String, f64>")]
    pub components: BTreeMap<String, Decimal>,
}

impl DeductionEntry {
    pub fn raw_total(&self) -> Decimal {
        self.components.values().copied().sum()
    }
}

impl TaxInput {
    /// Reject malformed input up front; the engine never partially applies
    /// a computation over bad data.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.context.category {
            TaxpayerCategory::Individual | TaxpayerCategory::Huf => {}
            other => {
                return Err(ValidationError::UnsupportedCategory(
                    other.display().to_string(),
                ))
            }
        }
        let income_fields = [
            ("salary basic", self.income.salary.basic),
            ("salary hra", self.income.salary.hra),
            ("salary other allowances", self.income.salary.other_allowances),
            ("salary bonus", self.income.salary.bonus),
            (
                "short-term capital gains",
                self.income.short_term_capital_gains,
            ),
            (
                "long-term capital gains",
                self.income.long_term_capital_gains,
            ),
            ("interest income", self.income.interest_income),
            ("other income", self.income.other_income),
            ("business income", self.income.business_income),
        ];
        for (field, amount) in income_fields {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(ValidationError::NegativeIncome { field, amount });
            }
        }
        validate_entries(&self.deductions)
    }
}

/// Entry-level checks shared by `TaxInput::validate` and the aggregator.
/// Negative amounts are rejected, not clamped, to surface caller bugs.
pub(crate) fn validate_entries(entries: &[DeductionEntry]) -> Result<(), ValidationError> {
    for entry in entries {
        if entry.section == Section::StandardDeduction {
            return Err(ValidationError::ReservedSection(
                entry.section.code().to_string(),
            ));
        }
        for (component, amount) in &entry.components {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(ValidationError::NegativeAmount {
                    section: entry.section.code().to_string(),
                    component: component.clone(),
                    amount: *amount,
                });
            }
        }
    }
    Ok(())
}

/// Read a `TaxInput` from JSON.
pub fn read_input_json<R: Read>(reader: R) -> anyhow::Result<TaxInput> {
    let input: TaxInput = serde_json::from_reader(reader)?;
    Ok(input)
}

/// CSV record format for deduction claims: `section,component,amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionCsvRecord {
    pub section: String,
    pub component: String,
    pub amount: Decimal,
}

/// Read deduction entries from CSV, merging rows for the same section.
/// Duplicate (section, component) rows are summed.
pub fn read_deductions_csv<R: Read>(reader: R) -> anyhow::Result<Vec<DeductionEntry>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut by_section: BTreeMap<Section, BTreeMap<String, Decimal>> = BTreeMap::new();
    for record in rdr.deserialize::<DeductionCsvRecord>() {
        let record = record?;
        let section = Section::parse(&record.section)
            .ok_or_else(|| anyhow::anyhow!("unknown section code '{}'", record.section))?;
        *by_section
            .entry(section)
            .or_default()
            .entry(record.component)
            .or_insert(Decimal::ZERO) += record.amount;
    }
    let entries = by_section
        .into_iter()
        .map(|(section, components)| DeductionEntry {
            section,
            components,
        })
        .collect();
    log::info!("Read deduction entries from csv");
    Ok(entries)
}
