//! Progressive slab taxation: bracket walk with a single final rounding.

use crate::error::ConfigurationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tax bracket. `lower` is inclusive, `upper` exclusive; the last
/// bracket is open-ended (`upper = None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabRow {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// Ordered brackets with gapless coverage from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlabRow>", into = "Vec<SlabRow>")]
pub struct SlabTable {
    rows: Vec<SlabRow>,
}

impl SlabTable {
    pub fn new(rows: Vec<SlabRow>) -> Result<Self, ConfigurationError> {
        let invalid = |msg: &str| ConfigurationError::InvalidSlabTable(msg.to_string());
        if rows.is_empty() {
            return Err(invalid("no brackets"));
        }
        if !rows[0].lower.is_zero() {
            return Err(invalid("first bracket must start at 0"));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.rate.is_sign_negative() || row.rate > Decimal::ONE {
                return Err(invalid("rate must be between 0 and 1"));
            }
            match row.upper {
                Some(upper) => {
                    if i == rows.len() - 1 {
                        return Err(invalid("last bracket must be open-ended"));
                    }
                    if upper <= row.lower {
                        return Err(invalid("bracket upper bound must exceed lower bound"));
                    }
                    if rows[i + 1].lower != upper {
                        return Err(invalid("brackets must be contiguous"));
                    }
                }
                None => {
                    if i != rows.len() - 1 {
                        return Err(invalid("only the last bracket may be open-ended"));
                    }
                }
            }
        }
        Ok(SlabTable { rows })
    }

    pub fn rows(&self) -> &[SlabRow] {
        &self.rows
    }
}

impl TryFrom<Vec<SlabRow>> for SlabTable {
    type Error = ConfigurationError;

    fn try_from(rows: Vec<SlabRow>) -> Result<Self, Self::Error> {
        SlabTable::new(rows)
    }
}

impl From<SlabTable> for Vec<SlabRow> {
    fn from(table: SlabTable) -> Self {
        table.rows
    }
}

/// One line of the bracket-by-bracket breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabLine {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    pub income: Decimal,
    pub tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlabTax {
    pub tax_before_cess: Decimal,
    pub breakdown: Vec<SlabLine>,
}

/// Walk the brackets in ascending order, accumulating tax on the income
/// falling in each. The total is rounded down to the whole rupee once,
/// after full accumulation, so per-bracket rounding can never drift.
pub fn compute_slab_tax(taxable: Decimal, table: &SlabTable) -> SlabTax {
    if taxable <= Decimal::ZERO {
        return SlabTax {
            tax_before_cess: Decimal::ZERO,
            breakdown: Vec::new(),
        };
    }

    let mut total = Decimal::ZERO;
    let mut breakdown = Vec::new();
    for row in table.rows() {
        let top = row.upper.map_or(taxable, |upper| taxable.min(upper));
        let income = (top - row.lower).max(Decimal::ZERO);
        if income.is_zero() {
            continue;
        }
        let tax = income * row.rate;
        total += tax;
        log::debug!(
            "slab {}..{:?} rate={}: income={}, tax={}",
            row.lower,
            row.upper,
            row.rate,
            income,
            tax
        );
        breakdown.push(SlabLine {
            lower: row.lower,
            upper: row.upper,
            rate: row.rate,
            income,
            tax,
        });
    }

    SlabTax {
        tax_before_cess: total.floor(),
        breakdown,
    }
}

/// Rate of the bracket containing the last rupee of taxable income.
pub fn marginal_rate(taxable: Decimal, table: &SlabTable) -> Decimal {
    if taxable <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    for row in table.rows() {
        let in_bracket = taxable > row.lower && row.upper.map_or(true, |upper| taxable <= upper);
        if in_bracket {
            return row.rate;
        }
    }
    Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(lower: Decimal, upper: Option<Decimal>, rate: Decimal) -> SlabRow {
        SlabRow { lower, upper, rate }
    }

    /// Old-regime below-60 slabs: 0/2.5L/5L/10L at 0/5/20/30%.
    fn old_regime_table() -> SlabTable {
        SlabTable::new(vec![
            row(dec!(0), Some(dec!(250000)), dec!(0)),
            row(dec!(250000), Some(dec!(500000)), dec!(0.05)),
            row(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
            row(dec!(1000000), None, dec!(0.30)),
        ])
        .unwrap()
    }

    #[test]
    fn zero_income_no_tax() {
        let result = compute_slab_tax(dec!(0), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn negative_income_no_tax() {
        let result = compute_slab_tax(dec!(-50000), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn income_within_first_bracket() {
        let result = compute_slab_tax(dec!(200000), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(0));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].income, dec!(200000));
    }

    #[test]
    fn income_spanning_three_brackets() {
        // 6,00,000: 2.5L at 0% + 2.5L at 5% + 1L at 20% = 32,500
        let result = compute_slab_tax(dec!(600000), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(32500));
        assert_eq!(result.breakdown.len(), 3);
        assert_eq!(result.breakdown[1].tax, dec!(12500));
        assert_eq!(result.breakdown[2].tax, dec!(20000));
    }

    #[test]
    fn income_at_upper_bound_taxed_within_bracket() {
        // Exactly 5,00,000 stays in the 5% bracket; the 20% bracket
        // contributes nothing.
        let result = compute_slab_tax(dec!(500000), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(12500));
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown.last().unwrap().rate, dec!(0.05));
    }

    #[test]
    fn open_ended_top_bracket() {
        // 20,00,000: 12,500 + 1,00,000 + 30% of 10L = 4,12,500
        let result = compute_slab_tax(dec!(2000000), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(412500));
    }

    #[test]
    fn rounds_down_once_after_accumulation() {
        // 2,50,009 leaves 9 rupees in the 5% bracket: 0.45, floored to 0.
        let result = compute_slab_tax(dec!(250009), &old_regime_table());
        assert_eq!(result.tax_before_cess, dec!(0));
        // The unrounded line is preserved in the breakdown.
        assert_eq!(result.breakdown[1].tax, dec!(0.45));
    }

    #[test]
    fn marginal_rate_of_last_rupee() {
        let table = old_regime_table();
        assert_eq!(marginal_rate(dec!(0), &table), dec!(0));
        assert_eq!(marginal_rate(dec!(250000), &table), dec!(0));
        assert_eq!(marginal_rate(dec!(250001), &table), dec!(0.05));
        assert_eq!(marginal_rate(dec!(500000), &table), dec!(0.05));
        assert_eq!(marginal_rate(dec!(999999), &table), dec!(0.20));
        assert_eq!(marginal_rate(dec!(5000000), &table), dec!(0.30));
    }

    #[test]
    fn rejects_gap_between_brackets() {
        let result = SlabTable::new(vec![
            row(dec!(0), Some(dec!(250000)), dec!(0)),
            row(dec!(300000), None, dec!(0.05)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_table_not_starting_at_zero() {
        let result = SlabTable::new(vec![row(dec!(100), None, dec!(0))]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bounded_last_bracket() {
        let result = SlabTable::new(vec![
            row(dec!(0), Some(dec!(250000)), dec!(0)),
            row(dec!(250000), Some(dec!(500000)), dec!(0.05)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_rate_above_one() {
        let result = SlabTable::new(vec![row(dec!(0), None, dec!(1.5))]);
        assert!(result.is_err());
    }

    #[test]
    fn deserialization_validates() {
        let json = r#"[
            { "lower": "0", "upper": "250000", "rate": "0" },
            { "lower": "250000", "upper": null, "rate": "0.05" }
        ]"#;
        let table: SlabTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.rows().len(), 2);

        let gap = r#"[
            { "lower": "0", "upper": "250000", "rate": "0" },
            { "lower": "999999", "upper": null, "rate": "0.05" }
        ]"#;
        assert!(serde_json::from_str::<SlabTable>(gap).is_err());
    }
}
