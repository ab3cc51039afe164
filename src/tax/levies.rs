//! Rebate (Section 87A), high-income surcharge and cess.

use crate::config::{RebateConfig, SurchargeSlab};
use crate::tax::slab::{compute_slab_tax, SlabTable};
use rust_decimal::Decimal;

/// Section 87A rebate. At or below the threshold the rebate wipes out tax
/// up to the configured maximum. Just above it, marginal relief (where the
/// regime enables it) caps the net tax at the income excess past the
/// threshold, so crossing the line can never cost more than the extra
/// income earned.
pub fn compute_rebate(tax_before_cess: Decimal, taxable: Decimal, config: &RebateConfig) -> Decimal {
    if taxable <= config.threshold {
        return tax_before_cess.min(config.max_rebate);
    }
    if config.marginal_relief {
        let excess = taxable - config.threshold;
        let relief = (tax_before_cess - excess).max(Decimal::ZERO);
        if relief > Decimal::ZERO {
            log::debug!(
                "rebate marginal relief: tax={}, excess={}, relief={}",
                tax_before_cess,
                excess,
                relief
            );
        }
        return relief;
    }
    Decimal::ZERO
}

/// Surcharge from an ordered threshold table, with marginal relief: total
/// tax just above a threshold never exceeds the total at the threshold
/// plus the income excess.
pub fn compute_surcharge(
    tax_after_rebate: Decimal,
    taxable: Decimal,
    bands: &[SurchargeSlab],
    table: &SlabTable,
) -> Decimal {
    let mut band_index = None;
    for (i, band) in bands.iter().enumerate() {
        if taxable > band.threshold {
            band_index = Some(i);
        }
    }
    let Some(i) = band_index else {
        return Decimal::ZERO;
    };

    let band = &bands[i];
    let rate_below = if i > 0 {
        bands[i - 1].rate
    } else {
        Decimal::ZERO
    };
    let surcharge = tax_after_rebate * band.rate;

    // Total payable at the threshold itself, with the lower band's rate.
    let tax_at_threshold = compute_slab_tax(band.threshold, table).tax_before_cess;
    let ceiling = tax_at_threshold * (Decimal::ONE + rate_below) + (taxable - band.threshold);
    let capped = surcharge.min((ceiling - tax_after_rebate).max(Decimal::ZERO));
    if capped < surcharge {
        log::debug!(
            "surcharge marginal relief: {} capped to {} at threshold {}",
            surcharge,
            capped,
            band.threshold
        );
    }
    capped
}

/// Flat cess on tax after rebate and surcharge. No caps, no brackets.
pub fn compute_cess(tax_after_rebate_and_surcharge: Decimal, rate: Decimal) -> Decimal {
    tax_after_rebate_and_surcharge * rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::slab::SlabRow;
    use rust_decimal_macros::dec;

    fn new_regime_rebate() -> RebateConfig {
        RebateConfig {
            threshold: dec!(700000),
            max_rebate: dec!(25000),
            marginal_relief: true,
        }
    }

    fn old_regime_rebate() -> RebateConfig {
        RebateConfig {
            threshold: dec!(500000),
            max_rebate: dec!(12500),
            marginal_relief: false,
        }
    }

    fn old_regime_table() -> SlabTable {
        SlabTable::new(vec![
            SlabRow {
                lower: dec!(0),
                upper: Some(dec!(250000)),
                rate: dec!(0),
            },
            SlabRow {
                lower: dec!(250000),
                upper: Some(dec!(500000)),
                rate: dec!(0.05),
            },
            SlabRow {
                lower: dec!(500000),
                upper: Some(dec!(1000000)),
                rate: dec!(0.20),
            },
            SlabRow {
                lower: dec!(1000000),
                upper: None,
                rate: dec!(0.30),
            },
        ])
        .unwrap()
    }

    fn surcharge_bands() -> Vec<SurchargeSlab> {
        vec![
            SurchargeSlab {
                threshold: dec!(5000000),
                rate: dec!(0.10),
            },
            SurchargeSlab {
                threshold: dec!(10000000),
                rate: dec!(0.15),
            },
            SurchargeSlab {
                threshold: dec!(20000000),
                rate: dec!(0.25),
            },
            SurchargeSlab {
                threshold: dec!(50000000),
                rate: dec!(0.37),
            },
        ]
    }

    #[test]
    fn rebate_below_threshold_wipes_out_tax() {
        // New regime, taxable 7,00,000: tax 20,000 fully rebated.
        assert_eq!(
            compute_rebate(dec!(20000), dec!(700000), &new_regime_rebate()),
            dec!(20000)
        );
    }

    #[test]
    fn rebate_capped_at_maximum() {
        assert_eq!(
            compute_rebate(dec!(30000), dec!(690000), &new_regime_rebate()),
            dec!(25000)
        );
    }

    #[test]
    fn rebate_marginal_relief_just_past_threshold() {
        // Taxable 7,00,100: tax 20,010, excess 100. Net tax is held to
        // the excess: rebate = 19,910.
        assert_eq!(
            compute_rebate(dec!(20010), dec!(700100), &new_regime_rebate()),
            dec!(19910)
        );
    }

    #[test]
    fn rebate_relief_phases_out() {
        // At 7,50,000 the tax (25,000) no longer exceeds the excess
        // (50,000), so no relief remains.
        assert_eq!(
            compute_rebate(dec!(25000), dec!(750000), &new_regime_rebate()),
            dec!(0)
        );
    }

    #[test]
    fn old_regime_has_no_marginal_relief() {
        // Taxable 5,00,100 in the old regime: over the threshold means
        // the rebate is simply gone.
        assert_eq!(
            compute_rebate(dec!(12520), dec!(500100), &old_regime_rebate()),
            dec!(0)
        );
    }

    #[test]
    fn no_surcharge_below_lowest_threshold() {
        let table = old_regime_table();
        assert_eq!(
            compute_surcharge(dec!(1312500), dec!(5000000), &surcharge_bands(), &table),
            dec!(0)
        );
    }

    #[test]
    fn surcharge_applies_above_threshold() {
        let table = old_regime_table();
        // 60,00,000: tax 16,12,500, well clear of the cliff; full 10%.
        let surcharge =
            compute_surcharge(dec!(1612500), dec!(6000000), &surcharge_bands(), &table);
        assert_eq!(surcharge, dec!(161250));
    }

    #[test]
    fn surcharge_marginal_relief_at_cliff_edge() {
        let table = old_regime_table();
        // One rupee over 50,00,000: tax 13,12,500 both sides of the line
        // after flooring, so the surcharge collapses to the 1-rupee excess.
        let surcharge =
            compute_surcharge(dec!(1312500), dec!(5000001), &surcharge_bands(), &table);
        assert_eq!(surcharge, dec!(1));
    }

    #[test]
    fn surcharge_relief_uses_lower_band_rate() {
        let table = old_regime_table();
        // Just above the 1Cr threshold the ceiling includes the 10%
        // surcharge payable at the threshold.
        let tax = compute_slab_tax(dec!(10000100), &table).tax_before_cess;
        let surcharge = compute_surcharge(tax, dec!(10000100), &surcharge_bands(), &table);
        let tax_at_threshold = compute_slab_tax(dec!(10000000), &table).tax_before_cess;
        let ceiling = tax_at_threshold * dec!(1.10) + dec!(100);
        assert_eq!(tax + surcharge, ceiling);
    }

    #[test]
    fn cess_is_flat_percentage() {
        assert_eq!(compute_cess(dec!(32500), dec!(0.04)), dec!(1300.00));
        assert_eq!(compute_cess(dec!(0), dec!(0.04)), dec!(0));
    }
}
