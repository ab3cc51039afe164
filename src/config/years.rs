//! Embedded statutory tables per financial year. Amounts live here as
//! data so that a new year is a new table, not new branching in the
//! algorithms.

use super::{RebateConfig, RegimeConfig, SurchargeSlab, TaxConfig};
use crate::input::AgeBracket;
use crate::tax::deductions::{
    AgeWindow, CapRule, DeductionRule, DisabledParty, GroupKey, InsuredParty, RegimeFilter, Section,
};
use crate::tax::slab::{SlabRow, SlabTable};
use crate::tax::FinancialYear;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn slab(lower: Decimal, upper: Option<Decimal>, rate: Decimal) -> SlabRow {
    SlabRow { lower, upper, rate }
}

/// Old-regime slabs; only the basic exemption varies with age.
fn old_regime_slabs(exemption: Decimal) -> SlabTable {
    SlabTable::new(vec![
        slab(dec!(0), Some(exemption), dec!(0)),
        slab(exemption, Some(dec!(500000)), dec!(0.05)),
        slab(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
        slab(dec!(1000000), None, dec!(0.30)),
    ])
    .expect("built-in slab table is valid")
}

fn age_invariant(table: SlabTable) -> BTreeMap<AgeBracket, SlabTable> {
    BTreeMap::from([
        (AgeBracket::Below60, table.clone()),
        (AgeBracket::SixtyTo80, table.clone()),
        (AgeBracket::Above80, table),
    ])
}

fn old_regime(standard_deduction: Decimal) -> RegimeConfig {
    RegimeConfig {
        slabs: BTreeMap::from([
            (AgeBracket::Below60, old_regime_slabs(dec!(250000))),
            (AgeBracket::SixtyTo80, old_regime_slabs(dec!(300000))),
            (AgeBracket::Above80, old_regime_slabs(dec!(500000))),
        ]),
        standard_deduction,
        rebate: RebateConfig {
            threshold: dec!(500000),
            max_rebate: dec!(12500),
            marginal_relief: false,
        },
        surcharge: vec![
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
        ],
        hp_loss_setoff_cap: dec!(200000),
    }
}

/// New-regime surcharge is capped at 25%; there is no 37% band.
fn new_regime_surcharge() -> Vec<SurchargeSlab> {
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
    ]
}

fn new_regime(slabs: SlabTable, standard_deduction: Decimal) -> RegimeConfig {
    RegimeConfig {
        slabs: age_invariant(slabs),
        standard_deduction,
        rebate: RebateConfig {
            threshold: dec!(700000),
            max_rebate: dec!(25000),
            marginal_relief: true,
        },
        surcharge: new_regime_surcharge(),
        hp_loss_setoff_cap: dec!(0),
    }
}

fn rule(section: Section, regimes: RegimeFilter, cap: CapRule) -> DeductionRule {
    DeductionRule {
        section,
        regimes,
        group: None,
        cap,
    }
}

fn basket_rule(section: Section) -> DeductionRule {
    DeductionRule {
        section,
        regimes: RegimeFilter::Old,
        group: Some(GroupKey::Basket80C),
        cap: CapRule::Fixed { cap: dec!(150000) },
    }
}

/// Deduction rules shared by both built-in years.
fn deduction_rules() -> Vec<DeductionRule> {
    vec![
        basket_rule(Section::Sec80C),
        basket_rule(Section::Sec80Ccc),
        basket_rule(Section::Sec80Ccd1),
        rule(
            Section::Sec80Ccd1b,
            RegimeFilter::Old,
            CapRule::Fixed { cap: dec!(50000) },
        ),
        // Employer NPS survives the new regime, at a higher percentage.
        rule(
            Section::Sec80Ccd2,
            RegimeFilter::Old,
            CapRule::EmployerNps {
                pct_of_basic: dec!(0.10),
            },
        ),
        rule(
            Section::Sec80Ccd2,
            RegimeFilter::New,
            CapRule::EmployerNps {
                pct_of_basic: dec!(0.14),
            },
        ),
        rule(
            Section::Sec80D,
            RegimeFilter::Old,
            CapRule::HealthInsurance {
                base: dec!(25000),
                senior: dec!(50000),
                covers: InsuredParty::SelfOrSpouse,
            },
        ),
        rule(
            Section::Sec80DParents,
            RegimeFilter::Old,
            CapRule::HealthInsurance {
                base: dec!(25000),
                senior: dec!(50000),
                covers: InsuredParty::Parents,
            },
        ),
        rule(
            Section::Sec80Dd,
            RegimeFilter::Old,
            CapRule::DisabilityFlat {
                normal: dec!(75000),
                severe: dec!(125000),
                party: DisabledParty::Dependant,
            },
        ),
        rule(Section::Sec80E, RegimeFilter::Old, CapRule::Unlimited),
        rule(
            Section::Sec80G,
            RegimeFilter::Old,
            CapRule::PctOfIncome { pct: dec!(0.10) },
        ),
        rule(
            Section::Sec80Gg,
            RegimeFilter::Old,
            CapRule::RentPaid {
                metro: dec!(60000),
                non_metro: dec!(48000),
            },
        ),
        rule(
            Section::Sec80Tta,
            RegimeFilter::Old,
            CapRule::SavingsInterest {
                cap: dec!(10000),
                window: AgeWindow::Below60,
            },
        ),
        rule(
            Section::Sec80Ttb,
            RegimeFilter::Old,
            CapRule::SavingsInterest {
                cap: dec!(50000),
                window: AgeWindow::SixtyPlus,
            },
        ),
        rule(
            Section::Sec80U,
            RegimeFilter::Old,
            CapRule::DisabilityFlat {
                normal: dec!(75000),
                severe: dec!(125000),
                party: DisabledParty::Taxpayer,
            },
        ),
        rule(
            Section::Sec24B,
            RegimeFilter::Old,
            CapRule::Fixed { cap: dec!(200000) },
        ),
    ]
}

fn group_caps() -> BTreeMap<GroupKey, Decimal> {
    BTreeMap::from([(GroupKey::Basket80C, dec!(150000))])
}

pub(super) fn fy_2024_25() -> TaxConfig {
    let new_slabs = SlabTable::new(vec![
        slab(dec!(0), Some(dec!(300000)), dec!(0)),
        slab(dec!(300000), Some(dec!(700000)), dec!(0.05)),
        slab(dec!(700000), Some(dec!(1000000)), dec!(0.10)),
        slab(dec!(1000000), Some(dec!(1200000)), dec!(0.15)),
        slab(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
        slab(dec!(1500000), None, dec!(0.30)),
    ])
    .expect("built-in slab table is valid");

    TaxConfig {
        year: FinancialYear(2024),
        old: old_regime(dec!(50000)),
        new: new_regime(new_slabs, dec!(75000)),
        cess_rate: dec!(0.04),
        rules: deduction_rules(),
        group_caps: group_caps(),
    }
}

pub(super) fn fy_2023_24() -> TaxConfig {
    let new_slabs = SlabTable::new(vec![
        slab(dec!(0), Some(dec!(300000)), dec!(0)),
        slab(dec!(300000), Some(dec!(600000)), dec!(0.05)),
        slab(dec!(600000), Some(dec!(900000)), dec!(0.10)),
        slab(dec!(900000), Some(dec!(1200000)), dec!(0.15)),
        slab(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
        slab(dec!(1500000), None, dec!(0.30)),
    ])
    .expect("built-in slab table is valid");

    TaxConfig {
        year: FinancialYear(2023),
        old: old_regime(dec!(50000)),
        new: new_regime(new_slabs, dec!(50000)),
        cess_rate: dec!(0.04),
        rules: deduction_rules(),
        group_caps: group_caps(),
    }
}
