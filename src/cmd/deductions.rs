//! Deductions command - per-section eligible amounts for one regime.

use crate::config::ConfigRegistry;
use crate::input::DeductionEntry;
use crate::tax::deductions::{aggregate, Section};
use crate::tax::Regime;
use crate::utils::{format_inr, write_csv};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DeductionsCommand {
    /// JSON file containing the tax input (or "-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Extra deduction entries from a section,component,amount CSV
    #[arg(short, long)]
    deductions: Option<PathBuf>,

    /// Regime to aggregate under
    #[arg(short, long, value_enum, default_value_t = RegimeArg::Old)]
    regime: RegimeArg,

    /// Output as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RegimeArg {
    #[default]
    Old,
    New,
}

impl From<RegimeArg> for Regime {
    fn from(arg: RegimeArg) -> Self {
        match arg {
            RegimeArg::Old => Regime::Old,
            RegimeArg::New => Regime::New,
        }
    }
}

#[derive(Debug, Clone, Tabled, Serialize)]
struct DeductionRow {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Claimed")]
    claimed: String,
    #[tabled(rename = "Eligible")]
    eligible: String,
}

impl DeductionsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let regime: Regime = self.regime.into();
        let registry = ConfigRegistry::builtin();

        let mut input = super::read_input(&self.input)?;
        if let Some(ref path) = self.deductions {
            input.deductions.extend(super::read_csv_deductions(path)?);
        }
        input.validate()?;

        let config = registry.get(input.financial_year)?;
        let breakdown = aggregate(
            &input.deductions,
            &input.context,
            &input.income,
            config,
            regime,
        )?;

        let claimed = claimed_by_section(&input.deductions);
        let mut rows: Vec<DeductionRow> = breakdown
            .per_section
            .iter()
            .map(|(section, eligible)| DeductionRow {
                section: section.code().to_string(),
                claimed: claimed
                    .get(section)
                    .map_or("-".to_string(), |amount| format_inr(*amount)),
                eligible: format_inr(*eligible),
            })
            .collect();
        rows.push(DeductionRow {
            section: "TOTAL".to_string(),
            claimed: String::new(),
            eligible: format_inr(breakdown.total),
        });

        if self.csv {
            write_csv(rows, io::stdout())
        } else {
            println!();
            println!(
                "ELIGIBLE DEDUCTIONS ({}, {} regime)",
                input.financial_year, regime
            );
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
            Ok(())
        }
    }
}

fn claimed_by_section(entries: &[DeductionEntry]) -> BTreeMap<Section, Decimal> {
    let mut claimed = BTreeMap::new();
    for entry in entries {
        *claimed.entry(entry.section).or_insert(Decimal::ZERO) += entry.raw_total();
    }
    claimed
}
