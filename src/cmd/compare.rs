//! Compare command - full old-vs-new regime comparison.

use crate::config::ConfigRegistry;
use crate::tax::regime::{compare, Comparison, RegimeResult};
use crate::utils::{format_inr, format_rate};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// JSON file containing the tax input (or "-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Extra deduction entries from a section,component,amount CSV
    #[arg(short, long)]
    deductions: Option<PathBuf>,

    /// JSON file with financial-year configuration overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show the bracket-by-bracket slab breakdown
    #[arg(long)]
    detailed: bool,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct CompareRow {
    #[tabled(rename = "")]
    metric: String,
    #[tabled(rename = "Old Regime")]
    old: String,
    #[tabled(rename = "New Regime")]
    new: String,
}

#[derive(Debug, Clone, Tabled)]
struct SlabRowDisplay {
    #[tabled(rename = "Bracket")]
    bracket: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut registry = ConfigRegistry::builtin();
        if let Some(ref path) = self.config {
            registry.load_overrides(File::open(path)?)?;
        }

        let mut input = super::read_input(&self.input)?;
        if let Some(ref path) = self.deductions {
            input.deductions.extend(super::read_csv_deductions(path)?);
        }

        let comparison = compare(&input, &registry)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
            return Ok(());
        }

        self.print_summary(&comparison);
        if self.detailed {
            print_slab_table(&comparison.old);
            print_slab_table(&comparison.new);
        }
        Ok(())
    }

    fn print_summary(&self, comparison: &Comparison) {
        println!();
        println!("TAX COMPARISON ({})", comparison.financial_year);
        println!();

        let row = |metric: &str, f: fn(&RegimeResult) -> String| CompareRow {
            metric: metric.to_string(),
            old: f(&comparison.old),
            new: f(&comparison.new),
        };
        let rows = vec![
            row("Gross Total Income", |r| format_inr(r.gross_total_income)),
            row("Total Deductions", |r| format_inr(r.total_deductions)),
            row("Taxable Income", |r| format_inr(r.taxable_income)),
            row("Tax Before Cess", |r| format_inr(r.tax_before_cess)),
            row("Rebate (87A)", |r| format_inr(r.rebate)),
            row("Surcharge", |r| format_inr(r.surcharge)),
            row("Cess", |r| format_inr(r.cess)),
            row("Net Tax", |r| format_inr(r.net_tax)),
            row("Effective Rate", |r| format_rate(r.effective_rate)),
            row("Marginal Rate", |r| format_rate(r.marginal_rate)),
        ];

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        println!();
        println!(
            "Recommended: {} regime (saves {})",
            comparison.recommended,
            format_inr(comparison.savings)
        );
        println!("{}", comparison.reason);
    }
}

fn print_slab_table(result: &RegimeResult) {
    if result.slab_breakdown.is_empty() {
        return;
    }
    println!();
    println!("SLAB BREAKDOWN ({} regime)", result.regime);

    let rows: Vec<SlabRowDisplay> = result
        .slab_breakdown
        .iter()
        .map(|line| SlabRowDisplay {
            bracket: match line.upper {
                Some(upper) => format!("{} - {}", format_inr(line.lower), format_inr(upper)),
                None => format!("{} +", format_inr(line.lower)),
            },
            rate: format_rate(line.rate),
            income: format_inr(line.income),
            tax: format_inr(line.tax),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}
