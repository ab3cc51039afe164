//! Years command - list the built-in financial-year configurations.

use crate::config::ConfigRegistry;
use crate::utils::{format_inr, format_rate};
use clap::Args;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct YearsCommand {}

#[derive(Debug, Clone, Tabled)]
struct YearRow {
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Std Ded (Old)")]
    std_old: String,
    #[tabled(rename = "Std Ded (New)")]
    std_new: String,
    #[tabled(rename = "Rebate Limit (Old)")]
    rebate_old: String,
    #[tabled(rename = "Rebate Limit (New)")]
    rebate_new: String,
    #[tabled(rename = "Cess")]
    cess: String,
}

impl YearsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let registry = ConfigRegistry::builtin();
        let rows: Vec<YearRow> = registry
            .years()
            .map(|config| YearRow {
                year: config.year.display(),
                std_old: format_inr(config.old.standard_deduction),
                std_new: format_inr(config.new.standard_deduction),
                rebate_old: format_inr(config.old.rebate.threshold),
                rebate_new: format_inr(config.new.rebate.threshold),
                cess: format_rate(config.cess_rate),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
