//! Schema command - print expected input formats

use crate::input::TaxInput;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or csv-header
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the input format
    JsonSchema,
    /// CSV header row for deduction entries
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(TaxInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        println!("{}", CSV_COLUMNS.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("Deduction CSV Input Format");
        println!("==========================");
        println!();
        for (name, required, description) in CSV_FIELD_DESCRIPTIONS {
            let req = if *required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", name, req, description);
        }
        println!();
        println!("Rows for the same section are merged; duplicate components are summed.");
        Ok(())
    }
}

const CSV_COLUMNS: &[&str] = &["section", "component", "amount"];

const CSV_FIELD_DESCRIPTIONS: &[(&str, bool, &str)] = &[
    (
        "section",
        true,
        "Section code (e.g., 80C, 80D, 80D-PARENTS, 80GG, 24B)",
    ),
    (
        "component",
        true,
        "Named sub-amount (e.g., ppfContribution, healthInsurancePremium)",
    ),
    ("amount", true, "Non-negative amount in rupees"),
];
