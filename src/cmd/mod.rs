pub mod compare;
pub mod deductions;
pub mod schema;
pub mod years;

use crate::input::{self, TaxInput};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a `TaxInput` (JSON) from a file, or stdin with "-".
pub fn read_input(path: &Path) -> anyhow::Result<TaxInput> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        input::read_input_json(reader)
    }
}

fn read_from_stdin() -> anyhow::Result<TaxInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    input::read_input_json(io::Cursor::new(buffer))
}

/// Read extra deduction entries from a `section,component,amount` CSV.
pub fn read_csv_deductions(path: &Path) -> anyhow::Result<Vec<crate::input::DeductionEntry>> {
    let file = File::open(path)?;
    input::read_deductions_csv(BufReader::new(file))
}
