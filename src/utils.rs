use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn write_csv<I, R, W>(records: I, writer: W) -> anyhow::Result<()>
where
    I: IntoIterator<Item = R>,
    R: serde::Serialize,
    W: std::io::Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records.into_iter() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Format an amount with Indian digit grouping: ₹12,34,567.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp(0).normalize();
    let negative = rounded.is_sign_negative();
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    if digits.len() <= 3 {
        grouped.push_str(&digits);
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut head_groups = Vec::new();
        let mut end = head.len();
        while end > 2 {
            head_groups.push(&head[end - 2..end]);
            end -= 2;
        }
        head_groups.push(&head[..end]);
        head_groups.reverse();
        grouped.push_str(&head_groups.join(","));
        grouped.push(',');
        grouped.push_str(tail);
    }

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

/// Display a fractional rate as a percentage, e.g. 0.05 -> "5%".
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * dec!(100)).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inr_grouping() {
        assert_eq!(format_inr(dec!(0)), "₹0");
        assert_eq!(format_inr(dec!(999)), "₹999");
        assert_eq!(format_inr(dec!(1000)), "₹1,000");
        assert_eq!(format_inr(dec!(100000)), "₹1,00,000");
        assert_eq!(format_inr(dec!(1234567)), "₹12,34,567");
        assert_eq!(format_inr(dec!(12345678)), "₹1,23,45,678");
        assert_eq!(format_inr(dec!(123456789)), "₹12,34,56,789");
    }

    #[test]
    fn inr_rounds_to_whole_rupees() {
        assert_eq!(format_inr(dec!(33800.00)), "₹33,800");
        assert_eq!(format_inr(dec!(1300.4)), "₹1,300");
    }

    #[test]
    fn inr_negative() {
        assert_eq!(format_inr(dec!(-150000)), "-₹1,50,000");
    }

    #[test]
    fn rate_display() {
        assert_eq!(format_rate(dec!(0.05)), "5%");
        assert_eq!(format_rate(dec!(0.30)), "30%");
        assert_eq!(format_rate(dec!(0.0875)), "8.75%");
        assert_eq!(format_rate(dec!(0)), "0%");
    }
}
