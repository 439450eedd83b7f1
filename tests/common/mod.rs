use std::io::Error;
use std::path::Path;

#[allow(dead_code)]
pub const HEADER: [&str; 12] = [
    "id",
    "name",
    "fee",
    "fee_type",
    "processing_time",
    "processing_time_minutes",
    "payout",
    "rating",
    "features",
    "business_friendly",
    "key_notes",
    "is_best",
];

/// Writes a provider table with `rows` percentage providers named `Provider1..=rows`.
///
/// Payout decreases with the id so the table order is also the payout-desc order.
#[allow(dead_code)]
pub fn generate_providers_csv(path: &Path, rows: u32) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;

    for i in 1..=rows {
        let payout = format!("{:.2}", 99.0 - f64::from(i) / 100.0);
        wtr.write_record([
            &i.to_string(),
            &format!("Provider{i}"),
            "1.0",
            "percentage",
            "5 mins",
            "5",
            &payout,
            "4.0",
            "Generated",
            "true",
            "",
            "false",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
