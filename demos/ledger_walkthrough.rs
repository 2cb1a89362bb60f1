use chrono::NaiveDate;
use rechnungslauf::numbering::{LedgerRow, SequenceLedger};

fn main() -> Result<(), rechnungslauf::RechnungError> {
    let mut ledger = SequenceLedger::from_rows(vec![LedgerRow::new("A", 24, 7, "05.11.2024")]);
    let december = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();

    // Bob's invoice saves: the number stands
    let bob = ledger.reserve(december)?;
    ledger.confirm();
    println!("Bob:  {}", bob.identifier);

    // Cara's invoice fails to save: the number is released
    let cara = ledger.reserve(december)?;
    let released = ledger.rollback()?;
    assert_eq!(cara, released);
    println!("Cara: {} released", released.identifier);

    // Dan receives the number Cara would have had
    let dan = ledger.reserve(december)?;
    ledger.confirm();
    println!("Dan:  {}", dan.identifier);

    // New year, new sequence
    let january = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let eve = ledger.reserve(january)?;
    println!("Eve:  {}", eve.identifier);

    println!("\n{} rows, dirty: {}", ledger.rows().len(), ledger.is_dirty());
    for row in ledger.rows() {
        println!("  {:<10} {}", row.identifier(), row.issue_date_text);
    }
    Ok(())
}
