#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use rechnungslauf::numbering::SequenceLedger;
use rechnungslauf::sheet::parse_csv;

fuzz_target!(|data: &[u8]| {
    let Ok(sheet) = parse_csv(data) else {
        return;
    };
    let Ok(mut ledger) = SequenceLedger::from_sheet(&sheet, 1) else {
        return;
    };
    // Malformed ledgers are errors, never panics; a loaded one must reserve and roll back cleanly.
    let before = ledger.last_row().cloned();
    let today = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
    if ledger.reserve(today).is_ok() {
        ledger.rollback().unwrap();
        assert_eq!(ledger.last_row().cloned(), before);
    }
    let _ = ledger.to_sheet();
});
