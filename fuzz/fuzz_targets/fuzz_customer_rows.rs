#![no_main]

use libfuzzer_sys::fuzz_target;
use rechnungslauf::Customer;
use rechnungslauf::sheet::{SheetRecord, map_sheet, parse_csv};

fuzz_target!(|data: &[u8]| {
    if let Ok(sheet) = parse_csv(data) {
        // Must not panic: cell failures are tolerated and reported.
        let schema = Customer::schema().unwrap();
        let mapped = map_sheet(&sheet, &schema);
        assert!(mapped.records.len() <= sheet.rows.len());
    }
});
