use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rechnungslauf::Customer;
use rechnungslauf::numbering::{LedgerRow, SequenceLedger};
use rechnungslauf::sheet::{SheetRecord, map_sheet, parse_csv};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// A ledger with a year's worth of history.
fn ledger_with_history(rows: u32) -> SequenceLedger {
    let history = (1..=rows)
        .map(|n| LedgerRow::new("A", 24, n, "15.06.2024"))
        .collect();
    SequenceLedger::from_rows(history)
}

fn customer_csv(rows: usize) -> String {
    let mut csv = String::from("Nume,Nr.Reg.Com,CIF,Sediu,Banca,IBAN,Suma,Email,TVA,Email?\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "Customer {i} SRL,J40/{i}/2020,RO{i},Str. {i},BT,RO49BTRL{i:08},{},c{i}@example.com,0.19,نعم\n",
            100 + i
        ));
    }
    csv
}

fn bench_reserve_confirm(c: &mut Criterion) {
    c.bench_function("reserve_confirm_100", |b| {
        b.iter(|| {
            let mut ledger = ledger_with_history(1_000);
            for _ in 0..100 {
                black_box(ledger.reserve(today()).unwrap());
                ledger.confirm();
            }
            ledger
        });
    });
}

fn bench_reserve_rollback(c: &mut Criterion) {
    let mut ledger = ledger_with_history(1_000);
    c.bench_function("reserve_rollback", |b| {
        b.iter(|| {
            black_box(ledger.reserve(today()).unwrap());
            black_box(ledger.rollback().unwrap());
        });
    });
}

fn bench_trailing_blank_scan(c: &mut Criterion) {
    let mut rows: Vec<LedgerRow> = (1..=100).map(|n| LedgerRow::new("A", 24, n, "")).collect();
    rows.extend((0..500).map(|_| LedgerRow::blank()));
    let mut ledger = SequenceLedger::from_rows(rows);
    c.bench_function("reserve_after_500_blank_rows", |b| {
        b.iter(|| {
            black_box(ledger.reserve(today()).unwrap());
            ledger.rollback().unwrap();
        });
    });
}

fn bench_map_customers(c: &mut Criterion) {
    let sheet = parse_csv(customer_csv(1_000).as_bytes()).unwrap();
    let schema = Customer::schema().unwrap();
    c.bench_function("map_1000_customers", |b| {
        b.iter(|| black_box(map_sheet(black_box(&sheet), &schema)));
    });
}

fn bench_parse_customer_csv(c: &mut Criterion) {
    let csv = customer_csv(1_000);
    c.bench_function("parse_1000_customer_rows", |b| {
        b.iter(|| black_box(parse_csv(black_box(csv.as_bytes())).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_reserve_confirm,
    bench_reserve_rollback,
    bench_trailing_blank_scan,
    bench_map_customers,
    bench_parse_customer_csv,
);
criterion_main!(benches);
