//! Column layouts of the supplier and customer master data sheets.
//!
//! Both sheets carry a header row. Columns 0-5 hold the shared
//! [`Collaborator`] fields in the order name, registration number, tax id,
//! address, bank, IBAN.

use super::error::RechnungError;
use super::types::{Collaborator, Customer, Supplier};
use crate::sheet::{
    FieldBinding, IntegerTextParser, LocalizedYesNoParser, PercentageParser, RecordSchema,
    RecordSchemaBuilder, SheetRecord,
};

fn collaborator_columns<R: 'static>(
    builder: RecordSchemaBuilder<R>,
    party: fn(&mut R) -> &mut Collaborator,
) -> RecordSchemaBuilder<R> {
    builder
        .bind(
            0,
            FieldBinding::nested_text("name", party, |c: &mut Collaborator| &mut c.name)
                .required(),
        )
        .bind(
            1,
            FieldBinding::nested_text("registration_number", party, |c: &mut Collaborator| {
                &mut c.registration_number
            }),
        )
        .bind(
            2,
            FieldBinding::nested_text("tax_id", party, |c: &mut Collaborator| &mut c.tax_id),
        )
        .bind(
            3,
            FieldBinding::nested_text("address", party, |c: &mut Collaborator| &mut c.address),
        )
        .bind(
            4,
            FieldBinding::nested_text("bank", party, |c: &mut Collaborator| &mut c.bank),
        )
        .bind(
            5,
            FieldBinding::nested_text("account_iban", party, |c: &mut Collaborator| {
                &mut c.account_iban
            }),
        )
}

/// Columns: 0-5 collaborator, 6 contact email.
impl SheetRecord for Supplier {
    fn schema() -> Result<RecordSchema<Self>, RechnungError> {
        let builder = RecordSchema::builder("supplier").has_header(true);
        collaborator_columns(builder, |s: &mut Supplier| &mut s.collaborator)
            .bind(
                6,
                FieldBinding::text("contact_email", |s: &mut Supplier| &mut s.contact_email),
            )
            .build()
    }
}

/// Columns: 0-5 collaborator, 6 invoice amount, 7 contact email,
/// 8 VAT rate as a fraction, 9 email delivery yes/no.
impl SheetRecord for Customer {
    fn schema() -> Result<RecordSchema<Self>, RechnungError> {
        let builder = RecordSchema::builder("customer").has_header(true);
        collaborator_columns(builder, |c: &mut Customer| &mut c.collaborator)
            .bind(
                6,
                FieldBinding::integer("invoice_amount", |c: &mut Customer| &mut c.invoice_amount)
                    .parser(IntegerTextParser)
                    .required(),
            )
            .bind(
                7,
                FieldBinding::text("contact_email", |c: &mut Customer| &mut c.contact_email),
            )
            .bind(
                8,
                FieldBinding::decimal("vat_rate", |c: &mut Customer| &mut c.vat_rate)
                    .parser(PercentageParser),
            )
            .bind(
                9,
                FieldBinding::flag("send_by_email", |c: &mut Customer| &mut c.send_by_email)
                    .parser(LocalizedYesNoParser::default()),
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{map_sheet, parse_csv};
    use rust_decimal_macros::dec;

    #[test]
    fn supplier_row() {
        let sheet = parse_csv(
            "name,reg,cif,address,bank,iban,email\n\
             Acme SRL,J40/1/2020,RO123,Bucuresti,BT,RO49AAAA1B31007593840000,office@acme.ro\n"
                .as_bytes(),
        )
        .unwrap();
        let mapped = map_sheet(&sheet, &Supplier::schema().unwrap());
        assert!(mapped.errors.is_empty());
        let supplier = &mapped.records[0];
        assert_eq!(supplier.name(), "Acme SRL");
        assert_eq!(supplier.collaborator.tax_id, "RO123");
        assert_eq!(supplier.collaborator.account_iban, "RO49AAAA1B31007593840000");
        assert_eq!(supplier.contact_email, "office@acme.ro");
    }

    #[test]
    fn customer_row_with_optional_columns() {
        let sheet = parse_csv(
            "name,reg,cif,address,bank,iban,amount,email,vat,send\n\
             Bob SRL,J12/3/2021,RO9,Cluj,ING,RO02INGB,1500,bob@example.com,0.19,لا\n"
                .as_bytes(),
        )
        .unwrap();
        let mapped = map_sheet(&sheet, &Customer::schema().unwrap());
        assert!(mapped.errors.is_empty());
        let customer = &mapped.records[0];
        assert_eq!(customer.invoice_amount, 1500);
        assert_eq!(customer.vat_rate, Some(dec!(19)));
        assert_eq!(customer.send_by_email, Some(false));
        assert!(!customer.wants_email());
    }

    #[test]
    fn customer_bad_amount_is_tolerated() {
        let sheet = parse_csv(
            "name,reg,cif,address,bank,iban,amount\nCara,,,,,,abc\n".as_bytes(),
        )
        .unwrap();
        let mapped = map_sheet(&sheet, &Customer::schema().unwrap());
        assert_eq!(mapped.records[0].name(), "Cara");
        assert_eq!(mapped.records[0].invoice_amount, 0);
        // parse failure plus the now-missing required amount
        assert_eq!(mapped.errors.len(), 2);
    }
}
