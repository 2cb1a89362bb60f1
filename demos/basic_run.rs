use chrono::NaiveDate;
use rechnungslauf::RunConfigBuilder;
use rechnungslauf::batch::{CustomerOutcome, InvoiceRun};
use rechnungslauf::render::TemplateRenderer;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One company with a seeded ledger and two customers
    let root = tempfile::tempdir()?;
    let acme = root.path().join("Acme");
    fs::create_dir_all(&acme)?;
    fs::write(root.path().join("template.csv"), "FACTURA FISCALA\n")?;
    fs::write(
        acme.join("supplier.csv"),
        "Nume,Nr.Reg.Com,CIF,Sediu,Banca,IBAN,Email\n\
         Acme SRL,J40/1/2020,RO123456,Bucuresti,Banca Transilvania,RO49BTRL0000000000000001,office@acme.ro\n",
    )?;
    // One customer per file
    let header = "Nume,Nr.Reg.Com,CIF,Sediu,Banca,IBAN,Suma,Email,TVA,Email?\n";
    fs::write(
        acme.join("customer_bob.csv"),
        format!("{header}Bob SRL,J12/3/2021,RO987,Cluj,ING,RO02INGB0000000000000002,1500,bob@example.com,0.19,نعم\n"),
    )?;
    fs::write(
        acme.join("customer_cara.csv"),
        format!("{header}Cara SA,J22/8/2019,RO555,Iasi,BCR,RO49RNCB0000000000000003,900,,,\n"),
    )?;
    fs::write(
        acme.join("invoice_controller.csv"),
        "serial,year,number,date\nA,24,7,05.11.2024\n",
    )?;

    let config = RunConfigBuilder::new(root.path(), root.path().join("template.csv")).build();
    let renderer = TemplateRenderer::load(&config.template_path, config.layout.clone())?;
    let run = InvoiceRun::new(config, renderer)?;

    let today = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
    let report = run.run(today)?;
    for company in &report.companies {
        println!("{}", company.company);
        for customer in &company.customers {
            match &customer.outcome {
                CustomerOutcome::Generated {
                    identifier,
                    document,
                    ..
                } => println!("  {} -> {identifier} ({})", customer.customer, document.display()),
                CustomerOutcome::AlreadyGenerated { .. } => {
                    println!("  {} already invoiced", customer.customer)
                }
                CustomerOutcome::Failed { reason } => {
                    println!("  {} failed: {reason}", customer.customer)
                }
            }
        }
    }

    // A second run finds every invoice in place
    let rerun = run.run(today)?;
    println!(
        "rerun: {} generated, {} already generated",
        rerun.generated(),
        rerun.already_generated()
    );
    println!("\nledger:\n{}", fs::read_to_string(acme.join("invoice_controller.csv"))?);
    Ok(())
}
