//! Company discovery.
//!
//! Every subdirectory of the root is a company. A company directory holds
//! exactly one supplier sheet, one sheet per customer and the ledger.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{Company, Customer, RechnungError, RunConfig, Supplier};
use crate::sheet::{RecordSchema, is_tabular, read_first_sheet};

/// One roster slot: a loaded company or the reason it could not be loaded.
#[derive(Debug)]
pub struct RosterEntry {
    pub name: String,
    pub dir: PathBuf,
    pub company: Result<Company, RechnungError>,
}

/// Company directories under `root`, sorted by name.
pub fn company_dirs(root: &Path) -> Result<Vec<PathBuf>, RechnungError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| RechnungError::io(root, e))? {
        let entry = entry.map_err(|e| RechnungError::io(root, e))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

pub(crate) fn load_company(
    dir: &Path,
    config: &RunConfig,
    suppliers: &RecordSchema<Supplier>,
    customers: &RecordSchema<Customer>,
) -> Result<Company, RechnungError> {
    let name = dir_name(dir);
    let files = data_files(dir, config)?;

    let supplier_files: Vec<&PathBuf> = files
        .iter()
        .filter(|p| file_name(p).contains(&config.supplier_marker))
        .collect();
    let supplier_file = match supplier_files.as_slice() {
        [one] => *one,
        [] => {
            return Err(RechnungError::Company(format!(
                "{name}: no supplier file matching '{}'",
                config.supplier_marker
            )));
        }
        many => {
            return Err(RechnungError::Company(format!(
                "{name}: {} supplier files matching '{}'",
                many.len(),
                config.supplier_marker
            )));
        }
    };

    let supplier = read_first_sheet(supplier_file, suppliers)?
        .into_iter()
        .next()
        .filter(|s| !s.name().trim().is_empty())
        .ok_or_else(|| {
            RechnungError::Company(format!(
                "{name}: supplier file {} has no data",
                supplier_file.display()
            ))
        })?;

    let mut roster = Vec::new();
    for path in files.iter().filter(|p| {
        let file = file_name(p);
        file.contains(&config.customer_marker) && !file.contains(&config.supplier_marker)
    }) {
        // One customer per file: its first data row.
        match read_first_sheet(path, customers)?.into_iter().next() {
            Some(customer) if !customer.name().trim().is_empty() => roster.push(customer),
            _ => tracing::warn!(path = %path.display(), "customer file has no customer"),
        }
    }

    tracing::info!(company = %name, customers = roster.len(), "company loaded");
    Ok(Company {
        name,
        dir: dir.to_path_buf(),
        supplier,
        customers: roster,
    })
}

/// Tabular files in `dir`, sorted, the ledger excluded.
fn data_files(dir: &Path, config: &RunConfig) -> Result<Vec<PathBuf>, RechnungError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| RechnungError::io(dir, e))? {
        let path = entry.map_err(|e| RechnungError::io(dir, e))?.path();
        if path.is_file() && is_tabular(&path) && file_name(&path) != config.ledger_file_name {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetRecord;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn load(dir: &Path) -> Result<Company, RechnungError> {
        let config = RunConfig::default();
        load_company(
            dir,
            &config,
            &Supplier::schema().unwrap(),
            &Customer::schema().unwrap(),
        )
    }

    #[test]
    fn dirs_sorted_by_name() {
        let root = tempfile::tempdir().unwrap();
        for name in ["zeta", "acme", "mid"] {
            fs::create_dir(root.path().join(name)).unwrap();
        }
        write(root.path(), "stray.csv", "");
        let names: Vec<String> = company_dirs(root.path())
            .unwrap()
            .iter()
            .map(|d| dir_name(d))
            .collect();
        assert_eq!(names, ["acme", "mid", "zeta"]);
    }

    #[test]
    fn loads_supplier_and_customers_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "supplier.csv", "name\nAcme SRL,J1,RO1,Str 1,BT,RO49\n");
        write(dir.path(), "customers_b.csv", "name,,,,,,amount\nCara,,,,,,200\n");
        write(dir.path(), "customers_a.csv", "name,,,,,,amount\nBob,,,,,,100\n,,,,,,\n");
        write(dir.path(), "invoice_controller.csv", "serial\nA,24,7,\n");

        let company = load(dir.path()).unwrap();
        assert_eq!(company.supplier.name(), "Acme SRL");
        let names: Vec<&str> = company.customers.iter().map(Customer::name).collect();
        assert_eq!(names, ["Bob", "Cara"]);
        assert_eq!(company.customers[1].invoice_amount, 200);
    }

    #[test]
    fn only_first_row_of_a_customer_file_counts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "supplier.csv", "name\nAcme SRL\n");
        write(dir.path(), "customer_bob.csv", "name,,,,,,amount\nBob,,,,,,100\nTotal,,,,,,100\n");
        write(dir.path(), "customer_empty.csv", "name\n");
        write(dir.path(), "customer_blank.csv", "name\n,,,\nLate,,,,,,5\n");

        let company = load(dir.path()).unwrap();
        let names: Vec<&str> = company.customers.iter().map(Customer::name).collect();
        assert_eq!(names, ["Bob"]);
    }

    #[test]
    fn two_supplier_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "supplier.csv", "name\nAcme\n");
        write(dir.path(), "supplier_old.csv", "name\nAcme\n");
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, RechnungError::Company(_)));
        assert!(err.to_string().contains("2 supplier files"));
    }

    #[test]
    fn empty_supplier_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "supplier.csv", "name\n");
        let err = load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("has no data"));
    }
}
