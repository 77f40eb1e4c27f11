// 📋 Registry - ordered, owning collection of records
//
// Insertion order by default, reordered in place by the sort methods.
// Lookups are linear and return the first match; ids are not checked for
// uniqueness. The Registry is not internally synchronized: callers serialize
// mutating calls themselves.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use crate::codec::{self, Format};
use crate::entities::{Loanable, Record, RecordId};
use crate::error::{ParseError, PreconditionError, RegistryError, ValidationError};
use crate::transfer::{self, Transfer};

// ============================================================================
// REPORTS
// ============================================================================

/// Result of `Registry::load` / `Registry::reload`
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub failures: Vec<ParseError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of `Registry::save`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub written: usize,
    pub bytes: usize,
    /// SHA-256 of the file contents
    pub digest: String,
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<Box<dyn Record>>,
}

impl Registry {
    /// Create new empty registry
    pub fn new() -> Self {
        Registry {
            records: Vec::new(),
        }
    }

    /// Append a record (no uniqueness check)
    pub fn add(&mut self, record: Box<dyn Record>) {
        self.records.push(record);
    }

    /// Remove and return the first record with `id`
    pub fn remove(&mut self, id: RecordId) -> Option<Box<dyn Record>> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn find_by_id(&self, id: RecordId) -> Option<&dyn Record> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.as_ref())
    }

    pub fn find_by_id_mut(&mut self, id: RecordId) -> Option<&mut (dyn Record + 'static)> {
        self.records
            .iter_mut()
            .find(|r| r.id() == id)
            .map(|r| r.as_mut())
    }

    /// Exact name match
    pub fn find_by_name(&self, name: &str) -> Option<&dyn Record> {
        self.records
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    /// Every record whose searchable text contains `query`
    pub fn search(&self, query: &str) -> Vec<&dyn Record> {
        self.records
            .iter()
            .filter(|r| r.matches(query))
            .map(|r| r.as_ref())
            .collect()
    }

    /// Records in current order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Record> + '_ {
        self.records.iter().map(|r| r.as_ref())
    }

    /// Sum of `value()` over all records
    pub fn total_value(&self) -> f64 {
        self.records.iter().map(|r| r.value()).sum()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    // ========================================================================
    // ORDERING (all sorts are stable)
    // ========================================================================

    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&dyn Record, &dyn Record) -> Ordering,
    {
        self.records.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
    }

    pub fn sort_by_age(&mut self) {
        self.sort_by(|a, b| a.age().cmp(&b.age()));
    }

    pub fn sort_by_value(&mut self) {
        self.sort_by(|a, b| a.value().total_cmp(&b.value()));
    }

    pub fn sort_by_name(&mut self) {
        self.sort_by(|a, b| a.name().cmp(b.name()));
    }

    // ========================================================================
    // GUARDED MUTATIONS
    // ========================================================================

    /// Debit `from`, then credit `to`; nothing changes on failure
    pub fn transfer(
        &mut self,
        from: RecordId,
        to: RecordId,
        amount: f64,
    ) -> Result<Transfer, RegistryError> {
        let from_index = self
            .position(from)
            .ok_or(RegistryError::NotFound { id: from })?;
        let to_index = self.position(to).ok_or(RegistryError::NotFound { id: to })?;

        if from_index == to_index {
            return Err(ValidationError::SameRecord { id: from }.into());
        }

        let (source, destination) = self.pair_mut(from_index, to_index);
        let source = source
            .as_ledger_mut()
            .ok_or(ValidationError::NoBalance { id: from })?;
        let destination = destination
            .as_ledger_mut()
            .ok_or(ValidationError::NoBalance { id: to })?;

        Ok(transfer::transfer(source, destination, amount)?)
    }

    /// Pay interest into an accruing record, returning the interest
    pub fn apply_accrual(&mut self, id: RecordId) -> Result<f64, RegistryError> {
        let record = self
            .find_by_id_mut(id)
            .ok_or(RegistryError::NotFound { id })?;
        let account = record
            .as_accrual_mut()
            .ok_or(ValidationError::NotAccruing { id })?;
        Ok(account.apply_accrual()?)
    }

    pub fn issue(&mut self, id: RecordId) -> Result<(), RegistryError> {
        self.loanable(id)?.issue()?;
        Ok(())
    }

    pub fn return_item(&mut self, id: RecordId) -> Result<(), RegistryError> {
        self.loanable(id)?.return_item()?;
        Ok(())
    }

    fn loanable(&mut self, id: RecordId) -> Result<&mut dyn Loanable, RegistryError> {
        let record = self
            .find_by_id_mut(id)
            .ok_or(RegistryError::NotFound { id })?;
        record
            .as_loanable_mut()
            .ok_or(PreconditionError::NotBorrowable { id }.into())
    }

    fn pair_mut(
        &mut self,
        first: usize,
        second: usize,
    ) -> (&mut Box<dyn Record>, &mut Box<dyn Record>) {
        if first < second {
            let (left, right) = self.records.split_at_mut(second);
            (&mut left[first], &mut right[0])
        } else {
            let (left, right) = self.records.split_at_mut(first);
            (&mut right[0], &mut left[second])
        }
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Write every record to `path`, truncating any previous contents
    pub fn save(&self, path: &Path, format: Format) -> Result<SaveReport, RegistryError> {
        let bytes = codec::encode_all(&self.records, format).map_err(|err| RegistryError::Write {
            path: path.to_path_buf(),
            source: err.into(),
        })?;

        fs::write(path, &bytes).map_err(|source| RegistryError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(records = self.records.len(), path = %path.display(), "registry saved");

        Ok(SaveReport {
            written: self.records.len(),
            bytes: bytes.len(),
            digest: codec::digest(&bytes),
        })
    }

    /// Build a fresh registry from `path`
    ///
    /// Lines that fail to parse are reported, not fatal.
    pub fn load(path: &Path, format: Format) -> Result<(Registry, LoadReport), RegistryError> {
        let decoded = codec::read_records(path, format)?;
        let report = LoadReport {
            loaded: decoded.records.len(),
            failures: decoded.failures,
        };
        Ok((
            Registry {
                records: decoded.records,
            },
            report,
        ))
    }

    /// Replace this registry's contents with the file's
    ///
    /// Current records are released before loading; if the file cannot be
    /// opened at all the registry is left untouched.
    pub fn reload(&mut self, path: &Path, format: Format) -> Result<LoadReport, RegistryError> {
        let decoded = codec::read_records(path, format)?;
        self.records.clear();
        self.records = decoded.records;
        Ok(LoadReport {
            loaded: self.records.len(),
            failures: decoded.failures,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Variant;
    use crate::entities::{
        AccruingRecord, BorrowableRecord, LoanState, MeteredRecord, PlainRecord,
        SupervisoryRecord,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_registry() -> Registry {
        let mut registry = Registry::new();
        registry.add(Box::new(PlainRecord::new(1, "A", 30, 100.0)));
        registry.add(Box::new(MeteredRecord::new(2, "B", 20, 4)));
        registry.add(Box::new(SupervisoryRecord::new(3, "C", 40, 200.0, 5)));
        registry
    }

    fn ids(registry: &Registry) -> Vec<RecordId> {
        registry.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_scenario_values_and_transfers() {
        let mut registry = create_test_registry();

        assert_eq!(registry.find_by_id(1).unwrap().value(), 100.0);
        assert_eq!(registry.find_by_id(2).unwrap().value(), 100.0);
        assert_eq!(registry.find_by_id(3).unwrap().value(), 205.0);

        registry.transfer(1, 3, 50.0).unwrap();
        assert_eq!(registry.find_by_id(1).unwrap().value(), 50.0);
        assert_eq!(registry.find_by_id(3).unwrap().value(), 255.0);

        let err = registry.transfer(1, 3, 1000.0).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::InsufficientBalance { .. })
        ));
        assert_eq!(registry.find_by_id(1).unwrap().value(), 50.0);
        assert_eq!(registry.find_by_id(3).unwrap().value(), 255.0);
    }

    #[test]
    fn test_transfer_in_reverse_index_order() {
        let mut registry = create_test_registry();
        registry.transfer(3, 1, 25.0).unwrap();
        assert_eq!(registry.find_by_id(1).unwrap().value(), 125.0);
        assert_eq!(registry.find_by_id(3).unwrap().value(), 180.0);
    }

    #[test]
    fn test_transfer_guards() {
        let mut registry = create_test_registry();

        assert!(matches!(
            registry.transfer(1, 1, 10.0),
            Err(RegistryError::Validation(ValidationError::SameRecord { id: 1 }))
        ));
        assert!(matches!(
            registry.transfer(1, 2, 10.0),
            Err(RegistryError::Validation(ValidationError::NoBalance { id: 2 }))
        ));
        assert!(matches!(
            registry.transfer(1, 42, 10.0),
            Err(RegistryError::NotFound { id: 42 })
        ));
        assert_eq!(registry.find_by_id(1).unwrap().value(), 100.0);
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut registry = Registry::new();
        registry.add(Box::new(PlainRecord::new(7, "First", 30, 1.0)));
        registry.add(Box::new(PlainRecord::new(7, "Second", 30, 2.0)));

        assert_eq!(registry.find_by_id(7).unwrap().name(), "First");
        assert!(registry.find_by_id(8).is_none());
        assert_eq!(registry.find_by_name("Second").unwrap().value(), 2.0);
        assert!(registry.find_by_name("second").is_none());
    }

    #[test]
    fn test_find_by_id_mut_reaches_ledger() {
        let mut registry = create_test_registry();

        let ledger = registry.find_by_id_mut(3).unwrap().as_ledger_mut().unwrap();
        ledger.deposit(10.0).unwrap();

        assert_eq!(registry.find_by_id(3).unwrap().value(), 215.0);
        assert!(registry.find_by_id_mut(2).unwrap().as_ledger_mut().is_none());
        assert!(registry.find_by_id_mut(99).is_none());
    }

    #[test]
    fn test_sort_by_value() {
        let mut registry = Registry::new();
        registry.add(Box::new(PlainRecord::new(1, "X", 30, 30.0)));
        registry.add(Box::new(PlainRecord::new(2, "Y", 30, 10.0)));
        registry.add(Box::new(PlainRecord::new(3, "Z", 30, 20.0)));

        registry.sort_by_value();

        let values: Vec<f64> = registry.iter().map(|r| r.value()).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut registry = Registry::new();
        registry.add(Box::new(PlainRecord::new(1, "P", 30, 20.0)));
        registry.add(Box::new(MeteredRecord::new(2, "Q", 25, 4)));
        registry.add(Box::new(PlainRecord::new(3, "R", 30, 100.0)));
        registry.add(Box::new(PlainRecord::new(4, "S", 25, 20.0)));

        registry.sort_by_value();
        assert_eq!(ids(&registry), vec![1, 4, 2, 3]);

        registry.sort_by_age();
        assert_eq!(ids(&registry), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_sort_by_name() {
        let mut registry = Registry::new();
        registry.add(Box::new(BorrowableRecord::new(1, "Emma", "Austen")));
        registry.add(Box::new(BorrowableRecord::new(2, "Dune", "Herbert")));
        registry.sort_by_name();
        assert_eq!(ids(&registry), vec![2, 1]);
    }

    #[test]
    fn test_search_and_remove() {
        let mut registry = Registry::new();
        registry.add(Box::new(BorrowableRecord::new(1, "The Hobbit", "Tolkien")));
        registry.add(Box::new(BorrowableRecord::new(2, "Silmarillion", "Tolkien")));
        registry.add(Box::new(BorrowableRecord::new(3, "Emma", "Austen")));

        assert_eq!(registry.search("Tolkien").len(), 2);
        assert_eq!(registry.search("Emma").len(), 1);

        let removed = registry.remove(1).unwrap();
        assert_eq!(removed.name(), "The Hobbit");
        assert_eq!(registry.len(), 2);
        assert!(registry.remove(1).is_none());
    }

    #[test]
    fn test_total_value() {
        let registry = create_test_registry();
        assert_eq!(registry.total_value(), 405.0);
    }

    #[test]
    fn test_issue_and_return_by_id() {
        let mut registry = Registry::new();
        registry.add(Box::new(BorrowableRecord::new(5, "Dune", "Herbert")));
        registry.add(Box::new(PlainRecord::new(6, "A", 30, 1.0)));

        registry.issue(5).unwrap();
        assert!(matches!(
            registry.issue(5),
            Err(RegistryError::Precondition(PreconditionError::AlreadyIssued { .. }))
        ));
        let state = registry.find_by_id(5).unwrap().as_loanable().unwrap().state();
        assert_eq!(state, LoanState::Issued);

        registry.return_item(5).unwrap();
        assert!(matches!(
            registry.return_item(5),
            Err(RegistryError::Precondition(PreconditionError::NotIssued { .. }))
        ));

        assert!(matches!(
            registry.issue(6),
            Err(RegistryError::Precondition(PreconditionError::NotBorrowable { id: 6 }))
        ));
    }

    #[test]
    fn test_apply_accrual_by_id() {
        let mut registry = Registry::new();
        registry.add(Box::new(AccruingRecord::savings(10, "Minh", 1000.0, 0.05)));
        registry.add(Box::new(PlainRecord::new(11, "A", 30, 1.0)));

        assert_eq!(registry.apply_accrual(10).unwrap(), 50.0);
        assert_eq!(registry.find_by_id(10).unwrap().value(), 1050.0);
        assert!(matches!(
            registry.apply_accrual(11),
            Err(RegistryError::Validation(ValidationError::NotAccruing { id: 11 }))
        ));
    }

    #[test]
    fn test_save_and_load_tagged_keeps_variants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.txt");

        let mut registry = create_test_registry();
        registry.add(Box::new(AccruingRecord::term_deposit(4, "D", 500.0, 0.1, 6)));
        let mut item = BorrowableRecord::new(5, "Dune", "Herbert");
        item.issue().unwrap();
        registry.add(Box::new(item));

        let saved = registry.save(&path, Format::Tagged).unwrap();
        assert_eq!(saved.written, 5);
        assert_eq!(saved.digest.len(), 64);

        let (loaded, report) = Registry::load(&path, Format::Tagged).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.loaded, 5);

        for (before, after) in registry.iter().zip(loaded.iter()) {
            assert_eq!(before.variant(), after.variant());
            assert_eq!(before.value(), after.value());
            assert_eq!(before.id(), after.id());
        }
    }

    #[test]
    fn test_save_and_load_legacy_collapses_variants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.txt");

        let registry = create_test_registry();
        registry.save(&path, Format::Legacy).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "1,A,30,100.000000\n2,B,20,100.000000\n3,C,40,205.000000\n"
        );

        let (loaded, report) = Registry::load(&path, Format::Legacy).unwrap();
        assert!(report.is_clean());
        assert!(loaded.iter().all(|r| r.variant() == Variant::Plain));
        let values: Vec<f64> = loaded.iter().map(|r| r.value()).collect();
        assert_eq!(values, vec![100.0, 100.0, 205.0]);
    }

    #[test]
    fn test_save_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.txt");

        create_test_registry().save(&path, Format::Tagged).unwrap();
        let mut small = Registry::new();
        small.add(Box::new(PlainRecord::new(1, "Only", 1, 1.0)));
        small.save(&path, Format::Tagged).unwrap();

        let (loaded, _) = Registry::load(&path, Format::Tagged).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_load_one_good_one_bad_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1,Nguyen Van A,30,100").unwrap();
        writeln!(file, "2,Tran Thi B,25,lots").unwrap();

        let (registry, report) = Registry::load(file.path(), Format::Legacy).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            ParseError::InvalidNumber { line: 2, field: "amount", .. }
        ));
    }

    #[test]
    fn test_load_rejects_non_finite_and_negative_amounts() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "plain,1,Ghost,30,NaN").unwrap();
        writeln!(file, "plain,2,Neg,30,-500").unwrap();
        writeln!(file, "plain,3,Real,30,100").unwrap();

        let (mut registry, report) = Registry::load(file.path(), Format::Tagged).unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.failures.len(), 2);
        assert!(registry.total_value() >= 0.0);
        assert!(matches!(
            registry.transfer(1, 3, 50.0),
            Err(RegistryError::NotFound { id: 1 })
        ));
        assert_eq!(registry.find_by_id(3).unwrap().value(), 100.0);
    }

    #[test]
    fn test_reload_replaces_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "plain,9,Fresh,22,10").unwrap();

        let mut registry = create_test_registry();
        let report = registry.reload(file.path(), Format::Tagged).unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(ids(&registry), vec![9]);
    }

    #[test]
    fn test_reload_missing_file_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = create_test_registry();

        let err = registry
            .reload(&dir.path().join("absent.txt"), Format::Tagged)
            .unwrap_err();

        assert!(matches!(err, RegistryError::Parse(ParseError::Unreadable { .. })));
        assert_eq!(registry.len(), 3);
    }
}
