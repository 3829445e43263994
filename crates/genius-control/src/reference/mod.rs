//! Auxiliary tracking-number lists consulted by the free-transport audit.
//!
//! Both loaders are best effort: an unreadable file is logged and skipped,
//! keeping whatever identifiers were read before the failure.

use csv::StringRecord;
use glob::MatchOptions;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const EXCEPTION_HEADER: &str = "nr";

/// Lookup sets joined against parcels by tracking number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSets {
    /// no_genius tracking numbers, never eligible for free transport.
    pub exceptions: HashSet<String>,
    /// eMag Club members, eligible regardless of carrier/type/weight.
    pub emag_clubs: HashSet<String>,
}

impl ReferenceSets {
    pub fn load(no_genius_dir: &Path, emag_clubs_csv: &Path) -> Self {
        let exceptions = load_exceptions(no_genius_dir);
        info!(
            count = exceptions.len(),
            "loaded no_genius exception tracking numbers"
        );

        let emag_clubs = load_emag_clubs(emag_clubs_csv);
        info!(count = emag_clubs.len(), "loaded eMag Club tracking numbers");

        Self {
            exceptions,
            emag_clubs,
        }
    }

    pub fn is_exception(&self, tracking_nr: &str) -> bool {
        self.exceptions.contains(tracking_nr)
    }

    pub fn is_emag_club(&self, tracking_nr: &str) -> bool {
        self.emag_clubs.contains(tracking_nr)
    }
}

/// Collects the first column of every `*.csv` file directly inside `dir`.
///
/// A leading `nr` header row is skipped; files without one start with data.
pub fn load_exceptions(dir: &Path) -> HashSet<String> {
    let mut exceptions = HashSet::new();

    if !dir.is_dir() {
        warn!(dir = %dir.display(), "no_genius directory not found; no exceptions loaded");
        return exceptions;
    }

    for path in exception_files(dir) {
        match read_exception_file(&path, &mut exceptions) {
            Ok(added) => debug!(file = %path.display(), rows = added, "read exception file"),
            Err(err) => warn!(file = %path.display(), error = %err, "could not read exception file"),
        }
    }

    exceptions
}

/// Collects tracking numbers from the `;`-delimited club list whose second field is `1`.
pub fn load_emag_clubs(path: &Path) -> HashSet<String> {
    let mut members = HashSet::new();
    if let Err(err) = read_emag_clubs(path, &mut members) {
        warn!(file = %path.display(), error = %err, "could not read eMag Club list");
    }
    members
}

fn exception_files(dir: &Path) -> Vec<PathBuf> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join("*.csv");
    let pattern = pattern.to_string_lossy();
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let entries = match glob::glob_with(&pattern, options) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(pattern = %pattern, error = %err, "invalid no_genius glob pattern");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "skipping unreadable no_genius entry");
                None
            }
        })
        .collect();
    files.sort();
    files
}

fn read_exception_file(path: &Path, exceptions: &mut HashSet<String>) -> Result<usize, csv::Error> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut added = 0;
    let mut record = StringRecord::new();
    let mut first = true;
    while reader.read_record(&mut record)? {
        let Some(value) = first_field(&record) else {
            first = false;
            continue;
        };
        if first {
            first = false;
            if value.to_lowercase() == EXCEPTION_HEADER {
                continue;
            }
        }
        exceptions.insert(value.to_string());
        added += 1;
    }

    Ok(added)
}

fn read_emag_clubs(path: &Path, members: &mut HashSet<String>) -> Result<(), csv::Error> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        if record.len() < 2 || record.get(1).map(str::trim) != Some("1") {
            continue;
        }
        if let Some(value) = first_field(&record) {
            members.insert(value.to_string());
        }
    }

    Ok(())
}

fn first_field(record: &StringRecord) -> Option<&str> {
    record
        .get(0)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn exceptions_skip_nr_header_but_keep_headerless_first_row() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "a.csv", "NR\nTRK1\n TRK2 \n");
        write(dir.path(), "b.csv", "TRK3\nTRK1\n");

        let exceptions = load_exceptions(dir.path());
        let mut values: Vec<_> = exceptions.into_iter().collect();
        values.sort();
        assert_eq!(values, vec!["TRK1", "TRK2", "TRK3"]);
    }

    #[test]
    fn exceptions_ignore_non_csv_hidden_files_and_blank_rows() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "list.csv", "nr\n\n,ignored\nTRK9,extra,cols\n");
        write(dir.path(), "notes.txt", "TRK_NOT_LOADED\n");
        write(dir.path(), ".draft.csv", "TRK_HIDDEN\n");
        fs::create_dir(dir.path().join("nested.csv")).expect("nested dir");

        let exceptions = load_exceptions(dir.path());
        assert_eq!(exceptions.len(), 1);
        assert!(exceptions.contains("TRK9"));
    }

    #[test]
    fn exceptions_keep_rows_read_before_invalid_utf8() {
        let dir = TempDir::new().expect("temp dir");
        let mut bytes = b"nr\nTRK1\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"TRK2\n");
        fs::write(dir.path().join("broken.csv"), bytes).expect("write fixture");
        write(dir.path(), "ok.csv", "TRK3\n");

        let exceptions = load_exceptions(dir.path());
        assert!(exceptions.contains("TRK1"));
        assert!(exceptions.contains("TRK3"));
        assert!(!exceptions.contains("TRK2"));
    }

    #[test]
    fn missing_exception_directory_yields_empty_set() {
        let dir = TempDir::new().expect("temp dir");
        assert!(load_exceptions(&dir.path().join("no_genius")).is_empty());
    }

    #[test]
    fn emag_clubs_require_second_column_one() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(
            dir.path(),
            "emag_clubs_01.csv",
            "TRK1;1\nTRK2;0\n TRK3 ; 1 ;x\nTRK4\n;1\nTRK5,1\n",
        );

        let members = load_emag_clubs(&path);
        let mut values: Vec<_> = members.into_iter().collect();
        values.sort();
        assert_eq!(values, vec!["TRK1", "TRK3"]);
    }

    #[test]
    fn missing_emag_club_file_yields_empty_set() {
        let dir = TempDir::new().expect("temp dir");
        assert!(load_emag_clubs(&dir.path().join("missing.csv")).is_empty());
    }

    #[test]
    fn reference_sets_answer_membership() {
        let dir = TempDir::new().expect("temp dir");
        let no_genius = dir.path().join("no_genius");
        fs::create_dir(&no_genius).expect("no_genius dir");
        write(&no_genius, "x.csv", "nr\nEXC1\n");
        let clubs = write(dir.path(), "emag_clubs_01.csv", "CLUB1;1\n");

        let sets = ReferenceSets::load(&no_genius, &clubs);
        assert!(sets.is_exception("EXC1"));
        assert!(!sets.is_exception("CLUB1"));
        assert!(sets.is_emag_club("CLUB1"));
    }
}
