use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{CSV_HEADER, Entry, Language, Lookup, canonical_key};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dictionary file '{}' not found", path.display())]
    NotFound { path: PathBuf },
    #[error("unable to open dictionary file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to read dictionary file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("'{}' line {line}: expected 2 fields, found {fields}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        fields: usize,
    },
}

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("{0} field cannot be empty")]
    Validation(Language),
    #[error("could not save new translation to '{}': {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// English → Urdu mapping bound to the CSV file it was loaded from.
///
/// Keys are canonical (see [`canonical_key`]). The file is only ever
/// appended to, and is opened and closed on every append.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    entries: HashMap<String, String>,
    session_additions: Vec<Entry>,
}

impl Store {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
            session_additions: Vec::new(),
        }
    }

    /// Builds an in-memory store without touching `path`.
    pub fn from_entries<'a>(
        path: impl Into<PathBuf>,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut store = Self::empty(path);
        for (english, urdu) in entries {
            store
                .entries
                .insert(canonical_key(english), urdu.trim().to_string());
        }
        store
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Open {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let store = Self::load_from_reader(path, file)?;
        info!(path = %path.display(), entries = store.len(), "dictionary loaded");
        Ok(store)
    }

    /// Parses CSV text whose first row is a header. `path` is where
    /// later inserts are appended.
    pub fn load_from_reader<R: Read>(
        path: impl Into<PathBuf>,
        reader: R,
    ) -> Result<Self, LoadError> {
        let mut store = Self::empty(path);
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        for record in csv_reader.records() {
            let record = record.map_err(|source| LoadError::Read {
                path: store.path.clone(),
                source,
            })?;
            if record.len() != 2 {
                return Err(LoadError::MalformedRow {
                    path: store.path.clone(),
                    line: record.position().map(|pos| pos.line()).unwrap_or(0),
                    fields: record.len(),
                });
            }
            let key = canonical_key(&record[0]);
            let urdu = record[1].trim().to_string();
            if let Some(previous) = store.entries.insert(key, urdu) {
                debug!(english = &record[0], previous = %previous, "duplicate headword, keeping last");
            }
        }

        Ok(store)
    }

    /// Loads `path`, falling back to an empty store bound to the same
    /// path when the file is missing or malformed.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> (Self, Option<LoadError>) {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) => (store, None),
            Err(err) => {
                warn!(error = %err, "dictionary load failed, starting with an empty store");
                (Self::empty(path), Some(err))
            }
        }
    }

    /// Re-reads the backing file. On failure the current mapping is kept.
    pub fn reload(&mut self) -> Result<usize, LoadError> {
        let fresh = Self::load(&self.path)?;
        self.entries = fresh.entries;
        Ok(self.entries.len())
    }

    pub fn lookup(&self, query: &str) -> Lookup<'_> {
        match self.entries.get(&canonical_key(query)) {
            Some(translation) => Lookup::Found(translation.as_str()),
            None => Lookup::Miss,
        }
    }

    /// Appends `(english, urdu)` to the backing file, then records it in
    /// memory. Nothing changes in memory if the write fails.
    pub fn insert(&mut self, english: &str, urdu: &str) -> Result<(), InsertError> {
        if english.trim().is_empty() {
            return Err(InsertError::Validation(Language::English));
        }
        let urdu = urdu.trim();
        if urdu.is_empty() {
            return Err(InsertError::Validation(Language::Urdu));
        }

        self.append_row(english, urdu)
            .map_err(|source| InsertError::Persist {
                path: self.path.clone(),
                source,
            })?;

        self.entries.insert(canonical_key(english), urdu.to_string());
        self.session_additions.push(Entry {
            english: english.to_string(),
            urdu: urdu.to_string(),
        });
        info!(english, urdu, path = %self.path.display(), "translation added");
        Ok(())
    }

    fn append_row(&self, english: &str, urdu: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut existing = Vec::new();
        file.read_to_end(&mut existing)?;

        // Same parser as load: blank lines and a BOM do not count as a header.
        let has_header = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(existing.as_slice())
            .byte_records()
            .next()
            .is_some();

        let mut bytes = Vec::new();
        if existing.last().is_some_and(|last| *last != b'\n') {
            bytes.push(b'\n');
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if !has_header {
            writer.write_record(CSV_HEADER)?;
        }
        writer.write_record([english, urdu])?;
        let row = writer.into_inner().map_err(|err| err.into_error())?;
        bytes.extend_from_slice(&row);

        file.write_all(&bytes)?;
        file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries inserted since the store was created, in append order.
    pub fn session_additions(&self) -> &[Entry] {
        &self.session_additions
    }

    /// All entries sorted by canonical key.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::{TempDir, tempdir};

    use super::*;

    fn write_csv(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn row_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn lookup_ignores_case_and_surrounding_whitespace() {
        let (_dir, path) = write_csv("English,Urdu\nhello,salam\n");
        let store = Store::load(&path).unwrap();
        for query in [" Hello ", "HELLO", "hello", "\thElLo\n"] {
            assert_eq!(store.lookup(query), Lookup::Found("salam"), "query {query:?}");
        }
    }

    #[test]
    fn load_canonicalizes_keys_and_trims_translations() {
        let (_dir, path) = write_csv("English,Urdu\n  Water , Pani \n");
        let store = Store::load(&path).unwrap();
        assert_eq!(store.entries(), vec![("water", "Pani")]);
    }

    #[test]
    fn missing_key_is_a_miss() {
        let (_dir, path) = write_csv("English,Urdu\nhello,salam\n");
        let store = Store::load(&path).unwrap();
        assert_eq!(store.lookup("goodbye"), Lookup::Miss);
        assert_eq!(store.lookup(""), Lookup::Miss);
    }

    #[test]
    fn header_row_is_always_skipped() {
        let (_dir, path) = write_csv("dog,Kutta\ncat,Billi\n");
        let store = Store::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("dog"), Lookup::Miss);
        assert_eq!(store.lookup("cat"), Lookup::Found("Billi"));
    }

    #[test]
    fn header_only_and_empty_files_load_empty() {
        let (_dir, path) = write_csv("English,Urdu\n");
        assert!(Store::load(&path).unwrap().is_empty());
        let (_dir, path) = write_csv("");
        assert!(Store::load(&path).unwrap().is_empty());
    }

    #[test]
    fn duplicate_headwords_keep_the_last_row() {
        let (_dir, path) = write_csv("English,Urdu\nbook,Kitab\nBOOK,Kitaab\n");
        let store = Store::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("book"), Lookup::Found("Kitaab"));
    }

    #[test]
    fn quoted_fields_are_unquoted() {
        let (_dir, path) = write_csv("English,Urdu\n\"well, then\",\"acha, phir\"\n");
        let store = Store::load(&path).unwrap();
        assert_eq!(store.lookup("Well, then"), Lookup::Found("acha, phir"));
    }

    #[test]
    fn row_with_wrong_field_count_fails() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta\ncat,Billi,extra\n");
        match Store::load(&path) {
            Err(LoadError::MalformedRow { line, fields, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(fields, 3);
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }

        let (_dir, path) = write_csv("English,Urdu\nlonely\n");
        assert!(matches!(
            Store::load(&path),
            Err(LoadError::MalformedRow { fields: 1, .. })
        ));
    }

    #[test]
    fn missing_file_fails_with_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(Store::load(&path), Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn open_or_empty_degrades_to_an_empty_store_on_the_same_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let (store, err) = Store::open_or_empty(&path);
        assert!(err.is_some());
        assert!(store.is_empty());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn loading_twice_yields_equal_mappings() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta\ncat,Billi\nsun,Suraj\n");
        let first = Store::load(&path).unwrap();
        let second = Store::load(&path).unwrap();
        assert_eq!(first.entries(), second.entries());
    }

    #[test]
    fn insert_then_lookup_sees_new_translation() {
        let (_dir, path) = write_csv("English,Urdu\n");
        let mut store = Store::load(&path).unwrap();
        store.insert("Moon", " Chaand ").unwrap();
        assert_eq!(store.lookup("moon"), Lookup::Found("Chaand"));
        assert_eq!(store.lookup(" MOON"), Lookup::Found("Chaand"));
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let (_dir, path) = write_csv("English,Urdu\nbook,Kitab\n");
        let mut store = Store::load(&path).unwrap();
        store.insert("Book", "Kitaab").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("book"), Lookup::Found("Kitaab"));
        assert_eq!(Store::load(&path).unwrap().lookup("book"), Lookup::Found("Kitaab"));
    }

    #[test]
    fn insert_with_empty_field_changes_nothing() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta\n");
        let mut store = Store::load(&path).unwrap();
        let rows_before = row_count(&path);

        assert!(matches!(
            store.insert("  ", "Billi"),
            Err(InsertError::Validation(Language::English))
        ));
        assert!(matches!(
            store.insert("cat", ""),
            Err(InsertError::Validation(Language::Urdu))
        ));
        assert!(matches!(
            store.insert("cat", "   "),
            Err(InsertError::Validation(Language::Urdu))
        ));

        assert_eq!(store.len(), 1);
        assert!(store.session_additions().is_empty());
        assert_eq!(row_count(&path), rows_before);
    }

    #[test]
    fn inserted_entry_survives_a_fresh_load() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta\n");
        let mut store = Store::load(&path).unwrap();
        store.insert("Book", "Kitab").unwrap();

        let reloaded = Store::load(&path).unwrap();
        assert_eq!(reloaded.lookup("book"), Lookup::Found("Kitab"));
        assert_eq!(reloaded.lookup("dog"), Lookup::Found("Kutta"));
    }

    #[test]
    fn insert_appends_english_as_typed() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta\n");
        let mut store = Store::load(&path).unwrap();
        store.insert("Book", "Kitab").unwrap();
        store.insert("Tree", "Darakht").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "English,Urdu\ndog,Kutta\nBook,Kitab\nTree,Darakht\n");
        let added: Vec<&str> = store
            .session_additions()
            .iter()
            .map(|entry| entry.english.as_str())
            .collect();
        assert_eq!(added, vec!["Book", "Tree"]);
    }

    #[test]
    fn insert_quotes_fields_containing_commas() {
        let (_dir, path) = write_csv("English,Urdu\n");
        let mut store = Store::load(&path).unwrap();
        store.insert("well, then", "acha, phir").unwrap();
        let reloaded = Store::load(&path).unwrap();
        assert_eq!(reloaded.lookup("well, then"), Lookup::Found("acha, phir"));
    }

    #[test]
    fn insert_into_missing_file_writes_header_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.csv");
        let (mut store, err) = Store::open_or_empty(&path);
        assert!(err.is_some());

        store.insert("cat", "Billi").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "English,Urdu\ncat,Billi\n");
        assert_eq!(Store::load(&path).unwrap().lookup("cat"), Lookup::Found("Billi"));
    }

    #[test]
    fn insert_into_headerless_blank_file_writes_header() {
        for contents in ["\n", "\r\n", "\n\n", "\u{feff}", "  \n"] {
            let (_dir, path) = write_csv(contents);
            let mut store = Store::load(&path).unwrap();
            assert!(store.is_empty(), "contents {contents:?}");

            store.insert("Book", "Kitab").unwrap();
            let reloaded = Store::load(&path).unwrap();
            assert_eq!(
                reloaded.lookup("book"),
                Lookup::Found("Kitab"),
                "contents {contents:?}, disk {:?}",
                fs::read_to_string(&path).unwrap()
            );
        }
    }

    #[test]
    fn insert_keeps_existing_header_only_file() {
        let (_dir, path) = write_csv("English,Urdu\n");
        let mut store = Store::load(&path).unwrap();
        store.insert("cat", "Billi").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "English,Urdu\ncat,Billi\n");
    }

    #[test]
    fn invalid_utf8_fails_with_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.csv");
        fs::write(&path, b"English,Urdu\n\xff\xfe,x\n").unwrap();
        assert!(matches!(Store::load(&path), Err(LoadError::Read { .. })));
    }

    #[test]
    fn insert_terminates_an_unterminated_last_row() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta");
        let mut store = Store::load(&path).unwrap();
        store.insert("cat", "Billi").unwrap();

        let reloaded = Store::load(&path).unwrap();
        assert_eq!(reloaded.lookup("dog"), Lookup::Found("Kutta"));
        assert_eq!(reloaded.lookup("cat"), Lookup::Found("Billi"));
    }

    #[test]
    fn persist_failure_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("dictionary.csv");
        let mut store = Store::from_entries(&path, [("dog", "Kutta")]);

        let err = store.insert("cat", "Billi").unwrap_err();
        assert!(matches!(err, InsertError::Persist { .. }));
        assert_eq!(store.lookup("cat"), Lookup::Miss);
        assert_eq!(store.len(), 1);
        assert!(store.session_additions().is_empty());
    }

    #[test]
    fn reload_picks_up_external_rows_and_keeps_state_on_failure() {
        let (dir, path) = write_csv("English,Urdu\ndog,Kutta\n");
        let mut store = Store::load(&path).unwrap();

        fs::write(&path, "English,Urdu\ndog,Kutta\nsun,Suraj\n").unwrap();
        assert_eq!(store.reload().unwrap(), 2);
        assert_eq!(store.lookup("sun"), Lookup::Found("Suraj"));

        fs::remove_file(&path).unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.len(), 2);
        drop(dir);
    }

    #[test]
    fn dog_cat_scenario() {
        let (_dir, path) = write_csv("English,Urdu\ndog,Kutta\n");
        let mut store = Store::load(&path).unwrap();

        assert_eq!(store.lookup("DOG "), Lookup::Found("Kutta"));
        assert_eq!(store.lookup("cat"), Lookup::Miss);
        store.insert("cat", "Billi").unwrap();
        assert_eq!(store.lookup("Cat"), Lookup::Found("Billi"));
    }

    #[test]
    fn load_from_reader_parses_in_memory_text() {
        let text = "English,Urdu\nwater,Pani\n";
        let store = Store::load_from_reader("memory.csv", text.as_bytes()).unwrap();
        assert_eq!(store.lookup("Water"), Lookup::Found("Pani"));
        assert_eq!(store.path(), Path::new("memory.csv"));
    }
}
