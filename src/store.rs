use crate::results::{Article, DiscoveredLink, Keyed};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSON-lines datasets for links and articles under one output directory.
///
/// Records are appended to a `.tmp` sibling as they arrive, and the full file is
/// rewritten, deduplicated by URL, when a stage finishes.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    link_path: PathBuf,
    article_path: PathBuf,
}

impl JsonlStore {
    pub fn new(link_path: PathBuf, article_path: PathBuf) -> Self {
        Self {
            link_path,
            article_path,
        }
    }

    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    pub fn article_path(&self) -> &Path {
        &self.article_path
    }

    pub fn load_links(&self) -> io::Result<Vec<DiscoveredLink>> {
        load(&self.link_path)
    }

    pub fn load_articles(&self) -> io::Result<Vec<Article>> {
        load(&self.article_path)
    }

    pub fn append_link(&self, link: &DiscoveredLink) -> io::Result<()> {
        append(&tmp_path(&self.link_path), link)
    }

    pub fn append_article(&self, article: &Article) -> io::Result<()> {
        append(&tmp_path(&self.article_path), article)
    }

    /// Rewrites the link dataset and drops its journal; returns the deduplicated records
    pub fn save_links(&self, links: Vec<DiscoveredLink>) -> io::Result<Vec<DiscoveredLink>> {
        let links = save_deduplicated(&self.link_path, links)?;
        remove_journal(&self.link_path)?;
        Ok(links)
    }

    /// Rewrites the article dataset and drops its journal; returns the deduplicated records
    pub fn save_articles(&self, articles: Vec<Article>) -> io::Result<Vec<Article>> {
        let articles = save_deduplicated(&self.article_path, articles)?;
        remove_journal(&self.article_path)?;
        Ok(articles)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// The journal only covers records not yet in the full file
fn remove_journal(path: &Path) -> io::Result<()> {
    match fs::remove_file(tmp_path(path)) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Reads one record per line; a missing file is an empty dataset
pub fn load<T: DeserializeOwned>(path: &Path) -> io::Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => ::log::warn!(
                "Skipping malformed line {} of {}: {}",
                number + 1,
                path.display(),
                e
            ),
        }
    }
    Ok(records)
}

pub fn append<T: Serialize>(path: &Path, record: &T) -> io::Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(record)?;
    writeln!(file, "{}", line)
}

/// Keeps the first record for every URL, preserving order
pub fn dedup_by_key<T: Keyed>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.key().to_string()))
        .collect()
}

fn save_deduplicated<T: Keyed + Serialize>(path: &Path, records: Vec<T>) -> io::Result<Vec<T>> {
    let original_len = records.len();
    let records = dedup_by_key(records);
    ::log::info!(
        "Removed {} duplicate records from {} records",
        original_len - records.len(),
        original_len
    );

    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for record in &records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    ::log::info!("Saved {} records to {}", records.len(), path.display());
    Ok(records)
}
