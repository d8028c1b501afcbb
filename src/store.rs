//! Reading and writing the persisted pipeline tables: count records and MI
//! lines, either as single streams or as directories of `part-*` files.
//! Malformed lines are logged and skipped.
use jwalk::WalkDir as ParWalkDir;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::counts::{CountRecord, CountTable};
use crate::error::Result;
use crate::mi::MiEntry;

static BUFFER_CAPACITY: usize = 10_485_760;
static PART_PREFIX: &str = "part-";

/// Writes every count of `table` as one record line, sorted by key
pub fn write_counts<W: Write>(writer: W, table: &CountTable) -> Result<()> {
  let mut writer = BufWriter::with_capacity(BUFFER_CAPACITY, writer);
  for record in table.records() {
    writeln!(writer, "{}", record)?;
  }
  writer.flush()?;
  Ok(())
}

/// Decodes every line of `reader` with `parse`. Empty lines are ignored, lines
/// that are not UTF-8 or fail to parse are logged and skipped. Only I/O
/// failures are errors.
fn read_lenient<R, T, F>(reader: R, what: &str, parse: F) -> Result<Vec<T>>
where
  R: BufRead,
  F: Fn(&str) -> Option<T>,
{
  let mut parsed = Vec::new();
  for (line_number, bytes) in reader.split(b'\n').enumerate() {
    let bytes = bytes?;
    let line = match String::from_utf8(bytes) {
      Ok(line) => line,
      Err(_) => {
        warn!("skipping non UTF-8 {} at line {}", what, line_number + 1);
        continue;
      },
    };
    if line.trim().is_empty() {
      continue;
    }
    match parse(&line) {
      Some(value) => parsed.push(value),
      None => warn!("skipping malformed {} at line {}: {:?}", what, line_number + 1, line),
    }
  }
  Ok(parsed)
}

/// Reads count record lines, skipping malformed ones
pub fn read_counts<R: BufRead>(reader: R) -> Result<Vec<CountRecord>> {
  read_lenient(reader, "count record", CountRecord::parse)
}

/// Writes MI entries as `path\tslot\tword\tmi` lines
pub fn write_mi<W: Write>(writer: W, entries: &[MiEntry]) -> Result<()> {
  let mut writer = BufWriter::with_capacity(BUFFER_CAPACITY, writer);
  for entry in entries {
    writeln!(writer, "{}", entry)?;
  }
  writer.flush()?;
  Ok(())
}

/// Reads MI lines, skipping malformed ones
pub fn read_mi<R: BufRead>(reader: R) -> Result<Vec<MiEntry>> { read_lenient(reader, "MI line", MiEntry::parse) }

/// The `part-*` files below `dir`, sorted by path for a reproducible read order
pub fn part_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
  let mut parts: Vec<PathBuf> = ParWalkDir::new(dir.as_ref())
    .skip_hidden(true)
    .into_iter()
    .filter_map(|each| {
      if let Ok(entry) = each {
        let selected = entry
          .file_name
          .to_str()
          .map(|name| name.starts_with(PART_PREFIX))
          .unwrap_or(false);
        let path = entry.path();
        if selected && path.is_file() {
          Some(path)
        } else {
          None
        }
      } else {
        None
      }
    })
    .collect();
  parts.sort();
  parts
}

fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
  Ok(BufReader::with_capacity(BUFFER_CAPACITY, File::open(path)?))
}

/// Reads all count records of a directory of part files
pub fn read_counts_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<CountRecord>> {
  let mut records = Vec::new();
  for part in part_files(dir) {
    records.extend(read_counts(open(&part)?)?);
  }
  Ok(records)
}

/// Reads all MI entries of a directory of part files
pub fn read_mi_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<MiEntry>> {
  let mut entries = Vec::new();
  for part in part_files(dir) {
    entries.extend(read_mi(open(&part)?)?);
  }
  info!("loaded {} MI entries", entries.len());
  Ok(entries)
}
