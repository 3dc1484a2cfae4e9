// Memory image files and end-of-run snapshots. All files are plain text,
// one hexadecimal word per line, written as 8 uppercase hex digits.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::cache::{Dsram, Tsram};
use crate::commons::{MAIN_MEM_DEPTH, MEM_FILE_SIZE, NUM_CORES};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("error opening file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error writing file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading data from file {path}: expected {expected} lines, got {got}")]
    ShortFile {
        path: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid hex value {value:?} in {path} line {line}")]
    BadHex {
        path: String,
        line: usize,
        value: String,
    },
    #[error("number of input files does not match the requirement: expected {expected} but got {got}")]
    ArgCount { expected: usize, got: usize },
}

fn parse_hex_line(line: &str, path: &str, lineno: usize) -> Result<u32, SimError> {
    let s = line.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(s, 16).map_err(|_| SimError::BadHex {
        path: path.to_string(),
        line: lineno,
        value: line.trim().to_string(),
    })
}

/// load one fixed-depth per-core memory image; a short file is fatal
pub fn load_mem_file(path: &str) -> Result<[u32; MEM_FILE_SIZE], SimError> {
    let file = File::open(path).map_err(|source| SimError::Open {
        path: path.to_string(),
        source,
    })?;
    let mut words = [0u32; MEM_FILE_SIZE];
    let mut count = 0;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        if count == MEM_FILE_SIZE {
            break;
        }
        let line = line.map_err(|source| SimError::Open {
            path: path.to_string(),
            source,
        })?;
        words[count] = parse_hex_line(&line, path, i + 1)?;
        count += 1;
    }
    if count < MEM_FILE_SIZE {
        return Err(SimError::ShortFile {
            path: path.to_string(),
            expected: MEM_FILE_SIZE,
            got: count,
        });
    }
    Ok(words)
}

/// load all per-core images; `paths` holds one file name per core
pub fn load_mem_files(paths: &[String]) -> Result<[[u32; MEM_FILE_SIZE]; NUM_CORES], SimError> {
    let mut images = [[0u32; MEM_FILE_SIZE]; NUM_CORES];
    for (image, path) in images.iter_mut().zip(paths) {
        *image = load_mem_file(path)?;
    }
    Ok(images)
}

/// load main memory, reading until the fixed depth or end-of-file
pub fn load_main_mem(path: &str) -> Result<Vec<u32>, SimError> {
    let file = File::open(path).map_err(|source| SimError::Open {
        path: path.to_string(),
        source,
    })?;
    let mut words = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        if words.len() == MAIN_MEM_DEPTH {
            break;
        }
        let line = line.map_err(|source| SimError::Open {
            path: path.to_string(),
            source,
        })?;
        words.push(parse_hex_line(&line, path, i + 1)?);
    }
    Ok(words)
}

fn write_words<P: AsRef<Path>>(
    path: P,
    words: impl IntoIterator<Item = u32>,
) -> Result<(), SimError> {
    let path_str = path.as_ref().display().to_string();
    let file = File::create(&path).map_err(|source| SimError::Open {
        path: path_str.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    for word in words {
        writeln!(out, "{word:08X}").map_err(|source| SimError::Write {
            path: path_str.clone(),
            source,
        })?;
    }
    out.flush().map_err(|source| SimError::Write {
        path: path_str,
        source,
    })
}

/// write a memory array, one word per line in array order
pub fn store_mem_to_file(path: &str, words: &[u32]) -> Result<(), SimError> {
    write_words(path, words.iter().copied())
}

/// write `dsram<core_id>.txt`, block-major then word order
pub fn store_dsram_to_file(core_id: u32, dsram: &Dsram) -> Result<(), SimError> {
    let path = format!("dsram{core_id}.txt");
    write_words(path, dsram.iter().flatten().copied())
}

/// write `tsram<core_id>.txt`, one packed state+tag word per block
pub fn store_tsram_to_file(core_id: u32, tsram: &Tsram) -> Result<(), SimError> {
    let path = format!("tsram{core_id}.txt");
    write_words(path, tsram.iter().map(|entry| entry.encode()))
}
