//! Framed append-only mutation log.
//!
//! Each record is written as: [length: u32][crc32: u32][payload: bincode(T)]
//! The log is append-only and fsynced after each write, so a record either
//! lands as a complete valid frame or is discarded wholesale at replay.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, VectorIndexError};
use crate::store::codec;

/// Append-only log of serialized records of one type.
pub struct MutationLog<T> {
    path: PathBuf,
    file: File,
    _record: PhantomData<T>,
}

impl<T> MutationLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open (or create) a log file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            _record: PhantomData,
        })
    }

    /// Append a record and fsync.
    pub fn append(&mut self, record: &T) -> Result<()> {
        let payload = codec::to_bincode(record)?;
        let crc = crc32fast::hash(&payload);
        let len = payload.len() as u32;

        self.file.write_all(&len.to_le_bytes())?;
        self.file.write_all(&crc.to_le_bytes())?;
        self.file.write_all(&payload)?;
        self.file.sync_all()?;

        Ok(())
    }

    /// Replay all valid records from the log.
    /// Stops at the first corrupted or incomplete frame (crash tolerance).
    pub fn replay(&self) -> Result<Vec<T>> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);
        let mut records = Vec::new();

        loop {
            // Read length
            let mut len_buf = [0u8; 4];
            match reader.read_exact(&mut len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(VectorIndexError::IoError(e)),
            }
            let len = u32::from_le_bytes(len_buf) as usize;

            // Read CRC
            let mut crc_buf = [0u8; 4];
            match reader.read_exact(&mut crc_buf) {
                Ok(()) => {}
                Err(_) => break, // Truncated frame
            }
            let expected_crc = u32::from_le_bytes(crc_buf);

            // Read payload
            let mut payload = vec![0u8; len];
            match reader.read_exact(&mut payload) {
                Ok(()) => {}
                Err(_) => break, // Truncated frame
            }

            // Verify CRC
            if crc32fast::hash(&payload) != expected_crc {
                break; // Corrupted frame
            }

            match codec::from_bincode::<T>(&payload) {
                Ok(record) => records.push(record),
                Err(_) => break, // Corrupted payload
            }
        }

        Ok(records)
    }

    /// Replace the log contents with the given records (compaction).
    pub fn rewrite(&mut self, records: &[T]) -> Result<()> {
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        for record in records {
            self.append(record)?;
        }
        Ok(())
    }
}
