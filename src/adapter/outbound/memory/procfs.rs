//! Resident set size from `/proc/self/statm`.

use std::path::PathBuf;

use crate::error::MemoryProbeError;
use crate::port::outbound::MemoryProbe;

/// Reads the second `statm` field (resident pages) and scales it by the
/// system page size.
#[derive(Debug, Clone)]
pub struct ProcfsProbe {
    path: PathBuf,
}

impl ProcfsProbe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/proc/self/statm"),
        }
    }

    /// Probe reading an alternate statm-formatted file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcfsProbe {
    fn resident_bytes(&self) -> Result<u64, MemoryProbeError> {
        let page = page_size()?;
        let statm = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MemoryProbeError::Unsupported
            } else {
                MemoryProbeError::Read(e.to_string())
            }
        })?;
        let pages = parse_resident_pages(&statm)?;
        Ok(pages.saturating_mul(page))
    }
}

fn parse_resident_pages(statm: &str) -> Result<u64, MemoryProbeError> {
    statm
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| MemoryProbeError::Read("statm has no resident field".into()))?
        .parse()
        .map_err(|e: std::num::ParseIntError| MemoryProbeError::Read(e.to_string()))
}

#[cfg(unix)]
fn page_size() -> Result<u64, MemoryProbeError> {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    u64::try_from(size)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| MemoryProbeError::Read("sysconf(_SC_PAGESIZE) failed".into()))
}

#[cfg(not(unix))]
fn page_size() -> Result<u64, MemoryProbeError> {
    Err(MemoryProbeError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_resident_field() {
        assert_eq!(parse_resident_pages("5000 1200 300 10 0 900 0\n").unwrap(), 1200);
        assert!(parse_resident_pages("5000").is_err());
        assert!(parse_resident_pages("5000 abc").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn reads_alternate_statm_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "100 10 5 1 0 4 0").unwrap();

        let bytes = ProcfsProbe::with_path(file.path()).resident_bytes().unwrap();
        assert_eq!(bytes, 10 * page_size().unwrap());
    }

    #[test]
    fn missing_file_is_unsupported() {
        let probe = ProcfsProbe::with_path("/definitely/not/here/statm");
        assert!(matches!(
            probe.resident_bytes(),
            Err(MemoryProbeError::Unsupported)
        ));
    }
}
