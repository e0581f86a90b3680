//! Configuration validation

use super::*;
use anyhow::Result;
use tracing::warn;

/// Width of the dependency word taken from the front of every chunk
pub const DEPENDENCY_BYTES: u64 = 8;

/// Alignment O_DIRECT reads need for length and offset
pub const DIRECT_IO_ALIGNMENT: u64 = 512;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_store(config)?;
    validate_chunk_size(config)?;
    validate_workers(config)?;

    if config.reads == 0 {
        warn!("reads is 0, only worker start-up and shutdown will be timed");
    }

    Ok(())
}

/// Validate backing store parameters
fn validate_store(config: &Config) -> Result<()> {
    if config.file_size_mib == 0 {
        anyhow::bail!("file_size_mib must be greater than 0");
    }

    if config.file_size_mib.checked_mul(MIB).is_none() {
        anyhow::bail!("file_size_mib {} is too large", config.file_size_mib);
    }

    if config.path.as_os_str().is_empty() {
        anyhow::bail!("file path must not be empty");
    }

    Ok(())
}

/// Validate chunk size against the store and the read mode
fn validate_chunk_size(config: &Config) -> Result<()> {
    let chunk = config.chunk_size;

    if chunk == 0 {
        anyhow::bail!("chunk_size must be greater than 0");
    }

    if chunk % DEPENDENCY_BYTES != 0 {
        anyhow::bail!(
            "chunk_size ({}) must be a multiple of {} bytes",
            chunk,
            DEPENDENCY_BYTES
        );
    }

    if chunk > config.file_size_bytes() {
        anyhow::bail!(
            "chunk_size ({}) is larger than the file ({} bytes)",
            chunk,
            config.file_size_bytes()
        );
    }

    if config.direct && chunk % DIRECT_IO_ALIGNMENT != 0 {
        anyhow::bail!(
            "chunk_size ({}) must be a multiple of {} with O_DIRECT",
            chunk,
            DIRECT_IO_ALIGNMENT
        );
    }

    if !chunk.is_power_of_two() {
        warn!("chunk_size {} is not a power of 2", chunk);
    }

    Ok(())
}

/// Validate worker pool parameters
fn validate_workers(config: &Config) -> Result<()> {
    if config.concurrency == 0 {
        anyhow::bail!("concurrency must be at least 1");
    }

    // Warn if thread count is very high
    if config.concurrency > 1024 {
        warn!(
            "Very high concurrency ({}), one OS thread is spawned per reader",
            config.concurrency
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        Config {
            file_size_mib: 16,
            concurrency: 4,
            reads: 1000,
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&small_config()).is_ok());
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_concurrency() {
        let config = Config { concurrency: 0, ..small_config() };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_file_size() {
        let config = Config { file_size_mib: 0, ..small_config() };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_chunk_size_rules() {
        let config = Config { chunk_size: 0, ..small_config() };
        assert!(validate_config(&config).is_err());

        // Dependency word must fit evenly
        let config = Config { chunk_size: 4100, ..small_config() };
        assert!(validate_config(&config).is_err());

        // Larger than the whole file
        let config = Config { chunk_size: 32 * MIB, ..small_config() };
        assert!(validate_config(&config).is_err());

        // Not a power of two is only a warning
        let config = Config { chunk_size: 3000 - 3000 % 8, ..small_config() };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_direct_io_alignment() {
        let config = Config { chunk_size: 1000, direct: true, ..small_config() };
        assert!(validate_config(&config).is_err());

        let config = Config { chunk_size: 4096, direct: true, ..small_config() };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_reads_allowed() {
        let config = Config { reads: 0, ..small_config() };
        assert!(validate_config(&config).is_ok());
    }
}
