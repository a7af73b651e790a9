use std::sync::{
    atomic::{
        AtomicBool,
        Ordering,
    },
    Arc,
};

const SIZE_1KB: u64 = 1024;
const SIZE_1MB: u64 = 1024 * SIZE_1KB;
const SIZE_1GB: u64 = 1024 * SIZE_1MB;

/// Render a byte count for humans.
/// Bytes are printed as integer, KB and MB with one decimal place and GB with two.
pub fn format_file_size(size: u64) -> String {
    if size < SIZE_1KB {
        format!("{} B", size)
    } else if size < SIZE_1MB {
        format!("{:.1} KB", (size as f64) / (SIZE_1KB as f64))
    } else if size < SIZE_1GB {
        format!("{:.1} MB", (size as f64) / (SIZE_1MB as f64))
    } else {
        format!("{:.2} GB", (size as f64) / (SIZE_1GB as f64))
    }
}

/// Cooperative cancellation flag.
///
/// Cloning the token shares the underlying flag. Setting it never interrupts a
/// filesystem call in flight, the worker only observes it at its next check point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_bytes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(999), "999 B");
        assert_eq!(format_file_size(1023), "1023 B");
    }

    #[test]
    fn formats_kilobytes_and_megabytes() {
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(1024 * 1024 + 512 * 1024), "1.5 MB");
    }

    #[test]
    fn formats_gigabytes_with_two_decimals() {
        assert_eq!(format_file_size(1073741824), "1.00 GB");
        assert_eq!(format_file_size(3 * SIZE_1GB + SIZE_1GB / 2), "3.50 GB");
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
