//! Display helpers for storage figures and item metadata.

use appdata_host::{FileMetadata, StorageStats};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Formats a byte count as megabytes with two decimals, e.g. `12.34MB`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / BYTES_PER_MEGABYTE)
}

/// Storage footer line; `...` while no snapshot has been loaded.
pub fn storage_line(stats: Option<&StorageStats>) -> String {
    match stats {
        Some(stats) => format!(
            "Storage: {} / {}",
            format_megabytes(stats.used_bytes()),
            format_megabytes(stats.total_bytes())
        ),
        None => "Storage: ...".to_string(),
    }
}

/// Pretty JSON rendering of an item's metadata for the info dialog.
pub fn metadata_report(metadata: &FileMetadata) -> String {
    serde_json::to_string_pretty(metadata).unwrap_or_else(|err| format!("{metadata:?} ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn megabytes_use_binary_units_and_two_decimals() {
        assert_eq!(format_megabytes(0), "0.00MB");
        assert_eq!(format_megabytes(1024 * 1024), "1.00MB");
        assert_eq!(format_megabytes(1536 * 1024), "1.50MB");
    }

    #[test]
    fn storage_line_shows_placeholder_until_loaded() {
        assert_eq!(storage_line(None), "Storage: ...");
        let stats = StorageStats::new(4 * 1024 * 1024, 3 * 1024 * 1024);
        assert_eq!(storage_line(Some(&stats)), "Storage: 1.00MB / 4.00MB");
    }

    #[test]
    fn metadata_report_is_pretty_json() {
        let report = metadata_report(&FileMetadata::missing("/ghost.txt"));
        let value: serde_json::Value = serde_json::from_str(&report).expect("valid json");
        assert_eq!(value["path"], "/ghost.txt");
        assert_eq!(value["exists"], false);
        assert!(report.contains('\n'));
    }
}
