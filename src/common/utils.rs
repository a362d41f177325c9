//! Small formatting and filesystem helpers shared across modules.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Replace the home directory prefix with `~` for log output.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Human-friendly countdown such as `3h12m`, `45m` or `20s`.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, m) if seconds > 30 => format!("{}m", m + 1),
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

/// Format coordinates as `52.520°N, 13.405°E`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    let lat_dir = if latitude >= 0.0 { "N" } else { "S" };
    let lon_dir = if longitude >= 0.0 { "E" } else { "W" };
    format!(
        "{:.3}°{}, {:.3}°{}",
        latitude.abs(),
        lat_dir,
        longitude.abs(),
        lon_dir
    )
}

/// Replace `path` with `contents` through a sibling temp file and rename.
///
/// Readers never observe a partially written file.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("{} has no parent directory", private_path(path)))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", private_path(parent)))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", private_path(parent)))?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", private_path(path)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(125), "2m");
        assert_eq!(format_duration(155), "3m");
        assert_eq!(format_duration(3600), "1h");
        assert_eq!(format_duration(3 * 3600 + 12 * 60 + 5), "3h12m");
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(52.52, 13.405), "52.520°N, 13.405°E");
        assert_eq!(format_coordinates(-33.8688, -70.0), "33.869°S, 70.000°W");
    }

    #[test]
    fn test_write_atomically_creates_and_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_atomically(&path, b"first").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        write_atomically(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        // No temp files left behind
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
