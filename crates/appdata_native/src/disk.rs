//! Device capacity queries for the volume backing the app-data root.

use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Capacity snapshot for one mounted volume.
pub struct DiskSpace {
    /// Total capacity in bytes.
    pub total_bytes: u64,
    /// Bytes available to unprivileged callers.
    pub free_bytes: u64,
}

/// Queries capacity of the volume containing `path`.
#[cfg(unix)]
pub fn disk_space(path: &Path) -> io::Result<DiskSpace> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;
    // SAFETY: `statvfs` is a plain C struct for which all-zero bytes is a valid value.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: `c_path` is NUL-terminated and `stat` is a valid, writable out-pointer.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    let fragment = stat.f_frsize as u64;
    Ok(DiskSpace {
        total_bytes: (stat.f_blocks as u64).saturating_mul(fragment),
        free_bytes: (stat.f_bavail as u64).saturating_mul(fragment),
    })
}

/// Queries capacity of the volume containing `path`.
#[cfg(not(unix))]
pub fn disk_space(path: &Path) -> io::Result<DiskSpace> {
    let _ = path;
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "disk space query is not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_volume_reports_consistent_capacity() {
        let space = disk_space(&std::env::temp_dir()).expect("statvfs");
        assert!(space.total_bytes > 0);
        assert!(space.free_bytes <= space.total_bytes);
    }

    #[test]
    fn missing_path_is_an_error() {
        let err = disk_space(Path::new("/definitely/not/a/real/appdata/path"))
            .expect_err("missing path");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
