//! Safety Module
//!
//! Refuses to write batch output into system directories or a bare home directory.

use std::path::Path;

const DANGEROUS_DIRS: &[&str] = &[
    "/", "/System", "/usr", "/bin", "/sbin", "/etc", "/var", "/private", "/Library",
    "/Applications", "/Users", "/home", "/root", "/boot", "/dev", "/proc", "/sys", "/opt",
];

pub fn check_dangerous_directory(path: &Path) -> Result<(), String> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    for candidate in [path, canonical.as_path()] {
        let path_str = candidate.to_string_lossy();
        let trimmed = if path_str.len() > 1 {
            path_str.trim_end_matches('/')
        } else {
            &path_str
        };
        if DANGEROUS_DIRS.contains(&trimmed) {
            return Err(format!(
                "🚨 Refusing to write into protected system directory '{}'",
                trimmed
            ));
        }
    }

    let path_str = canonical.to_string_lossy();
    let is_home_root = (path_str.starts_with("/Users/") || path_str.starts_with("/home/"))
        && canonical.components().count() <= 3;
    if is_home_root {
        return Err(format!(
            "🚨 Refusing to write directly into home directory '{}'; pick a subdirectory",
            path.display()
        ));
    }

    Ok(())
}
