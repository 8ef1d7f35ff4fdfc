use std::{
    env,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};

/// Reverse traversal to find a certain file from a filename
pub fn revtraverse(path: PathBuf, find: &str) -> io::Result<PathBuf> {
    if !path.is_dir() || !path.has_root() {
        return Err(io::Error::other("Path must be a full directory."));
    }
    let mut curpath = Some(path);
    while let Some(path) = curpath {
        let candidate = path.join(find);
        if candidate.is_file() {
            return Ok(candidate);
        }
        curpath = path.parent().map(|p| p.to_path_buf());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("Reached root directory: {find} not found."),
    ))
}

/// Gets current directory (shorthand)
#[inline(always)]
pub fn get_currdir() -> Result<PathBuf, String> {
    env::current_dir().map_err(|e| format!("Failed to get current working directory: {e}"))
}

/// Opens file and reads its content
pub fn read(path: &Path) -> Result<String, String> {
    let mut buf = String::new();
    File::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .read_to_string(&mut buf)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(buf)
}

/// Creates `dir` and its parents if they don't exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create dir {}: {e}", dir.display()))
}
