//! Tree fixtures and destination inspection helpers
//!
//! Every test and benchmark builds its source trees through these helpers so the
//! expected counts stay in one place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Size of the large file placed in sample trees
pub const LARGE_FILE_SIZE: usize = 3 * 1024 * 1024 + 17;

/// Deterministic, non-repeating-per-buffer file content
pub fn generate_test_data(size: usize, seed: u8) -> Vec<u8> {
    (0..size)
        .map(|i| ((i * 7 + 13) % 251) as u8 ^ seed)
        .collect()
}

/// Layout of a generated sample tree
#[derive(Debug, Clone)]
pub struct SampleTree {
    /// Root directory of the tree
    pub root: PathBuf,
    /// Every regular file created, relative to `root`
    pub files: Vec<PathBuf>,
}

impl SampleTree {
    /// Number of copy units the tree should produce
    pub fn expected_units(&self) -> u64 {
        self.files.len() as u64
    }
}

/// Build `root/top.txt` plus `root/sub/` holding `n` numbered files and one large file
///
/// The tree yields `n + 2` file units.
pub fn build_sample_tree(root: &Path, n: usize) -> io::Result<SampleTree> {
    let sub = root.join("sub");
    fs::create_dir_all(&sub)?;

    let mut files = Vec::with_capacity(n + 2);

    fs::write(root.join("top.txt"), generate_test_data(1024, 1))?;
    files.push(PathBuf::from("top.txt"));

    for i in 0..n {
        let name = format!("file_{i:04}.dat");
        fs::write(sub.join(&name), generate_test_data(64 + i * 31, i as u8))?;
        files.push(Path::new("sub").join(name));
    }

    fs::write(sub.join("large.bin"), generate_test_data(LARGE_FILE_SIZE, 0x5a))?;
    files.push(Path::new("sub").join("large.bin"));

    Ok(SampleTree {
        root: root.to_path_buf(),
        files,
    })
}

/// Build a tree `depth` directories deep with `fanout` subdirectories and one file per directory
pub fn build_wide_tree(root: &Path, depth: usize, fanout: usize) -> io::Result<usize> {
    fs::create_dir_all(root)?;
    fs::write(root.join("leaf.txt"), generate_test_data(256, depth as u8))?;
    let mut files = 1;
    if depth == 0 {
        return Ok(files);
    }
    for i in 0..fanout {
        files += build_wide_tree(&root.join(format!("d{i}")), depth - 1, fanout)?;
    }
    Ok(files)
}

/// Count regular files below `root`
pub fn count_files(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}

/// Count every entry below `root`, excluding `root` itself
pub fn count_entries(root: &Path) -> usize {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .count()
}

/// Whether every file of `tree` exists below `destination` with identical content
pub fn trees_match(tree: &SampleTree, destination: &Path) -> io::Result<bool> {
    for relative in &tree.files {
        let expected = fs::read(tree.root.join(relative))?;
        match fs::read(destination.join(relative)) {
            Ok(actual) if actual == expected => {}
            Ok(_) => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
