//! Local half of seeding: clone, strip VCS metadata, and pack a gzip'd tarball.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use git2::Repository;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::errors::SeedError;

/// File name of the archive, locally and on the remote host.
pub const ARCHIVE_NAME: &str = "lookml.tgz";

/// Top-level directory every archive entry is nested under.
pub const ARCHIVE_ROOT: &str = "lookml";

const VCS_DIR: &str = ".git";

/// A packed source tree ready for transfer.
#[derive(Debug, Clone)]
pub struct SourceArchive {
    pub path: PathBuf,
    pub sha256: String,
    pub file_count: usize,
}

/// Clone `url` into `dest`, which must not exist yet.
pub fn clone_source(url: &str, dest: &Path) -> Result<(), SeedError> {
    info!(url, dest = %dest.display(), "Cloning source repository");
    Repository::clone(url, dest).map_err(|source| SeedError::Clone {
        url: url.to_string(),
        source,
    })?;
    Ok(())
}

/// Remove the `.git` subtree from a working copy.
pub fn strip_vcs(tree: &Path) -> Result<(), SeedError> {
    let git_dir = tree.join(VCS_DIR);
    if git_dir.exists() {
        std::fs::remove_dir_all(&git_dir).map_err(|source| SeedError::Archive {
            path: git_dir.clone(),
            source,
        })?;
        debug!(path = %git_dir.display(), "Removed VCS metadata");
    }
    Ok(())
}

/// Pack `tree` into a gzip-compressed tarball at `archive_path`.
///
/// Entries are nested under [`ARCHIVE_ROOT`] and added in file-name order.
/// Anything under a `.git` directory is skipped.
pub fn build_archive(tree: &Path, archive_path: &Path) -> Result<SourceArchive, SeedError> {
    let archive_err = |source: std::io::Error| SeedError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::create(archive_path).map_err(archive_err)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    let mut file_count = 0;
    let walker = WalkDir::new(tree)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != VCS_DIR);
    for entry in walker {
        let entry = entry.map_err(|e| archive_err(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(tree)
            .map_err(|e| archive_err(std::io::Error::other(e)))?;
        let name = Path::new(ARCHIVE_ROOT).join(relative);

        if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path()).map_err(archive_err)?;
        } else {
            builder
                .append_path_with_name(entry.path(), &name)
                .map_err(archive_err)?;
            file_count += 1;
        }
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(archive_err)?;

    let sha256 = file_sha256(archive_path).map_err(archive_err)?;
    info!(
        path = %archive_path.display(),
        files = file_count,
        sha256 = %sha256,
        "Built source archive"
    );
    Ok(SourceArchive {
        path: archive_path.to_path_buf(),
        sha256,
        file_count,
    })
}

/// Clone, strip, and pack `url` inside `work_dir`.
pub fn prepare(url: &str, work_dir: &Path) -> Result<SourceArchive, SeedError> {
    let tree = work_dir.join(ARCHIVE_ROOT);
    clone_source(url, &tree)?;
    strip_vcs(&tree)?;
    build_archive(&tree, &work_dir.join(ARCHIVE_NAME))
}

fn file_sha256(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use git2::{Repository, Signature};
    use std::path::Path;

    /// Create a repository at `dir` with one commit holding `files`.
    pub fn source_repo(dir: &Path, files: &[(&str, &str)]) {
        let repo = Repository::init(dir).unwrap();
        for (name, content) in files {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
    }
}
