//! Install directory resolution and binary placement.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::acquire::Artifact;
use crate::environment::HostEnv;
use crate::error::PlaceError;
use crate::resources::Resource as _;
use crate::resources::executable::ExecutableResource;

/// The directory a binary is installed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDir {
    /// Absolute directory path.
    pub path: PathBuf,
    /// Whether the directory was created by this run.
    pub created: bool,
}

/// Result of probing the candidates, before anything is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirChoice {
    /// An existing, writable directory.
    Writable(PathBuf),
    /// Nothing was writable; the last-resort directory must be created.
    CreateLastResort(PathBuf),
}

/// The last configured install directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastResort {
    /// Expanded path, created when nothing earlier is writable.
    Dir(PathBuf),
    /// Raw entry that needs `HOME` while `HOME` is unset.
    NeedsHome(String),
}

/// Expanded install directories in preference order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    /// Every entry but the last, with unexpandable `~` entries dropped.
    pub preferred: Vec<PathBuf>,
    /// The last entry.
    pub last_resort: LastResort,
}

impl Candidates {
    /// Candidates whose last path is the last resort.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_dirs(mut dirs: Vec<PathBuf>) -> Option<Self> {
        let last = dirs.pop()?;
        Some(Self {
            preferred: dirs,
            last_resort: LastResort::Dir(last),
        })
    }

    fn probe_order(&self) -> impl Iterator<Item = &PathBuf> {
        let last = match &self.last_resort {
            LastResort::Dir(dir) => Some(dir),
            LastResort::NeedsHome(_) => None,
        };
        self.preferred.iter().chain(last)
    }

    fn describe(&self) -> String {
        let mut names: Vec<String> = self
            .preferred
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        names.push(match &self.last_resort {
            LastResort::Dir(dir) => dir.display().to_string(),
            LastResort::NeedsHome(raw) => raw.clone(),
        });
        names.join(", ")
    }
}

/// Expand the configured install directories against `env`.
///
/// Nothing fails here when `HOME` is unset: earlier `~` entries are
/// dropped and the last one is kept as [`LastResort::NeedsHome`], so an
/// absolute candidate can still win.
///
/// # Errors
///
/// Returns [`PlaceError::NoCandidates`] for an empty list.
pub fn candidate_dirs(install_dirs: &[String], env: &HostEnv) -> Result<Candidates, PlaceError> {
    let Some((last, rest)) = install_dirs.split_last() else {
        return Err(PlaceError::NoCandidates);
    };
    Ok(Candidates {
        preferred: rest.iter().filter_map(|d| env.expand_home(d)).collect(),
        last_resort: env
            .expand_home(last)
            .map_or_else(|| LastResort::NeedsHome(last.clone()), LastResort::Dir),
    })
}

/// Whether a file can be created in `dir`.
///
/// A missing directory is not writable. The probe file is removed again.
#[must_use]
pub fn is_writable(dir: &Path) -> bool {
    dir.is_dir()
        && tempfile::Builder::new()
            .prefix(".mycli-probe-")
            .tempfile_in(dir)
            .is_ok()
}

/// Pick the first writable candidate without changing anything.
///
/// # Errors
///
/// Returns [`PlaceError::NoHome`] when nothing is writable and the last
/// resort cannot be expanded, and [`PlaceError::NoWritableDir`] when
/// nothing is writable and the last resort already exists.
pub fn choose_install_dir(candidates: &Candidates) -> Result<DirChoice, PlaceError> {
    if let Some(dir) = candidates.probe_order().find(|d| is_writable(d)) {
        return Ok(DirChoice::Writable(dir.clone()));
    }
    match &candidates.last_resort {
        LastResort::NeedsHome(raw) => Err(PlaceError::NoHome(raw.clone())),
        LastResort::Dir(dir) if dir.exists() => Err(no_writable_dir(candidates)),
        LastResort::Dir(dir) => Ok(DirChoice::CreateLastResort(dir.clone())),
    }
}

/// Choose the install directory, creating the last resort when needed.
///
/// # Errors
///
/// Returns an error if the last resort is needed but cannot be expanded or
/// created, or if no directory is writable.
pub fn resolve_install_dir(candidates: &Candidates) -> Result<InstallDir, PlaceError> {
    match choose_install_dir(candidates)? {
        DirChoice::Writable(path) => Ok(InstallDir {
            path,
            created: false,
        }),
        DirChoice::CreateLastResort(path) => {
            fs::create_dir_all(&path).map_err(|source| PlaceError::CreateDir {
                path: path.clone(),
                source,
            })?;
            if !is_writable(&path) {
                return Err(no_writable_dir(candidates));
            }
            Ok(InstallDir {
                path,
                created: true,
            })
        }
    }
}

fn no_writable_dir(candidates: &Candidates) -> PlaceError {
    PlaceError::NoWritableDir {
        candidates: candidates.describe(),
    }
}

/// Move `artifact` to `dir/name` and make it executable.
///
/// A rename is tried first. When that fails (typically because the temp
/// directory is on another filesystem) the binary is copied to a staging
/// file in `dir` and that file is renamed over the destination, so the
/// destination is never observed half-written. An existing binary is
/// replaced.
///
/// # Errors
///
/// Returns [`PlaceError::Move`] if the binary cannot be moved or copied and
/// [`PlaceError::Permissions`] if its mode cannot be set.
pub fn place_binary(artifact: Artifact, dir: &Path, name: &str) -> Result<PathBuf, PlaceError> {
    let dest = dir.join(name);

    if let Err(err) = artifact.path.persist(&dest) {
        // `err.path` still owns the temp file and removes it on drop.
        copy_into_place(&err.path, dir, &dest, name)?;
    }

    ExecutableResource::new(&dest)
        .ensure()
        .map_err(|e| PlaceError::Permissions {
            path: dest.clone(),
            reason: format!("{e:#}"),
        })?;
    Ok(dest)
}

fn copy_into_place(from: &Path, dir: &Path, dest: &Path, name: &str) -> Result<(), PlaceError> {
    let move_error = |source: io::Error| PlaceError::Move {
        from: from.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{name}-"))
        .tempfile_in(dir)
        .map_err(move_error)?;
    let mut source = fs::File::open(from).map_err(move_error)?;
    io::copy(&mut source, staged.as_file_mut()).map_err(move_error)?;
    staged.persist(dest).map_err(|e| move_error(e.error))?;
    Ok(())
}
