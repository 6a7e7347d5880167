use std::fs::{copy, create_dir_all, File};
use std::io::Error as IOError;
use std::path::{Component, Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use thiserror::Error;

use super::config::Config;

lazy_static! {
  static ref LEADING_SEPARATORS: Regex = Regex::new(r"^[\\/]+").unwrap();
  static ref TRAILING_SEPARATORS: Regex = Regex::new(r"[\\/]+$").unwrap();
}

#[derive(Error, Debug)]
pub enum DictionaryDirErr {
  #[error("Path \"{0}\" was not found in the application assets.")]
  NotFoundErr(String),
  #[error("Invalid contents of the dictionary directory. The following files are missing: \"{}\".", .0.join("\", \""))]
  MissingFilesErr(Vec<String>),
  #[error("{0}")]
  IOError(#[from] IOError),
}

/// Strips leading and trailing path separators from a dictionary name.
pub fn normalize_name(name: &str) -> String {
  let name = LEADING_SEPARATORS.replace(name, "");
  TRAILING_SEPARATORS.replace(&name, "").into_owned()
}

// only plain segments, so the name stays inside both directories
fn is_relative_name(name: &str) -> bool {
  !name.is_empty()
    && Path::new(name)
      .components()
      .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Copies a bundled dictionary out of the assets into a directory the native
/// library can open.
pub struct DictionaryInstaller {
  assets_dir: PathBuf,
  documents_dir: PathBuf,
  config: Config,
}

impl DictionaryInstaller {
  pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
    assets_dir: P,
    documents_dir: Q,
    config: Config,
  ) -> DictionaryInstaller {
    DictionaryInstaller {
      assets_dir: assets_dir.as_ref().to_path_buf(),
      documents_dir: documents_dir.as_ref().to_path_buf(),
      config,
    }
  }

  pub fn install(&self, name: &str) -> Result<PathBuf, DictionaryDirErr> {
    let name = normalize_name(name);
    if !is_relative_name(&name) {
      return Err(DictionaryDirErr::NotFoundErr(name));
    }
    let source_dir = self.assets_dir.join(&name);
    if !source_dir.is_dir() {
      return Err(DictionaryDirErr::NotFoundErr(name));
    }
    let target_dir = self.documents_dir.join(&name);
    create_dir_all(&target_dir)?;

    let mut missing_files = vec![];
    for file_name in self.config.dictionary_files.iter() {
      let source = source_dir.join(file_name);
      if !source.is_file() {
        missing_files.push(file_name.to_string());
        continue;
      }
      copy(&source, target_dir.join(file_name))?;
      debug!("copied {:?}", source);
    }
    if !missing_files.is_empty() {
      return Err(DictionaryDirErr::MissingFilesErr(missing_files));
    }

    let rcfile = target_dir.join(&self.config.rcfile);
    if !rcfile.exists() {
      File::create(&rcfile)?;
    }
    info!("installed dictionary {} into {:?}", name, target_dir);
    Ok(target_dir)
  }
}
