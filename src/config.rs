use std::fs::File;
use std::io::{BufReader, Error as IOError, Read};
use std::path::Path;

use serde_json::{error::Error as SerdeError, Value};
use thiserror::Error;

use super::resources;

#[derive(Error, Debug)]
pub enum ConfigErr {
  #[error("{self:?}")]
  IOError(#[from] IOError),
  #[error("{self:?}")]
  SerdeError(#[from] SerdeError),
  #[error("`{0}` is invalid in setting file")]
  InvalidFormatErr(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
  pub settings: Value,
  pub rcfile: String,
  pub dictionary_files: Vec<String>,
}

impl Config {
  pub fn setup(path: Option<&str>) -> Result<Config, ConfigErr> {
    let settings = match path {
      Some(path) => {
        let mut buf = String::new();
        BufReader::new(File::open(path)?).read_to_string(&mut buf)?;
        serde_json::from_str(&buf)?
      }
      None => serde_json::from_str(resources::SETTINGS_JSON)?,
    };
    Config::from_settings(settings)
  }
  pub fn from_settings(settings: Value) -> Result<Config, ConfigErr> {
    let rcfile = match settings.get("rcfile") {
      Some(Value::String(p)) if is_file_name(p) => p.to_string(),
      Some(_) => return Err(ConfigErr::InvalidFormatErr("rcfile")),
      None => String::from("mecabrc"),
    };
    let mut dictionary_files = vec![];
    match settings.get("dictionaryFiles") {
      Some(Value::Array(arr)) => {
        for v in arr {
          match v {
            Value::String(f) if is_file_name(f) => dictionary_files.push(f.to_string()),
            _ => return Err(ConfigErr::InvalidFormatErr("dictionaryFiles")),
          }
        }
      }
      Some(_) => return Err(ConfigErr::InvalidFormatErr("dictionaryFiles")),
      None => {}
    }
    Ok(Config {
      settings,
      rcfile,
      dictionary_files,
    })
  }
  /// Path of the resource file inside `dicdir`.
  pub fn rcfile_path(&self, dicdir: &str) -> String {
    format!("{}/{}", dicdir.trim_end_matches('/'), self.rcfile)
  }
}

impl Default for Config {
  fn default() -> Config {
    Config {
      settings: Value::Null,
      rcfile: String::from("mecabrc"),
      dictionary_files: vec![],
    }
  }
}

// a bare file name, so it cannot escape the dictionary directory
fn is_file_name(name: &str) -> bool {
  let path = Path::new(name);
  !name.is_empty() && path.file_name().map(|f| f == path.as_os_str()) == Some(true)
}
