use std::fs::{create_dir_all, File};
use std::io::{Error as IOError, Write};
use std::path::Path;

pub fn write_settings_json<P: AsRef<Path>>(path: P) -> Result<(), IOError> {
  let path = path.as_ref();
  if !path.exists() {
    if let Some(p) = path.parent() {
      if !p.exists() {
        create_dir_all(p)?;
      }
    }
    File::create(path)?.write_all(SETTINGS_JSON.as_bytes())
  } else {
    Ok(())
  }
}

pub const SETTINGS_JSON: &str = r#"
{
  "rcfile" : "mecabrc",
  "dictionaryFiles" : [
    "char.bin",
    "dicrc",
    "left-id.def",
    "matrix.bin",
    "pos-id.def",
    "rewrite.def",
    "right-id.def",
    "sys.dic",
    "unk.dic"
  ]
}
"#;
