use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::native::{NativeErr, NativeLibrary};

pub const VALID_DICDIR: &str = "/dictionaries/ipadic";
pub const INVALID_DICDIR: &str = "/dictionaries/missing";

pub struct FakeHandle {
  dicdir: String,
  live: Arc<AtomicBool>,
}

impl FakeHandle {
  pub fn dicdir(&self) -> &str {
    &self.dicdir
  }
  pub fn is_live(&self) -> bool {
    self.live.load(Ordering::SeqCst)
  }
}

/// In-memory stand-in for the native tagger.
///
/// Any dicdir containing "missing" fails to initialize.
#[derive(Default)]
pub struct FakeLibrary {
  live: AtomicUsize,
  parse_calls: AtomicUsize,
  dispose_calls: AtomicUsize,
  fail_parse_on: Mutex<Option<String>>,
  fail_dispose: AtomicBool,
}

impl FakeLibrary {
  pub fn new() -> FakeLibrary {
    FakeLibrary::default()
  }
  pub fn live(&self) -> usize {
    self.live.load(Ordering::SeqCst)
  }
  pub fn parse_calls(&self) -> usize {
    self.parse_calls.load(Ordering::SeqCst)
  }
  pub fn dispose_calls(&self) -> usize {
    self.dispose_calls.load(Ordering::SeqCst)
  }
  pub fn fail_parse_on(&self, text: &str) {
    *self.fail_parse_on.lock().unwrap() = Some(text.to_string());
  }
  pub fn fail_dispose(&self, fail: bool) {
    self.fail_dispose.store(fail, Ordering::SeqCst);
  }
  /// One IPADIC-shaped line per whitespace separated word.
  pub fn expected_output(&self, text: &str) -> String {
    text
      .split_whitespace()
      .map(|w| format!("{}: 名詞,一般,*,*,*,*,{},*,*\n", w, w))
      .collect()
  }
}

impl NativeLibrary for FakeLibrary {
  type Handle = FakeHandle;

  fn init(&self, dicdir: &str) -> Result<FakeHandle, NativeErr> {
    if dicdir.contains("missing") {
      return Err(NativeErr::InitErr(format!(
        "no such file or directory: {}/dicrc",
        dicdir
      )));
    }
    self.live.fetch_add(1, Ordering::SeqCst);
    Ok(FakeHandle {
      dicdir: dicdir.to_string(),
      live: Arc::new(AtomicBool::new(true)),
    })
  }
  fn parse(&self, handle: &FakeHandle, text: &str) -> Result<String, NativeErr> {
    self.parse_calls.fetch_add(1, Ordering::SeqCst);
    assert!(handle.is_live(), "parse on a disposed handle");
    if self.fail_parse_on.lock().unwrap().as_deref() == Some(text) {
      return Err(NativeErr::ParseErr(format!("cannot parse {}", text)));
    }
    Ok(self.expected_output(text))
  }
  fn dispose(&self, handle: FakeHandle) -> Result<(), NativeErr> {
    self.dispose_calls.fetch_add(1, Ordering::SeqCst);
    assert!(handle.is_live(), "double free");
    handle.live.store(false, Ordering::SeqCst);
    self.live.fetch_sub(1, Ordering::SeqCst);
    if self.fail_dispose.load(Ordering::SeqCst) {
      return Err(NativeErr::DisposeErr(String::from("tagger busy")));
    }
    Ok(())
  }
}

/// Lays out `<root>/<name>` with the given dictionary files.
pub fn write_assets<P: AsRef<Path>>(root: P, name: &str, files: &[&str]) -> PathBuf {
  let dir = root.as_ref().join(name);
  create_dir_all(&dir).unwrap();
  for file in files {
    File::create(dir.join(file))
      .unwrap()
      .write_all(file.as_bytes())
      .unwrap();
  }
  dir
}
