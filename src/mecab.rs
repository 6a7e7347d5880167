//! Binding to the system libmecab.

use std::ffi::{CStr, CString};
use std::fmt::Write;
use std::os::raw::{c_char, c_float, c_long, c_short, c_uchar, c_uint, c_ushort};
use std::ptr::NonNull;
use std::slice;
use std::sync::{Mutex, PoisonError};

use log::debug;

use super::config::Config;
use super::native::{NativeErr, NativeLibrary};

#[allow(non_camel_case_types, dead_code)]
mod ffi {
  use super::*;

  pub const MECAB_BOS_NODE: c_uchar = 2;
  pub const MECAB_EOS_NODE: c_uchar = 3;

  #[repr(C)]
  pub struct mecab_t {
    _private: [u8; 0],
  }

  #[repr(C)]
  pub struct mecab_node_t {
    pub prev: *mut mecab_node_t,
    pub next: *mut mecab_node_t,
    pub enext: *mut mecab_node_t,
    pub bnext: *mut mecab_node_t,
    pub rpath: *mut std::ffi::c_void,
    pub lpath: *mut std::ffi::c_void,
    pub surface: *const c_char,
    pub feature: *const c_char,
    pub id: c_uint,
    pub length: c_ushort,
    pub rlength: c_ushort,
    pub rc_attr: c_ushort,
    pub lc_attr: c_ushort,
    pub posid: c_ushort,
    pub char_type: c_uchar,
    pub stat: c_uchar,
    pub isbest: c_uchar,
    pub alpha: c_float,
    pub beta: c_float,
    pub prob: c_float,
    pub wcost: c_short,
    pub cost: c_long,
  }

  #[link(name = "mecab")]
  extern "C" {
    pub fn mecab_new2(arg: *const c_char) -> *mut mecab_t;
    pub fn mecab_strerror(mecab: *mut mecab_t) -> *const c_char;
    pub fn mecab_sparse_tonode(mecab: *mut mecab_t, str: *const c_char) -> *const mecab_node_t;
    pub fn mecab_destroy(mecab: *mut mecab_t);
  }
}

struct RawTagger(NonNull<ffi::mecab_t>);

// A tagger may move between threads; `MecabTagger` keeps it to one at a time.
unsafe impl Send for RawTagger {}

/// A live MeCab tagger. Only ever reachable through a registry token.
pub struct MecabTagger {
  raw: Mutex<RawTagger>,
}

pub struct MecabLibrary {
  config: Config,
}

impl MecabLibrary {
  pub fn new(config: Config) -> MecabLibrary {
    MecabLibrary { config }
  }
  pub fn tagger_args(&self, dicdir: &str) -> String {
    format!(
      "--dicdir {} --rcfile {}",
      dicdir,
      self.config.rcfile_path(dicdir)
    )
  }
}

fn strerror(mecab: *mut ffi::mecab_t) -> String {
  let message = unsafe { ffi::mecab_strerror(mecab) };
  if message.is_null() {
    return String::from("unknown MeCab error");
  }
  unsafe { CStr::from_ptr(message) }
    .to_string_lossy()
    .into_owned()
}

impl NativeLibrary for MecabLibrary {
  type Handle = MecabTagger;

  fn init(&self, dicdir: &str) -> Result<MecabTagger, NativeErr> {
    let args = CString::new(self.tagger_args(dicdir))?;
    debug!("mecab_new2({:?})", args);
    let raw = unsafe { ffi::mecab_new2(args.as_ptr()) };
    match NonNull::new(raw) {
      Some(raw) => Ok(MecabTagger {
        raw: Mutex::new(RawTagger(raw)),
      }),
      None => Err(NativeErr::InitErr(strerror(std::ptr::null_mut()))),
    }
  }

  fn parse(&self, handle: &MecabTagger, text: &str) -> Result<String, NativeErr> {
    let input = CString::new(text)?;
    let raw = handle.raw.lock().unwrap_or_else(PoisonError::into_inner);
    let mut node = unsafe { ffi::mecab_sparse_tonode(raw.0.as_ptr(), input.as_ptr()) };
    if node.is_null() {
      return Err(NativeErr::ParseErr(strerror(raw.0.as_ptr())));
    }
    let mut result = String::new();
    // nodes belong to the tagger and stay valid until its next parse
    while let Some(n) = unsafe { node.as_ref() } {
      if n.stat != ffi::MECAB_BOS_NODE && n.stat != ffi::MECAB_EOS_NODE {
        let surface =
          unsafe { slice::from_raw_parts(n.surface as *const u8, n.length as usize) };
        let feature = unsafe { CStr::from_ptr(n.feature) };
        let _ = writeln!(
          result,
          "{}: {}",
          String::from_utf8_lossy(surface),
          feature.to_string_lossy()
        );
      }
      node = n.next as *const ffi::mecab_node_t;
    }
    Ok(result)
  }

  fn dispose(&self, handle: MecabTagger) -> Result<(), NativeErr> {
    let raw = handle
      .raw
      .into_inner()
      .unwrap_or_else(PoisonError::into_inner);
    unsafe { ffi::mecab_destroy(raw.0.as_ptr()) };
    Ok(())
  }
}
