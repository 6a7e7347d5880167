use std::ffi::NulError;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NativeErr {
  #[error("{0}")]
  InitErr(String),
  #[error("{0}")]
  ParseErr(String),
  #[error("{0}")]
  DisposeErr(String),
  #[error("input contains an interior nul byte: {0}")]
  NulErr(#[from] NulError),
}

/// The C-style surface of a native tokenizer library.
///
/// A `Handle` is whatever the library hands back from `init`. It is owned by
/// the caller of `init` until it is passed back to `dispose`.
pub trait NativeLibrary: Send + Sync {
  type Handle: Send + Sync;

  fn init(&self, dicdir: &str) -> Result<Self::Handle, NativeErr>;
  fn parse(&self, handle: &Self::Handle, text: &str) -> Result<String, NativeErr>;
  fn dispose(&self, handle: Self::Handle) -> Result<(), NativeErr>;
}

impl<'a, L: NativeLibrary + ?Sized> NativeLibrary for &'a L {
  type Handle = L::Handle;

  fn init(&self, dicdir: &str) -> Result<Self::Handle, NativeErr> {
    (**self).init(dicdir)
  }
  fn parse(&self, handle: &Self::Handle, text: &str) -> Result<String, NativeErr> {
    (**self).parse(handle, text)
  }
  fn dispose(&self, handle: Self::Handle) -> Result<(), NativeErr> {
    (**self).dispose(handle)
  }
}

impl<L: NativeLibrary + ?Sized> NativeLibrary for Arc<L> {
  type Handle = L::Handle;

  fn init(&self, dicdir: &str) -> Result<Self::Handle, NativeErr> {
    (**self).init(dicdir)
  }
  fn parse(&self, handle: &Self::Handle, text: &str) -> Result<String, NativeErr> {
    (**self).parse(handle, text)
  }
  fn dispose(&self, handle: Self::Handle) -> Result<(), NativeErr> {
    (**self).dispose(handle)
  }
}
