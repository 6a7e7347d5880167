use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::bridge::{Bridge, Reply};
use super::dictionary_dir::{DictionaryDirErr, DictionaryInstaller};
use super::feature::{parse_result, ParseFeatureErr, ParsedFeature};
use super::native::NativeLibrary;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
  Uninitialized,
  Initializing,
  Initialized,
  Disposed,
  Failed,
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let s = match self {
      State::Uninitialized => "is not initialized",
      State::Initializing => "is currently initializing",
      State::Initialized => "has already been initialized",
      State::Disposed => "has been disposed of",
      State::Failed => "is in a failed state",
    };
    f.write_str(s)
  }
}

#[derive(Error, Debug)]
pub enum TaggerErr {
  #[error("Cannot call `init(...)`, tagger {0}.")]
  InvalidStateErr(State),
  #[error("Tagger was not initialized. Did you forget to run `init(...)`?")]
  NotInitializedErr,
  #[error("This instance has been disposed of.")]
  DisposedErr,
  #[error("Tagger failed to initialize: {0}")]
  FailedErr(String),
  #[error("{0}")]
  DictionaryDirErr(#[from] DictionaryDirErr),
  #[error("{0}")]
  BridgeErr(String),
  #[error("{0}")]
  ParseFeatureErr(#[from] ParseFeatureErr),
}

/// One tagger behind a shared bridge, with its own lifecycle.
pub struct Tagger<L: NativeLibrary> {
  bridge: Arc<Bridge<L>>,
  key: Option<String>,
  state: State,
  init_error: Option<String>,
}

impl<L: NativeLibrary> Tagger<L> {
  pub fn new(bridge: Arc<Bridge<L>>) -> Tagger<L> {
    Tagger {
      bridge,
      key: None,
      state: State::Uninitialized,
      init_error: None,
    }
  }
  pub fn state(&self) -> State {
    self.state
  }

  /// Installs `name` from the assets and creates the native tagger on it.
  pub fn init(&mut self, installer: &DictionaryInstaller, name: &str) -> Result<(), TaggerErr> {
    if self.state != State::Uninitialized {
      return Err(TaggerErr::InvalidStateErr(self.state));
    }
    self.state = State::Initializing;
    let dicdir = match installer.install(name) {
      Ok(dicdir) => dicdir,
      Err(e) => return Err(self.fail(e.into())),
    };
    self.init_with_dicdir(&dicdir.to_string_lossy())
  }

  /// Creates the native tagger on an already prepared dictionary directory.
  pub fn init_dicdir(&mut self, dicdir: &str) -> Result<(), TaggerErr> {
    if self.state != State::Uninitialized {
      return Err(TaggerErr::InvalidStateErr(self.state));
    }
    self.state = State::Initializing;
    self.init_with_dicdir(dicdir)
  }

  fn init_with_dicdir(&mut self, dicdir: &str) -> Result<(), TaggerErr> {
    let (reply, pending) = Reply::channel();
    self.bridge.init_tagger(dicdir, reply);
    match pending.wait() {
      Ok(key) => {
        self.key = Some(key);
        self.state = State::Initialized;
        Ok(())
      }
      Err(message) => Err(self.fail(TaggerErr::BridgeErr(message))),
    }
  }

  fn fail(&mut self, err: TaggerErr) -> TaggerErr {
    self.state = State::Failed;
    self.init_error = Some(err.to_string());
    err
  }

  fn live_key(&self) -> Result<&str, TaggerErr> {
    match self.state {
      State::Uninitialized => Err(TaggerErr::NotInitializedErr),
      State::Disposed => Err(TaggerErr::DisposedErr),
      State::Failed | State::Initializing => Err(TaggerErr::FailedErr(
        self.init_error.clone().unwrap_or_default(),
      )),
      State::Initialized => self
        .key
        .as_deref()
        .ok_or(TaggerErr::NotInitializedErr),
    }
  }

  /// Raw bridge output, one `<surface>: <feature>` line per morpheme.
  pub fn tokenize(&self, text: &str) -> Result<String, TaggerErr> {
    let key = self.live_key()?;
    let (reply, pending) = Reply::channel();
    self.bridge.parse(key, text, reply);
    pending.wait().map_err(TaggerErr::BridgeErr)
  }

  pub fn tokenize_features(&self, text: &str) -> Result<Vec<ParsedFeature>, TaggerErr> {
    Ok(parse_result(&self.tokenize(text)?)?)
  }

  pub fn dispose(&mut self) -> Result<(), TaggerErr> {
    let key = self.live_key()?.to_string();
    self.state = State::Disposed;
    self.key = None;
    let (reply, pending) = Reply::channel();
    self.bridge.dispose(&key, reply);
    pending.wait().map_err(TaggerErr::BridgeErr)
  }
}
