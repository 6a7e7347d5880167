use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use log::{debug, info, warn};
use thiserror::Error;

use super::native::{NativeErr, NativeLibrary};
use super::token::Token;

#[derive(Error, Debug)]
pub enum RegistryErr {
  #[error("failed to initialize native resource: {0}")]
  ResourceInitErr(NativeErr),
  #[error("Token \"{0}\" doesn't exist.")]
  UnknownTokenErr(String),
  #[error("{0}")]
  NativeOperationErr(NativeErr),
}

// `None` once the handle has been handed to the library for disposal.
struct Entry<H> {
  handle: RwLock<Option<H>>,
}

/// Maps opaque tokens to native handles owned by the registry.
///
/// The map lock is only held for lookup, insert and removal. Native calls run
/// under the entry lock instead: `invoke` holds it shared, `dispose` holds it
/// exclusively, so a disposal waits for in-flight invokes on the same token.
pub struct Registry<L: NativeLibrary> {
  library: L,
  entries: Mutex<HashMap<Token, Arc<Entry<L::Handle>>>>,
}

impl<L: NativeLibrary> Registry<L> {
  pub fn new(library: L) -> Registry<L> {
    Registry {
      library,
      entries: Mutex::new(HashMap::new()),
    }
  }
  pub fn library(&self) -> &L {
    &self.library
  }
  pub fn len(&self) -> usize {
    self.lock_entries().len()
  }
  pub fn is_empty(&self) -> bool {
    self.lock_entries().is_empty()
  }
  pub fn contains(&self, token: &Token) -> bool {
    self.lock_entries().contains_key(token)
  }

  pub fn create(&self, dicdir: &str) -> Result<Token, RegistryErr> {
    let handle = self
      .library
      .init(dicdir)
      .map_err(RegistryErr::ResourceInitErr)?;
    let entry = Arc::new(Entry {
      handle: RwLock::new(Some(handle)),
    });
    let mut entries = self.lock_entries();
    let mut token = Token::generate();
    while entries.contains_key(&token) {
      token = Token::generate();
    }
    entries.insert(token, entry);
    debug!("created {} for {}", token, dicdir);
    Ok(token)
  }

  pub fn invoke(&self, token: &Token, text: &str) -> Result<String, RegistryErr> {
    self.with_resource(token, |handle| self.library.parse(handle, text))
  }

  /// Runs `f` against the handle behind `token`.
  ///
  /// The handle stays valid for the whole call: a concurrent `dispose` of the
  /// same token blocks until `f` returns.
  pub fn with_resource<R, F>(&self, token: &Token, f: F) -> Result<R, RegistryErr>
  where
    F: FnOnce(&L::Handle) -> Result<R, NativeErr>,
  {
    let entry = self.resolve(token)?;
    let guard = entry.handle.read().unwrap_or_else(PoisonError::into_inner);
    match guard.as_ref() {
      Some(handle) => f(handle).map_err(RegistryErr::NativeOperationErr),
      None => Err(RegistryErr::UnknownTokenErr(token.to_string())),
    }
  }

  pub fn dispose(&self, token: &Token) -> Result<(), RegistryErr> {
    let entry = self.resolve(token)?;
    let handle = entry
      .handle
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    let handle = match handle {
      Some(handle) => handle,
      // lost a race with another dispose of the same token
      None => return Err(RegistryErr::UnknownTokenErr(token.to_string())),
    };
    let result = self.library.dispose(handle);
    self.lock_entries().remove(token);
    debug!("disposed {}", token);
    result.map_err(|e| {
      warn!("native dispose of {} failed: {}", token, e);
      RegistryErr::NativeOperationErr(e)
    })
  }

  /// Disposes every live entry and returns how many were disposed.
  pub fn dispose_all(&self) -> usize {
    let tokens: Vec<Token> = self.lock_entries().keys().cloned().collect();
    let mut disposed = 0;
    for token in tokens {
      match self.dispose(&token) {
        Ok(()) | Err(RegistryErr::NativeOperationErr(_)) => disposed += 1,
        Err(_) => {}
      }
    }
    if disposed > 0 {
      info!("disposed {} remaining resources", disposed);
    }
    disposed
  }

  fn resolve(&self, token: &Token) -> Result<Arc<Entry<L::Handle>>, RegistryErr> {
    self
      .lock_entries()
      .get(token)
      .cloned()
      .ok_or_else(|| RegistryErr::UnknownTokenErr(token.to_string()))
  }

  fn lock_entries(&self) -> MutexGuard<'_, HashMap<Token, Arc<Entry<L::Handle>>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<L: NativeLibrary> Drop for Registry<L> {
  fn drop(&mut self) {
    self.dispose_all();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{FakeLibrary, INVALID_DICDIR, VALID_DICDIR};
  use std::collections::HashSet;
  use std::sync::mpsc::channel;
  use std::thread;
  use std::time::Duration;

  fn build_registry() -> Registry<Arc<FakeLibrary>> {
    Registry::new(Arc::new(FakeLibrary::new()))
  }

  #[test]
  fn test_round_trip() {
    let registry = build_registry();
    let token = registry.create(VALID_DICDIR).unwrap();
    assert_eq!(1, registry.len());
    assert_eq!(
      registry.library().expected_output("すもも"),
      registry.invoke(&token, "すもも").unwrap()
    );
    registry.dispose(&token).unwrap();
    assert!(registry.is_empty());
    assert_eq!(0, registry.library().live());
    match registry.invoke(&token, "すもも") {
      Err(RegistryErr::UnknownTokenErr(t)) => assert_eq!(token.to_string(), t),
      _ => panic!("disposed token must be unknown"),
    }
  }

  #[test]
  fn test_invoke_unknown_token() {
    let registry = build_registry();
    registry.create(VALID_DICDIR).unwrap();
    match registry.invoke(&Token::generate(), "text") {
      Err(RegistryErr::UnknownTokenErr(_)) => {}
      _ => panic!("never issued token must be unknown"),
    }
    assert_eq!(0, registry.library().parse_calls());
  }

  #[test]
  fn test_token_from_other_registry() {
    let registry = build_registry();
    let other = build_registry();
    let token = other.create(VALID_DICDIR).unwrap();
    assert!(!registry.contains(&token));
    assert!(matches!(
      registry.invoke(&token, "text"),
      Err(RegistryErr::UnknownTokenErr(_))
    ));
  }

  #[test]
  fn test_double_dispose() {
    let registry = build_registry();
    let token = registry.create(VALID_DICDIR).unwrap();
    registry.dispose(&token).unwrap();
    assert!(matches!(
      registry.dispose(&token),
      Err(RegistryErr::UnknownTokenErr(_))
    ));
    assert_eq!(1, registry.library().dispose_calls());
  }

  #[test]
  fn test_create_invalid_dicdir() {
    let registry = build_registry();
    registry.create(VALID_DICDIR).unwrap();
    assert!(matches!(
      registry.create(INVALID_DICDIR),
      Err(RegistryErr::ResourceInitErr(_))
    ));
    assert_eq!(1, registry.len());
    assert_eq!(1, registry.library().live());
  }

  #[test]
  fn test_native_parse_error_keeps_entry() {
    let registry = build_registry();
    let token = registry.create(VALID_DICDIR).unwrap();
    registry.library().fail_parse_on("broken");
    assert!(matches!(
      registry.invoke(&token, "broken"),
      Err(RegistryErr::NativeOperationErr(NativeErr::ParseErr(_)))
    ));
    assert!(registry.contains(&token));
    assert!(registry.invoke(&token, "fine").is_ok());
  }

  #[test]
  fn test_dispose_error_still_removes_entry() {
    let registry = build_registry();
    let token = registry.create(VALID_DICDIR).unwrap();
    registry.library().fail_dispose(true);
    assert!(matches!(
      registry.dispose(&token),
      Err(RegistryErr::NativeOperationErr(NativeErr::DisposeErr(_)))
    ));
    assert!(!registry.contains(&token));
    assert_eq!(1, registry.library().dispose_calls());
    assert!(matches!(
      registry.dispose(&token),
      Err(RegistryErr::UnknownTokenErr(_))
    ));
  }

  #[test]
  fn test_invoke_does_not_mutate() {
    let registry = build_registry();
    let token = registry.create(VALID_DICDIR).unwrap();
    for _ in 0..3 {
      registry.invoke(&token, "text").unwrap();
    }
    assert_eq!(1, registry.len());
    assert!(registry.contains(&token));
  }

  #[test]
  fn test_with_resource() {
    let registry = build_registry();
    let token = registry.create(VALID_DICDIR).unwrap();
    let dicdir = registry
      .with_resource(&token, |handle| Ok(handle.dicdir().to_string()))
      .unwrap();
    assert_eq!(VALID_DICDIR, dicdir);
  }

  #[test]
  fn test_drop_disposes_remaining() {
    let library = Arc::new(FakeLibrary::new());
    {
      let registry = Registry::new(Arc::clone(&library));
      registry.create(VALID_DICDIR).unwrap();
      registry.create(VALID_DICDIR).unwrap();
      let token = registry.create(VALID_DICDIR).unwrap();
      registry.dispose(&token).unwrap();
      assert_eq!(2, library.live());
    }
    assert_eq!(0, library.live());
    assert_eq!(3, library.dispose_calls());
  }

  #[test]
  fn test_dispose_all() {
    let registry = build_registry();
    for _ in 0..5 {
      registry.create(VALID_DICDIR).unwrap();
    }
    assert_eq!(5, registry.dispose_all());
    assert!(registry.is_empty());
    assert_eq!(0, registry.dispose_all());
  }

  #[test]
  fn test_concurrent_create() {
    let registry = Arc::new(build_registry());
    let handles: Vec<_> = (0..16)
      .map(|i| {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
          (0..32)
            .map(|j| {
              let dicdir = if (i + j) % 5 == 0 {
                INVALID_DICDIR
              } else {
                VALID_DICDIR
              };
              registry.create(dicdir).ok()
            })
            .collect::<Vec<_>>()
        })
      })
      .collect();
    let tokens: Vec<Token> = handles
      .into_iter()
      .flat_map(|h| h.join().unwrap())
      .flatten()
      .collect();
    let distinct: HashSet<&Token> = tokens.iter().collect();
    assert_eq!(tokens.len(), distinct.len());
    assert_eq!(tokens.len(), registry.len());
    assert_eq!(tokens.len(), registry.library().live());
  }

  #[test]
  fn test_concurrent_dispose_single_winner() {
    let registry = Arc::new(build_registry());
    let token = registry.create(VALID_DICDIR).unwrap();
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.dispose(&token).is_ok())
      })
      .collect();
    let successes = handles
      .into_iter()
      .map(|h| h.join().unwrap())
      .filter(|ok| *ok)
      .count();
    assert_eq!(1, successes);
    assert_eq!(1, registry.library().dispose_calls());
  }

  #[test]
  fn test_dispose_waits_for_in_flight_invoke() {
    let registry = Arc::new(build_registry());
    let token = registry.create(VALID_DICDIR).unwrap();
    let (started_tx, started_rx) = channel();
    let invoker = {
      let registry = Arc::clone(&registry);
      thread::spawn(move || {
        registry.with_resource(&token, |handle| {
          started_tx.send(()).unwrap();
          thread::sleep(Duration::from_millis(100));
          Ok(handle.is_live())
        })
      })
    };
    started_rx.recv().unwrap();
    registry.dispose(&token).unwrap();
    assert!(invoker.join().unwrap().unwrap());
    assert_eq!(0, registry.library().live());
  }
}
