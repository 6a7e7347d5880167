use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use log::debug;

use super::native::NativeLibrary;
use super::registry::{Registry, RegistryErr};
use super::token::Token;

/// Settles a host request exactly once.
pub trait Promise<T> {
  fn resolve(self, value: T);
  fn reject(self, message: String);
}

impl<T, F: FnOnce(Result<T, String>)> Promise<T> for F {
  fn resolve(self, value: T) {
    self(Ok(value))
  }
  fn reject(self, message: String) {
    self(Err(message))
  }
}

pub struct Reply<T> {
  sender: SyncSender<Result<T, String>>,
}

pub struct PendingReply<T> {
  receiver: Receiver<Result<T, String>>,
}

impl<T> Reply<T> {
  pub fn channel() -> (Reply<T>, PendingReply<T>) {
    let (sender, receiver) = sync_channel(1);
    (Reply { sender }, PendingReply { receiver })
  }
}

impl<T> Promise<T> for Reply<T> {
  fn resolve(self, value: T) {
    let _ = self.sender.send(Ok(value));
  }
  fn reject(self, message: String) {
    let _ = self.sender.send(Err(message));
  }
}

impl<T> PendingReply<T> {
  pub fn wait(self) -> Result<T, String> {
    self
      .receiver
      .recv()
      .unwrap_or_else(|_| Err(String::from("promise dropped without being settled")))
  }
}

/// Host-facing module: string keys in, promises settled out.
pub struct Bridge<L: NativeLibrary> {
  registry: Registry<L>,
}

impl<L: NativeLibrary> Bridge<L> {
  pub fn new(library: L) -> Bridge<L> {
    Bridge {
      registry: Registry::new(library),
    }
  }
  pub fn registry(&self) -> &Registry<L> {
    &self.registry
  }

  pub fn init_tagger<P: Promise<String>>(&self, dicdir: &str, promise: P) {
    settle(promise, self.registry.create(dicdir).map(|t| t.to_string()));
  }

  pub fn parse<P: Promise<String>>(&self, key: &str, query: &str, promise: P) {
    let result = parse_key(key).and_then(|token| self.registry.invoke(&token, query));
    settle(promise, result);
  }

  pub fn dispose<P: Promise<()>>(&self, key: &str, promise: P) {
    let result = parse_key(key).and_then(|token| self.registry.dispose(&token));
    settle(promise, result);
  }
}

fn parse_key(key: &str) -> Result<Token, RegistryErr> {
  key
    .parse::<Token>()
    .map_err(|_| RegistryErr::UnknownTokenErr(key.to_string()))
}

fn settle<T, P: Promise<T>>(promise: P, result: Result<T, RegistryErr>) {
  match result {
    Ok(value) => promise.resolve(value),
    Err(e) => {
      debug!("rejecting: {}", e);
      promise.reject(e.to_string())
    }
  }
}
