//! ```ignore
//! use mecab_bridge::prelude::*;
//!
//! let bridge = Bridge::new(MecabLibrary::new(Config::setup(None).unwrap()));
//!
//! // keys are opaque strings, the native tagger pointer never leaves the registry
//! let (reply, pending) = Reply::channel();
//! bridge.init_tagger("/usr/lib/mecab/dic/ipadic", reply);
//! let key = pending.wait().unwrap();
//!
//! let (reply, pending) = Reply::channel();
//! bridge.parse(&key, "すもももももももものうち", reply);
//! println!("{}", pending.wait().unwrap());
//! // => すもも: 名詞,一般,*,*,*,*,すもも,スモモ,スモモ
//! // => も: 助詞,係助詞,*,*,*,*,も,モ,モ
//! // => ...
//!
//! let (reply, pending) = Reply::channel();
//! bridge.dispose(&key, reply);
//! pending.wait().unwrap();
//!
//! // the key is dead from now on
//! let (reply, pending) = Reply::channel();
//! bridge.parse(&key, "すもも", reply);
//! assert!(pending.wait().is_err());
//! ```

#![crate_name = "mecab_bridge"]
#![crate_type = "lib"]
#![crate_type = "rlib"]

pub mod bridge;
pub mod config;
pub mod dictionary_dir;
pub mod feature;
#[cfg(feature = "mecab")]
pub mod mecab;
pub mod native;
pub mod registry;
mod resources;
pub mod tagger;
#[cfg(test)]
mod test_utils;
pub mod token;

pub use resources::write_settings_json;

pub mod prelude {
  pub use crate::bridge::{Bridge, Promise, Reply};
  pub use crate::config::Config;
  #[cfg(feature = "mecab")]
  pub use crate::mecab::MecabLibrary;
  pub use crate::native::NativeLibrary;
  pub use crate::registry::Registry;
  pub use crate::tagger::Tagger;
  pub use crate::token::Token;
}
