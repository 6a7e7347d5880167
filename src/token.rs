use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

const TOKEN_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

#[derive(Error, Debug, PartialEq)]
#[error("\"{0}\" is not a valid token")]
pub struct ParseTokenErr(pub String);

/// Caller-facing identifier of a live native resource.
///
/// Built from 128 random bits and rendered in the UUID v4 layout, so the
/// version and variant nibbles are fixed and 122 bits stay random.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u128);

impl Token {
  pub fn generate() -> Token {
    let bits: u128 = rand::thread_rng().gen();
    let bits = (bits & !(0xf << 76)) | (0x4 << 76);
    let bits = (bits & !(0x3 << 62)) | (0x2 << 62);
    Token(bits)
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let v = self.0;
    write!(
      f,
      "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
      (v >> 96) as u32,
      (v >> 80) as u16,
      (v >> 64) as u16,
      (v >> 48) as u16,
      v & 0xffff_ffff_ffff
    )
  }
}

impl FromStr for Token {
  type Err = ParseTokenErr;

  fn from_str(s: &str) -> Result<Token, ParseTokenErr> {
    let err = || ParseTokenErr(s.to_string());
    if s.len() != TOKEN_LEN || !s.is_ascii() {
      return Err(err());
    }
    let mut digits = String::with_capacity(32);
    for (i, c) in s.chars().enumerate() {
      if HYPHEN_POSITIONS.contains(&i) {
        if c != '-' {
          return Err(err());
        }
      } else if c.is_ascii_digit() || ('a'..='f').contains(&c) {
        digits.push(c);
      } else {
        return Err(err());
      }
    }
    u128::from_str_radix(&digits, 16)
      .map(Token)
      .map_err(|_| err())
  }
}
