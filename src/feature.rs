use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ParseFeatureErr {
  #[error("Failed to parse a MeCab result line: {0}")]
  InvalidLineErr(String),
}

/// One IPADIC morpheme as printed by the bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeature {
  pub surface: String,
  pub pos: String,
  pub pos_detail1: Option<String>,
  pub pos_detail2: Option<String>,
  pub pos_detail3: Option<String>,
  pub conjugation1: Option<String>,
  pub conjugation2: Option<String>,
  pub dictionary_form: Option<String>,
  pub reading: Option<String>,
  pub pronunciation: Option<String>,
}

fn field(fields: &[&str], i: usize) -> Option<String> {
  match fields.get(i) {
    Some(&"") | Some(&"*") | None => None,
    Some(f) => Some(f.to_string()),
  }
}

pub fn parse_line(line: &str) -> Result<ParsedFeature, ParseFeatureErr> {
  let invalid = || ParseFeatureErr::InvalidLineErr(line.to_string());
  let parts: Vec<&str> = line.split(": ").collect();
  if parts.len() != 2 {
    return Err(invalid());
  }
  let fields: Vec<&str> = parts[1].split(',').collect();
  if fields.len() < 7 || fields.len() > 9 {
    return Err(invalid());
  }
  Ok(ParsedFeature {
    surface: parts[0].to_string(),
    pos: fields[0].to_string(),
    pos_detail1: field(&fields, 1),
    pos_detail2: field(&fields, 2),
    pos_detail3: field(&fields, 3),
    conjugation1: field(&fields, 4),
    conjugation2: field(&fields, 5),
    dictionary_form: field(&fields, 6),
    reading: field(&fields, 7),
    pronunciation: field(&fields, 8),
  })
}

pub fn parse_result(result: &str) -> Result<Vec<ParsedFeature>, ParseFeatureErr> {
  result
    .trim()
    .split('\n')
    .filter(|line| !line.is_empty())
    .map(parse_line)
    .collect()
}
