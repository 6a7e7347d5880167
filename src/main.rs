use std::error::Error;
use std::fs::File;
use std::io::{stdin, BufRead, BufReader};
use std::path::Path;
use std::process::exit;
use std::sync::Arc;

use clap::{crate_name, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{debug, info};

use mecab_bridge::bridge::Bridge;
use mecab_bridge::config::Config;
use mecab_bridge::dictionary_dir::DictionaryInstaller;
use mecab_bridge::mecab::MecabLibrary;
use mecab_bridge::tagger::Tagger;
use mecab_bridge::write_settings_json;

// Subcommand names
const TOKENIZE_SUB_CMD: &str = "tokenize";
const INSTALL_SUB_CMD: &str = "install";

// Argument names
const ASSETS_DIR_ARG: &str = "assets_dir";
const DICDIR_ARG: &str = "dicdir";
const DOCUMENTS_DIR_ARG: &str = "documents_dir";
const FPATH_SETTING_ARG: &str = "fpath_setting";
const IN_FILES_ARG: &str = "in_files";
const NAME_ARG: &str = "name";
const PARSED_ARG: &str = "parsed";
const QUIET_ARG: &str = "quiet";
const VERBOSE_ARG: &str = "verbose";

fn unwrap<T, E: Error>(t: Result<T, E>) -> T {
  match t {
    Ok(t) => t,
    Err(e) => {
      eprintln!("{}: error: {}", crate_name!(), e);
      exit(1);
    }
  }
}

fn setup_config(args: &ArgMatches) -> Config {
  let path = args.value_of(FPATH_SETTING_ARG);
  if let Some(path) = path {
    if !Path::new(path).exists() {
      info!("writing default settings to {}", path);
      unwrap(write_settings_json(path));
    }
  }
  unwrap(Config::setup(path))
}

fn print_line(tagger: &Tagger<MecabLibrary>, line: &str, parsed: bool) {
  if parsed {
    for feature in unwrap(tagger.tokenize_features(line)) {
      println!(
        "{}\t{}\t{}",
        feature.surface,
        feature.pos,
        feature.dictionary_form.unwrap_or_else(|| String::from("*"))
      );
    }
  } else {
    print!("{}", unwrap(tagger.tokenize(line)));
  }
  println!("EOS");
}

fn tokenize(args: &ArgMatches) {
  let config = setup_config(args);
  let bridge = Arc::new(Bridge::new(MecabLibrary::new(config)));
  let mut tagger = Tagger::new(Arc::clone(&bridge));
  unwrap(tagger.init_dicdir(args.value_of(DICDIR_ARG).unwrap()));
  let parsed = args.is_present(PARSED_ARG);

  match args.values_of(IN_FILES_ARG) {
    Some(in_files) => {
      for in_file in in_files {
        debug!("reading {}", in_file);
        for line in BufReader::new(unwrap(File::open(in_file))).lines() {
          print_line(&tagger, &unwrap(line), parsed);
        }
      }
    }
    None => {
      let stdin = stdin();
      for line in stdin.lock().lines() {
        print_line(&tagger, &unwrap(line), parsed);
      }
    }
  }
  unwrap(tagger.dispose());
}

fn install(args: &ArgMatches) {
  let config = setup_config(args);
  let installer = DictionaryInstaller::new(
    args.value_of(ASSETS_DIR_ARG).unwrap(),
    args.value_of(DOCUMENTS_DIR_ARG).unwrap(),
    config,
  );
  let dicdir = unwrap(installer.install(args.value_of(NAME_ARG).unwrap()));
  println!("{}", dicdir.display());
}

fn path_validator(path: String) -> Result<(), String> {
  if Path::new(&path).exists() {
    Ok(())
  } else {
    Err(format!("{}: error: {} doesn't exist", crate_name!(), path))
  }
}

fn main() {
  let setting_arg = Arg::with_name(FPATH_SETTING_ARG)
    .short("r")
    .takes_value(true)
    .help("the setting file in JSON format (written with defaults if missing)");

  let tokenize_subcommand = SubCommand::with_name(TOKENIZE_SUB_CMD)
    .about("Tokenize Text")
    .arg(
      Arg::with_name(DICDIR_ARG)
        .short("d")
        .takes_value(true)
        .required(true)
        .help("the dictionary directory")
        .validator(path_validator),
    )
    .arg(setting_arg.clone())
    .arg(
      Arg::with_name(PARSED_ARG)
        .short("p")
        .help("print surface, part of speech and dictionary form only"),
    )
    .arg(
      Arg::with_name(IN_FILES_ARG)
        .takes_value(true)
        .multiple(true)
        .help("text written in utf-8 (default: stdin)")
        .validator(path_validator),
    );

  let install_subcommand = SubCommand::with_name(INSTALL_SUB_CMD)
    .about("Install a Bundled Dictionary")
    .arg(
      Arg::with_name(ASSETS_DIR_ARG)
        .short("a")
        .takes_value(true)
        .required(true)
        .help("directory holding bundled dictionaries")
        .validator(path_validator),
    )
    .arg(
      Arg::with_name(DOCUMENTS_DIR_ARG)
        .short("o")
        .takes_value(true)
        .required(true)
        .help("directory to install into"),
    )
    .arg(setting_arg)
    .arg(
      Arg::with_name(NAME_ARG)
        .takes_value(true)
        .required(true)
        .help("dictionary name inside the assets directory"),
    );

  let app = App::new("MeCab Bridge")
    .version(crate_version!())
    .setting(AppSettings::SubcommandRequiredElseHelp)
    .arg(
      Arg::with_name(VERBOSE_ARG)
        .short("v")
        .multiple(true)
        .help("increase log verbosity"),
    )
    .arg(
      Arg::with_name(QUIET_ARG)
        .short("q")
        .help("silence all logging"),
    )
    .subcommand(tokenize_subcommand)
    .subcommand(install_subcommand);
  let matches = app.get_matches();

  stderrlog::new()
    .module("mecab_bridge")
    .quiet(matches.is_present(QUIET_ARG))
    .verbosity(matches.occurrences_of(VERBOSE_ARG) as usize)
    .init()
    .expect("logger already initialized");

  match matches.subcommand() {
    (TOKENIZE_SUB_CMD, Some(tokenize_matches)) => tokenize(tokenize_matches),
    (INSTALL_SUB_CMD, Some(install_matches)) => install(install_matches),
    _ => unreachable!(),
  }
}
