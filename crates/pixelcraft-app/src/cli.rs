// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

pub const DEFAULT_OUT_DIR: &str = "pixelcraft-out";

/// Parsed invocation.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub request: PathBuf,
    pub config: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub out: PathBuf,
    pub report: Option<PathBuf>,
    pub verbose: bool,
    pub files: Vec<PathBuf>,
}

#[rustfmt::skip]
pub fn command() -> Command {
    Command::new("pixelcraft")
        .about("Apply one image transformation to a batch of files")
        .arg(Arg::new("request")
            .short('r')
            .long("request")
            .value_name("JSON")
            .help("Transform request, e.g. {\"op\": \"resize\", ...}")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("JSON")
            .help("Pipeline configuration; defaults are used when absent or unreadable")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("font")
            .long("font")
            .value_name("TTF")
            .help("Font used by text watermarks and meme captions")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("out")
            .short('o')
            .long("out")
            .value_name("DIR")
            .help("Directory the outputs are written to")
            .default_value(DEFAULT_OUT_DIR)
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("report")
            .long("report")
            .value_name("JSON")
            .help("Write the batch outcome as JSON")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Log debug information"))
        .arg(Arg::new("files")
            .value_name("FILES")
            .help("Images to process, in order")
            .action(ArgAction::Append)
            .value_parser(value_parser!(PathBuf))
            .required(true))
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();
        Self {
            request: path("request").unwrap_or_default(),
            config: path("config"),
            font: path("font"),
            out: path("out").unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            report: path("report"),
            verbose: matches.get_flag("verbose"),
            files: matches
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_invocation() {
        let matches = command()
            .try_get_matches_from([
                "pixelcraft", "-r", "req.json", "--font", "Impact.ttf", "--out", "done", "-v", "a.png",
                "b.jpg",
            ])
            .unwrap();
        let args = CliArgs::from_matches(&matches);
        assert_eq!(args.request, PathBuf::from("req.json"));
        assert_eq!(args.font, Some(PathBuf::from("Impact.ttf")));
        assert_eq!(args.out, PathBuf::from("done"));
        assert!(args.verbose);
        assert_eq!(args.files, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
        assert!(args.config.is_none());
    }

    #[test]
    fn output_directory_has_a_default() {
        let matches = command()
            .try_get_matches_from(["pixelcraft", "--request", "req.json", "a.png"])
            .unwrap();
        assert_eq!(CliArgs::from_matches(&matches).out, PathBuf::from(DEFAULT_OUT_DIR));
    }

    #[test]
    fn request_and_files_are_required() {
        assert!(command().try_get_matches_from(["pixelcraft", "a.png"]).is_err());
        assert!(command().try_get_matches_from(["pixelcraft", "-r", "req.json"]).is_err());
    }
}
