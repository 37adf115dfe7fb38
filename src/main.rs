//! Purpose: `extract-body` CLI entry point.
//! Role: Binary crate root; parses args, runs the extractor, emits pretty JSON on stdout.
//! Invariants: Stdout carries only the decoded body or the usage line.
//! Invariants: Errors are emitted on stderr (human text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `to_exit_code`.
//! Invariants: Only `--color`, `--help` and `--version` are flags; every other argument is a file.
//! Invariants: A file count other than one prints usage and exits 0 without touching the filesystem.
use std::error::Error as StdError;
use std::ffi::{OsStr, OsString};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod color_json;

use color_json::render_pretty;
use extract_body::{Error, ErrorKind, InputSource, extract_from, to_exit_code};

const BIN_NAME: &str = "extract-body";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run(std::env::args_os().collect()) {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run(args: Vec<OsString>) -> Result<RunOutcome, (Error, ColorMode)> {
    let program = program_name(&args);
    let (flags, files) = split_args(args);
    let cli = match Cli::try_parse_from(flags) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => return Err((flag_error(&err), ColorMode::Auto)),
        },
    };

    let color_mode = cli.color;
    let [file] = files.as_slice() else {
        debug!(count = files.len(), "wrong number of input files");
        return write_stdout(&usage_line(&program))
            .map(|()| RunOutcome::ok())
            .map_err(|err| (err, color_mode));
    };

    let source = InputSource::from_arg(file);
    extract_from(&source)
        .and_then(|body| emit_json(&body, color_mode))
        .map(|()| RunOutcome::ok())
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = BIN_NAME,
    version,
    about = "Pretty-print the response body captured in an automation error report",
    long_about = None,
    override_usage = "extract-body [--color <COLOR>] <filename.json>",
    after_help = r#"The report must contain `latestResponseData.body`, a string holding JSON.
Every argument other than the flags above is a file name, even when it starts
with `-`. Use `-` to read the report from stdin, or `./-` for a file named `-`.

EXAMPLES
  $ extract-body error-report.json
  $ extract-body --color never error-report.json > body.json"#
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize pretty JSON output: auto|always|never"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ArgRole {
    Flag,
    FlagWithValue,
    File,
}

fn arg_role(arg: &OsStr) -> ArgRole {
    match arg.to_str() {
        Some("--help" | "-h" | "--version" | "-V") => ArgRole::Flag,
        Some("--color") => ArgRole::FlagWithValue,
        Some(flag) if flag.starts_with("--color=") => ArgRole::Flag,
        _ => ArgRole::File,
    }
}

/// Splits argv into what clap parses (program name plus known flags) and file arguments.
fn split_args(args: Vec<OsString>) -> (Vec<OsString>, Vec<PathBuf>) {
    let mut args = args.into_iter();
    let mut flags: Vec<OsString> = args.next().into_iter().collect();
    let mut files = Vec::new();
    while let Some(arg) = args.next() {
        match arg_role(&arg) {
            ArgRole::Flag => flags.push(arg),
            ArgRole::FlagWithValue => {
                flags.push(arg);
                flags.extend(args.next());
            }
            ArgRole::File => files.push(PathBuf::from(arg)),
        }
    }
    (flags, files)
}

fn flag_error(err: &clap::Error) -> Error {
    let message = match err.kind() {
        ClapErrorKind::InvalidValue => {
            "invalid value for `--color` (expected auto, always or never)".to_string()
        }
        ClapErrorKind::ArgumentConflict => "`--color` may be given only once".to_string(),
        _ => err
            .render()
            .to_string()
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| line.trim_start_matches("error:").trim().to_string())
            .unwrap_or_else(|| "invalid arguments".to_string()),
    };
    Error::new(ErrorKind::Usage)
        .with_message(message)
        .with_hint(format!("Try `{BIN_NAME} --help`."))
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn program_name(args: &[OsString]) -> String {
    args.first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| BIN_NAME.to_string())
}

fn usage_line(program: &str) -> String {
    format!("Usage: {program} [filename.json]")
}

fn emit_json(value: &Value, color_mode: ColorMode) -> Result<(), Error> {
    let use_color = color_mode.use_color(io::stdout().is_terminal());
    write_stdout(&render_pretty(value, use_color))
}

fn write_stdout(text: &str) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")
        .and_then(|()| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write to stdout")
                .with_source(err)
        })
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("Check the report path; use `-` to read from stdin."),
        ErrorKind::Permission => err.with_hint("Permission denied. Check the file permissions."),
        ErrorKind::Io => err.with_hint("I/O error. Check the path and that the file is UTF-8 text."),
        ErrorKind::MissingField => err.with_hint(
            "Expected a report shaped like {\"latestResponseData\": {\"body\": \"...\"}}.",
        ),
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint("Unexpected internal failure. Retry with RUST_LOG=debug and share the report shape.")
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    eprintln!("{}", render_error(err, is_tty, color_mode.use_color(is_tty)));
}

// Terminals get the labeled text block; pipes and files get one JSON line.
fn render_error(err: &Error, is_tty: bool, use_color: bool) -> String {
    if is_tty {
        return error_text(err, use_color);
    }
    serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    })
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::InvalidJson => "invalid JSON".to_string(),
        ErrorKind::MissingField => "missing field".to_string(),
        ErrorKind::InvalidBody => "invalid response body".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<String>,
}

fn error_json(err: &Error) -> ErrorEnvelope<'_> {
    ErrorEnvelope {
        error: ErrorPayload {
            kind: format!("{:?}", err.kind()),
            message: error_message(err),
            hint: err.hint(),
            path: err.path().map(|path| path.display().to_string()),
            causes: error_causes(err),
        },
    }
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, ColorMode, add_io_hint, error_json, error_text, flag_error, program_name,
        render_error, split_args, usage_line,
    };
    use clap::Parser;
    use extract_body::{Error, ErrorKind};
    use std::ffi::OsString;
    use std::io;
    use std::path::PathBuf;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn usage_line_names_the_invoked_program() {
        let args = vec![OsString::from("./bin/extract-body")];
        assert_eq!(
            usage_line(&program_name(&args)),
            "Usage: ./bin/extract-body [filename.json]"
        );
        assert_eq!(usage_line(&program_name(&[])), "Usage: extract-body [filename.json]");
    }

    #[test]
    fn split_args_treats_unknown_dashes_as_files() {
        let (flags, files) = split_args(os_args(&["extract-body", "-report.json"]));
        assert_eq!(flags, os_args(&["extract-body"]));
        assert_eq!(files, [PathBuf::from("-report.json")]);

        let (flags, files) = split_args(os_args(&["extract-body", "a.json", "--verbose"]));
        assert_eq!(flags, os_args(&["extract-body"]));
        assert_eq!(files, [PathBuf::from("a.json"), PathBuf::from("--verbose")]);
    }

    #[test]
    fn split_args_keeps_color_and_its_value_together() {
        let (flags, files) =
            split_args(os_args(&["extract-body", "--color", "never", "-", "--color=always"]));
        assert_eq!(
            flags,
            os_args(&["extract-body", "--color", "never", "--color=always"])
        );
        assert_eq!(files, [PathBuf::from("-")]);

        let (flags, files) = split_args(os_args(&["extract-body"]));
        assert_eq!(flags.len(), 1);
        assert!(files.is_empty());
    }

    #[test]
    fn known_flags_parse_through_clap() {
        let cli = Cli::try_parse_from(["extract-body", "--color", "never"]).expect("color");
        assert!(matches!(cli.color, ColorMode::Never));

        let err = Cli::try_parse_from(["extract-body", "--color", "sometimes"])
            .err()
            .expect("bad color");
        let err = flag_error(&err);
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.message().unwrap().contains("--color"));
    }

    #[test]
    fn color_mode_respects_tty() {
        assert!(ColorMode::Auto.use_color(true));
        assert!(!ColorMode::Auto.use_color(false));
        assert!(ColorMode::Always.use_color(false));
        assert!(!ColorMode::Never.use_color(true));
    }

    #[test]
    fn error_json_includes_kind_hint_path_and_causes() {
        let err = Error::from_io(
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
            std::path::Path::new("report.json"),
        )
        .with_message("input file not found");
        let err = add_io_hint(err);
        let value = serde_json::to_value(error_json(&err)).expect("serialize");
        let inner = &value["error"];
        assert_eq!(inner["kind"], "NotFound");
        assert_eq!(inner["message"], "input file not found");
        assert_eq!(inner["path"], "report.json");
        assert_eq!(inner["causes"][0], "no such file");
        assert!(inner["hint"].as_str().unwrap().contains("report path"));
    }

    #[test]
    fn error_json_omits_absent_fields() {
        let err = Error::new(ErrorKind::Internal);
        let value = serde_json::to_value(error_json(&err)).expect("serialize");
        let inner = value["error"].as_object().expect("object");
        assert_eq!(inner.len(), 2);
        assert_eq!(inner["message"], "internal error");
    }

    #[test]
    fn render_error_picks_json_off_tty() {
        let err = Error::new(ErrorKind::MissingField).with_message("missing key `body`");
        let line = render_error(&err, false, false);
        let value: serde_json::Value = serde_json::from_str(&line).expect("json line");
        assert_eq!(value["error"]["kind"], "MissingField");
        assert_eq!(render_error(&err, true, false), "error: missing key `body`");
    }

    #[test]
    fn error_text_is_plain_without_color() {
        let err = Error::new(ErrorKind::InvalidBody)
            .with_message("bad body")
            .with_hint("check it");
        assert_eq!(error_text(&err, false), "error: bad body\nhint: check it");
        assert!(error_text(&err, true).contains("\u{1b}[31merror:\u{1b}[0m"));
    }
}
