//! Command-line front end for `jsonp-core`.
//!
//! Applies JSON Patch documents, resolves single pointers and lists every
//! pointer of a document. Inputs come from files or STDIN, output goes to
//! STDOUT or `-o FILE`. Diagnostics are logged to STDERR through `tracing`.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use jsonp_core::{navigate, Patch, PatchOptions, UnknownOpPolicy, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jsonp", version, about = "Apply JSON Patch (RFC 6902) and resolve JSON Pointers (RFC 6901).")]
struct Cli {
    /// Read and write YAML instead of JSON.
    #[arg(long = "yaml", global = true, action = ArgAction::SetTrue)]
    yaml: bool,

    /// Write output to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output", global = true)]
    output: Option<PathBuf>,

    /// JSON object of patch options, e.g. '{"unknownOps":"reject","maxPathDepth":32}'.
    #[arg(long = "opts", global = true)]
    opts: Option<String>,

    /// Fail on unrecognized operations instead of skipping them.
    #[arg(long = "strict", global = true, action = ArgAction::SetTrue)]
    strict: bool,

    /// Reject pointers with more than N tokens.
    #[arg(long = "max-depth", global = true, value_name = "N")]
    max_depth: Option<usize>,

    /// Pretty-print JSON output.
    #[arg(long = "pretty", global = true, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply PATCH to DOC (or STDIN) and print the patched document.
    Patch {
        /// Patch file: a JSON (or YAML) array of operations.
        patch: OsString,
        /// Document to patch; STDIN when omitted.
        doc: Option<OsString>,
    },
    /// Print the node at POINTER in DOC (or STDIN).
    Get {
        /// RFC 6901 pointer; the empty string selects the whole document.
        #[arg(allow_hyphen_values = true)]
        pointer: String,
        /// Document to read; STDIN when omitted.
        doc: Option<OsString>,
    },
    /// Print every node of DOC (or STDIN) as `<pointer>\t<json>`.
    Walk {
        /// Document to read; STDIN when omitted.
        doc: Option<OsString>,
    },
}

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err:#}");
            std::process::exit(1);
        }
    }
}

fn try_main() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rendered = match &cli.command {
        Command::Patch { patch, doc } => run_patch(&cli, patch, doc.as_ref())?,
        Command::Get { pointer, doc } => run_get(&cli, pointer, doc.as_ref())?,
        Command::Walk { doc } => run_walk(&cli, doc.as_ref())?,
    };
    write_output(cli.output.as_ref(), &rendered)?;
    Ok(0)
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "jsonp=debug",
        _ => "jsonp=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_patch(cli: &Cli, patch: &OsString, doc: Option<&OsString>) -> Result<String> {
    let options = build_options(cli)?;
    let patch_source = InputSource::File(path_from(patch)?);
    let patch_text = read_input(&patch_source)?;
    let patch = parse_patch(&patch_text, cli.yaml).context("failed to parse patch")?;

    let mut document = read_document(cli, doc)?;
    info!(target: "jsonp", operations = patch.len(), "applying patch");
    document.apply_patch_in_place(&patch, &options)?;
    render(&document, cli)
}

fn run_get(cli: &Cli, pointer: &str, doc: Option<&OsString>) -> Result<String> {
    let document = read_document(cli, doc)?;
    let Some(found) = document.get_by_pointer(pointer)? else {
        bail!("no value at {pointer:?}");
    };
    render(found, cli)
}

fn run_walk(cli: &Cli, doc: Option<&OsString>) -> Result<String> {
    let document = read_document(cli, doc)?;
    let mut lines = String::new();
    navigate::walk_pointers(&document, |pointer, node| {
        lines.push_str(pointer);
        lines.push('\t');
        lines.push_str(&node.to_string());
        lines.push('\n');
    });
    Ok(lines)
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    fn from_arg(arg: Option<&OsString>) -> Result<Self> {
        match arg {
            Some(arg) if arg != "-" => Ok(Self::File(path_from(arg)?)),
            _ => Ok(Self::Stdin),
        }
    }
}

fn path_from(input: &OsString) -> Result<PathBuf> {
    let path = PathBuf::from(input);
    if path.as_os_str().is_empty() {
        bail!("expected file path; got empty string");
    }
    Ok(path)
}

fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read STDIN")?;
            Ok(buffer)
        }
    }
}

fn read_document(cli: &Cli, doc: Option<&OsString>) -> Result<Value> {
    let source = InputSource::from_arg(doc)?;
    debug!(target: "jsonp", ?source, "reading document");
    let text = read_input(&source)?;
    let document = if cli.yaml { Value::from_yaml_str(&text) } else { Value::from_json_str(&text) };
    document.context("failed to parse document")
}

fn parse_patch(input: &str, yaml: bool) -> Result<Patch> {
    let patch = if yaml { Patch::from_yaml_str(input) } else { Patch::from_json_str(input) };
    Ok(patch?)
}

fn build_options(cli: &Cli) -> Result<PatchOptions> {
    let mut options = match &cli.opts {
        Some(raw) => parse_opts_json(raw)?,
        None => PatchOptions::default(),
    };
    if cli.strict {
        options = options.with_unknown_op_policy(UnknownOpPolicy::Reject)?;
    }
    if let Some(depth) = cli.max_depth {
        options = options.with_max_path_depth(depth)?;
    }
    Ok(options)
}

fn parse_opts_json(raw: &str) -> Result<PatchOptions> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("--opts requires a JSON object");
    }
    serde_json::from_str(trimmed).with_context(|| format!("failed to parse --opts JSON: {trimmed}"))
}

fn render(value: &Value, cli: &Cli) -> Result<String> {
    if cli.yaml {
        return serde_yaml::to_string(value).context("failed to render YAML");
    }
    let mut rendered = if cli.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to render JSON")?;
    rendered.push('\n');
    Ok(rendered)
}

fn write_output(output: Option<&PathBuf>, rendered: &str) -> Result<()> {
    if let Some(path) = output {
        fs::write(path, rendered.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("jsonp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let parsed = cli(&["get", "/a", "doc.json", "--yaml", "-vv"]);
        assert!(parsed.yaml);
        assert_eq!(parsed.verbose, 2);
        assert!(matches!(parsed.command, Command::Get { ref pointer, .. } if pointer == "/a"));
    }

    #[test]
    fn flags_layer_over_opts_json() {
        let parsed = cli(&["--opts", r#"{"maxPathDepth":4}"#, "--strict", "patch", "p.json"]);
        let options = build_options(&parsed).unwrap();
        assert_eq!(options.unknown_ops(), UnknownOpPolicy::Reject);
        assert_eq!(options.max_path_depth(), Some(4));

        let parsed = cli(&["--opts", r#"{"maxPathDepth":4}"#, "--max-depth", "9", "patch", "p.json"]);
        assert_eq!(build_options(&parsed).unwrap().max_path_depth(), Some(9));
    }

    #[test]
    fn opts_json_is_validated() {
        assert!(parse_opts_json("").is_err());
        assert!(parse_opts_json("[]").is_err());
        assert!(parse_opts_json(r#"{"maxPathDepth":0}"#).is_err());
        assert_eq!(parse_opts_json("{}").unwrap(), PatchOptions::default());
    }

    #[test]
    fn dash_means_stdin() {
        assert!(matches!(InputSource::from_arg(None).unwrap(), InputSource::Stdin));
        assert!(matches!(InputSource::from_arg(Some(&OsString::from("-"))).unwrap(), InputSource::Stdin));
        assert!(matches!(
            InputSource::from_arg(Some(&OsString::from("doc.json"))).unwrap(),
            InputSource::File(_)
        ));
    }

    #[test]
    fn render_respects_format_flags() {
        let value = Value::from_json_str(r#"{"a":[1]}"#).unwrap();
        assert_eq!(render(&value, &cli(&["walk"])).unwrap(), "{\"a\":[1]}\n");
        assert_eq!(render(&value, &cli(&["walk", "--pretty"])).unwrap(), "{\n  \"a\": [\n    1\n  ]\n}\n");
        assert_eq!(render(&value, &cli(&["walk", "--yaml"])).unwrap(), "a:\n- 1\n");
    }
}
