//! lcfg command-line tool for reading values from lcfg configuration files.
//!
//! Usage: lcfg [OPTIONS] CONFIGFILE
//!
//! The default is to print every `key value` pair found in CONFIGFILE, with
//! non-printable bytes replaced by a dot.
//!
//! Exit status is 0 if OK, 1 if the requested KEY was not found, 2 if some
//! serious error occurred (parse error, file not found, etc.).

use std::io::{self, Read, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, ValueEnum};
use liblcfg::{Document, Lookup, NodeKind, Visit};

mod render;

/// Read all or specific key/value pairs from an lcfg configuration file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file to read
    #[arg(value_name = "CONFIGFILE")]
    config_file: PathBuf,

    /// Only read the (possibly binary) value of KEY and print it unfiltered
    #[arg(short, long)]
    key: Option<String>,

    /// Print a newline after the KEY value
    #[arg(short, long)]
    newline: bool,

    /// Build the typed tree and dump it (or the node at KEY)
    #[arg(short, long)]
    tree: bool,

    /// Node type expected at KEY in tree mode
    #[arg(short = 'T', long = "type", value_enum, default_value_t = TypeArg::String)]
    node_type: TypeArg,

    /// Print values base64-encoded
    #[arg(short, long)]
    base64: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TypeArg {
    String,
    Map,
    List,
}

impl From<TypeArg> for NodeKind {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::String => NodeKind::String,
            TypeArg::Map => NodeKind::Map,
            TypeArg::List => NodeKind::List,
        }
    }
}

const EXIT_OK: u8 = 0;
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&args, &mut out).and_then(|code| out.flush().map(|()| code)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("lcfg: write error: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Open the configuration file and run the requested mode on it.
fn run(args: &Args, out: &mut impl Write) -> io::Result<u8> {
    match Document::open(&args.config_file) {
        Ok(doc) => execute(doc, args, out),
        Err(e) => {
            eprintln!("lcfg: liblcfg error: {}", e);
            Ok(EXIT_FAILURE)
        }
    }
}

fn execute<R: Read>(mut doc: Document<R>, args: &Args, out: &mut impl Write) -> io::Result<u8> {
    if let Err(e) = doc.parse() {
        eprintln!("lcfg: liblcfg error: {}", e);
        return Ok(EXIT_FAILURE);
    }
    log::debug!(
        "{} bindings in {}",
        doc.bindings().len(),
        args.config_file.display()
    );

    if args.tree {
        run_tree(&doc, args, out)
    } else {
        run_flat(&doc, args, out)
    }
}

/// Print all bindings, or the value of `--key`.
fn run_flat<R>(doc: &Document<R>, args: &Args, out: &mut impl Write) -> io::Result<u8> {
    let Some(key) = &args.key else {
        let mut failure = None;
        let visit = doc.visit(|path, value| {
            let line = if args.base64 {
                BASE64.encode(value)
            } else {
                render::printable(value)
            };
            match writeln!(out, "{} {}", path, line) {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    failure = Some(e);
                    ControlFlow::Break(())
                }
            }
        });
        return match visit {
            Visit::Completed => Ok(EXIT_OK),
            Visit::Aborted => Err(failure
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "listing aborted"))),
        };
    };

    let Some(value) = doc.get(key) else {
        eprintln!(
            "lcfg: key {} not found in {}",
            key,
            args.config_file.display()
        );
        return Ok(EXIT_NOT_FOUND);
    };
    if args.base64 {
        out.write_all(BASE64.encode(value).as_bytes())?;
    } else {
        out.write_all(value)?;
    }
    if args.newline {
        out.write_all(b"\n")?;
    }
    Ok(EXIT_OK)
}

/// Dump the tree, or report the typed lookup of `--key` and dump that node.
fn run_tree<R>(doc: &Document<R>, args: &Args, out: &mut impl Write) -> io::Result<u8> {
    let root = doc.build_tree();
    let Some(key) = &args.key else {
        write!(out, "{}", root)?;
        return Ok(EXIT_OK);
    };

    let lookup = root.get(key, args.node_type.into());
    writeln!(out, "PATH {} {}", render::lookup_status(&lookup), key)?;
    match lookup {
        Lookup::Found(node) => {
            write!(out, "{}", node)?;
            Ok(EXIT_OK)
        }
        Lookup::WrongKind(_) | Lookup::NotFound => Ok(EXIT_NOT_FOUND),
    }
}
