use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use is_terminal::IsTerminal;
use losslessjson::{
    json_value_to_serde, parse, Document, FormatOptions, IndentCharacter, QuoteStyle, ValueNode,
};

/// A format-preserving JSON/JSON5 editor.
///
/// ljson reads a JSON or JSON5 document, optionally applies edits or style
/// overrides, and writes the result back with the original formatting,
/// comments, and quoting intact everywhere the edit didn't reach.
#[derive(Parser, Debug)]
#[command(name = "ljson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file. If not specified, reads from stdin.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output file. If not specified, writes to stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the result back to the input file.
    #[arg(long)]
    in_place: bool,

    /// Print the value at a dotted path (e.g. server.port, items.0).
    #[arg(long, value_name = "PATH")]
    get: Option<String>,

    /// Set the value at a dotted path; the value is itself JSON5
    /// (e.g. --set server.port=8080). Repeatable.
    #[arg(long, value_name = "PATH=VALUE")]
    set: Vec<String>,

    /// Delete the value at a dotted path. Repeatable.
    #[arg(long, value_name = "PATH")]
    delete: Vec<String>,

    /// Print the document as strict JSON instead of serializing the tree.
    #[arg(long)]
    to_json: bool,

    /// Reformat with indented entries at the given width.
    #[arg(short, long, value_name = "WIDTH")]
    indent: Option<usize>,

    /// Use tabs instead of spaces for indentation.
    #[arg(short = 't', long)]
    tabs: bool,

    /// Reformat onto a single line with no optional spacing.
    #[arg(long)]
    compact: bool,

    /// Emit trailing commas in multi-line collections.
    #[arg(long)]
    trailing_commas: bool,

    /// Quote style for synthesized strings.
    #[arg(long, value_enum)]
    quote: Option<QuoteArg>,

    /// Write keys unquoted wherever they form valid identifiers.
    #[arg(long)]
    unquoted_keys: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QuoteArg {
    Double,
    Single,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("ljson: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let input = match &args.file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?,
        None => {
            if io::stdin().is_terminal() {
                return Err("no input file and stdin is a terminal; pass a file or pipe input".into());
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut doc = parse(&input)?;

    for assignment in &args.set {
        let (path, value_text) = assignment
            .split_once('=')
            .ok_or_else(|| format!("--set needs PATH=VALUE, got '{}'", assignment))?;
        let value_doc = parse(value_text.trim())
            .map_err(|e| format!("bad value for --set {}: {}", path, e))?;
        set_path(&mut doc, path, value_doc.root().clone())?;
    }
    for path in &args.delete {
        delete_path(&mut doc, path)?;
    }

    if let Some(path) = &args.get {
        let node = lookup_path(&doc, path)?;
        let plain = json_value_to_serde(&node.to_json());
        println!("{}", serde_json::to_string_pretty(&plain)?);
        return Ok(());
    }

    let output = if args.to_json {
        let plain = json_value_to_serde(&doc.to_json());
        let mut text = serde_json::to_string_pretty(&plain)?;
        text.push('\n');
        text
    } else {
        match build_options(&args) {
            Some(options) => doc.to_text_with(&options),
            None => doc.to_text(),
        }
    };

    if args.in_place {
        let path = args
            .file
            .as_ref()
            .ok_or("--in-place needs an input file")?;
        fs::write(path, &output).map_err(|e| format!("cannot write '{}': {}", path.display(), e))?;
    } else if let Some(path) = &args.output {
        fs::write(path, &output).map_err(|e| format!("cannot write '{}': {}", path.display(), e))?;
    } else {
        io::stdout().write_all(output.as_bytes())?;
    }

    Ok(())
}

fn build_options(args: &Args) -> Option<FormatOptions> {
    let mut options = if args.compact {
        FormatOptions::compact()
    } else if let Some(width) = args.indent {
        FormatOptions::pretty(width)
    } else if args.tabs {
        FormatOptions::pretty(1)
    } else {
        FormatOptions::default()
    };

    if args.tabs {
        options.indentation_character = Some(IndentCharacter::Tab);
        options.array.indentation_size = Some(args.indent.unwrap_or(1));
        options.object.indentation_size = Some(args.indent.unwrap_or(1));
    }
    if args.trailing_commas {
        options.array.trailing_comma = Some(true);
        options.object.trailing_comma = Some(true);
    }
    if let Some(quote) = args.quote {
        let style = match quote {
            QuoteArg::Double => QuoteStyle::Double,
            QuoteArg::Single => QuoteStyle::Single,
        };
        options.string_quote = Some(style);
        options.property_quote = Some(style);
    }
    if args.unquoted_keys {
        options.property_unquoted = Some(true);
    }

    if options == FormatOptions::default() {
        None
    } else {
        Some(options)
    }
}

fn lookup_path<'a>(doc: &'a Document, path: &str) -> Result<&'a ValueNode, String> {
    let mut node = doc.root();
    for segment in path.split('.') {
        node = match node {
            ValueNode::Object(o) => o
                .get(segment)
                .ok_or_else(|| format!("no property '{}' in path '{}'", segment, path))?,
            ValueNode::Array(a) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| format!("'{}' is not an array index in path '{}'", segment, path))?;
                a.get(index)
                    .ok_or_else(|| format!("index {} out of bounds in path '{}'", index, path))?
            }
            _ => return Err(format!("'{}' has no children in path '{}'", segment, path)),
        };
    }
    Ok(node)
}

fn set_path(doc: &mut Document, path: &str, value: ValueNode) -> Result<(), String> {
    let (parent_path, last) = split_last(path);
    let parent = lookup_path_mut(doc, parent_path)?;
    match parent {
        ValueNode::Object(o) => {
            o.set_node(last, value);
            Ok(())
        }
        ValueNode::Array(a) => {
            let index: usize = last
                .parse()
                .map_err(|_| format!("'{}' is not an array index in path '{}'", last, path))?;
            if index == a.len() {
                a.push_node(value);
                Ok(())
            } else {
                a.set_node(index, value).map_err(|e| e.to_string())
            }
        }
        _ => Err(format!("parent of '{}' is not a collection", path)),
    }
}

fn delete_path(doc: &mut Document, path: &str) -> Result<(), String> {
    let (parent_path, last) = split_last(path);
    let parent = lookup_path_mut(doc, parent_path)?;
    match parent {
        ValueNode::Object(o) => o.delete(last).map(|_| ()).map_err(|e| e.to_string()),
        ValueNode::Array(a) => {
            let index: usize = last
                .parse()
                .map_err(|_| format!("'{}' is not an array index in path '{}'", last, path))?;
            a.delete(index).map(|_| ()).map_err(|e| e.to_string())
        }
        _ => Err(format!("parent of '{}' is not a collection", path)),
    }
}

fn split_last(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((parent, last)) => (parent, last),
        None => ("", path),
    }
}

fn lookup_path_mut<'a>(doc: &'a mut Document, path: &str) -> Result<&'a mut ValueNode, String> {
    if path.is_empty() {
        return Ok(doc.root_mut());
    }
    let mut node = doc.root_mut();
    for segment in path.split('.') {
        node = match node {
            ValueNode::Object(o) => o
                .get_mut(segment)
                .ok_or_else(|| format!("no property '{}' in path '{}'", segment, path))?,
            ValueNode::Array(a) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| format!("'{}' is not an array index in path '{}'", segment, path))?;
                a.get_mut(index)
                    .ok_or_else(|| format!("index {} out of bounds in path '{}'", index, path))?
            }
            _ => return Err(format!("'{}' has no children in path '{}'", segment, path)),
        };
    }
    Ok(node)
}
