use std::env;
use std::fs;
use std::process;

use tracing_subscriber::EnvFilter;

use shiftree::{parse_trees, Err, Oracle};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} FILE [options]

Derives the gold transition sequence for every binarized tree in FILE
(one or more bracketed trees) and prints it.

Options:
  -h, --help            Print this message
  -s, --single-unaries  Emit one transition per unary level (defaults to
                        collapsing unary chains into compound transitions)
  -t, --states          Print the parser state before every transition",
    prog_name
  )
}

struct Args {
  filename: String,
  compound_unaries: bool,
  print_states: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "shiftree"));
    }

    let args_len = v.len();
    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap();

    if args_len < 2 {
      return Err(Self::make_error_message("not enough arguments", prog_name));
    }

    let mut filename: Option<String> = None;
    let mut compound_unaries = true; // default to compound unary chains
    let mut print_states = false;

    for o in iter {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-s" || o == "--single-unaries" {
        compound_unaries = false;
      } else if o == "-t" || o == "--states" {
        print_states = true;
      } else if filename.is_none() {
        filename = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if let Some(filename) = filename {
      Ok(Self {
        filename,
        compound_unaries,
        print_states,
      })
    } else {
      Err(Self::make_error_message("missing filename", prog_name))
    }
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let trees = parse_trees(&fs::read_to_string(&opts.filename)?)?;
  let oracle = Oracle::new(trees, opts.compound_unaries)?;

  for index in 0..oracle.len() {
    let gold = oracle.tree(index).unwrap();
    println!("{}", gold);

    let derivation = oracle.derive(index)?;
    if opts.print_states {
      for step in derivation.steps.iter() {
        println!("  [{}]", step.state);
        println!("  -> {}", step.transition);
      }
    } else {
      println!("  {}", derivation);
    }
    println!(
      "  {} transitions, rebuilt {}",
      derivation.len(),
      if derivation.tree() == Some(gold) {
        "exactly"
      } else {
        "INCORRECTLY"
      }
    );
    println!();
  }

  Ok(())
}
