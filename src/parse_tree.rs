use regex::Regex;
/// Simple recursive-descent parsing of bracketed (Penn-style) trees
use std::rc::Rc;
use std::str::FromStr;

use crate::tree::{Constituent, HeadSide, TaggedWord, Tree, Word};
use crate::Err;

/// Prefix the external binarizer puts on the temporary labels it
/// introduces; on a binary node, a `@`-labeled child marks the side that
/// continues the head projection.
pub const BINARIZED_PREFIX: char = '@';

type ParseResult<'a, T> = Result<(T, &'a str), Err>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

/// Try to consume a regex at the start of the input, returning None if it
/// doesn't match there
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> (Option<&'a str>, &'a str) {
  if let Some(caps) = re.captures(s) {
    let m = caps.get(0).unwrap();
    if m.start() > 0 {
      return (None, s);
    }
    let (_, rest) = s.split_at(m.end());
    (Some(m.as_str()), rest)
  } else {
    (None, s)
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> (Option<char>, &str) {
  let mut iter = s.char_indices().peekable();
  if let Some((_, c1)) = iter.next() {
    if c == c1 {
      let rest = if let Some((idx, _)) = iter.peek() {
        s.split_at(*idx).1
      } else {
        ""
      };
      return (Some(c), rest);
    }
  }
  (None, s)
}

/// Try to consume a char, failing if it doesn't match
fn needed_char(c: char, s: &str) -> ParseResult<char> {
  if let (Some(c), rest) = optional_char(c, s) {
    Ok((c, rest))
  } else {
    Err(format!("expected {} at {:?}", c, s).into())
  }
}

fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE, r"\s+");
  optional_re(&WHITESPACE, s).1
}

/// A label or a word: anything up to whitespace or a paren
fn parse_token(s: &str) -> ParseResult<&str> {
  regex_static!(TOKEN, r"[^\s()]+");
  if let (Some(t), rest) = optional_re(&TOKEN, s) {
    Ok((t, rest))
  } else {
    Err(format!("expected label or word at {:?}", s).into())
  }
}

fn head_side(children: &[Rc<Tree>]) -> Option<HeadSide> {
  match children {
    [left, right] => {
      if left.label().starts_with(BINARIZED_PREFIX) {
        Some(HeadSide::Left)
      } else if right.label().starts_with(BINARIZED_PREFIX) {
        Some(HeadSide::Right)
      } else {
        Some(HeadSide::Left)
      }
    }
    _ => None,
  }
}

/// Parses one `(label ...)` node. `next_leaf` is the position the next
/// leaf will occupy; spans are assigned from it.
fn parse_node<'a>(s: &'a str, next_leaf: &mut usize) -> ParseResult<'a, Tree> {
  let (_, s) = needed_char('(', s)?;
  let s = skip_whitespace(s);
  let (label, s) = parse_token(s)?;
  let mut rem = skip_whitespace(s);

  // a leaf is written (TAG word)
  if !rem.starts_with('(') {
    let (word, s) = parse_token(rem).map_err(|e| -> Err { format!("leaf word: {}", e).into() })?;
    let (_, s) = needed_char(')', skip_whitespace(s))?;
    let leaf = Tree::Leaf(Word {
      value: TaggedWord::new(word, label),
      span: (*next_leaf, *next_leaf + 1),
    });
    *next_leaf += 1;
    return Ok((leaf, s));
  }

  let start = *next_leaf;
  let mut children = Vec::new();
  loop {
    if let (Some(_), s) = optional_char(')', rem) {
      rem = s;
      break;
    }
    let (child, s) = parse_node(rem, next_leaf)?;
    children.push(Rc::new(child));
    rem = skip_whitespace(s);
  }

  let node = Tree::Branch(
    Constituent {
      value: label.to_string(),
      span: (start, *next_leaf),
      side: head_side(&children),
    },
    children,
  );
  Ok((node, rem))
}

/// Parses a single bracketed tree. The whole input must be consumed.
impl FromStr for Tree {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut next_leaf = 0;
    let (tree, rest) = parse_node(skip_whitespace(s), &mut next_leaf)?;
    if !skip_whitespace(rest).is_empty() {
      return Err(format!("trailing input after tree: {:?}", rest).into());
    }
    Ok(tree)
  }
}

/// Parses every tree in a treebank-style string, one or more bracketed
/// trees separated by whitespace.
pub fn parse_trees(s: &str) -> Result<Vec<Rc<Tree>>, Err> {
  let mut trees = Vec::new();
  let mut rem = skip_whitespace(s);
  while !rem.is_empty() {
    let mut next_leaf = 0;
    let (tree, rest) = parse_node(rem, &mut next_leaf)?;
    trees.push(Rc::new(tree));
    rem = skip_whitespace(rest);
  }
  if trees.is_empty() {
    return Err("empty treebank".into());
  }
  Ok(trees)
}
