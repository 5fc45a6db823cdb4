use std::fmt;
use std::rc::Rc;

/// A token paired with its part-of-speech tag.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TaggedWord {
  pub word: String,
  pub tag: String,
}

impl TaggedWord {
  pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
    Self {
      word: word.into(),
      tag: tag.into(),
    }
  }
}

impl fmt::Display for TaggedWord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.word, self.tag)
  }
}

/// Which child of a binary node continues the head projection of the
/// original n-ary tree. Recorded by the external binarizer and preserved
/// here so binarization can be inverted downstream.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HeadSide {
  Left,
  Right,
}

impl fmt::Display for HeadSide {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Left => write!(f, "left"),
      Self::Right => write!(f, "right"),
    }
  }
}

/// An internal node's label and span. `side` is set iff the node has
/// exactly two children.
#[derive(Debug, PartialEq, Clone)]
pub struct Constituent {
  pub value: String,
  pub span: (usize, usize),
  pub side: Option<HeadSide>,
}

impl fmt::Display for Constituent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

/// A leaf: one tagged token and its (single-token) span.
#[derive(Debug, PartialEq, Clone)]
pub struct Word {
  pub value: TaggedWord,
  pub span: (usize, usize),
}

impl fmt::Display for Word {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

/// An immutable constituency tree. Subtrees are shared through `Rc` and
/// never mutated once built; transitions combine existing trees into new
/// parents instead of editing them.
#[derive(Debug, PartialEq, Clone)]
pub enum Tree {
  Branch(Constituent, Vec<Rc<Tree>>),
  Leaf(Word),
}

impl Tree {
  /// A singleton leaf tree for the token at position `index`.
  pub fn leaf(token: TaggedWord, index: usize) -> Rc<Self> {
    Rc::new(Self::Leaf(Word {
      value: token,
      span: (index, index + 1),
    }))
  }

  /// A unary node over `child`. The span is inherited.
  pub fn unary(label: impl Into<String>, child: Rc<Tree>) -> Rc<Self> {
    let span = child.span();
    Rc::new(Self::Branch(
      Constituent {
        value: label.into(),
        span,
        side: None,
      },
      vec![child],
    ))
  }

  /// A binary node over `left` and `right`, carrying the head side.
  /// The children's spans must be adjacent and in order.
  pub fn binary(
    label: impl Into<String>,
    side: HeadSide,
    left: Rc<Tree>,
    right: Rc<Tree>,
  ) -> Rc<Self> {
    debug_assert_eq!(left.span().1, right.span().0);
    let span = (left.span().0, right.span().1);
    Rc::new(Self::Branch(
      Constituent {
        value: label.into(),
        span,
        side: Some(side),
      },
      vec![left, right],
    ))
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// The node's label; for a leaf this is its part-of-speech tag.
  pub fn label(&self) -> &str {
    match self {
      Self::Branch(c, _) => &c.value,
      Self::Leaf(w) => &w.value.tag,
    }
  }

  pub fn children(&self) -> &[Rc<Tree>] {
    match self {
      Self::Branch(_, children) => children,
      Self::Leaf(_) => &[],
    }
  }

  pub fn get_leaf(&self) -> Option<&Word> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent, &[Rc<Tree>])> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// The recorded head side, if this is a binary node.
  pub fn binary_side(&self) -> Option<HeadSide> {
    match self {
      Self::Branch(c, _) => c.side,
      Self::Leaf(_) => None,
    }
  }

  /// The tagged tokens at this tree's leaves, left to right.
  pub fn leaves(&self) -> Vec<&Word> {
    let mut out = Vec::new();
    self.collect_leaves(&mut out);
    out
  }

  fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Word>) {
    match self {
      Self::Leaf(w) => out.push(w),
      Self::Branch(_, children) => {
        for child in children {
          child.collect_leaves(out);
        }
      }
    }
  }

  /// Total number of nodes, leaves included.
  pub fn node_count(&self) -> usize {
    1 + self
      .children()
      .iter()
      .map(|c| c.node_count())
      .sum::<usize>()
  }
}

impl fmt::Display for Tree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "({} {})", w.value.tag, w.value.word),
      Self::Branch(c, children) => {
        write!(f, "({}", c.value)?;
        for child in children {
          write!(f, " {}", child)?;
        }
        write!(f, ")")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn np_a_test() -> Rc<Tree> {
    Tree::binary(
      "NP",
      HeadSide::Right,
      Tree::leaf(TaggedWord::new("a", "DT"), 0),
      Tree::leaf(TaggedWord::new("test", "NN"), 1),
    )
  }

  #[test]
  fn test_spans_and_labels() {
    let np = np_a_test();
    assert_eq!(np.span(), (0, 2));
    assert_eq!(np.label(), "NP");
    assert_eq!(np.children()[0].span(), (0, 1));
    assert_eq!(np.children()[0].label(), "DT");

    let s = Tree::unary("S", np.clone());
    assert_eq!(s.span(), (0, 2));
    assert_eq!(s.binary_side(), None);
    assert_eq!(np.binary_side(), Some(HeadSide::Right));
  }

  #[test]
  fn test_leaves_and_node_count() {
    let s = Tree::unary("S", np_a_test());
    let leaves = s.leaves();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].value, TaggedWord::new("a", "DT"));
    assert_eq!(leaves[1].span, (1, 2));
    assert_eq!(s.node_count(), 4);
  }

  #[test]
  fn test_display() {
    let s = Tree::unary("S", np_a_test());
    assert_eq!(format!("{}", s), "(S (NP (DT a) (NN test)))");
  }

  #[test]
  fn test_structural_sharing() {
    let np = np_a_test();
    let s = Tree::unary("S", np.clone());
    // combining never copies the subtree
    assert!(Rc::ptr_eq(&np, &s.children()[0]));
  }
}
