use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::tree::{TaggedWord, Tree};

/// One parser configuration: an output stack of partially built trees and
/// an input queue of not-yet-shifted leaves.
///
/// A `State` is a value, never mutated in place. The only way to obtain a
/// successor configuration is [`Transition::apply`], which builds a fresh
/// `State` sharing the unchanged subtrees through `Rc`, so the full state
/// history of a derivation stays valid and cheap to keep.
///
/// [`Transition::apply`]: crate::transition::Transition::apply
#[derive(Debug, Clone, PartialEq)]
pub struct State {
  pub(crate) stack: Vec<Rc<Tree>>,
  pub(crate) queue: VecDeque<Rc<Tree>>,
  pub(crate) sentence_length: usize,
  pub(crate) done: bool,
}

impl State {
  /// The initial configuration: empty stack, every token queued as a leaf.
  pub fn from_tagged_sentence(sentence: &[TaggedWord]) -> Self {
    let queue = sentence
      .iter()
      .enumerate()
      .map(|(idx, token)| Tree::leaf(token.clone(), idx))
      .collect::<VecDeque<_>>();
    Self {
      stack: Vec::new(),
      sentence_length: queue.len(),
      queue,
      done: false,
    }
  }

  /// The initial configuration for a gold tree's own tagged yield.
  pub fn from_gold_tree(tree: &Rc<Tree>) -> Self {
    let sentence = tree
      .leaves()
      .into_iter()
      .map(|w| w.value.clone())
      .collect::<Vec<_>>();
    Self::from_tagged_sentence(&sentence)
  }

  /// True once a Finish transition has been applied.
  pub fn is_finished(&self) -> bool {
    self.done
  }

  pub fn stack_size(&self) -> usize {
    self.stack.len()
  }

  pub fn queue_size(&self) -> usize {
    self.queue.len()
  }

  pub fn is_queue_empty(&self) -> bool {
    self.queue.is_empty()
  }

  pub fn sentence_length(&self) -> usize {
    self.sentence_length
  }

  /// The most recently built tree, if any.
  pub fn peek_stack(&self) -> Option<&Rc<Tree>> {
    self.stack.last()
  }

  /// The stack element `position` entries below the top (0 = top).
  pub fn stack(&self, position: usize) -> Option<&Rc<Tree>> {
    let size = self.stack.len();
    if position < size {
      self.stack.get(size - 1 - position)
    } else {
      None
    }
  }

  /// The next leaf a Shift would consume.
  pub fn peek_queue(&self) -> Option<&Rc<Tree>> {
    self.queue.front()
  }
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "stack:")?;
    for tree in self.stack.iter() {
      write!(f, " {}", tree)?;
    }
    write!(f, " | queue:")?;
    for leaf in self.queue.iter() {
      write!(f, " {}", leaf)?;
    }
    if self.done {
      write!(f, " | finished")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sentence() -> Vec<TaggedWord> {
    vec![
      TaggedWord::new("This", "DT"),
      TaggedWord::new("is", "VBZ"),
      TaggedWord::new("a", "DT"),
      TaggedWord::new("short", "JJ"),
      TaggedWord::new("test", "NN"),
      TaggedWord::new(".", "."),
    ]
  }

  #[test]
  fn test_initial_state() {
    let state = State::from_tagged_sentence(&sentence());
    assert!(!state.is_finished());
    assert_eq!(state.stack_size(), 0);
    assert_eq!(state.queue_size(), 6);
    assert_eq!(state.sentence_length(), 6);
    assert!(state.peek_stack().is_none());
    assert!(state.stack(0).is_none());

    let first = state.peek_queue().unwrap();
    assert_eq!(first.span(), (0, 1));
    assert_eq!(first.label(), "DT");
  }

  #[test]
  fn test_from_gold_tree_yield() {
    let tree: Tree = "(S (NP (PRP I)) (VP (VBD slept)))".parse().unwrap();
    let state = State::from_gold_tree(&Rc::new(tree));
    assert_eq!(state.sentence_length(), 2);
    assert_eq!(state.queue_size(), 2);
    let leaf = state.peek_queue().unwrap().get_leaf().unwrap();
    assert_eq!(leaf.value, TaggedWord::new("I", "PRP"));
  }
}
