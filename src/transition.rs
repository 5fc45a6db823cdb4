use std::error;
use std::fmt;

use crate::state::State;
use crate::tree::{HeadSide, Tree};

/// Separator for compound unary labels, outermost label first: `S+VP`
/// means an `S` node over a `VP` node over the affected tree.
pub const UNARY_JOIN: char = '+';

/// The closed set of parser actions. Values are stateless beyond their own
/// parameters; the same transition may be applied to many states.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
  /// Move the next queued token onto the stack as a singleton leaf tree.
  Shift,
  /// Wrap the top stack tree under one new parent per label segment
  /// (see [`UNARY_JOIN`]), innermost last in the label.
  Unary(String),
  /// Combine the top two stack trees under a new parent, recording which
  /// child continues the head projection.
  Binary(String, HeadSide),
  /// Mark the state finished. Legal only with a single stack tree and an
  /// empty queue.
  Finish,
}

/// A precondition violation. Applying an illegal transition is a driver
/// bug, not a data error; it aborts the derivation instead of silently
/// producing a malformed state.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionError {
  /// Any transition applied to an already-finished state.
  Finished,
  /// Shift with an empty queue.
  EmptyQueue,
  /// Unary with an empty stack.
  EmptyStack,
  /// Unary whose label equals the label it would enclose; forbidding this
  /// is what bounds every derivation.
  UnaryCycle(String),
  /// Binary with fewer than two stack elements.
  StackTooSmall,
  /// Finish before the stack holds exactly one tree over an empty queue.
  NotFinishable,
}

impl fmt::Display for TransitionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Finished => write!(f, "transition applied to a finished state"),
      Self::EmptyQueue => write!(f, "shift with an empty queue"),
      Self::EmptyStack => write!(f, "unary with an empty stack"),
      Self::UnaryCycle(label) => {
        write!(f, "unary {} would enclose a node with the same label", label)
      }
      Self::StackTooSmall => write!(f, "binary with fewer than two stack elements"),
      Self::NotFinishable => write!(f, "finish before the parse is complete"),
    }
  }
}

impl error::Error for TransitionError {}

impl Transition {
  /// Whether `apply` would succeed on `state`.
  pub fn is_legal(&self, state: &State) -> bool {
    if state.is_finished() {
      return false;
    }
    match self {
      Self::Shift => !state.is_queue_empty(),
      Self::Unary(label) => match state.peek_stack() {
        Some(top) => {
          let mut below = top.label();
          for segment in label.rsplit(UNARY_JOIN) {
            if segment == below {
              return false;
            }
            below = segment;
          }
          true
        }
        None => false,
      },
      Self::Binary(_, _) => state.stack_size() >= 2,
      Self::Finish => state.stack_size() == 1 && state.is_queue_empty(),
    }
  }

  /// Produces the successor state, or the precondition that failed.
  pub fn apply(&self, state: &State) -> Result<State, TransitionError> {
    if state.is_finished() {
      return Err(TransitionError::Finished);
    }
    match self {
      Self::Shift => {
        let mut next = state.clone();
        let leaf = next.queue.pop_front().ok_or(TransitionError::EmptyQueue)?;
        next.stack.push(leaf);
        Ok(next)
      }
      Self::Unary(label) => {
        let mut next = state.clone();
        let mut tree = next.stack.pop().ok_or(TransitionError::EmptyStack)?;
        // a compound label replays its chain innermost-first
        for segment in label.rsplit(UNARY_JOIN) {
          if segment == tree.label() {
            return Err(TransitionError::UnaryCycle(segment.to_string()));
          }
          tree = Tree::unary(segment, tree);
        }
        next.stack.push(tree);
        Ok(next)
      }
      Self::Binary(label, side) => {
        if state.stack_size() < 2 {
          return Err(TransitionError::StackTooSmall);
        }
        let mut next = state.clone();
        let right = next.stack.pop().ok_or(TransitionError::StackTooSmall)?;
        let left = next.stack.pop().ok_or(TransitionError::StackTooSmall)?;
        next.stack.push(Tree::binary(label.clone(), *side, left, right));
        Ok(next)
      }
      Self::Finish => {
        if state.stack_size() != 1 || !state.is_queue_empty() {
          return Err(TransitionError::NotFinishable);
        }
        let mut next = state.clone();
        next.done = true;
        Ok(next)
      }
    }
  }
}

impl fmt::Display for Transition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Shift => write!(f, "Shift"),
      Self::Unary(label) => write!(f, "Unary({})", label),
      Self::Binary(label, side) => write!(f, "Binary({}, {})", label, side),
      Self::Finish => write!(f, "Finish"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::TaggedWord;

  fn short_test_state() -> State {
    let words = ["This", "is", "a", "short", "test", "."];
    let tags = ["DT", "VBZ", "DT", "JJ", "NN", "."];
    let sentence = words
      .iter()
      .zip(tags.iter())
      .map(|(w, t)| TaggedWord::new(*w, *t))
      .collect::<Vec<_>>();
    State::from_tagged_sentence(&sentence)
  }

  #[test]
  fn test_shift() {
    let state = short_test_state();
    let next = Transition::Shift.apply(&state).unwrap();
    assert_eq!(next.stack_size(), 1);
    assert_eq!(next.queue_size(), 5);
    let top = next.peek_stack().unwrap();
    assert!(top.is_leaf());
    assert_eq!(top.span(), (0, 1));
    // the input state is untouched
    assert_eq!(state.stack_size(), 0);
    assert_eq!(state.queue_size(), 6);
  }

  #[test]
  fn test_binary_side() {
    let state = short_test_state();
    let shift = Transition::Shift;
    let state = shift.apply(&shift.apply(&state).unwrap()).unwrap();
    assert_eq!(state.stack_size(), 2);
    assert!(state.stack(0).unwrap().is_leaf());
    assert!(state.stack(1).unwrap().is_leaf());

    let next = Transition::Binary("NP".to_string(), HeadSide::Right)
      .apply(&state)
      .unwrap();
    assert_eq!(
      next.peek_stack().unwrap().binary_side(),
      Some(HeadSide::Right)
    );

    // the two-element state is still usable: build the other side from it
    let next = Transition::Binary("NP".to_string(), HeadSide::Left)
      .apply(&state)
      .unwrap();
    let top = next.peek_stack().unwrap();
    assert_eq!(top.binary_side(), Some(HeadSide::Left));
    assert_eq!(top.span(), (0, 2));
    assert_eq!(top.label(), "NP");
    assert_eq!(next.stack_size(), 1);
  }

  #[test]
  fn test_unary() {
    let state = Transition::Shift.apply(&short_test_state()).unwrap();
    let next = Transition::Unary("NP".to_string()).apply(&state).unwrap();
    let top = next.peek_stack().unwrap();
    assert_eq!(top.label(), "NP");
    assert_eq!(top.span(), (0, 1));
    assert_eq!(top.children().len(), 1);
    assert!(top.children()[0].is_leaf());
  }

  #[test]
  fn test_compound_unary_nesting() {
    let state = Transition::Shift.apply(&short_test_state()).unwrap();
    let compound = Transition::Unary("S+VP+NP".to_string())
      .apply(&state)
      .unwrap();

    let mut singles = state;
    for label in ["NP", "VP", "S"] {
      singles = Transition::Unary(label.to_string()).apply(&singles).unwrap();
    }
    assert_eq!(compound.peek_stack(), singles.peek_stack());
    assert_eq!(compound.peek_stack().unwrap().label(), "S");
  }

  #[test]
  fn test_unary_cycle_guard() {
    let state = Transition::Shift.apply(&short_test_state()).unwrap();
    let np = Transition::Unary("NP".to_string()).apply(&state).unwrap();

    let again = Transition::Unary("NP".to_string());
    assert!(!again.is_legal(&np));
    assert_eq!(
      again.apply(&np),
      Err(TransitionError::UnaryCycle("NP".to_string()))
    );

    // the guard also applies inside a compound chain
    let compound = Transition::Unary("NP+VP".to_string());
    assert!(compound.is_legal(&np));
    let doubled = Transition::Unary("VP+VP".to_string());
    assert!(!doubled.is_legal(&np));
    assert!(doubled.apply(&np).is_err());
  }

  #[test]
  fn test_illegal_transitions_rejected() {
    let initial = short_test_state();
    assert_eq!(
      Transition::Unary("NP".to_string()).apply(&initial),
      Err(TransitionError::EmptyStack)
    );
    assert_eq!(
      Transition::Binary("NP".to_string(), HeadSide::Left).apply(&initial),
      Err(TransitionError::StackTooSmall)
    );
    assert_eq!(
      Transition::Finish.apply(&initial),
      Err(TransitionError::NotFinishable)
    );

    let one = Transition::Shift.apply(&initial).unwrap();
    assert_eq!(
      Transition::Binary("NP".to_string(), HeadSide::Left).apply(&one),
      Err(TransitionError::StackTooSmall)
    );
    // queue still holds tokens, so this is not finishable either
    assert_eq!(
      Transition::Finish.apply(&one),
      Err(TransitionError::NotFinishable)
    );

    let mut state = initial;
    for _ in 0..6 {
      state = Transition::Shift.apply(&state).unwrap();
    }
    assert_eq!(
      Transition::Shift.apply(&state),
      Err(TransitionError::EmptyQueue)
    );
  }

  #[test]
  fn test_finish() {
    let sentence = vec![TaggedWord::new("word", "NN")];
    let state = State::from_tagged_sentence(&sentence);
    let state = Transition::Shift.apply(&state).unwrap();
    let finish = Transition::Finish;
    assert!(finish.is_legal(&state));
    let done = finish.apply(&state).unwrap();
    assert!(done.is_finished());
    // nothing further is legal
    assert!(!Transition::Shift.is_legal(&done));
    assert_eq!(finish.apply(&done), Err(TransitionError::Finished));
  }
}
