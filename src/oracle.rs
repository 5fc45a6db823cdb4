use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::parents::ParentMap;
use crate::state::State;
use crate::transition::{Transition, UNARY_JOIN};
use crate::tree::Tree;
use crate::Err;

/// Per-sentence bookkeeping: the gold tree, its parent side-table and a
/// span index over every node. Built once, queried for every oracle call
/// on that sentence.
#[derive(Debug)]
struct GoldTree {
  root: Rc<Tree>,
  parents: ParentMap,
  by_span: HashMap<(usize, usize), Vec<Rc<Tree>>>,
}

impl GoldTree {
  fn new(root: Rc<Tree>) -> Result<Self, Err> {
    let parents = ParentMap::new(&root)?;
    let mut by_span = HashMap::new();
    Self::index(&root, &mut by_span);
    Ok(Self {
      root,
      parents,
      by_span,
    })
  }

  fn index(node: &Rc<Tree>, by_span: &mut HashMap<(usize, usize), Vec<Rc<Tree>>>) {
    by_span.entry(node.span()).or_default().push(node.clone());
    for child in node.children() {
      Self::index(child, by_span);
    }
  }

  /// The gold node structurally identical to `tree`, if any. Nodes that
  /// share a span sit on one unary chain and differ structurally, so the
  /// match is unique.
  fn find(&self, tree: &Rc<Tree>) -> Option<&Rc<Tree>> {
    self
      .by_span
      .get(&tree.span())?
      .iter()
      .find(|node| ***node == **tree)
  }
}

/// Computes, for a collection of gold binarized trees, the canonical
/// transition that continues rebuilding a given sentence's tree from a
/// given parser state. Deterministic and read-only: suitable as ground
/// truth for training an action scorer.
#[derive(Debug)]
pub struct Oracle {
  trees: Vec<GoldTree>,
  compound_unaries: bool,
}

impl Oracle {
  /// Indexes every gold tree up front (one parent map and span table
  /// each). Fails if a tree is malformed (a node with two parents).
  pub fn new(trees: Vec<Rc<Tree>>, compound_unaries: bool) -> Result<Self, Err> {
    let trees = trees
      .into_iter()
      .map(GoldTree::new)
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self {
      trees,
      compound_unaries,
    })
  }

  pub fn len(&self) -> usize {
    self.trees.len()
  }

  pub fn is_empty(&self) -> bool {
    self.trees.is_empty()
  }

  pub fn tree(&self, index: usize) -> Option<&Rc<Tree>> {
    self.trees.get(index).map(|gold| &gold.root)
  }

  pub fn compound_unaries(&self) -> bool {
    self.compound_unaries
  }

  /// The gold transition for sentence `index` at `state`, or `None` when
  /// the gold tree cannot be reached from this state at all: the
  /// derivation has diverged, the index is unknown, or the tree is not
  /// actually binary. `None` is fatal for the sentence's derivation and
  /// must not be skipped over.
  pub fn gold_transition(&self, index: usize, state: &State) -> Option<Transition> {
    let gold = self.trees.get(index)?;
    if state.is_finished() {
      return None;
    }

    let top = match state.peek_stack() {
      Some(top) => top,
      None if state.is_queue_empty() => return None,
      None => return Some(Transition::Shift),
    };

    // a top that matches no gold node is still under construction and
    // needs more input
    let node = match gold.find(top) {
      Some(node) => node,
      None if state.is_queue_empty() => return None,
      None => return Some(Transition::Shift),
    };

    let parent = match gold.parents.parent(node) {
      Some(parent) => parent,
      None => {
        // the gold root has been rebuilt
        if state.stack_size() == 1 && state.is_queue_empty() {
          return Some(Transition::Finish);
        }
        return None;
      }
    };

    match parent.children() {
      [_only] => Some(Transition::Unary(self.unary_label(gold, parent))),
      [_left, _right] => {
        let span = parent.span();
        let tiles = state.stack(1).is_some_and(|second| {
          second.span().0 == span.0
            && second.span().1 == top.span().0
            && top.span().1 == span.1
        });
        if tiles {
          Some(Transition::Binary(
            parent.label().to_string(),
            parent.binary_side()?,
          ))
        } else if !state.is_queue_empty() {
          // the right sibling still needs material
          Some(Transition::Shift)
        } else {
          None
        }
      }
      // more than two children: the gold tree was never binarized
      _ => None,
    }
  }

  /// The label for the unary reduce that puts `parent` (and, under the
  /// compound policy, the whole unary chain above it) over the current
  /// top, outermost label first.
  fn unary_label(&self, gold: &GoldTree, parent: &Rc<Tree>) -> String {
    if !self.compound_unaries {
      return parent.label().to_string();
    }
    let mut labels = vec![parent.label()];
    let mut node = parent;
    while let Some(above) = gold.parents.parent(node) {
      if above.children().len() != 1 {
        break;
      }
      labels.push(above.label());
      node = above;
    }
    labels.reverse();
    labels.join(&UNARY_JOIN.to_string())
  }

  /// Replays the oracle against sentence `index` from its initial state
  /// until Finish, returning every (state, transition) pair in order —
  /// the training signal for an action scorer. Errors if the oracle
  /// reports divergence or a transition turns out to be illegal.
  pub fn derive(&self, index: usize) -> Result<Derivation, Err> {
    let gold = self
      .trees
      .get(index)
      .ok_or_else(|| format!("no gold tree at index {}", index))?;

    let mut state = State::from_gold_tree(&gold.root);
    let mut steps = Vec::new();
    while !state.is_finished() {
      let transition = self.gold_transition(index, &state).ok_or_else(|| -> Err {
        format!(
          "gold tree {} cannot be rebuilt by any transition from [{}]",
          index, state
        )
        .into()
      })?;
      debug!(step = steps.len(), %transition, "gold transition");
      let next = transition.apply(&state)?;
      steps.push(DerivationStep { state, transition });
      state = next;
    }

    Ok(Derivation {
      steps,
      final_state: state,
    })
  }
}

/// One oracle step: the transition chosen and the state it was applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationStep {
  pub state: State,
  pub transition: Transition,
}

/// A full oracle-derived action trace for one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
  pub steps: Vec<DerivationStep>,
  pub final_state: State,
}

impl Derivation {
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
    self.steps.iter().map(|step| &step.transition)
  }

  /// The single tree left on the stack after Finish.
  pub fn tree(&self) -> Option<&Rc<Tree>> {
    self.final_state.peek_stack()
  }
}

impl fmt::Display for Derivation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for transition in self.transitions() {
      if !first {
        write!(f, " ")?;
      }
      write!(f, "{}", transition)?;
      first = false;
    }
    Ok(())
  }
}
