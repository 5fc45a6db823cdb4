use std::collections::HashMap;
use std::rc::Rc;

use crate::tree::Tree;
use crate::Err;

/// A reverse-edge index over a gold tree: every descendant node, by
/// identity, mapped to its unique parent. Built once per gold tree and
/// read-only afterwards; keeping the parent links in a side table keeps
/// `Tree` itself immutable and freely shareable.
#[derive(Debug)]
pub struct ParentMap {
  map: HashMap<*const Tree, Rc<Tree>>,
}

impl ParentMap {
  pub fn new(root: &Rc<Tree>) -> Result<Self, Err> {
    let mut map = HashMap::new();
    Self::collect(root, &mut map)?;
    Ok(Self { map })
  }

  fn collect(node: &Rc<Tree>, map: &mut HashMap<*const Tree, Rc<Tree>>) -> Result<(), Err> {
    for child in node.children() {
      if map.insert(Rc::as_ptr(child), node.clone()).is_some() {
        return Err(
          format!("malformed tree: node {} is reachable through two parents", child).into(),
        );
      }
      Self::collect(child, map)?;
    }
    Ok(())
  }

  /// The parent of `node`, or None for the root (and for nodes that are
  /// not part of the indexed tree at all).
  pub fn parent(&self, node: &Rc<Tree>) -> Option<&Rc<Tree>> {
    self.map.get(&Rc::as_ptr(node))
  }

  /// Number of child→parent edges; equals the tree's node count minus one.
  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}
