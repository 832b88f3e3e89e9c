//! Generic pre/post tree traversal shared by the analysis passes.
//!
//! [`walk`] visits a sibling chain. For every node it calls
//! [`TreeVisitor::enter`], walks all of the node's children, calls
//! [`TreeVisitor::exit`], and then moves on to the next sibling. Children
//! are read after `enter` returns, so `enter` may annotate the node. The
//! first error returned by either callback stops the walk.

use crate::node::SyntaxTree;
use crate::types::NodeId;

/// A pass over the tree with a preorder and a postorder action.
pub trait TreeVisitor {
    type Error;

    fn enter(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), Self::Error>;

    fn exit(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), Self::Error>;
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Walk the sibling chain starting at `first`, applying `visitor`.
///
/// Pending work lives on a heap stack rather than the call stack, so the
/// depth of the tree is not limited by the thread's stack size.
pub fn walk<V: TreeVisitor + ?Sized>(
    tree: &mut SyntaxTree,
    first: Option<NodeId>,
    visitor: &mut V,
) -> Result<(), V::Error> {
    let mut pending: Vec<Step> = first.map(Step::Enter).into_iter().collect();
    while let Some(step) = pending.pop() {
        match step {
            Step::Enter(id) => {
                log::trace!("enter {:?} at line {}", id, tree.node(id).line);
                visitor.enter(tree, id)?;
                pending.push(Step::Exit(id));
                // Reversed so the first child is walked first.
                pending.extend(tree.node(id).children().into_iter().rev().flatten().map(Step::Enter));
            }
            Step::Exit(id) => {
                visitor.exit(tree, id)?;
                if let Some(next) = tree.node(id).sibling {
                    pending.push(Step::Enter(next));
                }
            }
        }
    }
    Ok(())
}
