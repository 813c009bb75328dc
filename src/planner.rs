//! Dependency planning: turns a root recipe name into an ordered execution
//! plan covering every transitively required recipe exactly once.
//!
//! Uses an iterative DFS with explicit state tracking, emitting recipes in
//! post-order so every dependency strictly precedes every dependent. The
//! root is always last. Missing names, direct or transitive, abort planning
//! before any recipe executes; so do dependency cycles.

use std::collections::HashMap;

use crate::error::Error;
use crate::registry::RecipeRegistry;

/// Node state for the DFS traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    /// Currently on the stack with unfinished dependencies.
    Processing,
    /// Emitted into the plan.
    Processed,
}

/// Build the execution plan for `root`.
///
/// Every name reached is validated against the registry as it is
/// discovered; duplicate reachability (diamonds, repeated dependency
/// entries) collapses to a single plan slot.
pub fn plan<T>(root: &str, recipes: &RecipeRegistry<T>) -> Result<Vec<String>, Error> {
    let mut state: HashMap<String, NodeState> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    // Stack holds (recipe name, index of next dependency to visit).
    let mut stack: Vec<(String, usize)> = vec![(root.to_string(), 0)];

    while let Some((node, dep_idx)) = stack.pop() {
        let deps = recipes.lookup(&node)?.dependencies();

        match state.get(&node).copied() {
            Some(NodeState::Processed) => continue,
            Some(NodeState::Processing) => {
                if dep_idx >= deps.len() {
                    state.insert(node.clone(), NodeState::Processed);
                    order.push(node);
                    continue;
                }
            }
            None => {
                state.insert(node.clone(), NodeState::Processing);
            }
        }

        let mut descended = false;
        for (i, dep) in deps.iter().enumerate().skip(dep_idx) {
            match state.get(dep) {
                None => {
                    stack.push((node.clone(), i + 1));
                    stack.push((dep.clone(), 0));
                    descended = true;
                    break;
                }
                Some(NodeState::Processing) => {
                    return Err(Error::DependencyCycle {
                        from: node,
                        to: dep.clone(),
                    });
                }
                Some(NodeState::Processed) => {}
            }
        }

        if !descended {
            // All dependencies settled; push back to finalize.
            stack.push((node, deps.len()));
        }
    }

    Ok(order)
}
