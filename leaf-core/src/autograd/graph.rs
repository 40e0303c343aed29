use std::collections::HashSet;

use log::trace;

use crate::tensor::TensorId;
use crate::tensor_data::TensorData;

/// Builds a topological sort of the graph reachable from `start`.
///
/// Depth-first over `grad_fn.parents` edges, recording each node in post-order: a
/// node is appended only after every node reachable through it. Iterating the
/// result backwards therefore visits every consumer before any of its inputs. Each
/// node appears exactly once, however many paths lead to it.
///
/// Uses an explicit stack so long chains cannot overflow the call stack. `start`
/// must be a valid index into `nodes`.
pub(crate) fn topological_sort(nodes: &[TensorData], start: TensorId) -> Vec<TensorId> {
    let mut visited: HashSet<TensorId> = HashSet::new();
    let mut sorted_list: Vec<TensorId> = Vec::new();
    // (node, children already pushed)
    let mut stack: Vec<(TensorId, bool)> = vec![(start, false)];

    while let Some((node_id, expanded)) = stack.pop() {
        if expanded {
            sorted_list.push(node_id);
            continue;
        }
        if !visited.insert(node_id) {
            continue;
        }
        stack.push((node_id, true));
        if let Some(ctx) = nodes[node_id.index()].grad_fn.as_ref() {
            // Reversed so parents are explored in call order.
            for &parent in ctx.parents().iter().rev() {
                if !visited.contains(&parent) {
                    stack.push((parent, false));
                }
            }
        }
    }

    trace!("topological_sort from {}: {} nodes", start, sorted_list.len());
    sorted_list
}
