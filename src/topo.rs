//! C5: generic dependency sorter (spec §4.5).
//!
//! Generic over any entity with `outputs`/`inputs` projections. Built on
//! `petgraph::algo::toposort` rather than `petgraph::visit::Topo`: the
//! latter silently skips nodes trapped in a cycle, which would hide the
//! *cyclic-dependency* fatal condition spec §7/§8 (property 6) requires
//! to surface explicitly.

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

use crate::error::{EmitError, Result};

/// Topologically sort `entities` so that if `a` depends on `b` (i.e. `b`'s
/// name appears in `a`'s `inputs`), `b` precedes `a` in the result.
///
/// `outputs`/`inputs` mirror spec §4.5's projections: `outputs(e)` names
/// what `e` produces, `inputs(e)` names what it consumes. Inputs that
/// resolve to no known producer are leaf files and are ignored, matching
/// the spec's Kahn-variant description.
pub fn sort<E, O, I>(entities: &[E], outputs: O, inputs: I) -> Result<Vec<usize>>
where
    O: Fn(&E) -> Vec<String>,
    I: Fn(&E) -> Vec<String>,
{
    let mut output_map: HashMap<String, usize> = HashMap::new();
    for (idx, e) in entities.iter().enumerate() {
        for name in outputs(e) {
            output_map.insert(name, idx);
        }
    }

    let mut graph = DiGraph::<usize, ()>::new();
    let nodes: Vec<_> = (0..entities.len()).map(|i| graph.add_node(i)).collect();

    for (idx, e) in entities.iter().enumerate() {
        for input in inputs(e) {
            if let Some(&producer_idx) = output_map.get(&input) {
                if producer_idx != idx {
                    // producer must come before consumer: edge producer -> consumer
                    graph.add_edge(nodes[producer_idx], nodes[idx], ());
                }
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|n| graph[n]).collect()),
        Err(cycle) => {
            // Walk strongly-connected components to report every entity
            // actually trapped in a cycle, not just the one node petgraph
            // happened to point at.
            let sccs = petgraph::algo::kosaraju_scc(&graph);
            let members: Vec<String> = sccs
                .into_iter()
                .find(|scc| scc.contains(&cycle.node_id()))
                .map(|scc| {
                    scc.into_iter()
                        .map(|n| format!("{}", graph[n]))
                        .collect()
                })
                .unwrap_or_else(|| vec![format!("{}", graph[cycle.node_id()])]);
            Err(EmitError::CyclicDependency { members })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Entity {
        name: String,
        deps: Vec<String>,
    }

    fn e(name: &str, deps: &[&str]) -> Entity {
        Entity {
            name: name.to_string(),
            deps: deps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn orders_producer_before_consumer() {
        let entities = vec![e("app", &["lib"]), e("lib", &[])];
        let order = sort(&entities, |ent| vec![ent.name.clone()], |ent| ent.deps.clone()).unwrap();
        let names: Vec<&str> = order.iter().map(|&i| entities[i].name.as_str()).collect();
        assert_eq!(names, vec!["lib", "app"]);
    }

    #[test]
    fn ignores_inputs_with_no_producer() {
        let entities = vec![e("app", &["some/leaf/file.h"])];
        let order = sort(&entities, |ent| vec![ent.name.clone()], |ent| ent.deps.clone()).unwrap();
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn detects_cycle() {
        let entities = vec![e("A", &["B"]), e("B", &["A"])];
        let result = sort(&entities, |ent| vec![ent.name.clone()], |ent| ent.deps.clone());
        match result {
            Err(EmitError::CyclicDependency { members }) => {
                assert_eq!(members.len(), 2);
            }
            other => panic!("expected cyclic dependency error, got {other:?}"),
        }
    }

    #[test]
    fn acyclic_diamond_is_stable() {
        let entities = vec![
            e("app", &["a", "b"]),
            e("a", &["base"]),
            e("b", &["base"]),
            e("base", &[]),
        ];
        let order = sort(&entities, |ent| vec![ent.name.clone()], |ent| ent.deps.clone()).unwrap();
        let pos = |name: &str| order.iter().position(|&i| entities[i].name == name).unwrap();
        assert!(pos("base") < pos("a"));
        assert!(pos("base") < pos("b"));
        assert!(pos("a") < pos("app"));
        assert!(pos("b") < pos("app"));
    }
}
