//! C6: target graph builder (spec §4.6).

use crate::error::Result;
use crate::model::{Project, Target, TargetKind};
use crate::topo;

/// Compute the deterministic, dependency-respecting target order (spec
/// §3 "Target order", §4.6).
///
/// `InterfaceLibrary` and `Unknown` targets never appear in the result
/// and never contribute dependency edges (spec §3 invariants). Duplicate
/// `GlobalTarget`s not anchored at the project root are stripped before
/// sorting (spec §4.6) — modeled here via `Target::is_root_scoped`, since
/// this crate does not itself represent the meta build-system's
/// multi-directory sub-project hierarchy (see DESIGN.md).
pub fn build_target_order(project: &Project) -> Result<Vec<&Target>> {
    let candidates: Vec<&Target> = project
        .targets
        .iter()
        .filter(|t| t.kind.is_emitted())
        .filter(|t| t.kind != TargetKind::GlobalTarget || t.is_root_scoped)
        .collect();

    let order = topo::sort(
        &candidates,
        |t| vec![t.name.as_str().to_string()],
        |t| direct_depends(t).iter().map(|s| s.to_string()).collect(),
    )?;

    Ok(order.into_iter().map(|idx| candidates[idx]).collect())
}

/// `inputs(t)` for C6: a `GlobalTarget`'s utility set substitutes for its
/// ordinary `depends` list (spec §4.6); `InterfaceLibrary` dependencies
/// never contribute an edge since they never appear in the candidate set
/// (and so resolve to leaf/no-producer inputs regardless).
pub fn direct_depends(t: &Target) -> Vec<&str> {
    if t.kind == TargetKind::GlobalTarget {
        t.utilities.iter().map(|n| n.as_str()).collect()
    } else {
        t.depends.iter().map(|n| n.as_str()).collect()
    }
}

/// `direct_depends(t)` with `InterfaceLibrary`-kind dependencies dropped
/// (spec.md §4.8 item 2: `deps = directDepends(t) \ InterfaceLibraries`).
/// C6 doesn't need this — such an edge already resolves to "no producer"
/// since `InterfaceLibrary` targets never enter the candidate set — but
/// anything that turns `deps` into an emitted alias reference does, since
/// an `InterfaceLibrary`'s alias is never written anywhere.
pub fn emitted_depends<'a>(project: &'a Project, t: &'a Target) -> Vec<&'a str> {
    direct_depends(t)
        .into_iter()
        .filter(|name| !matches!(project.target(name), Some(dep) if dep.kind == TargetKind::InterfaceLibrary))
        .collect()
}
