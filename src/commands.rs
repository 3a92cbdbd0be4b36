//! C7: custom-command planner (spec §4.7).

use std::collections::HashMap;

use crate::config::HostFamily;
use crate::detect::join_command_lines;
use crate::error::Result;
use crate::model::CustomCommand;
use crate::topo;
use crate::util::hash::Fingerprint;

/// The outcome of planning one custom command: either a fresh `Exec`
/// block, or a reference to one already emitted under a different alias
/// (spec §4.7 items 4-6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedCommand {
    Exec(ExecNode),
    Alias { alias: String, points_to: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecNode {
    pub alias: String,
    pub executable: String,
    pub arguments: String,
    pub inputs: Vec<String>,
    pub order_deps: Vec<String>,
    pub output: String,
    pub use_stdout_as_output: bool,
}

/// Table tracking, for config-independent commands with non-empty
/// outputs, which alias first emitted a given command identity (spec
/// §3 "Custom-command alias table", §4.7 item 6, §9 "process-scoped").
#[derive(Debug, Default)]
pub struct AliasTable {
    seen: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        AliasTable::default()
    }

    fn identity(cc: &CustomCommand, file_inputs: &[String], outputs: &[String]) -> String {
        let mut fp = Fingerprint::new();
        for line in &cc.command_lines {
            fp.update_str(&line.to_shell_string());
        }
        fp.update_strs(file_inputs.iter().map(String::as_str));
        fp.update_strs(outputs.iter().map(String::as_str));
        fp.update_opt(cc.working_directory.as_ref().and_then(|p| p.to_str()));
        fp.update_opt(cc.launcher.as_deref());
        fp.finish()
    }
}

/// Resolve the non-symbolic output set for a command: `outputs ∪
/// byproducts`, minus any path `is_symbolic` reports true for (spec §4.7
/// item 1).
pub fn effective_outputs(cc: &CustomCommand, is_symbolic: impl Fn(&str) -> bool) -> Vec<String> {
    cc.outputs
        .iter()
        .chain(cc.byproducts.iter())
        .filter(|o| !is_symbolic(o))
        .cloned()
        .collect()
}

/// Split `cc.depends` into (order-dependency target names, file inputs)
/// (spec §4.7 item 2).
pub fn split_inputs(cc: &CustomCommand, config: &str, is_target: impl Fn(&str) -> bool) -> (Vec<String>, Vec<String>) {
    let mut order_deps = Vec::new();
    let mut file_inputs = Vec::new();
    for dep in &cc.depends {
        if is_target(dep) {
            order_deps.push(format!("{dep}-{config}"));
        } else {
            file_inputs.push(dep.clone());
        }
    }
    (order_deps, file_inputs)
}

/// Compose the shell command text for a custom command: an optional
/// `cd`, then each launcher-prefixed command line, chained per the host
/// family's rule (spec §4.7 item 3).
pub fn compose_command_text(cc: &CustomCommand, host: HostFamily) -> String {
    let mut lines = Vec::new();

    if let Some(ref wd) = cc.working_directory {
        let wd_str = wd.to_string_lossy();
        lines.push(match host {
            HostFamily::Windows => format!("cd /D {wd_str}"),
            HostFamily::Unix => format!("cd {wd_str}"),
        });
    }

    for line in &cc.command_lines {
        let mut text = String::new();
        if let Some(ref launcher) = cc.launcher {
            text.push_str(launcher);
            text.push(' ');
        }
        text.push_str(&line.to_shell_string());
        lines.push(text);
    }

    join_command_lines(&lines, host)
}

/// Plan one custom command attached to `target_name` in `config`,
/// consulting and updating `alias_table` for dedup (spec §4.7).
pub fn plan(
    target_name: &str,
    index: usize,
    cc: &CustomCommand,
    config: &str,
    host: HostFamily,
    is_symbolic: impl Fn(&str) -> bool,
    is_target: impl Fn(&str) -> bool,
    alias_table: &mut AliasTable,
) -> PlannedCommand {
    let outputs = effective_outputs(cc, is_symbolic);
    let (order_deps, file_inputs) = split_inputs(cc, config, is_target);

    let alias = format!("{target_name}-CustomCommand-{config}-{}", index + 1);

    if !cc.is_config_dependent() && !outputs.is_empty() {
        let identity = AliasTable::identity(cc, &file_inputs, &outputs);
        if let Some(existing) = alias_table.seen.get(&identity) {
            return PlannedCommand::Alias {
                alias,
                points_to: existing.clone(),
            };
        }
        alias_table.seen.insert(identity, alias.clone());
    }

    let text = compose_command_text(cc, host);
    let (executable, arguments) = match text.split_once(char::is_whitespace) {
        Some((exe, rest)) => (exe.to_string(), rest.trim_start().to_string()),
        None => (text, String::new()),
    };

    let exec_inputs = if file_inputs.is_empty() {
        vec!["dummy-in".to_string()]
    } else {
        file_inputs
    };

    let (output, use_stdout) = if outputs.is_empty() {
        (format!("dummy-out-{target_name}.txt"), true)
    } else {
        (outputs.join(";"), false)
    };

    PlannedCommand::Exec(ExecNode {
        alias,
        executable,
        arguments,
        inputs: exec_inputs,
        order_deps,
        output,
        use_stdout_as_output: use_stdout,
    })
}

/// Order a target's custom commands so a command consuming another's
/// output appears later (spec §4.7 final paragraph), via C5 with
/// `outputs(cc) = outputs ∪ byproducts` and `inputs(cc) = file inputs`.
pub fn sort_commands<'a>(
    commands: &'a [CustomCommand],
    is_symbolic: impl Fn(&str) -> bool,
    is_target: impl Fn(&str) -> bool,
) -> Result<Vec<&'a CustomCommand>> {
    let order = topo::sort(
        commands,
        |cc| effective_outputs(cc, &is_symbolic),
        |cc| cc.depends.iter().filter(|d| !is_target(d)).cloned().collect(),
    )?;
    Ok(order.into_iter().map(|idx| &commands[idx]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommandLine;

    fn cc(outputs: Vec<&str>, depends: Vec<&str>) -> CustomCommand {
        CustomCommand {
            command_lines: vec![CommandLine::new("gen", ["--out", "x"])],
            depends: depends.into_iter().map(String::from).collect(),
            outputs: outputs.into_iter().map(String::from).collect(),
            byproducts: vec![],
            working_directory: None,
            launcher: None,
        }
    }

    #[test]
    fn empty_inputs_default_to_dummy_in() {
        let command = cc(vec!["out.cpp"], vec![]);
        let mut table = AliasTable::new();
        let planned = plan("t", 0, &command, "Debug", HostFamily::Unix, |_| false, |_| false, &mut table);
        match planned {
            PlannedCommand::Exec(node) => assert_eq!(node.inputs, vec!["dummy-in".to_string()]),
            other => panic!("expected Exec, got {other:?}"),
        }
    }

    #[test]
    fn empty_outputs_synthesize_dummy_out_and_use_stdout() {
        let command = cc(vec![], vec![]);
        let mut table = AliasTable::new();
        let planned = plan("t", 0, &command, "Debug", HostFamily::Unix, |_| false, |_| false, &mut table);
        match planned {
            PlannedCommand::Exec(node) => {
                assert!(node.use_stdout_as_output);
                assert_eq!(node.output, "dummy-out-t.txt");
            }
            other => panic!("expected Exec, got {other:?}"),
        }
    }

    #[test]
    fn identical_config_independent_commands_dedup_to_alias() {
        let first = cc(vec!["shared.h"], vec![]);
        let second = cc(vec!["shared.h"], vec![]);
        let mut table = AliasTable::new();
        let p1 = plan("a", 0, &first, "Debug", HostFamily::Unix, |_| false, |_| false, &mut table);
        let p2 = plan("b", 0, &second, "Debug", HostFamily::Unix, |_| false, |_| false, &mut table);
        assert!(matches!(p1, PlannedCommand::Exec(_)));
        match p2 {
            PlannedCommand::Alias { points_to, .. } => assert_eq!(points_to, "a-CustomCommand-Debug-1"),
            other => panic!("expected Alias, got {other:?}"),
        }
    }

    #[test]
    fn config_dependent_commands_never_dedup() {
        let mut first = cc(vec!["gen/$ConfigName$/out.h"], vec![]);
        first.outputs = vec!["gen/$ConfigName$/out.h".to_string()];
        let second = first.clone();
        let mut table = AliasTable::new();
        let p1 = plan("a", 0, &first, "Debug", HostFamily::Unix, |_| false, |_| false, &mut table);
        let p2 = plan("b", 0, &second, "Debug", HostFamily::Unix, |_| false, |_| false, &mut table);
        assert!(matches!(p1, PlannedCommand::Exec(_)));
        assert!(matches!(p2, PlannedCommand::Exec(_)));
    }

    #[test]
    fn target_dependency_becomes_order_dependency() {
        let command = cc(vec!["out.cpp"], vec!["other_target"]);
        let mut table = AliasTable::new();
        let planned = plan("t", 0, &command, "Debug", HostFamily::Unix, |_| false, |d| d == "other_target", &mut table);
        match planned {
            PlannedCommand::Exec(node) => assert_eq!(node.order_deps, vec!["other_target-Debug".to_string()]),
            other => panic!("expected Exec, got {other:?}"),
        }
    }

    #[test]
    fn sort_commands_orders_producer_before_consumer() {
        let producer = cc(vec!["gen.cpp"], vec![]);
        let consumer = cc(vec![], vec!["gen.cpp"]);
        let commands = vec![consumer, producer];
        let sorted = sort_commands(&commands, |_| false, |_| false).unwrap();
        assert_eq!(sorted[0].outputs, vec!["gen.cpp".to_string()]);
    }
}
