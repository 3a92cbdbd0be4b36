//! C8: per-target emission (spec §4.8).

use std::collections::BTreeMap;
use std::path::Path;

use crate::canon::{self, quote_single, wrap};
use crate::commands::{self, AliasTable, PlannedCommand};
use crate::config::HostFamily;
use crate::detect;
use crate::error::Result;
use crate::graph::emitted_depends;
use crate::model::{CustomCommand, Project, SourceFile, Target, TargetKind};
use crate::writer::Writer;

/// What a target contributes to its own and to others' per-config
/// aliases (spec §4.9 "Per-target aliases").
#[derive(Debug, Default)]
pub struct TargetEmission {
    /// One entry per language (`<t>-ObjectGroup_<L>-<c>`), plus `"<t>-link-<c>"`
    /// when a linker stage exists.
    pub linkable_deps: Vec<String>,
    /// `PreBuild`, `PreLink`, `CustomCommands`, `link`, `PostBuild`
    /// components that exist for this target, in that order.
    pub order_deps: Vec<String>,
}

/// Emit one non-skipped target's entire definition (spec §4.8).
pub fn emit_target(
    w: &mut Writer,
    project: &Project,
    target: &Target,
    host: HostFamily,
    alias_table: &mut AliasTable,
) -> Result<BTreeMap<String, TargetEmission>> {
    let mut by_config = BTreeMap::new();
    let deps: Vec<&str> = emitted_depends(project, target);

    w.blank();
    w.line_comment(&format!(" Target definition: {}", target.name));

    for config in &project.effective_configurations() {
        let mut emission = TargetEmission::default();

        emit_base_config(w, target, config, &deps);

        let pre_build_alias = emit_custom_step_group(
            w,
            project,
            target,
            &target.pre_build,
            "PreBuild",
            config,
            host,
            alias_table,
        );
        let pre_link_alias = emit_custom_step_group(
            w,
            project,
            target,
            &target.pre_link,
            "PreLink",
            config,
            host,
            alias_table,
        );

        emit_base_compilation_config(w, config, pre_build_alias.is_some(), pre_link_alias.is_some());
        if pre_build_alias.is_some() {
            emission.order_deps.push("PreBuild".to_string());
        }
        if pre_link_alias.is_some() {
            emission.order_deps.push("PreLink".to_string());
        }

        let source_commands: Vec<CustomCommand> = target
            .sources
            .iter()
            .filter_map(|s| s.custom_command.clone())
            .collect();
        let has_custom_build_rules = emit_custom_commands_group(w, target, &source_commands, config, host, alias_table)?;
        if has_custom_build_rules {
            emission.order_deps.push("CustomCommands".to_string());
        }

        for language in target.languages() {
            let alias = emit_object_group(w, project, target, &language, config);
            emission.linkable_deps.push(alias);
        }

        if target.kind.has_linker_stage() {
            emit_linker_config(w, target, config, &deps, &emission.linkable_deps, &project.toolchain);
            emit_link_command(w, target, config);
            emission.linkable_deps.push(format!("{}-link-{}", target.name, config));
            emission.order_deps.push("link".to_string());
        }

        let post_build_alias = emit_custom_step_group(
            w,
            project,
            target,
            &target.post_build,
            "PostBuild",
            config,
            host,
            alias_table,
        );
        if post_build_alias.is_some() {
            emission.order_deps.push("PostBuild".to_string());
        }

        by_config.insert(config.clone(), emission);
    }

    Ok(by_config)
}

fn emit_base_config(w: &mut Writer, target: &Target, config: &str, deps: &[&str]) {
    w.push_named_struct(&format!("BaseConfig_{config}"));
    w.using("ConfigBase");
    w.assign("ConfigName", &quote_single(config));
    w.assign("TargetName", &quote_single(target.name.as_str()));
    w.assign("TargetOutput", "'$TargetOutDir$$TargetName$'");
    w.assign("TargetOutputReal", ".TargetOutput");
    w.assign("TargetOutDir", &quote_single(&format!("out/{}/{}/", target.name, config)));
    w.assign("TargetOutSO", ".TargetOutput");
    w.assign("TargetNamePDB", &quote_single(&format!("{}.pdb", target.name)));
    w.assign("TargetCompilePDB", &quote_single(&format!("{}.compile.pdb", target.name)));

    let pre_build_deps = wrap(deps.iter().copied(), &format!("{}-", target.name), &format!("-{config}"));
    if !pre_build_deps.is_empty() {
        w.array("PreBuildDependencies", &pre_build_deps.into_iter().map(|d| quote_single(&d)).collect::<Vec<_>>(), "=");
    }
    w.pop_scope();
}

fn emit_base_compilation_config(w: &mut Writer, config: &str, has_pre_build: bool, has_pre_link: bool) {
    w.push_named_struct(&format!("BaseCompilationConfig_{config}"));
    w.using(&format!("BaseConfig_{config}"));
    let mut extra = Vec::new();
    if has_pre_build {
        extra.push(quote_single("PreBuild"));
    }
    if has_pre_link {
        extra.push(quote_single("PreLink"));
    }
    if !extra.is_empty() {
        w.array("PreBuildDependencies", &extra, "+");
    }
    w.pop_scope();
}

/// Plan and emit one pre-build/pre-link/post-build custom-command group,
/// returning the alias it was collected under, if any commands existed
/// (spec §4.8 items 4/10).
fn emit_custom_step_group(
    w: &mut Writer,
    project: &Project,
    target: &Target,
    commands_list: &[CustomCommand],
    label: &str,
    config: &str,
    host: HostFamily,
    alias_table: &mut AliasTable,
) -> Option<String> {
    if commands_list.is_empty() {
        return None;
    }

    let mut member_aliases = Vec::new();
    for (i, cc) in commands_list.iter().enumerate() {
        let planned = commands::plan(
            &format!("{}-{}", target.name, label),
            i,
            cc,
            config,
            host,
            |path| is_symbolic_output(project, path),
            |name| project.target(name).is_some(),
            alias_table,
        );
        member_aliases.push(emit_planned(w, planned));
    }

    let group_alias = format!("{}-{}-{}", target.name, label, config);
    w.command("Alias", Some(group_alias.as_str()));
    w.push_scope('{', '}');
    w.array("Targets", &member_aliases.iter().map(|a| quote_single(a)).collect::<Vec<_>>(), "=");
    w.pop_scope();
    Some(group_alias)
}

/// Emit the target's per-source custom commands (if any) plus the
/// `CustomCommands_<c>` struct every `ObjectConfig_<c>` `Using`s (spec
/// §4.8 items 6/7). The struct is emitted unconditionally — empty when
/// there are no custom commands — so `ObjectConfig_<c>` can always
/// reference it regardless of whether this target has any.
fn emit_custom_commands_group(
    w: &mut Writer,
    target: &Target,
    commands_list: &[CustomCommand],
    config: &str,
    host: HostFamily,
    alias_table: &mut AliasTable,
) -> Result<bool> {
    let has_custom_build_rules = !commands_list.is_empty();

    if has_custom_build_rules {
        let sorted = commands::sort_commands(commands_list, |_| false, |name| target.depends.iter().any(|d| d.as_str() == name))?;

        let mut member_aliases = Vec::new();
        for (i, cc) in sorted.into_iter().enumerate() {
            let planned = commands::plan(
                &format!("{}-CustomCommands", target.name),
                i,
                cc,
                config,
                host,
                |_| false,
                |name| target.depends.iter().any(|d| d.as_str() == name),
                alias_table,
            );
            member_aliases.push(emit_planned(w, planned));
        }

        let group_alias = format!("{}-CustomCommands-{}", target.name, config);
        w.command("Alias", Some(group_alias.as_str()));
        w.push_scope('{', '}');
        w.array("Targets", &member_aliases.iter().map(|a| quote_single(a)).collect::<Vec<_>>(), "=");
        w.pop_scope();
    }

    w.push_named_struct(&format!("CustomCommands_{config}"));
    w.using(&format!("BaseCompilationConfig_{config}"));
    if has_custom_build_rules {
        let group_alias = format!("{}-CustomCommands-{}", target.name, config);
        w.array("PreBuildDependencies", &[quote_single(&group_alias)], "+");
    }
    w.pop_scope();

    Ok(has_custom_build_rules)
}

fn emit_planned(w: &mut Writer, planned: PlannedCommand) -> String {
    match planned {
        PlannedCommand::Exec(node) => {
            w.command("Exec", Some(node.alias.as_str()));
            w.push_scope('{', '}');
            w.assign("ExecExecutable", &quote_single(&node.executable));
            w.assign("ExecArguments", &quote_single(&node.arguments));
            w.array("ExecInput", &node.inputs.iter().map(|i| quote_single(i)).collect::<Vec<_>>(), "=");
            if node.use_stdout_as_output {
                w.assign("ExecUseStdOutAsOutput", "true");
            }
            w.assign("ExecOutput", &quote_single(&node.output));
            if !node.order_deps.is_empty() {
                w.array(
                    "PreBuildDependencies",
                    &node.order_deps.iter().map(|d| quote_single(d)).collect::<Vec<_>>(),
                    "=",
                );
            }
            w.pop_scope();
            node.alias
        }
        PlannedCommand::Alias { alias, points_to } => {
            w.command("Alias", Some(alias.as_str()));
            w.push_scope('{', '}');
            w.array("Targets", &[quote_single(&points_to)], "=");
            w.pop_scope();
            alias
        }
    }
}

fn is_symbolic_output(project: &Project, path: &str) -> bool {
    project
        .targets
        .iter()
        .flat_map(|t| &t.sources)
        .any(|s| s.symbolic && s.path.to_string_lossy() == path)
}

/// Emit `ObjectGroup_<L>` for one language: one `ObjectConfig_<c>` per
/// configuration grouping sources by (flags, defines) permutation and
/// then by source directory (spec §4.8 item 7). Returns the group alias.
fn emit_object_group(
    w: &mut Writer,
    project: &Project,
    target: &Target,
    language: &crate::model::Language,
    config: &str,
) -> String {
    let sources: Vec<&SourceFile> = target
        .sources
        .iter()
        .filter(|s| s.language.as_ref() == Some(language) && s.custom_command.is_none())
        .collect();

    let object_config_name = format!("ObjectConfig_{language}_{config}");
    w.push_named_struct(&format!("{}-{}", target.name, object_config_name));
    w.using(&format!("BaseCompilationConfig_{config}"));
    w.using(&format!("CustomCommands_{config}"));
    w.assign("Compiler", &format!(".Compiler_{language}"));
    let base_flags: Vec<String> = sources
        .iter()
        .copied()
        .flat_map(|s| detect::per_source_compile_flags(target, config, s, &project.toolchain))
        .collect();
    w.assign("CompilerCmdBaseFlags", &quote_single(&base_flags.join(" ")));
    w.pop_scope();
    let object_config_full_name = format!("{}-{}", target.name, object_config_name);

    let mut permutations: BTreeMap<String, Vec<&SourceFile>> = BTreeMap::new();
    for &s in &sources {
        let flags = detect::per_source_compile_flags(target, config, s, &project.toolchain).join(" ");
        let defines = detect::per_source_defines(target, config, s).join(" ");
        let key = format!("{flags}{{|}}{defines}");
        permutations.entry(key).or_default().push(s);
    }

    let mut rule_names = Vec::new();
    let mut group_name_count = 0usize;
    for group in permutations.values() {
        let mut by_folder: BTreeMap<String, Vec<&SourceFile>> = BTreeMap::new();
        for &s in group {
            let folder = s
                .path
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();
            by_folder.entry(folder).or_default().push(s);
        }
        for (folder, group_sources) in by_folder {
            group_name_count += 1;
            let rule_name = format!(
                "{}-ObjectGroup_{}-{}-{}-{}",
                target.name,
                language,
                config,
                if folder.is_empty() { "root".to_string() } else { folder.replace(['/', '\\'], "_") },
                group_name_count
            );
            let extension = if *language == crate::model::Language::Rc {
                ".res".to_string()
            } else {
                format!(".{language}.obj")
            };
            w.command("ObjectList", Some(rule_name.as_str()));
            w.push_scope('{', '}');
            w.using(&object_config_full_name);
            let inputs: Vec<String> = group_sources
                .iter()
                .map(|s| quote_single(&canon::convert_path(&s.path, HostFamily::Unix)))
                .collect();
            w.array("CompilerInputFiles", &inputs, "=");
            w.assign("CompilerOutputPath", &quote_single(&format!("$TargetOutDir$obj/{folder}")));
            w.assign("CompilerOutputExtension", &quote_single(&extension));
            w.assign("UnityInputFiles", ".CompilerInputFiles");
            w.pop_scope();
            rule_names.push(rule_name);
        }
    }

    let group_alias = format!("{}-ObjectGroup_{}-{}", target.name, language, config);
    w.command("Alias", Some(group_alias.as_str()));
    w.push_scope('{', '}');
    w.array("Targets", &rule_names.iter().map(|r| quote_single(r)).collect::<Vec<_>>(), "=");
    w.pop_scope();
    group_alias
}

fn emit_linker_config(
    w: &mut Writer,
    target: &Target,
    config: &str,
    deps: &[&str],
    linkable_deps: &[String],
    toolchain: &crate::model::ToolchainVars,
) {
    let tc = target.config(config);
    let lib_paths = detect::linker_library_paths(&tc, config, toolchain);
    let link_libs = tc.link_libraries.clone();
    let mut link_flags = tc.link_flags.clone();
    // Only executables with exports get a /DEF: module-definition flag.
    if target.kind == TargetKind::Executable {
        if let Some(ref def_file) = tc.module_definition_file {
            link_flags.push(format!("/DEF:{}", def_file.display()));
        }
    }

    w.push_named_struct(&format!("LinkerConfig_{config}"));
    w.assign("LinkPath", &quote_single(&lib_paths.join(" ")));
    w.array("LinkLibs", &link_libs.iter().map(|l| quote_single(l)).collect::<Vec<_>>(), "=");
    w.assign("LinkFlags", &quote_single(&link_flags.join(" ")));
    w.assign("Linker", "'$Linker$'");
    if let Some(lang) = target.effective_linker_language() {
        if let Some(id) = toolchain.compiler_id(&lang) {
            w.assign("LinkerType", &quote_single(id));
        }
    }
    w.assign("BaseLinkerOptions", "'$BaseLinkerOptions$'");
    w.assign("LinkerOutput", "'$TargetOutput$'");
    w.assign("LinkerOptions", "'$BaseLinkerOptions$ $LinkLibs$'");

    let libraries = wrap(linkable_deps.iter().map(|s| s.as_str()), &format!("{}-", target.name), &format!("-{config}"));
    w.array("Libraries", &libraries.iter().map(|l| quote_single(l)).collect::<Vec<_>>(), "=");
    let extra = wrap(deps.iter().copied(), &format!("{}-", target.name), &format!("-{config}"));
    if !extra.is_empty() {
        w.array("Libraries", &extra.into_iter().map(|e| quote_single(&e)).collect::<Vec<_>>(), "+");
    }
    w.pop_scope();
}

fn emit_link_command(w: &mut Writer, target: &Target, config: &str) {
    let command_name = match target.kind {
        TargetKind::Executable => "Executable",
        TargetKind::SharedLibrary => "DLL",
        TargetKind::ModuleLibrary => "DLL",
        TargetKind::StaticLibrary => "Library",
        _ => "NoLinkCommand",
    };

    let alias = format!("{}-link-{}", target.name, config);
    w.command(command_name, Some(alias.as_str()));
    w.push_scope('{', '}');
    w.using(&format!("LinkerConfig_{config}"));
    if command_name == "Library" {
        w.assign("Compiler", ".Compiler_dummy");
        w.assign("CompilerOptions", "'-c $FB_INPUT_1_PLACEHOLDER$ $FB_INPUT_2_PLACEHOLDER$'");
        w.assign("CompilerOutputPath", "'/dummy/'");
        w.assign("Librarian", "'$Linker$'");
        w.assign("LibrarianOptions", "'$LinkerOptions$'");
        w.assign("LibrarianOutput", "'$TargetOutput$'");
    }
    w.pop_scope();
}

pub fn target_path_folder(path: &Path) -> String {
    path.parent().map(|p| p.to_string_lossy().to_string()).unwrap_or_default()
}
