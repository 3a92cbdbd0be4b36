//! C4: compile/link command detection (spec §4.4).

use crate::canon;
use crate::config::HostFamily;
use crate::error::{EmitError, Result};
use crate::model::{Language, SourceFile, Target, TargetConfig, TargetKind, ToolchainVars};
use crate::rules::{self, RuleVars};

/// An (executable, flags) pair, the form every base command is reduced
/// to after the final whitespace split (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseCommand {
    pub executable: String,
    pub flags: String,
}

/// Join command lines per the host family's shell-chaining convention
/// (spec §4.4/§4.7). Shared between the compile detector, the link
/// detector and the custom-command planner.
pub fn join_command_lines(lines: &[String], host: HostFamily) -> String {
    if lines.is_empty() {
        return match host {
            HostFamily::Windows => "cmd.exe /C \"cd .\"".to_string(),
            HostFamily::Unix => ":".to_string(),
        };
    }
    let joined = lines.join(" && ");
    match host {
        HostFamily::Windows => format!("cmd.exe /C \"{joined}\""),
        HostFamily::Unix => joined,
    }
}

/// Split a fully-joined shell invocation into its first whitespace-
/// delimited token and the remainder (spec §4.4 "split the final string
/// on whitespace into (executable, remaining-flags)").
fn split_executable(s: &str) -> BaseCommand {
    match s.split_once(char::is_whitespace) {
        Some((exe, rest)) => BaseCommand {
            executable: exe.to_string(),
            flags: rest.trim_start().to_string(),
        },
        None => BaseCommand {
            executable: s.to_string(),
            flags: String::new(),
        },
    }
}

/// Base compile command for `(target, language)` (spec §4.4).
pub fn base_compile_command(
    target: &Target,
    language: &Language,
    toolchain: &ToolchainVars,
    host: HostFamily,
) -> Result<BaseCommand> {
    let template = toolchain.compile_object_rule(language).ok_or_else(|| EmitError::MissingRuleVariable {
        target: target.name.to_string(),
        variable: format!("CMAKE_{}_COMPILE_OBJECT", language.as_key()),
    })?;

    let vars = RuleVars {
        source: Some("%1".to_string()),
        object: Some("%2".to_string()),
        object_dir: Some("$TargetOutputDir$".to_string()),
        target_compile_pdb: Some("$TargetNamePDB$".to_string()),
        flags: Some(String::new()),
        defines: Some(String::new()),
        ..Default::default()
    };

    let lines: Vec<String> = rules::split_command_lines(template)
        .into_iter()
        .map(|line| rules::expand(line, &vars))
        .collect();

    Ok(split_executable(&join_command_lines(&lines, host)))
}

/// Base link command for `(target, config)` (spec §4.4).
pub fn base_link_command(
    target: &Target,
    config: &str,
    toolchain: &ToolchainVars,
    host: HostFamily,
) -> Result<BaseCommand> {
    let lang = target.effective_linker_language().ok_or_else(|| EmitError::MissingLinkerLanguage {
        target: target.name.to_string(),
    })?;

    let lines: Vec<String> = match toolchain.link_rule(target.kind, &lang) {
        Some(template) => rules::split_command_lines(template).into_iter().map(str::to_string).collect(),
        None => match target.kind {
            TargetKind::StaticLibrary => {
                let create = toolchain.archive_create_rule(&lang).ok_or_else(|| EmitError::MissingRuleVariable {
                    target: target.name.to_string(),
                    variable: format!("CMAKE_{}_ARCHIVE_CREATE", lang.as_key()),
                })?;
                let finish = toolchain.archive_finish_rule(&lang).ok_or_else(|| EmitError::MissingRuleVariable {
                    target: target.name.to_string(),
                    variable: format!("CMAKE_{}_ARCHIVE_FINISH", lang.as_key()),
                })?;
                let mut lines = vec!["<CMAKE_COMMAND> -E remove $TARGET_FILE$".to_string()];
                lines.extend(rules::split_command_lines(create).into_iter().map(str::to_string));
                lines.extend(rules::split_command_lines(finish).into_iter().map(str::to_string));
                lines
            }
            TargetKind::SharedLibrary | TargetKind::ModuleLibrary | TargetKind::Executable => {
                return Err(EmitError::MissingLinkerLanguage {
                    target: target.name.to_string(),
                });
            }
            _ => Vec::new(),
        },
    };

    let tc = target.config(config);
    let vars = RuleVars {
        objects: Some("%1".to_string()),
        target: Some("%2".to_string()),
        target_pdb: Some("$TargetOutDir$$TargetNamePDB$".to_string()),
        target_soname: Some("$TargetOutSO$".to_string()),
        defines: Some("$CompileDefineFlags$".to_string()),
        flags: Some("$CompileFlags$".to_string()),
        link_flags: Some("$LinkFlags$ $LinkPath$".to_string()),
        link_libraries: Some(String::new()),
        target_version_major: tc.version_major.map(|v| v.to_string()),
        target_version_minor: tc.version_minor.map(|v| v.to_string()),
        ..Default::default()
    };

    let expanded: Vec<String> = lines.into_iter().map(|line| rules::expand(&line, &vars)).collect();
    Ok(split_executable(&join_command_lines(&expanded, host)))
}

/// Per-source compile flags: language flags, architecture flags, PIC
/// flags, visibility-preset flags, include-directory flags (full paths
/// for `RC`), makefile-level define flags, target compile options, and
/// per-source `COMPILE_FLAGS`, combined in that order (spec §4.4).
pub fn per_source_compile_flags(
    target: &Target,
    config: &str,
    source: &SourceFile,
    toolchain: &ToolchainVars,
) -> Vec<String> {
    let tc = target.config(config);
    let mut flags = Vec::new();
    let lang = source.language.as_ref();

    if let Some(lang) = lang {
        if let Some(v) = toolchain.get(&format!("CMAKE_{}_FLAGS", lang.as_key())) {
            flags.push(v.to_string());
        }
        if let Some(v) = toolchain.get("CMAKE_SYSTEM_PROCESSOR_FLAGS") {
            flags.push(v.to_string());
        }
        if target.kind.has_linker_stage()
            && matches!(target.kind, TargetKind::SharedLibrary | TargetKind::ModuleLibrary)
        {
            if let Some(v) = toolchain.get(&format!("CMAKE_{}_COMPILE_OPTIONS_PIC", lang.as_key())) {
                flags.push(v.to_string());
            }
        }
        if let Some(v) = toolchain.get(&format!("CMAKE_{}_VISIBILITY_PRESET", lang.as_key())) {
            flags.push(v.to_string());
        }

        let include_flag = toolchain
            .get(&format!("CMAKE_INCLUDE_FLAG_{}", lang.as_key()))
            .unwrap_or("-I")
            .to_string();
        for dir in &tc.include_directories {
            let path = canon::convert_path(dir, HostFamily::Unix);
            if *lang == Language::Rc {
                flags.push(format!("{include_flag}\"{path}\""));
            } else {
                flags.push(format!("{include_flag}{path}"));
            }
        }
    }

    if let Some(v) = toolchain.get("CMAKE_MAKEFILE_DEFINE_FLAGS") {
        flags.push(v.to_string());
    }

    flags.extend(tc.compile_options.iter().cloned());

    if let Some(ref per_source) = source.compile_flags {
        flags.push(per_source.clone());
    }

    flags
}

/// Per-source preprocessor defines: target export-macro, target+config
/// defines, source-file `COMPILE_DEFINITIONS`, source-file
/// `COMPILE_DEFINITIONS_<UPPER(CONFIG)>`, and the synthetic
/// `CMAKE_INTDIR`, combined in that order (spec §4.4).
pub fn per_source_defines(target: &Target, config: &str, source: &SourceFile) -> Vec<String> {
    let tc = target.config(config);
    let mut defines = Vec::new();

    if let Some(ref export_macro) = target.export_macro {
        defines.push(export_macro.clone());
    }
    defines.extend(tc.compile_definitions.iter().cloned());
    defines.extend(source.compile_definitions.iter().cloned());
    if let Some(v) = source.compile_definitions_by_config.get(&config.to_uppercase()) {
        defines.extend(v.iter().cloned());
    }
    defines.push(format!("CMAKE_INTDIR=\"{config}\""));

    defines
}

/// Linker library search-path flags: for each library directory, both
/// `<flag><dir><term>` and the per-config variant `<flag><dir>/<config><term>`
/// (spec §4.4 "Linker library paths").
pub fn linker_library_paths(tc: &TargetConfig, config: &str, toolchain: &ToolchainVars) -> Vec<String> {
    let flag = toolchain.library_path_flag();
    let mut paths = Vec::new();
    for dir in &tc.link_directories {
        let base = canon::convert_path(dir, HostFamily::Unix);
        paths.push(format!("{flag}{base}"));
        paths.push(format!("{flag}{base}/{config}"));
    }
    paths
}
