//! C9: top-level document assembly (spec §4.9).

use std::collections::BTreeMap;

use crate::canon::{convert_path, quote_single};
use crate::commands::AliasTable;
use crate::config::{EmitConfig, HostFamily};
use crate::emit::target::{emit_target, TargetEmission};
use crate::error::Result;
use crate::graph::build_target_order;
use crate::model::Project;
use crate::util::fs;
use crate::writer::Writer;

/// Assemble and write the complete `.bff` document for `project`,
/// returning the text that was written (spec §4.9, §6).
///
/// This is the crate's single public entry point: everything else is an
/// implementation detail reached only through this call (spec §2 "a pure
/// transformation from a project model P to a text artifact B").
pub fn emit(project: &Project, config: &EmitConfig) -> Result<String> {
    let home_output_dir = config.resolve_home_output_dir(&project.home_output_dir);
    let host = config.host_family;

    let order = build_target_order(project)?;

    let mut w = Writer::new();

    emit_settings(&mut w, &home_output_dir, host);
    emit_compilers(&mut w, project);
    emit_configurations(&mut w, project);

    let mut alias_table = AliasTable::new();
    let mut per_target: BTreeMap<String, BTreeMap<String, TargetEmission>> = BTreeMap::new();

    for target in &order {
        if !matches!(target.kind, crate::model::TargetKind::ObjectLibrary) {
            for config_name in project.effective_configurations() {
                let tc = target.config(&config_name);
                if let Some(ref dir) = tc.output_directory {
                    let _ = fs::ensure_directory_exists(dir, &home_output_dir);
                }
            }
        }
        let emission = emit_target(&mut w, project, target, host, &mut alias_table)?;
        per_target.insert(target.name.to_string(), emission);
    }

    emit_aliases(&mut w, project, &order, &per_target);

    let text = w.finish();

    let bff_path = home_output_dir.join("fbuild.bff");
    fs::write_string(&bff_path, &text).map_err(|_| crate::error::EmitError::SinkWrite(std::io::Error::new(
        std::io::ErrorKind::Other,
        "failed to write fbuild.bff",
    )))?;

    Ok(text)
}

fn emit_settings(w: &mut Writer, home_output_dir: &std::path::Path, host: HostFamily) {
    w.section_header("Settings");
    w.command("Settings", None);
    w.push_scope('{', '}');
    let cache_path = convert_path(&home_output_dir.join(".fbuild.cache"), host);
    w.assign("CachePath", &quote_single(&cache_path));
    w.pop_scope();
}

fn emit_compilers(w: &mut Writer, project: &Project) {
    w.blank();
    w.section_header("Compilers");

    // Languages in sorted order, matching the original's `std::set<std::string>`
    // iteration (DESIGN.md: grounded on cmGlobalFastbuildGenerator.cxx
    // `WriteCompilers`).
    let mut languages = Vec::new();
    for target in &project.targets {
        if !target.kind.is_emitted() {
            continue;
        }
        for lang in target.languages() {
            if !languages.contains(&lang) {
                languages.push(lang);
            }
        }
    }
    languages.sort_by(|a, b| a.as_key().cmp(b.as_key()));

    if languages.is_empty() {
        return;
    }

    // Distinct compilers that resolve to the same location are coalesced
    // into one `Compiler()` block named `Compiler-<L1>-<L2>-...`; languages
    // with no `CMAKE_<LANG>_COMPILER` entry are skipped (no compiler to
    // describe for them).
    let mut location_to_name: BTreeMap<&str, String> = BTreeMap::new();
    let mut language_to_location: Vec<(&crate::model::Language, &str)> = Vec::new();
    for lang in &languages {
        let Some(location) = project.toolchain.compiler(lang) else { continue };
        let name = location_to_name.entry(location).or_insert_with(|| "Compiler".to_string());
        name.push('-');
        name.push_str(lang.as_key());
        language_to_location.push((lang, location));
    }

    for (location, name) in &location_to_name {
        let path = std::path::Path::new(location);
        let root = path.parent().map(|p| p.to_string_lossy().to_string()).unwrap_or_default();
        let file_name = path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();

        w.command("Compiler", Some(name.as_str()));
        w.push_scope('{', '}');
        w.assign("CompilerRoot", &quote_single(&root));
        w.assign("Executable", &quote_single(&format!("$CompilerRoot$/{file_name}")));
        w.pop_scope();
    }

    for (i, (lang, location)) in language_to_location.iter().enumerate() {
        let name = &location_to_name[location];
        if i == 0 {
            w.assign("Compiler_dummy", &quote_single(name));
        }
        w.assign(&format!("Compiler_{lang}"), &quote_single(name));
    }
}

fn emit_configurations(w: &mut Writer, project: &Project) {
    w.blank();
    w.section_header("Configurations");

    w.push_named_struct("ConfigBase");
    w.pop_scope();

    let configs = project.effective_configurations();
    for config in &configs {
        w.push_named_struct(&format!("config_{config}"));
        w.using("ConfigBase");
        w.pop_scope();
    }

    let names: Vec<String> = configs.iter().map(|c| format!(".config_{c}")).collect();
    w.array("all_configs", &names, "=");
}

fn emit_aliases(
    w: &mut Writer,
    project: &Project,
    order: &[&crate::model::Target],
    per_target: &BTreeMap<String, BTreeMap<String, TargetEmission>>,
) {
    w.blank();
    w.section_header("Aliases");

    let configs = project.effective_configurations();

    for config in &configs {
        let mut members = Vec::new();
        for target in order {
            let tc = target.config(config);
            if tc.excluded_from_all {
                continue;
            }
            members.push(quote_single(&format!("{}-{}", target.name, config)));
        }
        w.command("Alias", Some(config.as_str()));
        w.push_scope('{', '}');
        w.array("Targets", &members, "=");
        w.pop_scope();
    }

    for target in order {
        let name = target.name.to_string();
        let Some(by_config) = per_target.get(&name) else { continue };
        for config in &configs {
            let Some(emission) = by_config.get(config) else { continue };

            if !emission.linkable_deps.is_empty() {
                let alias = format!("{}-{}-products", target.name, config);
                w.command("Alias", Some(alias.as_str()));
                w.push_scope('{', '}');
                let members = crate::canon::wrap(
                    emission.linkable_deps.iter().map(|s| s.as_str()),
                    &format!("{}-", target.name),
                    &format!("-{config}"),
                );
                w.array("Targets", &members.into_iter().map(|m| quote_single(&m)).collect::<Vec<_>>(), "=");
                w.pop_scope();
            }

            let linkable = crate::canon::wrap(
                emission.linkable_deps.iter().map(|s| s.as_str()),
                &format!("{}-", target.name),
                &format!("-{config}"),
            );
            let order_deps = crate::canon::wrap(
                emission.order_deps.iter().map(|s| s.as_str()),
                &format!("{}-", target.name),
                &format!("-{config}"),
            );
            if !linkable.is_empty() || !order_deps.is_empty() {
                let alias = format!("{}-{}", target.name, config);
                w.command("Alias", Some(alias.as_str()));
                w.push_scope('{', '}');
                let mut members: Vec<String> = linkable.into_iter().map(|m| quote_single(&m)).collect();
                members.extend(order_deps.into_iter().map(|m| quote_single(&m)));
                w.array("Targets", &members, "=");
                w.pop_scope();
            }
        }
    }

    for target in order {
        let alias = target.name.to_string();
        w.command("Alias", Some(alias.as_str()));
        w.push_scope('{', '}');
        let members: Vec<String> = configs.iter().map(|c| quote_single(&format!("{}-{c}", target.name))).collect();
        w.array("Targets", &members, "=");
        w.pop_scope();
    }

    w.command("Alias", Some("All"));
    w.push_scope('{', '}');
    let members: Vec<String> = configs.iter().map(|c| quote_single(c)).collect();
    w.array("Targets", &members, "=");
    w.pop_scope();
}
