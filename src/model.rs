//! The project model this crate consumes (spec §3).
//!
//! The core owns none of this data persistently — it is handed a `Project`
//! for the duration of one emission and discards all derived state
//! afterward (spec §3 "Lifecycle", §5). Populating a `Project` from a real
//! meta build-system's evaluated state is explicitly out of scope (spec
//! §1); these types are the read-only façade spec §6 describes.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::InternedString;

/// A source-file language. `Other` carries through any token the model
/// supplies without the core special-casing it (spec §3: "any other name
/// is accepted but not special-cased" — stated there for configurations,
/// applied here for languages for the same reason: the rule-variable
/// table is keyed by whatever string the model uses).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    C,
    Cxx,
    Rc,
    Other(String),
}

impl Language {
    pub fn as_key(&self) -> &str {
        match self {
            Language::C => "C",
            Language::Cxx => "CXX",
            Language::Rc => "RC",
            Language::Other(s) => s.as_str(),
        }
    }

    /// Relative link priority when a linker language must be derived from a
    /// target's source languages — higher wins. CXX takes precedence over C
    /// so that C++ runtime/exception-handling link requirements are honored
    /// when a target mixes both.
    fn link_priority(&self) -> u8 {
        match self {
            Language::Rc => 0,
            Language::C => 1,
            Language::Cxx => 2,
            Language::Other(_) => 1,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// Target kind (spec §3). `InterfaceLibrary` targets are skipped entirely
/// by the graph builder; `Unknown` targets are silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Executable,
    SharedLibrary,
    StaticLibrary,
    ModuleLibrary,
    ObjectLibrary,
    Utility,
    GlobalTarget,
    InterfaceLibrary,
    Unknown,
}

impl TargetKind {
    /// Whether this kind has a linker stage at all (spec §4.8 item 8).
    pub fn has_linker_stage(&self) -> bool {
        !matches!(
            self,
            TargetKind::ObjectLibrary | TargetKind::Utility | TargetKind::GlobalTarget
        )
    }

    /// Whether this kind is ever skipped by the graph builder (spec §3
    /// invariants, §4.6).
    pub fn is_emitted(&self) -> bool {
        !matches!(self, TargetKind::InterfaceLibrary | TargetKind::Unknown)
    }
}

/// A single line of a custom command: a program plus its arguments, before
/// launcher-prefixing and chaining (spec §4.7 item 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        CommandLine {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render as a single shell-visible token string (program then args,
    /// space-joined). Used before the chaining/splitting done in C4/C7.
    pub fn to_shell_string(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len());
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// A custom command (spec §3, §4.7).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomCommand {
    /// Shell command lines, in sequence.
    pub command_lines: Vec<CommandLine>,
    /// Declared inputs — a mix of target names and file paths.
    pub depends: Vec<String>,
    /// Declared outputs.
    pub outputs: Vec<String>,
    /// Byproducts (treated identically to outputs for dependency purposes).
    pub byproducts: Vec<String>,
    /// Optional working directory.
    pub working_directory: Option<PathBuf>,
    /// Optional launcher program prefixed onto every command line
    /// (e.g. a compiler-cache wrapper).
    pub launcher: Option<String>,
}

impl CustomCommand {
    /// Whether this command's outputs vary by configuration (spec §4.7
    /// item 4: the literal substring `$ConfigName$` appears in an output
    /// or byproduct).
    pub fn is_config_dependent(&self) -> bool {
        self.outputs
            .iter()
            .chain(self.byproducts.iter())
            .any(|o| o.contains("$ConfigName$"))
    }
}

/// A source file (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Detected (or explicitly assigned) language. `None` means this file
    /// does not participate in compilation (e.g. a header).
    pub language: Option<Language>,
    /// Per-file `COMPILE_FLAGS`.
    #[serde(default)]
    pub compile_flags: Option<String>,
    /// Per-file `COMPILE_DEFINITIONS`.
    #[serde(default)]
    pub compile_definitions: Vec<String>,
    /// Per-file `COMPILE_DEFINITIONS_<CONFIG>`, keyed by the upper-cased
    /// configuration name.
    #[serde(default)]
    pub compile_definitions_by_config: HashMap<String, Vec<String>>,
    /// Name of the `ObjectLibrary` target this source's compiled object is
    /// sourced from, if this "source" is really a reference to one.
    #[serde(default)]
    pub object_library: Option<InternedString>,
    /// Declared for dependency tracking only; never produced as a real
    /// file (spec §3, §4.7 item 1).
    #[serde(default)]
    pub symbolic: bool,
    /// Custom command that generates this file, if any.
    #[serde(default)]
    pub custom_command: Option<CustomCommand>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: Option<Language>) -> Self {
        SourceFile {
            path: path.into(),
            language,
            compile_flags: None,
            compile_definitions: Vec::new(),
            compile_definitions_by_config: HashMap::new(),
            object_library: None,
            symbolic: false,
            custom_command: None,
        }
    }
}

/// Per-configuration attributes of a target (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Output file name (without directory), e.g. `libfoo.a`.
    pub output_name: Option<String>,
    /// Output directory, relative to the home output directory unless
    /// absolute.
    pub output_directory: Option<PathBuf>,
    /// Libraries to link, in link order.
    #[serde(default)]
    pub link_libraries: Vec<String>,
    /// Directories to search for link libraries.
    #[serde(default)]
    pub link_directories: Vec<PathBuf>,
    /// Directories searched for headers at compile time.
    #[serde(default)]
    pub include_directories: Vec<PathBuf>,
    /// Additional linker flags.
    #[serde(default)]
    pub link_flags: Vec<String>,
    /// macOS-style framework search path entries.
    #[serde(default)]
    pub framework_path: Vec<PathBuf>,
    /// Target compile definitions (target+config level, before per-source).
    #[serde(default)]
    pub compile_definitions: Vec<String>,
    /// Target compile options (before per-source `COMPILE_FLAGS`).
    #[serde(default)]
    pub compile_options: Vec<String>,
    /// Module-definition (`.def`) file, Windows DLL exports.
    pub module_definition_file: Option<PathBuf>,
    /// Major/minor version for SONAME-style versioned shared libraries.
    pub version_major: Option<u32>,
    pub version_minor: Option<u32>,
    /// If true, this target is excluded from the per-config `All` alias
    /// (spec §4.9 "Aliases").
    #[serde(default)]
    pub excluded_from_all: bool,
}

/// A build target (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: InternedString,
    pub kind: TargetKind,
    #[serde(default)]
    pub sources: Vec<SourceFile>,
    #[serde(default)]
    pub pre_build: Vec<CustomCommand>,
    #[serde(default)]
    pub pre_link: Vec<CustomCommand>,
    #[serde(default)]
    pub post_build: Vec<CustomCommand>,
    /// Explicit linker-language override. When absent the linker language
    /// is derived from the highest-priority language among this target's
    /// compiled sources (`Language::link_priority`).
    #[serde(default)]
    pub linker_language: Option<Language>,
    /// Direct target-name dependencies (link or order, kind-agnostic here;
    /// the graph builder and target emitter each apply their own filters).
    #[serde(default)]
    pub depends: Vec<InternedString>,
    /// For `GlobalTarget`: the utility set substituted for `depends` by the
    /// graph builder (spec §4.6).
    #[serde(default)]
    pub utilities: Vec<InternedString>,
    /// Whether a `GlobalTarget`'s originating directory is the project
    /// root. Per-directory duplicate `GlobalTarget`s not anchored at the
    /// root are stripped by the graph builder (spec §4.6). Always `true`
    /// for non-`GlobalTarget` kinds.
    #[serde(default = "default_true")]
    pub is_root_scoped: bool,
    /// Export macro name for shared libraries (propagated into per-source
    /// defines per spec §4.4 "Per-source defines").
    #[serde(default)]
    pub export_macro: Option<String>,
    #[serde(default)]
    pub configs: HashMap<String, TargetConfig>,
}

fn default_true() -> bool {
    true
}

impl Target {
    pub fn new(name: impl Into<InternedString>, kind: TargetKind) -> Self {
        Target {
            name: name.into(),
            kind,
            sources: Vec::new(),
            pre_build: Vec::new(),
            pre_link: Vec::new(),
            post_build: Vec::new(),
            linker_language: None,
            depends: Vec::new(),
            utilities: Vec::new(),
            is_root_scoped: true,
            export_macro: None,
            configs: HashMap::new(),
        }
    }

    /// Derive the effective linker language (spec §3 "linker language
    /// (derived)").
    pub fn effective_linker_language(&self) -> Option<Language> {
        if let Some(ref lang) = self.linker_language {
            return Some(lang.clone());
        }
        self.sources
            .iter()
            .filter_map(|s| s.language.clone())
            .max_by_key(|l| l.link_priority())
    }

    /// Every language used by any compiled source in this target, in
    /// first-seen order (used to drive the per-language `ObjectGroup_<L>`
    /// loop, spec §4.8 item 7).
    pub fn languages(&self) -> Vec<Language> {
        let mut seen = Vec::new();
        for s in &self.sources {
            if let Some(ref lang) = s.language {
                if !seen.contains(lang) {
                    seen.push(lang.clone());
                }
            }
        }
        seen
    }

    pub fn config(&self, config: &str) -> TargetConfig {
        self.configs.get(config).cloned().unwrap_or_default()
    }
}

/// Toolchain rule-template table (spec §3 "Toolchain variable table").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolchainVars {
    vars: HashMap<String, String>,
}

impl ToolchainVars {
    pub fn new() -> Self {
        ToolchainVars::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn compile_object_rule(&self, lang: &Language) -> Option<&str> {
        self.get(&format!("CMAKE_{}_COMPILE_OBJECT", lang.as_key()))
    }

    pub fn archive_create_rule(&self, lang: &Language) -> Option<&str> {
        self.get(&format!("CMAKE_{}_ARCHIVE_CREATE", lang.as_key()))
    }

    pub fn archive_finish_rule(&self, lang: &Language) -> Option<&str> {
        self.get(&format!("CMAKE_{}_ARCHIVE_FINISH", lang.as_key()))
    }

    pub fn compiler(&self, lang: &Language) -> Option<&str> {
        self.get(&format!("CMAKE_{}_COMPILER", lang.as_key()))
    }

    pub fn compiler_id(&self, lang: &Language) -> Option<&str> {
        self.get(&format!("CMAKE_{}_COMPILER_ID", lang.as_key()))
    }

    pub fn library_path_flag(&self) -> &str {
        self.get("CMAKE_LIBRARY_PATH_FLAG").unwrap_or("-L")
    }

    /// `CreateRuleVariable` lookup for a link stage (spec §4.4 "Base link
    /// command"): `CMAKE_<kind>_LINKER_<LANG>` by convention, tried before
    /// the generic `CMAKE_<LANG>_LINK_EXECUTABLE`/`_SHARED_LIBRARY`/
    /// `_MODULE_LIBRARY` fallbacks.
    pub fn link_rule(&self, kind: TargetKind, lang: &Language) -> Option<&str> {
        let suffix = match kind {
            TargetKind::Executable => "LINK_EXECUTABLE",
            TargetKind::SharedLibrary => "CREATE_SHARED_LIBRARY",
            TargetKind::ModuleLibrary => "CREATE_SHARED_MODULE",
            _ => return None,
        };
        self.get(&format!("CMAKE_{}_{}", lang.as_key(), suffix))
    }
}

/// A complete emission input (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub targets: Vec<Target>,
    /// Configuration names; defaults to `{Debug, Release}` when empty
    /// (spec §3).
    #[serde(default)]
    pub configurations: Vec<String>,
    pub toolchain: ToolchainVars,
    /// The directory `fbuild.bff` and all ensured-to-exist directories are
    /// written relative to (spec §6).
    pub home_output_dir: PathBuf,
}

impl Project {
    /// Effective configuration list, applying the `{Debug, Release}`
    /// default (spec §3, §7 "recoverable").
    pub fn effective_configurations(&self) -> Vec<String> {
        if self.configurations.is_empty() {
            vec!["Debug".to_string(), "Release".to_string()]
        } else {
            self.configurations.clone()
        }
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name.as_str() == name)
    }
}
