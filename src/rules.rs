//! C3: rule-template placeholder substitution (spec §4.3).

/// The fields a rule template may reference, e.g.
/// `"<CMAKE_CXX_COMPILER> <FLAGS> -c <SOURCE> -o <OBJECT>"`.
///
/// Every field is optional; a template referencing an unset field leaves
/// the placeholder untouched (spec §4.3: "leaving unrecognized
/// placeholders intact" extends naturally to fields the caller has
/// nothing to substitute for this particular expansion).
#[derive(Debug, Clone, Default)]
pub struct RuleVars {
    pub rule_launcher: Option<String>,
    pub target_name: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
    pub object: Option<String>,
    pub object_dir: Option<String>,
    pub object_file_dir: Option<String>,
    pub flags: Option<String>,
    pub defines: Option<String>,
    pub target_pdb: Option<String>,
    pub target_compile_pdb: Option<String>,
    pub target_soname: Option<String>,
    pub target_version_major: Option<String>,
    pub target_version_minor: Option<String>,
    pub link_libraries: Option<String>,
    pub link_flags: Option<String>,
    pub output: Option<String>,
    pub objects: Option<String>,
    pub target: Option<String>,
}

impl RuleVars {
    /// `(placeholder, value)` pairs, in the fixed order placeholders are
    /// looked up. Order does not affect correctness since substitution is
    /// a single left-to-right scan over the template, not the field list,
    /// but a stable order keeps this deterministic to read.
    fn entries(&self) -> Vec<(&'static str, &Option<String>)> {
        vec![
            ("<CMAKE_RULE_LAUNCH_COMPILE>", &self.rule_launcher),
            ("<TARGET_NAME>", &self.target_name),
            ("<LANGUAGE>", &self.language),
            ("<SOURCE>", &self.source),
            ("<OBJECT>", &self.object),
            ("<OBJECT_DIR>", &self.object_dir),
            ("<OBJECT_FILE_DIR>", &self.object_file_dir),
            ("<FLAGS>", &self.flags),
            ("<DEFINES>", &self.defines),
            ("<TARGET_PDB>", &self.target_pdb),
            ("<TARGET_COMPILE_PDB>", &self.target_compile_pdb),
            ("<TARGET_SONAME>", &self.target_soname),
            ("<TARGET_VERSION_MAJOR>", &self.target_version_major),
            ("<TARGET_VERSION_MINOR>", &self.target_version_minor),
            ("<LINK_LIBRARIES>", &self.link_libraries),
            ("<LINK_FLAGS>", &self.link_flags),
            ("<OBJECTS>", &self.objects),
            ("<TARGET>", &self.target),
            // `<OUTPUT>` and `<OBJECTS>`/`<TARGET>` are distinct tokens in
            // the upstream rule grammar; keep `<OUTPUT>` as its own entry.
            ("<OUTPUT>", &self.output),
        ]
    }
}

/// Substitute every recognized placeholder in `template` with the
/// corresponding field of `vars`, in a single left-to-right pass — matches
/// are not re-scanned after substitution (spec §4.3).
pub fn expand(template: &str, vars: &RuleVars) -> String {
    let entries = vars.entries();
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    'outer: while i < bytes.len() {
        if bytes[i] == b'<' {
            for (placeholder, value) in &entries {
                if template[i..].starts_with(placeholder) {
                    if let Some(v) = value {
                        out.push_str(v);
                    } else {
                        out.push_str(placeholder);
                    }
                    i += placeholder.len();
                    continue 'outer;
                }
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Split a rule template string on `;` into its constituent command
/// lines (spec §4.4 "split on `;`").
pub fn split_command_lines(template: &str) -> Vec<&str> {
    template.split(';').map(str::trim).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let vars = RuleVars {
            source: Some("%1".to_string()),
            object: Some("%2".to_string()),
            flags: Some("-O2".to_string()),
            ..Default::default()
        };
        let result = expand("cc <FLAGS> -c <SOURCE> -o <OBJECT>", &vars);
        assert_eq!(result, "cc -O2 -c %1 -o %2");
    }

    #[test]
    fn leaves_unrecognized_placeholders_intact() {
        let vars = RuleVars::default();
        let result = expand("<NOT_A_REAL_FIELD> stays", &vars);
        assert_eq!(result, "<NOT_A_REAL_FIELD> stays");
    }

    #[test]
    fn unset_field_leaves_placeholder_intact() {
        let vars = RuleVars::default();
        let result = expand("<SOURCE> <OBJECT>", &vars);
        assert_eq!(result, "<SOURCE> <OBJECT>");
    }

    #[test]
    fn single_pass_does_not_reexpand_substituted_content() {
        let vars = RuleVars {
            source: Some("<OBJECT>".to_string()),
            object: Some("final.o".to_string()),
            ..Default::default()
        };
        let result = expand("<SOURCE> <OBJECT>", &vars);
        assert_eq!(result, "<OBJECT> final.o");
    }

    #[test]
    fn split_command_lines_trims_and_drops_empty() {
        assert_eq!(
            split_command_lines(" cc -c a.c ; ; cc -c b.c "),
            vec!["cc -c a.c", "cc -c b.c"]
        );
    }
}
