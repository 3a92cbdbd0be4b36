//! C2: name & path canonicalization (spec §4.2).

use std::path::Path;

use crate::config::HostFamily;

/// Placeholders that survive `escape_literal` verbatim (spec §3 invariant
/// on the escape law, §4.4/§4.8 where these are substituted in later).
const PRESERVED_PLACEHOLDERS: &[&str] = &[
    "$ConfigName$",
    "$CompileFlags$",
    "$CompileDefineFlags$",
    "$CompilerCmdBaseFlags$",
    "$LinkLibs$",
    "$BaseLinkerOptions$",
    "$Linker$",
    "$LinkerOptions$",
    "$LinkerOutput$",
    "$TargetOutput$",
    "$TargetOutDir$",
    "$TargetNamePDB$",
    "$FB_INPUT_1_PLACEHOLDER$",
    "$FB_INPUT_2_PLACEHOLDER$",
];

/// Convert a path to the slash convention the given host family expects.
pub fn convert_path(p: &Path, host: HostFamily) -> String {
    let s = p.to_string_lossy().replace('\\', "/");
    match host {
        HostFamily::Windows => s.replace('/', "\\"),
        HostFamily::Unix => s,
    }
}

/// Wrap `s` with `q` on both sides. Inputs are assumed not to contain `q`
/// (spec §4.2: "no embedded-quote escaping").
pub fn quote(s: &str, q: char) -> String {
    format!("{q}{s}{q}")
}

/// `quote` with FASTBuild's default single-quote.
pub fn quote_single(s: &str) -> String {
    quote(s, '\'')
}

/// `[prefix+x+suffix for x in xs]`, preserving order.
pub fn wrap<'a>(xs: impl IntoIterator<Item = &'a str>, prefix: &str, suffix: &str) -> Vec<String> {
    xs.into_iter().map(|x| format!("{prefix}{x}{suffix}")).collect()
}

/// Escape every literal `$` as `^$`, except within the whitelisted
/// placeholder substrings, which are preserved verbatim (spec §3
/// invariant "Escape law").
pub fn escape_literal(s: &str) -> String {
    if !s.contains('$') {
        return s.to_string();
    }

    // Find every preserved placeholder's byte ranges first so a literal
    // `$` next to one isn't mistaken for part of it.
    let mut protected_ranges: Vec<(usize, usize)> = Vec::new();
    for placeholder in PRESERVED_PLACEHOLDERS {
        let mut start = 0;
        while let Some(pos) = s[start..].find(placeholder) {
            let abs_start = start + pos;
            let abs_end = abs_start + placeholder.len();
            protected_ranges.push((abs_start, abs_end));
            start = abs_end;
        }
    }
    protected_ranges.sort_unstable();

    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let bytes = s.as_bytes();
    while i < bytes.len() {
        if let Some(&(start, end)) = protected_ranges.iter().find(|&&(start, _)| start == i) {
            out.push_str(&s[start..end]);
            i = end;
            continue;
        }
        let ch = s[i..].chars().next().unwrap();
        if ch == '$' {
            out.push_str("^$");
        } else {
            out.push(ch);
        }
        i += ch.len_utf8();
    }
    out
}

/// `ensure-directory-exists(p, root)` (spec §4.2), re-exported here for
/// callers that think of it as part of the canonicalizer's surface; the
/// filesystem primitive itself lives in `util::fs`.
pub fn ensure_directory_exists(p: &Path, root: &Path) -> anyhow::Result<()> {
    crate::util::fs::ensure_directory_exists(p, root)
}
