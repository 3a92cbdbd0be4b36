//! C1: stateful scoped-text emitter (spec §4.1).
//!
//! Every other component routes its output through a `Writer`; none of
//! them touch the sink directly. Indentation is one tab per open scope;
//! failure is limited to the sink, which is always the only thing that
//! can go wrong here.

use std::fmt::Write as _;

/// A scoped, indentation-tracking text emitter over an in-memory buffer.
///
/// The buffer is flushed to disk by the caller (`emit::document`) once
/// the whole `.bff` has been assembled — spec §5 calls for exactly one
/// output write per emission.
pub struct Writer {
    buf: String,
    indent: usize,
    scope_stack: Vec<char>,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            buf: String::new(),
            indent: 0,
            scope_stack: Vec::new(),
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buf.push('\t');
        }
    }

    /// Emit a line comment: `;s`.
    pub fn line_comment(&mut self, s: &str) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.buf, ";{}", s);
        self
    }

    /// Emit a blank line.
    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Emit a fixed banner line, e.g. for section headers.
    pub fn horizontal_rule(&mut self) -> &mut Self {
        self.line_comment(&"-".repeat(72))
    }

    /// Emit a section header framed by horizontal rules.
    pub fn section_header(&mut self, s: &str) -> &mut Self {
        self.horizontal_rule();
        self.line_comment(&format!(" {}", s));
        self.horizontal_rule()
    }

    /// Open a scope delimited by `open`/`close` (default `{`/`}`).
    pub fn push_scope(&mut self, open: char, close: char) -> &mut Self {
        self.write_indent();
        self.buf.push(open);
        self.buf.push('\n');
        self.indent += 1;
        self.scope_stack.push(close);
        self
    }

    /// Open a struct scope, delimited by `[`/`]`.
    pub fn push_struct_scope(&mut self) -> &mut Self {
        self.push_scope('[', ']')
    }

    /// Emit `.name =` followed by an opened struct scope — the shape a
    /// named, `Using`-able struct variable takes (spec §6 grammar; spec
    /// §4.8 items 3/5/8 each open one of these).
    pub fn push_named_struct(&mut self, name: &str) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.buf, ".{} =", name);
        self.push_struct_scope()
    }

    /// Close the innermost open scope.
    pub fn pop_scope(&mut self) -> &mut Self {
        let close = self
            .scope_stack
            .pop()
            .expect("pop_scope called with no open scope");
        self.indent -= 1;
        self.write_indent();
        self.buf.push(close);
        self.buf.push('\n');
        self
    }

    /// Emit `.key <op> value`.
    pub fn variable(&mut self, key: &str, value: &str, op: &str) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.buf, ".{} {} {}", key, op, value);
        self
    }

    /// Emit `.key = value` (the common case).
    pub fn assign(&mut self, key: &str, value: &str) -> &mut Self {
        self.variable(key, value, "=")
    }

    /// Emit `.key + value` (append).
    pub fn append(&mut self, key: &str, value: &str) -> &mut Self {
        self.variable(key, value, "+")
    }

    /// Emit `Name('arg') {` (or `Name() {` / just `Name {` variants),
    /// returning after the opening brace so the caller can fill the body
    /// and call `pop_scope`.
    pub fn command(&mut self, name: &str, arg: Option<&str>) -> &mut Self {
        self.write_indent();
        match arg {
            Some(a) if !a.is_empty() => {
                let _ = writeln!(self.buf, "{}('{}')", name, a);
            }
            _ => {
                let _ = writeln!(self.buf, "{}", name);
            }
        }
        self
    }

    /// Emit `Using(.struct_name)`.
    pub fn using(&mut self, struct_name: &str) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.buf, "Using(.{})", struct_name);
        self
    }

    /// Emit `.key [op] = { v1, v2, ... }` (one element per line, trailing
    /// comma elided on the last).
    pub fn array(&mut self, key: &str, values: &[String], op: &str) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.buf, ".{} {}", key, op);
        self.push_scope('{', '}');
        let last = values.len().saturating_sub(1);
        for (i, v) in values.iter().enumerate() {
            self.write_indent();
            if i == last {
                let _ = writeln!(self.buf, "{}", v);
            } else {
                let _ = writeln!(self.buf, "{},", v);
            }
        }
        self.pop_scope();
        self
    }

    /// Consume the writer, returning the accumulated text. Panics if any
    /// scope is still open, matching `pop_scope`'s entry assertion — a
    /// caller leaving scopes open has a bug worth surfacing immediately.
    pub fn finish(self) -> String {
        assert!(
            self.scope_stack.is_empty(),
            "writer finished with {} scope(s) still open",
            self.scope_stack.len()
        );
        self.buf
    }
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_emits_expected_shape() {
        let mut w = Writer::new();
        w.assign("Foo", "'bar'");
        assert_eq!(w.finish(), ".Foo = 'bar'\n");
    }

    #[test]
    fn nested_scope_indents() {
        let mut w = Writer::new();
        w.command("Alias", Some("foo"));
        w.push_scope('{', '}');
        w.assign("Targets", "{}");
        w.pop_scope();
        assert_eq!(w.finish(), "Alias('foo')\n{\n\t.Targets = {}\n}\n");
    }

    #[test]
    fn push_named_struct_emits_bracket_scope() {
        let mut w = Writer::new();
        w.push_named_struct("BaseConfig_Debug");
        w.assign("ConfigName", "'Debug'");
        w.pop_scope();
        assert_eq!(w.finish(), ".BaseConfig_Debug =\n[\n\t.ConfigName = 'Debug'\n]\n");
    }

    #[test]
    fn array_elides_trailing_comma() {
        let mut w = Writer::new();
        w.array("Targets", &["'a'".to_string(), "'b'".to_string()], "=");
        assert_eq!(w.finish(), ".Targets =\n{\n\t'a',\n\t'b'\n}\n");
    }

    #[test]
    #[should_panic]
    fn finish_panics_on_unbalanced_scope() {
        let mut w = Writer::new();
        w.push_scope('{', '}');
        w.finish();
    }
}
