//! Content hashing for custom-command identity.
//!
//! The custom-command alias table (spec §4.7/§9) keys on the *identity* of
//! a custom command, not its memory address: two commands with the same
//! command lines, inputs, outputs and working directory are the same
//! command even if attached to different targets. `Fingerprint` builds a
//! stable digest over those fields so the planner can deduplicate across
//! targets with a plain map lookup.

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple ordered components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // separator so "ab","c" != "a","bc"
        self
    }

    /// Add multiple strings, in order, to the fingerprint.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Add an optional string component.
    pub fn update_opt(&mut self, opt: Option<&str>) -> &mut Self {
        match opt {
            Some(s) => {
                self.hasher.update(b"\x01");
                self.update_str(s);
            }
            None => {
                self.hasher.update(b"\x00");
            }
        }
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_components_same_fingerprint() {
        let build = || {
            let mut fp = Fingerprint::new();
            fp.update_str("cc -c a.c -o a.o").update_strs(["a.c"]).update_strs(["a.o"]);
            fp.finish()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn different_components_different_fingerprint() {
        let mut fp1 = Fingerprint::new();
        fp1.update_str("cc -c a.c -o a.o");
        let mut fp2 = Fingerprint::new();
        fp2.update_str("cc -c b.c -o b.o");
        assert_ne!(fp1.finish(), fp2.finish());
    }

    #[test]
    fn component_boundaries_matter() {
        let mut fp1 = Fingerprint::new();
        fp1.update_str("ab").update_str("c");
        let mut fp2 = Fingerprint::new();
        fp2.update_str("a").update_str("bc");
        assert_ne!(fp1.finish(), fp2.finish());
    }

    #[test]
    fn optional_presence_is_distinguished() {
        let mut fp1 = Fingerprint::new();
        fp1.update_opt(Some(""));
        let mut fp2 = Fingerprint::new();
        fp2.update_opt(None);
        assert_ne!(fp1.finish(), fp2.finish());
    }
}
