/*! Dictionary hosting for C-style spell-checking engines.

Morphological spell checkers such as Hunspell are C libraries that want two
physical files (affix rules plus a word list) handed to them by path. The
resources an application actually ships are often virtual: packed into an
archive, compiled into the binary, or otherwise not directly openable. This
crate owns the plumbing in between: materializing virtual resources to real
files, keeping at most one live engine instance with correct teardown and
reinitialization semantics, and moving suggestion-buffer ownership across
the C boundary without leaks or double-frees.

The analysis engine itself is an external collaborator described by an
[`EngineApi`](engine::EngineApi) vtable; a small word-list reference engine
ships in [`engine::wordlist`] so everything runs out of the box.

# Usage example

```no_run
use spellhost::checker::SpellChecker;
use spellhost::engine::wordlist;
use spellhost::vfs::Fs;

# fn main() -> Result<(), spellhost::checker::LoadError> {
let mut checker = SpellChecker::new(Fs, wordlist::api());
checker.load("/usr/share/myspell/en_US.aff", "/usr/share/myspell/en_US.dic")?;

if !checker.check("recieve") {
    for suggestion in checker.suggest("recieve").iter() {
        println!("did you mean {}?", suggestion);
    }
}
# Ok(())
# }
```

Dictionaries packed into a zip archive load the same way through
[`vfs::zip::Filesystem`]; the checker materializes the entries to a
per-process temp directory before handing them to the engine.
*/

#![warn(missing_docs)]
pub mod checker;
pub mod engine;
pub mod materialize;
pub mod vfs;
