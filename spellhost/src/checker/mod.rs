//! Engine lifecycle and the spell-checking query surface.

use thiserror::Error;

use crate::engine::{DictionaryInstance, EngineApi, EngineError};
use crate::materialize::{Materializer, MaterializeError};
use crate::vfs::Filesystem;

pub mod suggestion;

use self::suggestion::SuggestionSet;

/// Failure to bring a dictionary pair up in the engine.
///
/// Whatever the cause, the checker is left unloaded: a new load always tears
/// the previous instance down before anything that can fail.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A resource could not be materialized to a physical path.
    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    /// The engine rejected the materialized files.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A spell checker hosting at most one live engine instance.
///
/// This is an explicit context object: the single-instance invariant is a
/// property of each value, not of any process-global state. All operations
/// are synchronous and the checker does no internal locking; callers that
/// share one across threads must serialize access themselves.
pub struct SpellChecker<FS: Filesystem> {
    fs: FS,
    materializer: Materializer,
    api: EngineApi,
    instance: Option<DictionaryInstance>,
    affix_path: Option<String>,
    wordlist_path: Option<String>,
}

impl<FS: Filesystem> SpellChecker<FS> {
    /// Creates an unloaded checker reading resources from `fs` and hosting
    /// instances of the engine behind `api`.
    pub fn new(fs: FS, api: EngineApi) -> SpellChecker<FS> {
        SpellChecker::with_materializer(fs, api, Materializer::new())
    }

    /// Creates an unloaded checker with an explicit materializer (useful to
    /// pick the temp root).
    pub fn with_materializer(
        fs: FS,
        api: EngineApi,
        materializer: Materializer,
    ) -> SpellChecker<FS> {
        SpellChecker {
            fs,
            materializer,
            api,
            instance: None,
            affix_path: None,
            wordlist_path: None,
        }
    }

    /// Loads a dictionary from an affix-rules resource and a word-list
    /// resource.
    ///
    /// Any live instance is destroyed first, so after a failed load the
    /// checker is unloaded rather than still serving the previous
    /// dictionary. On success the originally supplied identifiers are
    /// recorded and reported by [`affix_path`](SpellChecker::affix_path) and
    /// [`wordlist_path`](SpellChecker::wordlist_path).
    pub fn load(&mut self, affix: &str, wordlist: &str) -> Result<(), LoadError> {
        self.unload();

        let aff = self.materializer.materialize(&self.fs, affix)?;
        let dic = self.materializer.materialize(&self.fs, wordlist)?;

        let instance = DictionaryInstance::create(self.api, &aff, &dic)?;
        log::debug!("dictionary loaded: {} + {}", affix, wordlist);
        // Probe the fresh instance once so a structurally-valid but useless
        // dictionary shows up in the logs right away.
        log::debug!("engine probe: spell(\"test\") = {}", instance.spell("test"));

        self.instance = Some(instance);
        self.affix_path = Some(affix.to_string());
        self.wordlist_path = Some(wordlist.to_string());
        Ok(())
    }

    /// Destroys the live instance, if any. A no-op when already unloaded.
    pub fn unload(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.close();
            log::debug!("dictionary unloaded");
        }
        self.affix_path = None;
        self.wordlist_path = None;
    }

    /// Whether a dictionary instance is currently live.
    pub fn is_loaded(&self) -> bool {
        self.instance.is_some()
    }

    /// The affix-rules identifier the live dictionary was loaded from.
    pub fn affix_path(&self) -> Option<&str> {
        self.affix_path.as_deref()
    }

    /// The word-list identifier the live dictionary was loaded from.
    pub fn wordlist_path(&self) -> Option<&str> {
        self.wordlist_path.as_deref()
    }

    /// Whether the engine accepts `word`.
    ///
    /// Returns `false` when no dictionary is loaded; that case is logged but
    /// indistinguishable from a rejected word in the return value.
    pub fn check(&self, word: &str) -> bool {
        match &self.instance {
            Some(instance) => instance.spell(word),
            None => {
                log::warn!("check({:?}): no dictionary loaded", word);
                false
            }
        }
    }

    /// Ranked correction candidates for `word`, in the engine's order.
    ///
    /// Returns an empty set when no dictionary is loaded or the engine has
    /// no candidates.
    pub fn suggest(&self, word: &str) -> SuggestionSet {
        match &self.instance {
            Some(instance) => SuggestionSet::from_values(instance.suggest(word)),
            None => {
                log::warn!("suggest({:?}): no dictionary loaded", word);
                SuggestionSet::new()
            }
        }
    }

    /// Adds `word` to the live instance's accepted words for the rest of the
    /// session. Not persisted anywhere; a no-op when unloaded.
    pub fn add_word(&mut self, word: &str) {
        match &mut self.instance {
            Some(instance) => instance.add(word),
            None => log::warn!("add_word({:?}): no dictionary loaded", word),
        }
    }

    /// Removes `word` from the live instance's accepted words. A no-op when
    /// unloaded or when the engine does not know the word.
    pub fn remove_word(&mut self, word: &str) {
        match &mut self.instance {
            Some(instance) => instance.remove(word),
            None => log::warn!("remove_word({:?}): no dictionary loaded", word),
        }
    }
}
