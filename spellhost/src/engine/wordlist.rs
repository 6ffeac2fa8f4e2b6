//! Built-in word-list engine.
//!
//! A small reference engine exported behind the same C ABI the checker
//! consumes, so the crate is usable end-to-end without an external native
//! library. It checks membership against the word-list file and ranks
//! suggestions by edit distance; it performs no affix analysis (the affix
//! file only has to exist and be readable).
//!
//! The word-list format is the Hunspell `.dic` surface: an optional entry
//! count on the first line, one entry per line, affix flags after `/`
//! ignored, anything after whitespace ignored.

use std::cmp::Ordering::Equal;
use std::ffi::CStr;
use std::ffi::CString;
use std::path::Path;

use hashbrown::HashSet;
use itertools::Itertools;
use libc::{c_char, c_int};
use smol_str::SmolStr;

use super::{EngineApi, RawEngine};

const MAX_SUGGESTIONS: usize = 10;
const MAX_EDIT_DISTANCE: usize = 2;

struct WordlistEngine {
    words: HashSet<SmolStr>,
    session: HashSet<SmolStr>,
    removed: HashSet<SmolStr>,
}

fn parse_wordlist(bytes: &[u8]) -> HashSet<SmolStr> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines();

    // Hunspell-style count header; advisory only, so it is skipped rather
    // than enforced.
    let first = lines
        .next()
        .filter(|line| line.trim().parse::<usize>().is_err());

    first
        .into_iter()
        .chain(lines)
        .filter_map(|line| {
            let entry = line.split(&['/', '\t'][..]).next().unwrap_or("");
            let entry = entry.split_whitespace().next().unwrap_or("");
            if entry.is_empty() || entry.contains('\0') {
                None
            } else {
                Some(SmolStr::new(entry))
            }
        })
        .collect()
}

impl WordlistEngine {
    fn from_paths(affix: &Path, wordlist: &Path) -> Option<WordlistEngine> {
        // The affix rules are opaque to this engine, but a missing or
        // unreadable file is still a construction failure.
        if let Err(e) = std::fs::read(affix) {
            log::debug!("{}: affix file unreadable: {}", affix.display(), e);
            return None;
        }

        let bytes = match std::fs::read(wordlist) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{}: word list unreadable: {}", wordlist.display(), e);
                return None;
            }
        };

        let words = parse_wordlist(&bytes);
        if words.is_empty() {
            log::debug!("{}: no entries in word list", wordlist.display());
            return None;
        }

        Some(WordlistEngine {
            words,
            session: HashSet::new(),
            removed: HashSet::new(),
        })
    }

    fn is_accepted(&self, word: &str) -> bool {
        if word.is_empty() || self.removed.contains(word) {
            return false;
        }
        if self.session.contains(word) || self.words.contains(word) {
            return true;
        }
        // "Hello" is accepted when the list carries "hello".
        let lower = word.to_lowercase();
        lower != word && !self.removed.contains(lower.as_str()) && self.words.contains(lower.as_str())
    }

    fn suggest(&self, word: &str) -> Vec<SmolStr> {
        if word.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<(usize, f64, &SmolStr)> = self
            .words
            .iter()
            .chain(self.session.iter())
            .unique()
            .filter(|candidate| !self.removed.contains(candidate.as_str()))
            .filter(|candidate| candidate.as_str() != word)
            .filter(|candidate| {
                candidate.len().abs_diff(word.len()) <= MAX_EDIT_DISTANCE
            })
            .filter_map(|candidate| {
                let distance = strsim::levenshtein(word, candidate);
                if distance > MAX_EDIT_DISTANCE {
                    return None;
                }
                Some((distance, strsim::jaro_winkler(word, candidate), candidate))
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(Equal))
                .then_with(|| a.2.cmp(b.2))
        });

        candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, _, candidate)| candidate.clone())
            .collect()
    }

    fn add(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.removed.remove(word);
        self.session.insert(SmolStr::new(word));
    }

    fn remove(&mut self, word: &str) {
        self.session.remove(word);
        self.removed.insert(SmolStr::new(word));
    }
}

unsafe fn engine_mut<'a>(raw: *mut RawEngine) -> &'a mut WordlistEngine {
    &mut *(raw as *mut WordlistEngine)
}

unsafe fn cstr<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Constructs a word-list engine instance. Returns null when either file is
/// unreadable or the word list has no entries.
#[no_mangle]
pub extern "C" fn spellhost_wordlist_create(
    affix: *const c_char,
    wordlist: *const c_char,
) -> *mut RawEngine {
    let (affix, wordlist) = match unsafe { (cstr(affix), cstr(wordlist)) } {
        (Some(a), Some(w)) => (Path::new(a), Path::new(w)),
        _ => return std::ptr::null_mut(),
    };

    match WordlistEngine::from_paths(affix, wordlist) {
        Some(engine) => Box::into_raw(Box::new(engine)) as *mut RawEngine,
        None => std::ptr::null_mut(),
    }
}

/// Destroys an instance created by [`spellhost_wordlist_create`].
#[no_mangle]
pub extern "C" fn spellhost_wordlist_destroy(raw: *mut RawEngine) {
    if !raw.is_null() {
        drop(unsafe { Box::from_raw(raw as *mut WordlistEngine) });
    }
}

/// Returns 1 if `word` is accepted, 0 otherwise.
#[no_mangle]
pub extern "C" fn spellhost_wordlist_spell(raw: *mut RawEngine, word: *const c_char) -> c_int {
    if raw.is_null() {
        return 0;
    }
    match unsafe { cstr(word) } {
        Some(word) => unsafe { engine_mut(raw) }.is_accepted(word) as c_int,
        None => 0,
    }
}

/// Writes a caller-owned suggestion array to `slst` and returns its length.
/// Release with [`spellhost_wordlist_free_list`].
#[no_mangle]
pub extern "C" fn spellhost_wordlist_suggest(
    raw: *mut RawEngine,
    slst: *mut *mut *mut c_char,
    word: *const c_char,
) -> c_int {
    if raw.is_null() || slst.is_null() {
        return 0;
    }
    let word = match unsafe { cstr(word) } {
        Some(word) => word,
        None => return 0,
    };

    let suggestions = unsafe { engine_mut(raw) }.suggest(word);
    if suggestions.is_empty() {
        return 0;
    }

    let strings: Vec<*mut c_char> = suggestions
        .iter()
        .filter_map(|s| CString::new(s.as_str()).ok())
        .map(CString::into_raw)
        .collect();
    let count = strings.len() as c_int;

    unsafe { *slst = Box::into_raw(strings.into_boxed_slice()) as *mut *mut c_char };
    count
}

/// Releases an array produced by [`spellhost_wordlist_suggest`].
#[no_mangle]
pub extern "C" fn spellhost_wordlist_free_list(
    _raw: *mut RawEngine,
    slst: *mut *mut c_char,
    count: c_int,
) {
    if slst.is_null() || count <= 0 {
        return;
    }
    let slice = unsafe { std::slice::from_raw_parts_mut(slst, count as usize) };
    for item in slice.iter() {
        if !item.is_null() {
            drop(unsafe { CString::from_raw(*item) });
        }
    }
    drop(unsafe { Box::from_raw(slice as *mut [*mut c_char]) });
}

/// Adds `word` to the session dictionary. Returns 0.
#[no_mangle]
pub extern "C" fn spellhost_wordlist_add(raw: *mut RawEngine, word: *const c_char) -> c_int {
    if raw.is_null() {
        return 0;
    }
    if let Some(word) = unsafe { cstr(word) } {
        unsafe { engine_mut(raw) }.add(word);
    }
    0
}

/// Removes `word` from the session dictionary, masking it if it came from
/// the base word list. Returns 0.
#[no_mangle]
pub extern "C" fn spellhost_wordlist_remove(raw: *mut RawEngine, word: *const c_char) -> c_int {
    if raw.is_null() {
        return 0;
    }
    if let Some(word) = unsafe { cstr(word) } {
        unsafe { engine_mut(raw) }.remove(word);
    }
    0
}

/// The word-list engine's entry points as a host-consumable vtable.
pub fn api() -> EngineApi {
    EngineApi {
        create: spellhost_wordlist_create,
        destroy: spellhost_wordlist_destroy,
        spell: spellhost_wordlist_spell,
        suggest: spellhost_wordlist_suggest,
        free_list: spellhost_wordlist_free_list,
        add: spellhost_wordlist_add,
        remove: spellhost_wordlist_remove,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(words: &str) -> WordlistEngine {
        WordlistEngine {
            words: parse_wordlist(words.as_bytes()),
            session: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    #[test]
    fn parses_count_header_and_flags() {
        let words = parse_wordlist(b"3\nhello/NGS\nworld\ntest ph:tset\n");
        assert!(words.contains("hello"));
        assert!(words.contains("world"));
        assert!(words.contains("test"));
        assert!(!words.contains("3"));
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn wordlist_without_header_keeps_first_line() {
        let words = parse_wordlist(b"hello\nworld\n");
        assert_eq!(words.len(), 2);
        assert!(words.contains("hello"));
    }

    #[test]
    fn membership_and_case() {
        let engine = engine("2\nhello\nworld\n");
        assert!(engine.is_accepted("hello"));
        assert!(engine.is_accepted("Hello"));
        assert!(!engine.is_accepted("helo"));
        assert!(!engine.is_accepted(""));
    }

    #[test]
    fn session_add_and_remove() {
        let mut engine = engine("1\nhello\n");

        engine.add("flooba");
        assert!(engine.is_accepted("flooba"));
        engine.remove("flooba");
        assert!(!engine.is_accepted("flooba"));

        // Removal masks base-dictionary words too.
        engine.remove("hello");
        assert!(!engine.is_accepted("hello"));
        engine.add("hello");
        assert!(engine.is_accepted("hello"));
    }

    #[test]
    fn suggestions_are_closest_first() {
        let engine = engine("3\nhello\nhelp\nworld\n");
        let suggestions = engine.suggest("helo");
        assert_eq!(suggestions, vec!["hello", "help"]);
    }

    #[test]
    fn suggestions_skip_removed_and_identical() {
        let mut engine = engine("2\nhello\nhelp\n");
        engine.remove("help");
        assert_eq!(engine.suggest("helo"), vec!["hello"]);
        assert!(!engine.suggest("hello").iter().any(|s| s == "hello"));
    }

    #[test]
    fn c_abi_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let aff = dir.path().join("en.aff");
        let dic = dir.path().join("en.dic");
        std::fs::write(&aff, b"SET UTF-8\n").unwrap();
        std::fs::write(&dic, b"2\nhello\nworld\n").unwrap();

        let aff = CString::new(aff.to_str().unwrap()).unwrap();
        let dic = CString::new(dic.to_str().unwrap()).unwrap();

        let raw = spellhost_wordlist_create(aff.as_ptr(), dic.as_ptr());
        assert!(!raw.is_null());

        let word = CString::new("hello").unwrap();
        assert_eq!(spellhost_wordlist_spell(raw, word.as_ptr()), 1);

        let word = CString::new("helo").unwrap();
        let mut list: *mut *mut c_char = std::ptr::null_mut();
        let count = spellhost_wordlist_suggest(raw, &mut list, word.as_ptr());
        assert_eq!(count, 1);
        let first = unsafe { CStr::from_ptr(*list) }.to_str().unwrap();
        assert_eq!(first, "hello");
        spellhost_wordlist_free_list(raw, list, count);

        spellhost_wordlist_destroy(raw);
    }

    #[test]
    fn empty_wordlist_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let aff = dir.path().join("en.aff");
        let dic = dir.path().join("en.dic");
        std::fs::write(&aff, b"").unwrap();
        std::fs::write(&dic, b"0\n\n").unwrap();

        let aff = CString::new(aff.to_str().unwrap()).unwrap();
        let dic = CString::new(dic.to_str().unwrap()).unwrap();
        assert!(spellhost_wordlist_create(aff.as_ptr(), dic.as_ptr()).is_null());
    }
}
