//! The foreign analysis-engine boundary.
//!
//! The engine is an opaque C-style library: an instance is constructed from
//! two file paths, queried through plain functions, and torn down manually.
//! [`EngineApi`] captures those entry points as a vtable so a checker can
//! host any conforming engine; [`DictionaryInstance`] is the owning handle
//! that keeps construction and destruction paired.
//!
//! Suggestion buffers returned by an engine are arrays of C strings that the
//! caller owns and must free. [`DictionaryInstance::suggest`] performs that
//! ownership transfer: every string is copied into a Rust value, then the
//! strings and the array are released before it returns. No raw buffer
//! escapes this module.

use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;

use libc::{c_char, c_int};
use smol_str::SmolStr;
use thiserror::Error;

pub mod wordlist;

/// Opaque engine state behind the C boundary.
#[repr(C)]
pub struct RawEngine {
    _private: [u8; 0],
}

/// Entry points of a C-style analysis engine.
///
/// The shape mirrors Hunspell's C API: `create` returns null on failure,
/// `spell` returns nonzero for an accepted word, `suggest` fills a
/// caller-owned array of C strings that must be released with `free_list`.
#[derive(Clone, Copy, Debug)]
pub struct EngineApi {
    /// Constructs an instance from an affix file and a word-list file.
    pub create: unsafe extern "C" fn(*const c_char, *const c_char) -> *mut RawEngine,
    /// Destroys an instance created by `create`.
    pub destroy: unsafe extern "C" fn(*mut RawEngine),
    /// Nonzero if the word is accepted.
    pub spell: unsafe extern "C" fn(*mut RawEngine, *const c_char) -> c_int,
    /// Writes a suggestion array to `slst`, returns its length.
    pub suggest: unsafe extern "C" fn(*mut RawEngine, *mut *mut *mut c_char, *const c_char) -> c_int,
    /// Releases an array produced by `suggest`.
    pub free_list: unsafe extern "C" fn(*mut RawEngine, *mut *mut c_char, c_int),
    /// Adds a word to the instance's runtime dictionary.
    pub add: unsafe extern "C" fn(*mut RawEngine, *const c_char) -> c_int,
    /// Removes a word from the instance's runtime dictionary.
    pub remove: unsafe extern "C" fn(*mut RawEngine, *const c_char) -> c_int,
}

/// Failure at the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the materialized files.
    #[error("engine could not construct an instance from `{affix}` and `{wordlist}`")]
    ConstructionFailed {
        /// Physical affix-rules path handed to the engine.
        affix: PathBuf,
        /// Physical word-list path handed to the engine.
        wordlist: PathBuf,
    },

    /// A path could not be represented as a C string.
    #[error("path `{0}` is not representable at the C boundary")]
    InvalidPath(PathBuf),
}

fn path_cstring(path: &Path) -> Result<CString, EngineError> {
    CString::new(path.to_string_lossy().as_bytes().to_vec())
        .map_err(|_| EngineError::InvalidPath(path.to_path_buf()))
}

/// An owned, live engine instance.
///
/// Construction and destruction are paired one-to-one; [`close`] is
/// idempotent and [`Drop`] closes whatever is still open, so reload and
/// unload sequences cannot double-free. Holding the raw pointer makes this
/// type `!Send`/`!Sync`, which matches the engine contract: concurrent use
/// must be serialized by the caller.
///
/// [`close`]: DictionaryInstance::close
#[derive(Debug)]
pub struct DictionaryInstance {
    api: EngineApi,
    raw: *mut RawEngine,
}

impl DictionaryInstance {
    /// Constructs an instance from two physical dictionary paths.
    pub fn create(
        api: EngineApi,
        affix: &Path,
        wordlist: &Path,
    ) -> Result<DictionaryInstance, EngineError> {
        let aff = path_cstring(affix)?;
        let dic = path_cstring(wordlist)?;

        let raw = unsafe { (api.create)(aff.as_ptr(), dic.as_ptr()) };
        if raw.is_null() {
            return Err(EngineError::ConstructionFailed {
                affix: affix.to_path_buf(),
                wordlist: wordlist.to_path_buf(),
            });
        }

        Ok(DictionaryInstance { api, raw })
    }

    /// Whether the engine accepts `word`.
    pub fn spell(&self, word: &str) -> bool {
        let word = match CString::new(word) {
            Ok(v) => v,
            Err(_) => return false,
        };
        unsafe { (self.api.spell)(self.raw, word.as_ptr()) != 0 }
    }

    /// Ranked correction candidates for `word`, in engine order.
    ///
    /// The engine's buffer is copied and released in full before returning.
    pub fn suggest(&self, word: &str) -> Vec<SmolStr> {
        let word = match CString::new(word) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };

        let mut list: *mut *mut c_char = ptr::null_mut();
        let count = unsafe { (self.api.suggest)(self.raw, &mut list, word.as_ptr()) };
        if count <= 0 || list.is_null() {
            return Vec::new();
        }

        let mut values = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let item = unsafe { *list.add(i) };
            if item.is_null() {
                continue;
            }
            let value = unsafe { CStr::from_ptr(item) }.to_string_lossy();
            values.push(SmolStr::new(value));
        }

        unsafe { (self.api.free_list)(self.raw, list, count) };
        values
    }

    /// Adds `word` to the instance's runtime dictionary.
    pub fn add(&mut self, word: &str) {
        if let Ok(word) = CString::new(word) {
            unsafe { (self.api.add)(self.raw, word.as_ptr()) };
        }
    }

    /// Removes `word` from the instance's runtime dictionary.
    pub fn remove(&mut self, word: &str) {
        if let Ok(word) = CString::new(word) {
            unsafe { (self.api.remove)(self.raw, word.as_ptr()) };
        }
    }

    /// Destroys the underlying engine instance. Safe to call repeatedly.
    pub fn close(&mut self) {
        if !self.raw.is_null() {
            unsafe { (self.api.destroy)(self.raw) };
            self.raw = ptr::null_mut();
        }
    }
}

impl Drop for DictionaryInstance {
    fn drop(&mut self) {
        self.close();
    }
}

/// Routes the crate's log records to stderr. For hosts consuming the C ABI,
/// which cannot install a Rust `log` backend themselves.
#[cfg(feature = "logging")]
#[no_mangle]
pub extern "C" fn spellhost_enable_logging() {
    let _ = env_logger::try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicIsize, Ordering};

    // The counters are shared by every test in this module; serialize so the
    // balances stay meaningful.
    static LOCK: Mutex<()> = parking_lot::const_mutex(());
    static LIVE: AtomicIsize = AtomicIsize::new(0);
    static ALLOCS: AtomicIsize = AtomicIsize::new(0);

    extern "C" fn fake_create(affix: *const c_char, _wordlist: *const c_char) -> *mut RawEngine {
        let affix = unsafe { CStr::from_ptr(affix) }.to_string_lossy();
        if affix.ends_with("reject.aff") {
            return ptr::null_mut();
        }
        LIVE.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(0u8)) as *mut RawEngine
    }

    extern "C" fn fake_destroy(raw: *mut RawEngine) {
        LIVE.fetch_sub(1, Ordering::SeqCst);
        drop(unsafe { Box::from_raw(raw as *mut u8) });
    }

    extern "C" fn fake_spell(_raw: *mut RawEngine, word: *const c_char) -> c_int {
        let word = unsafe { CStr::from_ptr(word) }.to_string_lossy();
        (word == "hello") as c_int
    }

    extern "C" fn fake_suggest(
        _raw: *mut RawEngine,
        slst: *mut *mut *mut c_char,
        _word: *const c_char,
    ) -> c_int {
        let strings: Vec<*mut c_char> = ["zeta", "alpha", "mu"]
            .iter()
            .map(|s| {
                ALLOCS.fetch_add(1, Ordering::SeqCst);
                CString::new(*s).unwrap().into_raw()
            })
            .collect();
        let count = strings.len() as c_int;

        ALLOCS.fetch_add(1, Ordering::SeqCst);
        let boxed = strings.into_boxed_slice();
        unsafe { *slst = Box::into_raw(boxed) as *mut *mut c_char };
        count
    }

    extern "C" fn fake_free_list(_raw: *mut RawEngine, slst: *mut *mut c_char, count: c_int) {
        let slice = unsafe { std::slice::from_raw_parts_mut(slst, count as usize) };
        for item in slice.iter() {
            drop(unsafe { CString::from_raw(*item) });
            ALLOCS.fetch_sub(1, Ordering::SeqCst);
        }
        drop(unsafe { Box::from_raw(slice as *mut [*mut c_char]) });
        ALLOCS.fetch_sub(1, Ordering::SeqCst);
    }

    extern "C" fn fake_add(_raw: *mut RawEngine, _word: *const c_char) -> c_int {
        0
    }

    extern "C" fn fake_remove(_raw: *mut RawEngine, _word: *const c_char) -> c_int {
        0
    }

    fn fake_api() -> EngineApi {
        EngineApi {
            create: fake_create,
            destroy: fake_destroy,
            spell: fake_spell,
            suggest: fake_suggest,
            free_list: fake_free_list,
            add: fake_add,
            remove: fake_remove,
        }
    }

    #[test]
    fn create_and_drop_are_paired() {
        let _guard = LOCK.lock();

        let instance =
            DictionaryInstance::create(fake_api(), Path::new("a.aff"), Path::new("a.dic")).unwrap();
        assert_eq!(LIVE.load(Ordering::SeqCst), 1);
        drop(instance);
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn close_is_idempotent() {
        let _guard = LOCK.lock();

        let mut instance =
            DictionaryInstance::create(fake_api(), Path::new("a.aff"), Path::new("a.dic")).unwrap();
        instance.close();
        instance.close();
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
        // Drop after close must not destroy again.
        drop(instance);
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_construction_reports_paths() {
        let _guard = LOCK.lock();

        let err = DictionaryInstance::create(
            fake_api(),
            Path::new("/tmp/reject.aff"),
            Path::new("/tmp/any.dic"),
        )
        .unwrap_err();

        match err {
            EngineError::ConstructionFailed { affix, wordlist } => {
                assert_eq!(affix, Path::new("/tmp/reject.aff"));
                assert_eq!(wordlist, Path::new("/tmp/any.dic"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn suggest_copies_then_frees_the_native_buffer() {
        let _guard = LOCK.lock();

        let instance =
            DictionaryInstance::create(fake_api(), Path::new("a.aff"), Path::new("a.dic")).unwrap();

        let values = instance.suggest("anything");
        assert_eq!(values, vec!["zeta", "alpha", "mu"]);
        // Engine order is preserved, and every allocation was released.
        assert_eq!(ALLOCS.load(Ordering::SeqCst), 0);

        let again = instance.suggest("anything");
        assert_eq!(again.len(), 3);
        assert_eq!(ALLOCS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn interior_nul_is_absorbed() {
        let _guard = LOCK.lock();

        let mut instance =
            DictionaryInstance::create(fake_api(), Path::new("a.aff"), Path::new("a.dic")).unwrap();

        assert!(!instance.spell("he\0llo"));
        assert!(instance.suggest("he\0llo").is_empty());
        instance.add("he\0llo");
        instance.remove("he\0llo");
        assert_eq!(ALLOCS.load(Ordering::SeqCst), 0);
    }
}
