use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use spellhost::checker::{suggestion::SuggestionSet, SpellChecker};
use spellhost::engine::wordlist;
use spellhost::vfs::{self, Filesystem, Fs};

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &SuggestionSet);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &SuggestionSet) {
        for suggestion in suggestions.iter() {
            println!("{}", suggestion);
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct WordResult {
    word: String,
    is_correct: bool,
    suggestions: SuggestionSet,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<WordResult>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(WordResult {
            word: word.to_owned(),
            is_correct,
            suggestions: SuggestionSet::new(),
        });
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &SuggestionSet) {
        let i = self.results.len() - 1;
        self.results[i].suggestions = suggestions.clone();
    }

    fn finish(&mut self) {
        println!("{}", serde_json::to_string_pretty(self).expect("json"));
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "affix rules file, or entry name inside --archive", meta = "PATH")]
    affix: Option<String>,

    #[options(help = "word list file, or entry name inside --archive", meta = "PATH")]
    wordlist: Option<String>,

    #[options(
        no_short,
        help = "zip archive to read the dictionary pair from",
        meta = "PATH"
    )]
    archive: Option<PathBuf>,

    #[options(short = "S", help = "show suggestions for rejected words")]
    suggest: bool,

    #[options(
        no_short,
        long = "always-suggest",
        help = "always show suggestions even if the word is accepted"
    )]
    always_suggest: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be checked (stdin when empty)")]
    inputs: Vec<String>,
}

fn run<FS: Filesystem>(
    checker: &SpellChecker<FS>,
    words: Vec<String>,
    writer: &mut dyn OutputWriter,
    is_suggesting: bool,
    is_always_suggesting: bool,
) {
    for word in words {
        let is_correct = checker.check(&word);
        writer.write_correction(&word, is_correct);

        if is_suggesting && (is_always_suggesting || !is_correct) {
            writer.write_suggestions(&word, &checker.suggest(&word));
        }
    }

    writer.finish();
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse_args_default_or_exit();

    let affix = args
        .affix
        .context("--affix is required (see --help)")?;
    let wordlist = args
        .wordlist
        .context("--wordlist is required (see --help)")?;

    let words = if args.inputs.is_empty() {
        eprintln!("Reading from stdin...");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("reading stdin")?;
        buffer.split_whitespace().map(str::to_owned).collect()
    } else {
        args.inputs
    };

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };
    let is_suggesting = args.suggest || args.always_suggest;

    match args.archive {
        Some(archive) => {
            let fs = vfs::zip::Filesystem::open_path(&archive)
                .with_context(|| format!("opening archive {}", archive.display()))?;
            let mut checker = SpellChecker::new(fs, wordlist::api());
            checker
                .load(&affix, &wordlist)
                .context("loading dictionary")?;
            run(
                &checker,
                words,
                &mut *writer,
                is_suggesting,
                args.always_suggest,
            );
        }
        None => {
            let mut checker = SpellChecker::new(Fs, wordlist::api());
            checker
                .load(&affix, &wordlist)
                .context("loading dictionary")?;
            run(
                &checker,
                words,
                &mut *writer,
                is_suggesting,
                args.always_suggest,
            );
        }
    }

    Ok(())
}
