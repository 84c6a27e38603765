use std::path::{Path, PathBuf};
use std::process;

use jdx_core::dict::{index_path_for, DictionaryHandle, FORMAT_VERSION};

use super::die;

/// Cache directory for `dict_file`: `--cache-dir` if given, otherwise the
/// directory holding the dictionary.
fn cache_dir(dict_file: &str, cache_dir: Option<&str>) -> PathBuf {
    match cache_dir {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(dict_file)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

fn open(dict_file: &str, cache: Option<&str>) -> DictionaryHandle {
    let dict_path = Path::new(dict_file);
    die!(
        DictionaryHandle::open_in(dict_path, &cache_dir(dict_file, cache)),
        "Error opening dictionary: {}"
    )
}

pub fn build(dict_file: &str, cache: Option<&str>, force: bool) {
    let dict_path = Path::new(dict_file);
    let index_path = index_path_for(&cache_dir(dict_file, cache), dict_path);

    let handle = if force {
        die!(
            DictionaryHandle::rebuild(dict_path, &index_path),
            "Error building index: {}"
        )
    } else {
        open(dict_file, cache)
    };

    let stats = handle.stats();
    eprintln!(
        "{} {} ({} entries)",
        if stats.rebuilt { "Wrote" } else { "Up to date:" },
        index_path.display(),
        stats.entries
    );
}

pub fn search(dict_file: &str, query: &str, cache: Option<&str>) {
    let handle = open(dict_file, cache);
    let lines = handle.search(query);
    if lines.is_empty() {
        eprintln!("(no matches)");
        process::exit(1);
    }
    for line in lines {
        print!("{line}");
        if !line.ends_with('\n') {
            println!();
        }
    }
}

pub fn info(dict_file: &str, cache: Option<&str>) {
    let dict_path = Path::new(dict_file);
    let index_path = index_path_for(&cache_dir(dict_file, cache), dict_path);
    let handle = open(dict_file, cache);
    let stats = handle.stats();

    println!("Dictionary: {dict_file}");
    println!("Size:       {} bytes", stats.dict_len);
    println!("Index:      {}", index_path.display());
    println!("Format:     v{FORMAT_VERSION}");
    println!("Header:     {}", handle.index().header());
    println!("Entries:    {}", stats.entries);
    println!(
        "Rebuilt:    {}",
        if stats.rebuilt { "yes" } else { "no (cached)" }
    );
}

pub fn verify(dict_file: &str, cache: Option<&str>) {
    let handle = open(dict_file, cache);
    if handle.index().is_sorted(handle.text()) {
        println!("OK: {} entries in order", handle.stats().entries);
    } else {
        eprintln!("Error: index entries are out of order");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_defaults_to_dictionary_dir() {
        assert_eq!(
            cache_dir("/data/dict/edict", None),
            PathBuf::from("/data/dict")
        );
        assert_eq!(cache_dir("edict", None), PathBuf::new());
        assert_eq!(
            cache_dir("/data/dict/edict", Some("/tmp/cache")),
            PathBuf::from("/tmp/cache")
        );
    }
}
