//! The subset of the Python standard library recognized for import
//! classification. Imports resolving to one of these top-level names are
//! excluded from the intra-project dependency graph and from coupling/fan-out
//! counts, matching the original detectors' `standard_lib_prefixes`/
//! `standard_libs` exclusion sets (broadened here to the full `sys.stdlib_module_names`
//! spirit rather than the original's small hardcoded sample).

use rustc_hash::FxHashSet;
use std::sync::OnceLock;

const STDLIB_MODULES: &[&str] = &[
    "os", "sys", "re", "io", "abc", "ast", "copy", "csv", "time", "math", "json",
    "uuid", "enum", "glob", "heapq", "queue", "shutil", "socket", "string", "struct",
    "typing", "pickle", "random", "logging", "inspect", "hashlib", "pathlib", "argparse",
    "asyncio", "builtins", "datetime", "warnings", "textwrap", "operator", "functools",
    "itertools", "importlib", "threading", "traceback", "subprocess", "contextlib",
    "dataclasses", "collections", "unittest", "tempfile", "configparser", "multiprocessing",
    "urllib", "http", "html", "xml", "email", "sqlite3", "base64", "binascii", "bisect",
    "calendar", "codecs", "decimal", "difflib", "fnmatch", "fractions", "gc", "getpass",
    "gzip", "ipaddress", "keyword", "locale", "numbers", "platform", "pprint", "secrets",
    "select", "shlex", "signal", "statistics", "stat", "tarfile", "token", "tokenize",
    "types", "weakref", "zipfile", "zlib", "ctypes", "curses", "mimetypes", "plistlib",
];

fn set() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STDLIB_MODULES.iter().copied().collect())
}

/// True if `dotted_name`'s top-level component is a standard-library module.
pub fn is_stdlib_module(dotted_name: &str) -> bool {
    let top = dotted_name.split('.').next().unwrap_or(dotted_name);
    set().contains(top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_stdlib_top_level() {
        assert!(is_stdlib_module("os"));
        assert!(is_stdlib_module("os.path"));
        assert!(is_stdlib_module("collections.abc"));
    }

    #[test]
    fn rejects_project_or_third_party_modules() {
        assert!(!is_stdlib_module("mypackage.utils"));
        assert!(!is_stdlib_module("numpy"));
    }
}
