
use std::path::{Path, PathBuf};

use crate::eucjp;

/// Write `content` as an EUC-JP dictionary file named `name`.
pub(super) fn write_dict(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let bytes = eucjp::encode(content).expect("test dictionary must be EUC-JP encodable");
    std::fs::write(&path, bytes).unwrap();
    path
}
