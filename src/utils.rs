//! Reading candidate lists and writing the validated output.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Read a candidate list from `path`, one `host:port` per line.
pub async fn read_candidates(path: &Path) -> io::Result<Vec<String>> {
    let content = tokio::fs::read(path).await?;
    Ok(parse_candidate_list(&content))
}

/// Split raw bytes into candidates, dropping blank lines. Duplicates are kept.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the whole list;
/// such lines are later rejected as invalid addresses.
pub fn parse_candidate_list(content: &[u8]) -> Vec<String> {
    content
        .split(|&b| b == b'\n')
        .map(String::from_utf8_lossy)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Write `proxies` to `path`, one per line, replacing any existing file.
///
/// The data goes to a temporary file next to `path` which is then renamed
/// over it, so readers see either the old file or the complete new one.
/// A replaced file keeps its mode; a new one gets `0666` minus the umask.
pub fn write_proxy_list(path: &Path, proxies: &[String]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut builder = tempfile::Builder::new();
    builder.prefix(".proxies").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        for proxy in proxies {
            writeln!(writer, "{}", proxy)?;
        }
        writer.flush()?;
    }
    if let Some(permissions) = existing {
        file.as_file().set_permissions(permissions)?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
