use crate::model::Node;
use crate::scanner::ScanStats;

/// Write the tree as flattened pre-order CSV rows.
pub fn to_csv(tree: &Node, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record(["path", "name", "kind", "size", "modified"])?;
    for n in tree.iter_all() {
        writer.write_record([
            n.path.display().to_string(),
            n.name(),
            (if n.is_dir { "dir" } else { "file" }).to_string(),
            n.size.to_string(),
            n.modified.to_rfc3339(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// JSON report embedding the serialized tree plus scan statistics.
pub fn to_json(tree: &Node, stats: &ScanStats) -> serde_json::Value {
    serde_json::json!({
        "root": tree.path,
        "total_size": tree.size,
        "files_scanned": stats.files_scanned,
        "dirs_scanned": stats.dirs_scanned,
        "permission_denied": stats.permission_denied,
        "errors": stats.errors,
        "tree": tree,
    })
}
