use crate::models::FileDescriptor;

/// Case-insensitive substring match on name, summary or folder
pub fn matches_query(file: &FileDescriptor, lowered_query: &str) -> bool {
    file.name.to_lowercase().contains(lowered_query)
        || file.summary.to_lowercase().contains(lowered_query)
        || file.folder.to_lowercase().contains(lowered_query)
}

/// Files matching `query`, in catalog order.
///
/// A blank query returns everything unchanged. Otherwise the query is
/// lowercased as typed (surrounding spaces are part of it).
pub fn filter_catalog<'a>(files: &'a [FileDescriptor], query: &str) -> Vec<&'a FileDescriptor> {
    if query.trim().is_empty() {
        return files.iter().collect();
    }

    let lowered = query.to_lowercase();
    files.iter().filter(|file| matches_query(file, &lowered)).collect()
}
