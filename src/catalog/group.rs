use std::collections::HashMap;

use crate::models::FileDescriptor;

/// Files of one folder, in the order they were given
#[derive(Debug, Clone)]
pub struct FolderGroup<'a> {
    pub folder: &'a str,
    pub files: Vec<&'a FileDescriptor>,
}

/// Group by folder. Groups appear in order of their first file.
pub fn group_by_folder<'a>(
    files: impl IntoIterator<Item = &'a FileDescriptor>,
) -> Vec<FolderGroup<'a>> {
    let mut groups: Vec<FolderGroup<'a>> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for file in files {
        let folder = file.folder.as_str();
        let index = *positions.entry(folder).or_insert_with(|| {
            groups.push(FolderGroup { folder, files: Vec::new() });
            groups.len() - 1
        });
        groups[index].files.push(file);
    }

    groups
}
