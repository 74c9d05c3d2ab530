//! File-type categories and their display colors.
//!
//! Presentation configuration, not algorithmic core: plain immutable
//! lookup tables keyed by file extension.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Archive,
    Document,
    Code,
    Binary,
    Other,
    Directory,
}

const IMAGE_EXT: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "svg"];
const VIDEO_EXT: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv"];
const AUDIO_EXT: &[&str] = &["mp3", "wav", "flac", "aac", "ogg"];
const ARCHIVE_EXT: &[&str] = &["zip", "tar", "gz", "bz2", "rar", "7z"];
const DOCUMENT_EXT: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "md",
];
const CODE_EXT: &[&str] = &[
    "py", "js", "ts", "java", "c", "cpp", "rs", "go", "rb", "php", "html", "css",
];
const BINARY_EXT: &[&str] = &["exe", "dll", "so", "bin", "dylib"];

impl FileCategory {
    pub const ALL: [FileCategory; 9] = [
        FileCategory::Image,
        FileCategory::Video,
        FileCategory::Audio,
        FileCategory::Archive,
        FileCategory::Document,
        FileCategory::Code,
        FileCategory::Binary,
        FileCategory::Other,
        FileCategory::Directory,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Archive => "archive",
            FileCategory::Document => "document",
            FileCategory::Code => "code",
            FileCategory::Binary => "binary",
            FileCategory::Other => "other",
            FileCategory::Directory => "directory",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            FileCategory::Image => "#6A5ACD",
            FileCategory::Video => "#FF8C00",
            FileCategory::Audio => "#20B2AA",
            FileCategory::Archive => "#DC143C",
            FileCategory::Document => "#2E8B57",
            FileCategory::Code => "#4682B4",
            FileCategory::Binary => "#8B4513",
            FileCategory::Other => "#696969",
            FileCategory::Directory => "#B0C4DE",
        }
    }
}

pub fn classify(path: &Path, is_dir: bool) -> FileCategory {
    if is_dir {
        return FileCategory::Directory;
    }
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_ascii_lowercase(),
        None => return FileCategory::Other,
    };
    let ext = ext.as_str();
    if IMAGE_EXT.contains(&ext) {
        FileCategory::Image
    } else if VIDEO_EXT.contains(&ext) {
        FileCategory::Video
    } else if AUDIO_EXT.contains(&ext) {
        FileCategory::Audio
    } else if ARCHIVE_EXT.contains(&ext) {
        FileCategory::Archive
    } else if DOCUMENT_EXT.contains(&ext) {
        FileCategory::Document
    } else if CODE_EXT.contains(&ext) {
        FileCategory::Code
    } else if BINARY_EXT.contains(&ext) {
        FileCategory::Binary
    } else {
        FileCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify(Path::new("a/photo.JPG"), false), FileCategory::Image);
        assert_eq!(classify(Path::new("movie.mkv"), false), FileCategory::Video);
        assert_eq!(classify(Path::new("main.rs"), false), FileCategory::Code);
        assert_eq!(classify(Path::new("notes"), false), FileCategory::Other);
        assert_eq!(classify(Path::new("x.weird"), false), FileCategory::Other);
    }

    #[test]
    fn directories_win_over_extensions() {
        assert_eq!(classify(Path::new("backup.zip"), true), FileCategory::Directory);
    }

    #[test]
    fn every_category_has_a_color() {
        for cat in FileCategory::ALL {
            assert!(cat.color().starts_with('#'));
            assert!(!cat.label().is_empty());
        }
    }
}
