use anyhow::{Result, anyhow};
use std::path::Path;

/// Longest accepted document title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Extensions that are never accepted as documents
const BLOCKED_EXTENSIONS: &[&str] = &[
    // Executables
    "exe", "dll", "so", "dylib", "bin", "com", "bat", "cmd", "ps1", "sh", "bash", "msi",
    // Scripts
    "js", "vbs", "py", "rb", "php", "pl", "jar",
    // Macro-enabled documents
    "docm", "xlsm", "pptm", "dotm", "xltm", "potm",
];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        }));
    }
    Ok(())
}

/// Trims a title and checks it is between 1 and 255 characters
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed: String = title.trim().chars().filter(|c| !c.is_control()).collect();

    if trimmed.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_TITLE",
            message: "Title cannot be empty".to_string(),
        }));
    }

    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(anyhow!(ValidationError {
            code: "INVALID_TITLE",
            message: format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
        }));
    }

    Ok(trimmed)
}

/// Reduces an uploaded filename to a safe single path component
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Normalise Windows separators so Path sees every component
    let unified = filename.replace('\\', "/");
    let name = Path::new(&unified)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    if filename.contains("..") {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';') {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if let Some(ext) = Path::new(&sanitized).extension().and_then(|e| e.to_str()) {
        let ext_lower = ext.to_lowercase();
        if BLOCKED_EXTENSIONS.contains(&ext_lower.as_str()) {
            return Err(anyhow!(ValidationError {
                code: "BLOCKED_EXTENSION",
                message: format!("File extension '.{}' is not allowed", ext_lower),
            }));
        }
    }

    if sanitized.starts_with('.') {
        return Err(anyhow!(ValidationError {
            code: "HIDDEN_FILE",
            message: "Hidden files (starting with '.') are not allowed".to_string(),
        }));
    }

    Ok(sanitized)
}

/// Checks if file content appears to be executable
pub fn is_executable_content(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // ELF, PE/COFF, Mach-O
    header.starts_with(&[0x7F, 0x45, 0x4C, 0x46])
        || header.starts_with(&[0x4D, 0x5A])
        || header.starts_with(&[0xFE, 0xED, 0xFA, 0xCE])
        || header.starts_with(&[0xFE, 0xED, 0xFA, 0xCF])
        || header.starts_with(&[0xCE, 0xFA, 0xED, 0xFE])
        || header.starts_with(&[0xCF, 0xFA, 0xED, 0xFE])
        || header.starts_with(b"#!")
}
