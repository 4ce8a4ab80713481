use std::ffi::OsStr;
use std::path::Path;

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_lowercase()
}

/// Fence label for an open document.
///
/// C#, project and JSON files always get a fixed label; everything else keeps
/// whatever the editor reported, or no label at all.
pub fn language_label(path: &Path, reported: Option<&str>) -> String {
    match lowercase_extension(path).as_str() {
        "cs" => "csharp".to_string(),
        "csproj" => "xml".to_string(),
        "json" => "json".to_string(),
        _ => reported.unwrap_or("").to_string(),
    }
}

/// Language detection used when buffers come straight from disk rather than
/// from an editor. Extensions with a fixed export label are left to
/// [`language_label`].
pub fn detect_language_id(path: &Path) -> Option<&'static str> {
    let id = match lowercase_extension(path).as_str() {
        "rs" => "rust",
        "js" => "javascript",
        "jsx" => "javascriptreact",
        "ts" => "typescript",
        "tsx" => "typescriptreact",
        "py" => "python",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "fs" => "fsharp",
        "vb" => "vb",
        "razor" | "cshtml" => "razor",
        "html" => "html",
        "css" => "css",
        "md" => "markdown",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "ps1" => "powershell",
        "sh" => "shellscript",
        "sql" => "sql",
        _ => return None,
    };
    Some(id)
}
