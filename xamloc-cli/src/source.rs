use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use xamloc::{Error, ProjectSource};

/// Filesystem-backed [`ProjectSource`]: a single `.xaml` file or a directory
/// tree walked with gitignore rules applied.
pub struct FsProjectSource {
    root: PathBuf,
}

impl FsProjectSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsProjectSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project-relative name of a file, used to derive its baml name.
    /// For a single-file root this is just the file name.
    pub fn relative_name(&self, file: &Path) -> String {
        // When the root is the file itself, strip_prefix succeeds with an
        // empty path; fall through to the file name instead.
        let relative = file
            .strip_prefix(&self.root)
            .ok()
            .filter(|relative| !relative.as_os_str().is_empty())
            .or_else(|| file.file_name().map(Path::new));
        relative.unwrap_or(file).to_string_lossy().into_owned()
    }
}

fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xaml"))
}

impl ProjectSource for FsProjectSource {
    fn markup_files(&self) -> Result<Vec<PathBuf>, Error> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        let mut files = Vec::new();
        for entry in WalkBuilder::new(&self.root).build() {
            let entry = entry.map_err(|e| Error::Io(std::io::Error::other(e)))?;
            if entry.file_type().is_some_and(|t| t.is_file()) && is_markup_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_text(&self, file: &Path) -> Result<String, Error> {
        Ok(std::fs::read_to_string(file)?)
    }

    fn write_text(&self, file: &Path, content: &str) -> Result<(), Error> {
        Ok(std::fs::write(file, content)?)
    }

    fn ensure_writable(&self, file: &Path) -> Result<(), Error> {
        let mut permissions = std::fs::metadata(file)?.permissions();
        if permissions.readonly() {
            permissions.set_readonly(false);
            std::fs::set_permissions(file, permissions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_only_xaml_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("views")).unwrap();
        std::fs::write(dir.path().join("views/Main.xaml"), "<a/>").unwrap();
        std::fs::write(dir.path().join("App.XAML"), "<a/>").unwrap();
        std::fs::write(dir.path().join("readme.md"), "nope").unwrap();

        let source = FsProjectSource::new(dir.path());
        let files = source.markup_files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_markup_file(f)));
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Main.xaml");
        std::fs::write(&file, "<a/>").unwrap();

        let source = FsProjectSource::new(&file);
        assert_eq!(source.markup_files().unwrap(), vec![file.clone()]);
        assert_eq!(source.relative_name(&file), "Main.xaml");
    }

    #[test]
    fn test_relative_name() {
        let source = FsProjectSource::new("/project");
        assert_eq!(
            source.relative_name(Path::new("/project/views/Main.xaml")),
            "views/Main.xaml"
        );
    }

    #[test]
    fn test_ensure_writable_clears_readonly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Main.xaml");
        std::fs::write(&file, "<a/>").unwrap();
        let mut permissions = std::fs::metadata(&file).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&file, permissions).unwrap();

        let source = FsProjectSource::new(dir.path());
        source.ensure_writable(&file).unwrap();
        source.write_text(&file, "<b/>").unwrap();
        assert_eq!(source.read_text(&file).unwrap(), "<b/>");
    }
}
