use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use orcbib::format::Format;

use eyre::{eyre, Context, Result};
use glob::glob;
use log::trace;

/// Reads the format file at `path`, or the single format file of the current directory when no
/// path is given.
pub fn read_format_file<F: Format>(path: Option<PathBuf>) -> Result<(PathBuf, F)> {
    let path = if let Some(path) = path {
        trace!("reading {} as a {} file", path.display(), F::name());
        with_default_ext::<F>(path)
    } else {
        trace!("Searching current directory for any {} files", F::name());
        find_format_file_in_current_directory::<F>()?
    };

    let content = open_file_for_read(&path).and_then(|mut f| read_file_to_string(&mut f))?;
    Ok((path, F::new(content)))
}

#[inline]
fn with_default_ext<F: Format>(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(F::ext())
    }
}

#[inline]
fn open_file_for_read(path: &Path) -> Result<File> {
    File::open(path)
        .wrap_err_with(|| format!("Failed to open the '{}' file for reading.", path.display()))
}

#[inline]
fn find_format_file_in_current_directory<F: Format>() -> Result<PathBuf> {
    find_format_file_in_directory::<F, _>(".")
}

fn find_format_file_in_directory<F, P>(dir: P) -> Result<PathBuf>
where
    F: Format,
    P: AsRef<Path>,
{
    let path = dir.as_ref();
    if !path.is_dir() {
        return Err(eyre!("Path entered is not a directory"));
    }

    let pattern = format!("{}/*.{}", path.to_string_lossy(), F::ext());

    let mut iter = glob(&pattern).wrap_err("File pattern should always be valid")?;

    let path_buf = iter
        .next()
        .ok_or_else(|| {
            eyre!(
                "No .{} file found in the '{}' directory",
                F::ext(),
                path.display()
            )
        })?
        .wrap_err("Cannot determine a file path - Do you have the correct permissions?")?;

    if iter.next().is_some() {
        return Err(eyre!(
            "More than one .{} file found - use the --file option to select one",
            F::ext()
        ));
    }

    Ok(path_buf)
}

fn read_file_to_string(file: &mut File) -> Result<String> {
    let mut content = String::new();
    file.read_to_string(&mut content)
        .wrap_err("Cannot read contents of file")
        .map(move |_| content)
}
