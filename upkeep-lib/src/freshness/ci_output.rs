use crate::Result;
use camino::Utf8Path;
use ohno::IntoAppError;
use std::fs::OpenOptions;
use std::io::Write;

/// Append `name=value` lines to a CI output file (the file named by `GITHUB_OUTPUT` on GitHub Actions).
pub fn write_ci_outputs(path: &Utf8Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .into_app_err_with(|| format!("could not open CI output file '{path}'"))?;

    for (name, value) in outputs {
        writeln!(file, "{name}={value}").into_app_err_with(|| format!("could not write to CI output file '{path}'"))?;
    }

    Ok(())
}
