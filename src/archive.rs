//! Archive batch pipeline.
//!
//! Unpacks a ZIP container into a scratch directory, runs the single-file
//! dispatcher over every supported member, and repacks the successful
//! outputs into a new container. Member failures are logged and skipped;
//! only a container that cannot be unpacked aborts the batch. The scratch
//! directory is a [`tempfile::TempDir`], so it is removed on every exit
//! path, including when unpacking itself fails.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::dispatch::{modified_path, replace_in_file, FileKind, ProcessedFile};
use crate::error::{Error, Result};
use crate::substitution::ReplacementSpec;

/// Outcome of one archive member: replaced, skipped as unsupported, or
/// failed. Failures are collected as values rather than thrown, so one bad
/// member never interrupts the iteration.
enum MemberOutcome {
    Replaced(ProcessedFile),
    Skipped,
    Failed(Error),
}

/// Process every supported file inside a ZIP container.
///
/// Returns the repacked container as `<stem>_modified.zip` beside the
/// input, or `Ok(None)` when no member produced output — "nothing to do"
/// is not an error. Member outputs are flattened to their base names in
/// the new container; members from different sub-paths that share a base
/// name are not disambiguated.
pub fn replace_in_archive(path: &Path, spec: &ReplacementSpec) -> Result<Option<ProcessedFile>> {
    // Scratch lives beside the container and is released on every exit path
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let scratch = tempfile::Builder::new()
        .prefix("unpack-")
        .tempdir_in(parent)?;

    let mut container = zip::ZipArchive::new(File::open(path)?)?;
    container.extract(scratch.path())?;
    drop(container);

    // Snapshot the member list before any replacer runs: outputs are
    // written into the scratch directory too, and a lazy walk would yield
    // and re-process them
    let members: Vec<PathBuf> = WalkDir::new(scratch.path())
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    let mut produced: Vec<ProcessedFile> = Vec::new();
    for member in &members {
        match process_member(member, spec) {
            MemberOutcome::Replaced(file) => produced.push(file),
            MemberOutcome::Skipped => {
                debug!("skipping unsupported member {}", member.display());
            }
            MemberOutcome::Failed(error) => {
                warn!("error processing {}: {}", member.display(), error);
            }
        }
    }

    if produced.is_empty() {
        return Ok(None);
    }
    let output = modified_path(path);
    write_container(&output, &produced)?;
    Ok(Some(ProcessedFile::for_input(path, output)))
}

fn process_member(path: &Path, spec: &ReplacementSpec) -> MemberOutcome {
    if FileKind::from_path(path).is_none() {
        return MemberOutcome::Skipped;
    }
    match replace_in_file(path, spec) {
        Ok(file) => MemberOutcome::Replaced(file),
        Err(error) => MemberOutcome::Failed(error),
    }
}

/// Repack the produced outputs into a new ZIP, flattened to base names.
fn write_container(output: &Path, members: &[ProcessedFile]) -> Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(output)?);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for member in members {
        let name = member
            .output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| member.display_name.clone());
        writer.start_file(name, options)?;
        let mut input = File::open(&member.output_path)?;
        std::io::copy(&mut input, &mut writer)?;
    }
    writer.finish()?;
    Ok(())
}
