use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::ScanError;
use crate::types::{FileEntry, FileStatus, OutputFormat, QueueItem};

#[derive(Debug)]
pub struct ScanResult {
    pub queue: Vec<QueueItem>,
    pub files: Vec<FileEntry>,
    pub total_found: usize,
    pub skipped: usize,
}

/// Where converted documents land.
///
/// `-o` names an exact file only in the unambiguous case of a single input
/// file; any directory input or multi-file scan makes it a flat directory.
enum OutputTarget<'a> {
    Alongside,
    File(&'a Path),
    Dir(&'a Path),
}

pub fn scan_inputs(
    inputs: &[PathBuf],
    recursive: bool,
    output: Option<&Path>,
    format: OutputFormat,
    force: bool,
) -> Result<ScanResult, ScanError> {
    let mut pdf_files: Vec<PathBuf> = Vec::new();

    for input in inputs {
        if !input.exists() {
            return Err(ScanError::InputNotFound(input.clone()));
        }
        if input.is_dir() {
            let walker = if recursive {
                WalkDir::new(input)
            } else {
                WalkDir::new(input).max_depth(1)
            };

            for entry in walker {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && is_pdf(path) {
                    pdf_files.push(path.to_path_buf());
                }
            }
        } else if is_pdf(input) {
            pdf_files.push(input.clone());
        } else {
            return Err(ScanError::NotAPdf(input.clone()));
        }
    }

    pdf_files.sort();
    pdf_files.dedup();
    let total_found = pdf_files.len();
    info!(count = total_found, "Found PDF files");

    let target = match output {
        None => OutputTarget::Alongside,
        Some(out) => {
            if inputs.len() == 1 && inputs[0].is_file() && !out.is_dir() {
                OutputTarget::File(out)
            } else {
                OutputTarget::Dir(out)
            }
        }
    };

    if let OutputTarget::Dir(out_dir) = &target {
        if !out_dir.exists() {
            std::fs::create_dir_all(out_dir).map_err(|e| ScanError::CreateOutputDir {
                path: out_dir.to_path_buf(),
                source: e,
            })?;
            info!(path = %out_dir.display(), "Created output directory");
        }
    }

    let mut queue = Vec::new();
    let mut files = Vec::new();
    let mut skipped = 0;

    match target {
        OutputTarget::File(out) => {
            for pdf_path in &pdf_files {
                push_item(
                    pdf_path.clone(),
                    out.to_path_buf(),
                    force,
                    &mut queue,
                    &mut files,
                    &mut skipped,
                );
            }
        }
        OutputTarget::Dir(out_dir) => {
            let mut name_counts: HashMap<String, usize> = HashMap::new();

            for pdf_path in &pdf_files {
                let stem = pdf_path
                    .file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();

                let out_name = resolve_collision(&stem, format.extension(), &mut name_counts);
                push_item(
                    pdf_path.clone(),
                    out_dir.join(&out_name),
                    force,
                    &mut queue,
                    &mut files,
                    &mut skipped,
                );
            }
        }
        OutputTarget::Alongside => {
            for pdf_path in &pdf_files {
                push_item(
                    pdf_path.clone(),
                    pdf_path.with_extension(format.extension()),
                    force,
                    &mut queue,
                    &mut files,
                    &mut skipped,
                );
            }
        }
    }

    if skipped > 0 {
        info!(skipped, "Skipped existing output files");
    }

    Ok(ScanResult {
        queue,
        files,
        total_found,
        skipped,
    })
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn push_item(
    source_path: PathBuf,
    output_path: PathBuf,
    force: bool,
    queue: &mut Vec<QueueItem>,
    files: &mut Vec<FileEntry>,
    skipped: &mut usize,
) {
    let filename = output_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    if !force && output_path.exists() {
        debug!(path = %output_path.display(), "Skipping existing file");
        *skipped += 1;
        files.push(FileEntry {
            filename,
            status: FileStatus::Skipped,
        });
        return;
    }

    queue.push(QueueItem {
        source_path,
        output_path,
        filename: filename.clone(),
    });
    files.push(FileEntry {
        filename,
        status: FileStatus::Pending,
    });
}

fn resolve_collision(
    stem: &str,
    extension: &str,
    name_counts: &mut HashMap<String, usize>,
) -> String {
    let count = name_counts.entry(stem.to_string()).or_insert(0);
    let filename = if *count == 0 {
        format!("{stem}.{extension}")
    } else {
        format!("{stem}_{count}.{extension}")
    };
    *count += 1;
    filename
}
