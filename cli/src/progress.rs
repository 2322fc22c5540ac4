//! Ingestion progress printed to stderr.

use pdfqa_rag::{IngestProgress, IngestStage};

/// Prints one line per progress update unless `quiet`.
pub fn reporter(quiet: bool) -> impl FnMut(IngestProgress) {
    move |progress| {
        if !quiet {
            eprintln!("{}", render(&progress));
        }
    }
}

fn render(progress: &IngestProgress) -> String {
    let position = format!("[{}/{}]", progress.processed, progress.total);
    let file = progress.current_file.as_deref().unwrap_or("");
    match &progress.stage {
        IngestStage::Scanning => format!("{position} scanning"),
        IngestStage::Extracting => format!("{position} extracting"),
        IngestStage::Chunked { chunks } => format!("{position} {file}: {chunks} chunks"),
        IngestStage::Skipped { reason } => format!("{position} \x1b[33mskipped\x1b[0m {file}: {reason}"),
        IngestStage::Embedding { chunks } => format!("{position} embedding {chunks} chunks"),
        IngestStage::Saving => format!("{position} saving index"),
        IngestStage::Done => format!("{position} \x1b[32mdone\x1b[0m"),
    }
}
