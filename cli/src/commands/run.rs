use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use colored::*;

use diagr_common::report::BatchResult;
use diagr_core::batch::BatchService;
use diagr_probes::default_registry;

use crate::commands::RunArgs;
use crate::ingest;
use crate::terminal::{print, spinner};

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let entries = ingest::load_entries(&args.config)?;
    if entries.is_empty() {
        println!("{}", "no machine configurations found, nothing to do".yellow());
        return Ok(());
    }

    let cfg = args.to_run_config();
    let service = BatchService::new(default_registry());

    let sp = spinner::start(format!("Running diagnostics for {} entries...", entries.len()));
    let started = Instant::now();
    let batch = service.run(&entries, &cfg).await?;
    sp.finish_and_clear();

    print::rejected(&batch.rejected);
    print::report(&batch.result);
    print::summary(&batch.result.summary(), started.elapsed());

    if let Some(path) = &args.csv {
        export_csv(&batch.result, path)?;
        println!(
            "{}",
            format!("report written to {}", path.display()).green()
        );
    }
    Ok(())
}

fn export_csv(result: &BatchResult, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating CSV report at {}", path.display()))?;
    write_csv(result, file)
}

fn write_csv<W: std::io::Write>(result: &BatchResult, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in result.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
