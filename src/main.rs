use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use image_transformer::cli::Args;
use image_transformer::image_processing::report::{extract_filename, ConversionReport};
use image_transformer::image_processing::{
    plan, BatchEvent, BatchSummary, ConversionQueue, ConversionSettings,
};
use image_transformer::json_output::JsonMessage;
use image_transformer::logging;
use image_transformer::utils::{
    create_progress_bar, error_println, format_duration, validate_inputs, verbose_println,
    warn_println,
};

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let mut args = Args::parse();

    logging::init(args.verbose, args.json_progress);
    args.load_and_merge_config()?;

    let json = args.json_progress;
    if !json {
        println!("{}", style("Image Transformer - Batch Reducer").bold().blue());
        println!();
    }

    let resolved = args
        .conversion_options()
        .resolve()
        .context("Invalid conversion settings")?;
    if let Some(warning) = &resolved.warning {
        let message = format!("{}: ratio mode activated", warning);
        if json {
            JsonMessage::warning(message);
        } else {
            warn_println(&message);
        }
    }
    let settings = resolved.settings;

    validate_inputs(&args)?;

    let mut queue = ConversionQueue::new();
    for input_path in &args.input_paths {
        let added = queue.add_path(input_path);
        verbose_println(
            args.verbose && !json,
            &format!("{} images from {}", added.len(), input_path.display()),
        );
    }

    if queue.is_empty() {
        if json {
            JsonMessage::warning("No JPEG images found");
        } else {
            println!("{}", style("No JPEG images found in the given paths").red());
        }
        return Ok(ExitCode::FAILURE);
    }

    if args.verbose && !json {
        print_configuration(&settings, queue.len());
    }

    if args.dry_run {
        return Ok(dry_run(&queue, &settings, json));
    }

    let mut report = ConversionReport::new();
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    let handle = queue.start(settings.clone())?;
    let total = handle.total();

    if json {
        JsonMessage::started(total, settings.policy.describe());
    }
    let progress_bar = (!json).then(|| {
        let pb = create_progress_bar(total as u64);
        pb.set_message("Converting images");
        pb
    });

    for event in handle.events().iter() {
        queue.apply(&event);
        report.record(&event);

        if json {
            JsonMessage::batch_event(&event);
        }

        if let BatchEvent::ItemConverted { path, result, .. } = &event {
            let filename = extract_filename(path);
            match result {
                Ok(_) => {
                    if let Some(pb) = &progress_bar {
                        pb.inc(1);
                        pb.set_message(filename.clone());
                    }
                }
                Err(e) => {
                    if let Some(pb) = &progress_bar {
                        pb.println(format!("{} {}", style("✗").red().bold(), e));
                    }
                    failures.push((path.clone(), e.to_string()));
                    if args.stop_on_error {
                        handle.cancel();
                    }
                }
            }
            if json {
                let progress = queue.progress();
                JsonMessage::progress(progress.converted, progress.total, filename);
            }
        }
    }

    let summary = queue
        .finish(handle)
        .context("Conversion worker stopped unexpectedly")?;

    if let Some(pb) = &progress_bar {
        if summary.cancelled {
            pb.abandon_with_message("Cancelled");
        } else {
            pb.finish_with_message("✓ Conversion complete!");
        }
    }

    if !json {
        println!();
        print_summary(&summary, &failures, &settings);
        if args.report {
            report.print();
        }
        println!(
            "  Total time: {}",
            style(format_duration(start_time.elapsed())).bold()
        );
    }

    if summary.failed > 0 || summary.cancelled {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_configuration(settings: &ConversionSettings, images: usize) {
    println!("{}", style("Configuration:").bold());
    println!("  Sizing: {}", settings.policy.describe());
    println!("  Quality: {}", settings.quality);
    println!("  Output folder: {}", settings.folder);
    println!("  Filter: {:?}", settings.filter);
    println!("  Images: {}", images);
    println!();
}

/// Show where every pending image would go, without decoding pixels
fn dry_run(queue: &ConversionQueue, settings: &ConversionSettings, json: bool) -> ExitCode {
    if !json {
        println!("{}", style("Dry Run Results:").bold().cyan());
    }

    let mut failed = 0;
    for (index, (_, path)) in queue.pending().iter().enumerate() {
        match plan(path, settings) {
            Ok(planned) => {
                if json {
                    JsonMessage::planned(&planned);
                } else {
                    println!(
                        "  {}: {} {}x{} → {} {}x{}",
                        style(format!("#{}", index + 1)).dim(),
                        style(extract_filename(&planned.source)).bold(),
                        planned.source_size.0,
                        planned.source_size.1,
                        style(planned.output.display()).cyan(),
                        planned.output_size.0,
                        planned.output_size.1
                    );
                }
            }
            Err(e) => {
                failed += 1;
                if json {
                    JsonMessage::file_failed(path, e.kind(), e.to_string());
                } else {
                    error_println(&e.to_string());
                }
            }
        }
    }

    if !json {
        println!();
        println!("{}", style("💡 Dry Run Mode:").bold().yellow());
        println!("  • No files were written during this simulation");
        println!("  • Remove --dry-run to convert the images");
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_summary(summary: &BatchSummary, failures: &[(PathBuf, String)], settings: &ConversionSettings) {
    println!("{}", style("Results Summary:").bold().green());
    println!(
        "  Successfully converted: {}",
        style(summary.converted).bold().green()
    );
    if summary.failed > 0 {
        println!("  Failed: {}", style(summary.failed).bold().red());
    }
    if summary.cancelled {
        println!(
            "  Cancelled, not attempted: {}",
            style(summary.skipped).bold().yellow()
        );
    }
    println!("  Sizing: {}", style(settings.policy.describe()).dim());

    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Conversion time: {}",
        style(format_duration(summary.elapsed)).bold()
    );
    println!(
        "  Average time per image: {}",
        style(format_duration(summary.average_duration())).dim()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Errors encountered:").bold().red());
        for (i, (path, error)) in failures.iter().enumerate() {
            println!(
                "  {}: {} - {}",
                style(format!("#{}", i + 1)).dim(),
                style(extract_filename(path)).bold().red(),
                error
            );
        }
        println!();
        println!(
            "{}",
            style(format!(
                "⚠ {} errors occurred during conversion",
                failures.len()
            ))
            .bold()
            .yellow()
        );
        println!("  Check image files and try again with --verbose for more details");
    }
}
