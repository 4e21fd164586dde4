use std::time::Duration;

use super::*;

pub fn run(args: SplitArgs) -> Result<()> {
    let oracle = build_oracle(&args)?;
    let manifest = run_batch(
        &args,
        oracle.as_ref().map(|oracle| oracle as &dyn TitleOracle),
    )?;

    if args.dry_run {
        info!(
            books = manifest.counts.book_count,
            resolved = manifest.counts.resolved_count,
            "split dry-run complete"
        );
        return Ok(());
    }

    if let Some(manifest_path) = &args.manifest_path {
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote split run manifest");
    }

    Ok(())
}

fn build_oracle(args: &SplitArgs) -> Result<Option<OpenAiTitleOracle>> {
    let Some(api_key) = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    else {
        info!(
            credential_check = args.credential_check.as_str(),
            "no oracle credential configured; title oracle disabled"
        );
        return Ok(None);
    };

    let oracle = OpenAiTitleOracle::new(OracleConfig {
        api_key: api_key.to_string(),
        model: args.oracle_model.clone(),
        base_url: args.oracle_base_url.clone(),
        timeout: Duration::from_secs(args.oracle_timeout_secs),
    })
    .context("failed to build title oracle client")?;
    Ok(Some(oracle))
}

pub(super) fn run_batch(
    args: &SplitArgs,
    oracle: Option<&dyn TitleOracle>,
) -> Result<SplitRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("split-{}", utc_compact_string(started_ts));

    let books = discover_books(&args.input)?;
    if !books.is_empty() && !args.dry_run {
        ensure_directory(&args.output_dir)?;
    }

    info!(
        run_id = %run_id,
        input = %args.input.display(),
        books = books.len(),
        output_dir = %args.output_dir.display(),
        oracle = oracle.is_some(),
        "starting split"
    );

    let settings = BookSettings {
        output_dir: &args.output_dir,
        resolve: ResolveConfig {
            preview_chars: args.preview_chars(),
        },
        credential_check: args.credential_check,
        dry_run: args.dry_run,
    };

    let reports: Vec<BookReport> = books
        .iter()
        .map(|book| process_book(book, &settings, oracle))
        .collect();

    let count_status = |status: &str| {
        reports
            .iter()
            .filter(|report| report.status == status)
            .count()
    };
    let counts = SplitCounts {
        book_count: reports.len(),
        resolved_count: count_status("resolved"),
        skipped_count: count_status("skipped"),
        failed_count: count_status("failed"),
        chapters_written: reports
            .iter()
            .filter(|report| report.output_path.is_some())
            .map(|report| report.chapter_count)
            .sum(),
    };

    info!(
        books = counts.book_count,
        resolved = counts.resolved_count,
        skipped = counts.skipped_count,
        failed = counts.failed_count,
        chapters = counts.chapters_written,
        "split completed"
    );

    Ok(SplitRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        dry_run: args.dry_run,
        credential_check: args.credential_check.as_str().to_string(),
        preview_chars: args.preview_chars(),
        paths: SplitPaths {
            input: args.input.display().to_string(),
            output_dir: args.output_dir.display().to_string(),
        },
        counts,
        books: reports,
    })
}
