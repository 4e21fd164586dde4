use super::*;

pub(super) struct BookSettings<'a> {
    pub output_dir: &'a Path,
    pub resolve: ResolveConfig,
    pub credential_check: CredentialCheck,
    pub dry_run: bool,
}

/// One book, start to finish. Failures never escape: they end up in the
/// report and the batch moves on.
pub(super) fn process_book(
    path: &Path,
    settings: &BookSettings<'_>,
    oracle: Option<&dyn TitleOracle>,
) -> BookReport {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut report = BookReport {
        filename,
        sha256: String::new(),
        status: "failed".to_string(),
        tier: None,
        skip_reason: None,
        chapter_count: 0,
        output_path: None,
        warnings: Vec::new(),
    };

    info!(book = %report.filename, "processing book");
    if let Err(err) = resolve_and_write(path, settings, oracle, &mut report) {
        warn!(book = %report.filename, error = %err, "book failed");
        for cause in err.chain().skip(1) {
            warn!(book = %report.filename, cause = %cause, "caused by");
        }
        report.status = "failed".to_string();
        report.warnings.push(format!("{err:#}"));
    }
    report
}

fn resolve_and_write(
    path: &Path,
    settings: &BookSettings<'_>,
    oracle: Option<&dyn TitleOracle>,
    report: &mut BookReport,
) -> Result<()> {
    report.sha256 = sha256_file(path)?;

    if settings.credential_check == CredentialCheck::Eager && oracle.is_none() {
        mark_skipped(report, &SkipReason::MissingCredential);
        return Ok(());
    }

    let loaded = load_book(path).with_context(|| format!("failed to load {}", path.display()))?;
    record_warnings(report, loaded.warnings);

    let outcome = resolve_chapters(&loaded.document, oracle, &settings.resolve);
    record_warnings(report, outcome.warnings);

    match outcome.resolution {
        Resolution::Skipped(reason) => mark_skipped(report, &reason),
        Resolution::Resolved { tier, chapters } => {
            report.tier = Some(tier.as_str().to_string());
            report.chapter_count = chapters.len();

            if settings.dry_run {
                info!(
                    book = %report.filename,
                    tier = tier.as_str(),
                    chapters = chapters.len(),
                    "chapters resolved (dry-run)"
                );
            } else {
                let csv_path = csv_path_for(settings.output_dir, path);
                write_chapters_csv(&csv_path, &chapters)?;
                info!(
                    book = %report.filename,
                    tier = tier.as_str(),
                    chapters = chapters.len(),
                    path = %csv_path.display(),
                    "wrote chapters"
                );
                report.output_path = Some(csv_path.display().to_string());
            }
            report.status = "resolved".to_string();
        }
    }
    Ok(())
}

fn record_warnings(report: &mut BookReport, warnings: Vec<String>) {
    for warning in &warnings {
        warn!(book = %report.filename, warning = %warning, "resolution warning");
    }
    report.warnings.extend(warnings);
}

fn mark_skipped(report: &mut BookReport, reason: &SkipReason) {
    warn!(book = %report.filename, reason = %reason, "book skipped");
    report.status = "skipped".to_string();
    report.skip_reason = Some(reason.as_str().to_string());
    report.warnings.push(reason.to_string());
}
