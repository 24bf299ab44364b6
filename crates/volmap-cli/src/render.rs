//! Text and JSON renderings of country data.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use volmap_core::models::{CountryRecord, GlobalStats};
use volmap_core::utils::{format_date, join_languages, truncate_string};
use volmap_core::{CountryPresenter, Loaded, LoadFailure, Locale};

// ============================================================================
// Constants
// ============================================================================

/// Column width for volunteer names
const NAME_WIDTH: usize = 20;

/// Languages shown per volunteer before collapsing to "+n"
const MAX_LANGUAGES_SHOWN: usize = 3;

/// Plain text for terminals
pub struct TextPresenter {
    locale: Locale,
    /// Named in the empty-state hint when records come from a directory
    data_dir: Option<PathBuf>,
}

impl TextPresenter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            data_dir: None,
        }
    }

    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        self.data_dir = Some(dir.to_path_buf());
        self
    }

    fn write_header(&self, record: &CountryRecord, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{} ({})  updated {}",
            record.country_name,
            record.country_code,
            format_date(&record.last_updated)
        )?;
        let s = &record.stats;
        writeln!(
            out,
            "  total {}  active {}  translators {}  reviewers {}  coordinators {}  languages {}",
            s.total, s.active, s.translators, s.reviewers, s.coordinators, s.languages
        )
    }

    fn write_volunteers(&self, record: &CountryRecord, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "  {:<8}{:<w$}  {:<12}{:<18}{:<9}{:>5}",
            "ID", "Name", "Role", "Languages", "Status", "Tasks",
            w = NAME_WIDTH
        )?;
        for v in &record.volunteers {
            writeln!(
                out,
                "  {:<8}{:<w$}  {:<12}{:<18}{:<9}{:>5}",
                v.id,
                truncate_string(&v.name, NAME_WIDTH),
                v.role.label(self.locale),
                join_languages(&v.languages, MAX_LANGUAGES_SHOWN),
                v.status.label(self.locale),
                v.completed_tasks,
                w = NAME_WIDTH
            )?;
        }
        Ok(())
    }
}

impl CountryPresenter for TextPresenter {
    fn present_country(&self, loaded: &Loaded, out: &mut dyn Write) -> io::Result<()> {
        let record = &loaded.record;
        match loaded.failure {
            Some(LoadFailure::Failed(ref reason)) => {
                writeln!(out, "Could not load {} ({}): {}", record.country_name, record.country_code, reason)?;
                writeln!(
                    out,
                    "  Showing an empty record. Retry with: volmap show {} --refresh",
                    record.country_code
                )?;
            }
            Some(LoadFailure::InvalidCode) => {
                writeln!(out, "Not a country code: {:?}", record.country_code)?;
                return Ok(());
            }
            _ => {}
        }

        self.write_header(record, out)?;
        if record.is_empty() {
            writeln!(out)?;
            writeln!(out, "  No volunteer records yet.")?;
            if let Some(ref dir) = self.data_dir {
                let path = dir.join(format!("{}.json", record.country_code));
                writeln!(out, "  Data file: {}", path.display())?;
            }
            writeln!(
                out,
                "  Be the first: volmap add {} --name <NAME>",
                record.country_code
            )?;
            return Ok(());
        }
        self.write_volunteers(record, out)
    }

    fn present_global(&self, stats: &GlobalStats, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{} volunteers ({} active) in {} countries",
            stats.total_volunteers, stats.active_volunteers, stats.total_countries
        )?;
        if stats.ranking.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        for (i, rank) in stats.ranking.iter().enumerate() {
            writeln!(
                out,
                "  {:>2}. {:<24}{:>6}",
                i + 1,
                format!("{} ({})", rank.country_name, rank.country_code),
                rank.count
            )?;
        }
        Ok(())
    }
}

/// Machine-readable output, one pretty JSON document per call
pub struct JsonPresenter;

impl CountryPresenter for JsonPresenter {
    fn present_country(&self, loaded: &Loaded, out: &mut dyn Write) -> io::Result<()> {
        let doc = serde_json::json!({
            "record": loaded.record,
            "fallback": loaded.is_fallback(),
            "failure": loaded.failure.as_ref().map(|f| f.to_string()),
        });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)
    }

    fn present_global(&self, stats: &GlobalStats, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, stats)?;
        writeln!(out)
    }
}
