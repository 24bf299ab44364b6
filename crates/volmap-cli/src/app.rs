//! Application state and command handlers.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use volmap_core::models::{CountryRecord, GlobalStats, Role, Status, VolunteerDraft};
use volmap_core::source::DirSource;
use volmap_core::store::{is_valid_code, normalize_code};
use volmap_core::{
    compute_global_stats, ApiClient, Config, CountryCache, CountryPresenter, CountrySource,
    CountryStore, LoadFailure, SourceKind,
};

use crate::render::{JsonPresenter, TextPresenter};

/// Rows shown by `stats` unless `--top` says otherwise
pub const DEFAULT_TOP: usize = 10;

/// Fields accepted by `add`
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub name: String,
    pub role: Option<Role>,
    pub languages: Vec<String>,
    pub location: Option<String>,
    pub status: Option<Status>,
    pub save: bool,
}

impl AddArgs {
    fn draft(&self) -> VolunteerDraft {
        VolunteerDraft {
            name: Some(self.name.clone()),
            role: self.role,
            languages: if self.languages.is_empty() {
                None
            } else {
                Some(self.languages.clone())
            },
            location: self.location.clone(),
            status: self.status,
            ..VolunteerDraft::default()
        }
    }
}

pub struct App {
    pub config: Config,
    pub cache: CountryCache,
    presenter: Box<dyn CountryPresenter>,
}

impl App {
    /// Wire source, store, cache and presenter from a resolved config
    pub fn new(config: Config, json: bool) -> Result<Self> {
        let source = config.build_source()?;
        info!(source = %source.describe(), ttl_secs = config.cache_ttl_secs, "Using country source");

        let store = CountryStore::new(source).with_locale(config.locale);
        let cache = CountryCache::new(store, config.cache_ttl());
        let presenter: Box<dyn CountryPresenter> = if json {
            Box::new(JsonPresenter)
        } else {
            let presenter = TextPresenter::new(config.locale);
            match config.source {
                SourceKind::Dir => Box::new(presenter.with_data_dir(&config.data_dir)),
                _ => Box::new(presenter),
            }
        };

        Ok(Self {
            config,
            cache,
            presenter,
        })
    }

    /// Present one country. With `refresh`, a failed load is retried once
    /// after dropping the cached fallback.
    pub async fn show(&self, code: &str, refresh: bool, out: &mut dyn Write) -> Result<()> {
        let mut loaded = self.cache.get_detailed(code).await;
        if refresh && matches!(loaded.failure, Some(LoadFailure::Failed(_))) {
            info!(country = %code, "Retrying failed load");
            self.cache.invalidate(code).await;
            loaded = self.cache.get_detailed(code).await;
        }
        self.presenter.present_country(&loaded, out)?;
        Ok(())
    }

    pub async fn stats(&self, codes: &[String], top: usize, out: &mut dyn Write) -> Result<()> {
        let codes = if codes.is_empty() {
            self.config.countries.as_slice()
        } else {
            codes
        };
        let stats = compute_global_stats(&self.cache, codes).await;
        let shown = GlobalStats {
            ranking: stats.top(top).to_vec(),
            ..stats
        };
        self.presenter.present_global(&shown, out)?;
        Ok(())
    }

    /// The cached record for `code`, if writing it back cannot lose data.
    /// A template standing in for a failed load never qualifies; one for a
    /// country with no data yet does.
    async fn writable(&self, code: &str) -> Result<CountryRecord> {
        let loaded = self.cache.get_detailed(code).await;
        match loaded.failure {
            Some(LoadFailure::Failed(reason)) => bail!(
                "Existing data for {} could not be loaded, not writing over it: {}",
                loaded.record.country_code,
                reason
            ),
            Some(LoadFailure::InvalidCode) => bail!("Not a country code: {:?}", code),
            _ => Ok(loaded.record),
        }
    }

    /// Append a volunteer through the cache; persist only when asked
    pub async fn add(&self, code: &str, args: &AddArgs, out: &mut dyn Write) -> Result<()> {
        self.writable(code).await?;
        let (record, volunteer) = self.cache.add_volunteer(code, args.draft()).await;
        info!(country = %record.country_code, id = %volunteer.id, "Added volunteer");

        if args.save {
            self.cache
                .store()
                .save(&record)
                .await
                .with_context(|| format!("Failed to save {}", record.country_code))?;
        } else {
            warn!(country = %record.country_code, "Volunteer kept in memory only; pass --save to persist");
        }

        let loaded = self.cache.get_detailed(&record.country_code).await;
        self.presenter.present_country(&loaded, out)?;
        Ok(())
    }

    /// Write an empty record for `code` into the data directory.
    /// Returns the path written.
    pub async fn init(&self, code: &str, force: bool) -> Result<PathBuf> {
        let normalized = normalize_code(code);
        if !is_valid_code(&normalized) {
            bail!("Not a country code: {:?}", code);
        }
        let template = self.cache.store().empty_template(&normalized);

        let dir = DirSource::new(&self.config.data_dir);
        let path = dir.record_path(&template.country_code);
        if !force && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }

        dir.store(&template)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.cache.put(template).await;
        Ok(path)
    }

    fn api(&self) -> Result<ApiClient> {
        self.config.api_client()
    }

    pub async fn regions(&self, json: bool, out: &mut dyn Write) -> Result<()> {
        let regions = self.api()?.regions().await.context("Failed to fetch regions")?;
        if json {
            serde_json::to_writer_pretty(&mut *out, &regions)?;
            writeln!(out)?;
        } else {
            for region in regions {
                writeln!(out, "{}", region)?;
            }
        }
        Ok(())
    }

    pub async fn summary(&self, json: bool, out: &mut dyn Write) -> Result<()> {
        let summary = self.api()?.summary().await.context("Failed to fetch summary")?;
        if json {
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
        } else {
            writeln!(out, "Volunteers:      {}", summary.total_volunteers)?;
            writeln!(out, "  active:        {}", summary.active_volunteers)?;
            writeln!(out, "  inactive:      {}", summary.inactive_volunteers)?;
            writeln!(out, "Services:        {}", summary.total_service_count)?;
            writeln!(out, "Service hours:   {:.1}", summary.total_service_hours)?;
            writeln!(out, "Hours/volunteer: {:.1}", summary.avg_hours_per_volunteer)?;
        }
        Ok(())
    }

    /// Run one line of the interactive session. Returns false on quit.
    pub async fn run_line(&self, line: &str, out: &mut dyn Write) -> Result<bool> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(true);
        };
        let rest: Vec<String> = words.map(str::to_string).collect();

        match (command, rest.as_slice()) {
            ("quit" | "exit" | "q", _) => return Ok(false),
            ("help" | "?", _) => write_help(out)?,
            ("show", [code]) => self.show(code, false, out).await?,
            ("refresh", [code]) => {
                self.cache.invalidate(code).await;
                self.show(code, false, out).await?;
            }
            ("stats", codes) => self.stats(codes, DEFAULT_TOP, out).await?,
            ("add", [code, name @ ..]) if !name.is_empty() => {
                let args = AddArgs {
                    name: name.join(" "),
                    ..AddArgs::default()
                };
                self.add(code, &args, out).await?;
            }
            ("save", [code]) => {
                let record = self.writable(code).await?;
                self.cache.store().save(&record).await?;
                writeln!(out, "Saved {}", record.country_code)?;
            }
            ("age", [code]) => match self.cache.age(code).await {
                Some(age) => writeln!(out, "{} cached {}", code.to_uppercase(), age)?,
                None => writeln!(out, "{} is not cached", code.to_uppercase())?,
            },
            ("clear", _) => {
                self.cache.clear().await;
                writeln!(out, "Cache cleared")?;
            }
            _ => writeln!(out, "Unknown command: {} (try help)", line.trim())?,
        }
        Ok(true)
    }
}

fn write_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  show <CODE>         show one country")?;
    writeln!(out, "  refresh <CODE>      drop the cached entry and show again")?;
    writeln!(out, "  stats [CODE...]     global statistics")?;
    writeln!(out, "  add <CODE> <NAME>   add a volunteer (in memory)")?;
    writeln!(out, "  save <CODE>         write the cached record to the source")?;
    writeln!(out, "  age <CODE>          how long ago the entry was cached")?;
    writeln!(out, "  clear               empty the cache")?;
    writeln!(out, "  quit")
}

// ============================================================================
// Tests
// ============================================================================
