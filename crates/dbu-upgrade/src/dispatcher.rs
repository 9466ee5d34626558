//! Migration dispatcher.
//!
//! Runs the liveness check, optionally moves config into the central
//! directory, detects the backend, then walks the subsystems in their fixed
//! order and applies whichever scripts exist for the target version. Nothing is rolled back across subsystems: once a subsystem's
//! script has committed it stays committed even if a later one fails.

use crate::error::{UpgradeError, UpgradeResult};
use crate::liveness::LivenessGuard;
use crate::locator::ScriptLocator;
use crate::relocate::{ConfigRelocator, MovedConfig, RelocationOutcome};
use crate::report::{MigrationReport, OutcomeStatus, SkipReason};
use dbu_core::{
    ccnet_component, BackendDetector, BackendKind, Detection, EnvironmentContext, ServerVersion,
    Subsystem,
};
use dbu_db::{DriverTargets, SqlScriptApplier, StatementPolicy, TargetFactory};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Knobs for one upgrade run
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    /// Fail fast on networked backends too
    pub strict: bool,
    /// Report what would be applied without opening any database
    pub dry_run: bool,
    /// Move legacy config into the central directory first (5.0.0 and later)
    pub relocate_config: bool,
}

/// Which database a script is applied to
enum ScriptDestination {
    Embedded(PathBuf),
    Networked(Subsystem),
}

pub struct MigrationDispatcher<'a> {
    env: &'a EnvironmentContext,
    locator: ScriptLocator,
    options: MigrationOptions,
    targets: Box<dyn TargetFactory>,
}

impl<'a> MigrationDispatcher<'a> {
    pub fn new(env: &'a EnvironmentContext, options: MigrationOptions) -> Self {
        Self {
            env,
            locator: ScriptLocator::from_env(env),
            options,
            targets: Box::new(DriverTargets),
        }
    }

    /// Open databases through `targets` instead of the SQLite and MySQL drivers
    pub fn with_targets(mut self, targets: impl TargetFactory + 'static) -> Self {
        self.targets = Box::new(targets);
        self
    }

    /// Upgrade every subsystem database to `version`.
    ///
    /// Success means every applicable script was attempted. Under the
    /// fail-soft networked policy individual statements may still have
    /// failed; they are listed in the returned report.
    pub async fn run(&self, version: &ServerVersion) -> UpgradeResult<MigrationReport> {
        LivenessGuard::new(self.env).ensure_not_running().await?;

        let relocated = self.relocate_configs(version)?;
        let detection = BackendDetector::new(&self.detection_env(version)).detect(version)?;
        let policy = StatementPolicy::for_backend(detection.kind, self.options.strict);
        let applier = SqlScriptApplier::new(policy);
        let mut report = MigrationReport::new(
            version.as_str(),
            detection.kind,
            policy,
            self.options.dry_run,
        );
        report.relocated_configs = relocated;

        for subsystem in Subsystem::ALL {
            self.migrate_subsystem(subsystem, version, &detection, &applier, &mut report)
                .await?;
        }
        self.migrate_ccnet_components(version, &detection, &applier, &mut report)
            .await?;

        Ok(report)
    }

    /// Relocate legacy config when asked to; returns the files moved
    fn relocate_configs(&self, version: &ServerVersion) -> UpgradeResult<Vec<MovedConfig>> {
        if !self.options.relocate_config {
            return Ok(Vec::new());
        }
        if !version.uses_central_config() {
            log::warn!("{version} does not use a central config directory, not relocating config");
            return Ok(Vec::new());
        }
        if self.options.dry_run {
            log::info!("dry run, not relocating config");
            return Ok(Vec::new());
        }
        match ConfigRelocator::new(self.env).relocate()? {
            RelocationOutcome::Moved { files } => Ok(files),
            RelocationOutcome::AlreadyRelocated { .. } => Ok(Vec::new()),
        }
    }

    /// Environment detection reads from. A relocating run without a central
    /// directory configured reads from the directory the configs went to.
    fn detection_env(&self, version: &ServerVersion) -> Cow<'_, EnvironmentContext> {
        if self.options.relocate_config
            && version.uses_central_config()
            && self.env.central_config_dir.is_none()
        {
            let mut env = self.env.clone();
            env.central_config_dir = Some(ConfigRelocator::new(self.env).destination());
            return Cow::Owned(env);
        }
        Cow::Borrowed(self.env)
    }

    async fn migrate_subsystem(
        &self,
        subsystem: Subsystem,
        version: &ServerVersion,
        detection: &Detection,
        applier: &SqlScriptApplier,
        report: &mut MigrationReport,
    ) -> UpgradeResult<()> {
        let Some(script) = self.locator.locate(version, detection.kind, subsystem) else {
            log::debug!("No {} script for {}, nothing to do", subsystem, version);
            report.record(
                subsystem.name(),
                None,
                OutcomeStatus::Skipped {
                    reason: SkipReason::NoScript,
                },
            );
            return Ok(());
        };

        if subsystem.requires_pro() {
            // TODO: confirm with product owners whether a licence check
            // should replace the on-disk `pro` marker.
            if !self.env.is_pro() {
                log::info!("{subsystem} database is only used by the professional edition, skipping");
                report.record(
                    subsystem.name(),
                    Some(script),
                    OutcomeStatus::Skipped {
                        reason: SkipReason::NotProfessionalEdition,
                    },
                );
                return Ok(());
            }
            if detection.kind == BackendKind::Embedded {
                log::info!("{subsystem} does not support sqlite3 database");
                report.record(
                    subsystem.name(),
                    Some(script),
                    OutcomeStatus::Skipped {
                        reason: SkipReason::UnsupportedOnEmbedded,
                    },
                );
                return Ok(());
            }
        }

        let destination = match detection.kind {
            BackendKind::Embedded => match self.env.embedded_db_path(subsystem) {
                Some(path) => ScriptDestination::Embedded(path),
                None => {
                    report.record(
                        subsystem.name(),
                        Some(script),
                        OutcomeStatus::Skipped {
                            reason: SkipReason::UnsupportedOnEmbedded,
                        },
                    );
                    return Ok(());
                }
            },
            BackendKind::Networked => ScriptDestination::Networked(subsystem),
        };

        log::info!("updating {subsystem} database...");
        self.apply_script(subsystem.name(), &script, destination, detection, applier, report)
            .await
    }

    /// Embedded ccnet keeps some tables in separate component databases,
    /// each with its own optional script.
    async fn migrate_ccnet_components(
        &self,
        version: &ServerVersion,
        detection: &Detection,
        applier: &SqlScriptApplier,
        report: &mut MigrationReport,
    ) -> UpgradeResult<()> {
        let scripts = self
            .locator
            .ccnet_component_scripts(version, detection.kind)?;

        for script in scripts {
            let stem = script
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let component = ccnet_component(&stem).ok_or_else(|| UpgradeError::UnknownComponent {
                path: script.display().to_string(),
            })?;

            let target = format!("{}/{}", Subsystem::Ccnet, component.stem);
            let db_path = self.env.ccnet_component_path(component);
            log::info!("updating {target} database...");
            self.apply_script(
                &target,
                &script,
                ScriptDestination::Embedded(db_path),
                detection,
                applier,
                report,
            )
            .await?;
        }
        Ok(())
    }

    async fn apply_script(
        &self,
        target_name: &str,
        script: &Path,
        destination: ScriptDestination,
        detection: &Detection,
        applier: &SqlScriptApplier,
        report: &mut MigrationReport,
    ) -> UpgradeResult<()> {
        let sql = std::fs::read_to_string(script).map_err(|e| UpgradeError::Io {
            path: script.display().to_string(),
            message: e.to_string(),
        })?;

        if self.options.dry_run {
            report.record(target_name, Some(script.to_path_buf()), OutcomeStatus::Planned);
            return Ok(());
        }

        let db_err = |source| UpgradeError::Db {
            target: target_name.to_string(),
            source,
        };
        let mut target = match destination {
            ScriptDestination::Embedded(path) => {
                self.targets.open_embedded(&path).await.map_err(db_err)?
            }
            ScriptDestination::Networked(subsystem) => {
                let info = detection.connection(subsystem).ok_or_else(|| {
                    UpgradeError::MissingConnection {
                        target: target_name.to_string(),
                    }
                })?;
                self.targets.open_networked(info).await.map_err(db_err)?
            }
        };

        let applied = applier
            .apply(target.as_mut(), &sql)
            .await
            .map_err(db_err)?;
        report.record(
            target_name,
            Some(script.to_path_buf()),
            OutcomeStatus::Applied { report: applied },
        );
        Ok(())
    }
}
