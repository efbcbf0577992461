mod dto;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::duration::DurationArg;
use crate::error::{Error, Result};

pub use dto::FlagData;

/// Name of the flag file inside the installation root
pub const FLAG_FILE_NAME: &str = ".maintenance";

/// Root directory of the web installation whose maintenance state we manage
pub struct Installation {
    path: PathBuf,
}

/// What `enable` did, for the success message
#[derive(Debug)]
pub enum EnableOutcome {
    /// Maintenance mode was off and is now on
    Enabled { expires_at: Option<DateTime<Utc>> },
    /// Maintenance mode was already on, `--force` replaced its duration
    Updated { expires_at: Option<DateTime<Utc>> },
}

pub enum DisableOutcome {
    Disabled,
    /// Nothing was on; any stale flag file is left alone
    WasInactive,
}

impl Installation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn flag_file_path(&self) -> PathBuf {
        self.path.join(FLAG_FILE_NAME)
    }

    /// Turn maintenance mode on, or with `force` replace the duration of an
    /// already running one.
    pub fn enable(
        &self,
        duration: &DurationArg,
        force: bool,
        default_duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<EnableOutcome> {
        if matches!(duration, DurationArg::Forever) && !force {
            return Err(Error::Validation(
                "a duration of `forever` also needs --force".into(),
            ));
        }

        self.check_writable()?;

        let was_active = self.is_active(now)?;
        if was_active && !force {
            return Err(Error::AlreadyEnabled);
        }

        let expires_at = duration.expires_at(default_duration, now);
        self.store_flag(&dto::FlagData::new(now, expires_at))?;
        info!(path = %self.flag_file_path().display(), "Maintenance flag written");

        Ok(if was_active {
            EnableOutcome::Updated { expires_at }
        } else {
            EnableOutcome::Enabled { expires_at }
        })
    }

    /// Turn maintenance mode off by deleting the flag file.
    pub fn disable(&self, now: DateTime<Utc>) -> Result<DisableOutcome> {
        if !self.is_active(now)? {
            return Ok(DisableOutcome::WasInactive);
        }

        let path = self.flag_file_path();
        debug!(path = %path.display(), "Deleting maintenance flag");
        fs::remove_file(&path).map_err(|source| match source.kind() {
            ErrorKind::PermissionDenied => Error::NotWritable(path.clone()),
            _ => Error::io(
                format!("cannot delete maintenance flag {}", path.display()),
                source,
            ),
        })?;
        Ok(DisableOutcome::Disabled)
    }

    /// Whether maintenance mode is on at `now`. A missing flag file means off.
    pub fn is_active(&self, now: DateTime<Utc>) -> Result<bool> {
        let Some(flag) = self.load_flag()? else {
            return Ok(false);
        };
        let active = flag.is_active(now);
        match flag.expires_in(now) {
            Some(left) => debug!(active, expires_in_secs = left.num_seconds(), "Read maintenance flag"),
            None => debug!(active, "Read maintenance flag, no expiry set"),
        }
        Ok(active)
    }

    pub fn load_flag(&self) -> Result<Option<dto::FlagData>> {
        let path = self.flag_file_path();
        if !path
            .try_exists()
            .map_err(|e| Error::io(format!("cannot stat {}", path.display()), e))?
        {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| Error::io(format!("cannot read maintenance flag {}", path.display()), e))?;
        let flag =
            serde_json::from_str(&raw).map_err(|source| Error::MalformedFlag { path, source })?;
        Ok(Some(flag))
    }

    fn store_flag(&self, flag: &dto::FlagData) -> Result<()> {
        let path = self.flag_file_path();
        let json = serde_json::to_string_pretty(flag)
            .map_err(|e| Error::io("cannot encode maintenance flag", e.into()))?;
        fs::write(&path, json).map_err(|source| match source.kind() {
            ErrorKind::PermissionDenied => Error::NotWritable(path.clone()),
            _ => Error::io(
                format!("cannot write maintenance flag {}", path.display()),
                source,
            ),
        })
    }

    /// The host platform reads the flag with web server privileges; catching
    /// a read-only installation up front beats a half-done enable.
    fn check_writable(&self) -> Result<()> {
        let flag = self.flag_file_path();
        let target = if flag
            .try_exists()
            .map_err(|e| Error::io(format!("cannot stat {}", flag.display()), e))?
        {
            flag
        } else {
            self.path.clone()
        };
        let meta = fs::metadata(&target)
            .map_err(|e| Error::io(format!("cannot stat {}", target.display()), e))?;
        if meta.permissions().readonly() {
            return Err(Error::NotWritable(target));
        }
        Ok(())
    }
}
