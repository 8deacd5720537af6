//! Scoring session: the one shared resource of a run.
//!
//! A session owns the worker pool used for row-parallel stages (feature
//! assembly, scoring). It is created by [`with_session`], handed to each stage
//! by reference, and dropped when that scope ends, whether the run succeeded
//! or not.

use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{AppError, EXIT_INPUT};

/// Session name used when neither the CLI nor the environment provides one.
pub const DEFAULT_APP_NAME: &str = "RegressionScoring";

const ENV_APP_NAME: &str = "SCORE_APP_NAME";
const ENV_THREADS: &str = "SCORE_THREADS";

/// Settings needed to build a [`ScoringSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub app_name: String,
    /// Worker count; `None` lets rayon pick (one per logical CPU).
    pub threads: Option<usize>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            threads: None,
        }
    }
}

impl SessionSettings {
    /// Resolve settings from CLI values, falling back to `SCORE_APP_NAME` /
    /// `SCORE_THREADS`, then to defaults. `app::run` loads `.env` beforehand.
    pub fn from_env(app_name: Option<String>, threads: Option<usize>) -> Result<Self, AppError> {
        resolve_settings(
            app_name,
            threads,
            std::env::var(ENV_APP_NAME).ok(),
            std::env::var(ENV_THREADS).ok(),
        )
    }
}

fn resolve_settings(
    cli_name: Option<String>,
    cli_threads: Option<usize>,
    env_name: Option<String>,
    env_threads: Option<String>,
) -> Result<SessionSettings, AppError> {
    let app_name = cli_name
        .or(env_name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

    let threads = match (cli_threads, env_threads) {
        (Some(n), _) => Some(n),
        (None, Some(raw)) => Some(raw.trim().parse::<usize>().map_err(|_| {
            AppError::new(
                EXIT_INPUT,
                format!("Invalid {ENV_THREADS} '{raw}': expected a positive integer."),
            )
        })?),
        (None, None) => None,
    };

    if threads == Some(0) {
        return Err(AppError::new(EXIT_INPUT, "Thread count must be > 0."));
    }

    Ok(SessionSettings { app_name, threads })
}

/// An explicitly scoped processing session.
pub struct ScoringSession {
    app_name: String,
    pool: ThreadPool,
    started: Instant,
}

impl ScoringSession {
    pub fn new(settings: &SessionSettings) -> Result<Self, AppError> {
        let mut builder = ThreadPoolBuilder::new().thread_name({
            let name = settings.app_name.clone();
            move |i| format!("{name}-{i}")
        });
        if let Some(n) = settings.threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            AppError::new(
                EXIT_INPUT,
                format!("Failed to create session '{}': {e}", settings.app_name),
            )
        })?;

        log::info!(
            "Created session '{}' with {} worker(s)",
            settings.app_name,
            pool.current_num_threads()
        );

        Ok(Self {
            app_name: settings.app_name.clone(),
            pool,
            started: Instant::now(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the session's worker pool.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl std::fmt::Debug for ScoringSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringSession")
            .field("app_name", &self.app_name)
            .field("threads", &self.threads())
            .finish()
    }
}

impl Drop for ScoringSession {
    fn drop(&mut self) {
        log::debug!(
            "Released session '{}' after {:.3}s",
            self.app_name,
            self.started.elapsed().as_secs_f64()
        );
    }
}

/// Create a session, run `f` with it, and release it on every exit path.
pub fn with_session<T>(
    settings: &SessionSettings,
    f: impl FnOnce(&ScoringSession) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let session = ScoringSession::new(settings)?;
    f(&session)
}
