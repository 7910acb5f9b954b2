//! One measurement pass, start to finish

use crate::backend::{SessionResults, SpeedtestBackend, SpeedtestCli};
use crate::error::{AppError, MeasurementStage, Result};
use crate::logging::RunLogger;
use crate::models::{MeasurementResult, RawMeasurements, ServerIdentity, Settings};
use crate::selector::ServerSelector;
use crate::store::{ConfigSource, ConfigStore};
use crate::types::SelectionSource;
use std::future::Future;
use std::time::Instant;

/// A completed pass: the result together with the server that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRun {
    pub result: MeasurementResult,
    pub server: ServerIdentity,
    pub source: SelectionSource,
}

/// Runs load, resolve, bind, download, upload and latency in order.
///
/// The first failing step aborts the pass and nothing partial is returned.
/// There are no retries; the next scheduled invocation is the retry.
pub struct MeasurementRunner {
    source: Box<dyn ConfigSource>,
    backend: Box<dyn SpeedtestBackend>,
    logger: RunLogger,
}

impl MeasurementRunner {
    pub fn new(source: Box<dyn ConfigSource>, backend: Box<dyn SpeedtestBackend>, logger: RunLogger) -> Self {
        Self {
            source,
            backend,
            logger,
        }
    }

    /// Runner over the pinned config file and the external speed test client
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            Box::new(ConfigStore::new(settings.pinned_config_path.clone())),
            Box::new(SpeedtestCli::new(&settings.backend_command)?),
            RunLogger::new(settings),
        ))
    }

    pub async fn run(&mut self) -> Result<MeasurementRun> {
        let started = Instant::now();
        self.logger.run_started().await;

        let outcome = self.execute().await;

        self.logger.run_finished(outcome.is_ok(), started.elapsed()).await;
        outcome
    }

    async fn execute(&mut self) -> Result<MeasurementRun> {
        let Self {
            source,
            backend,
            logger,
        } = self;

        let pinned = match source.load().await {
            Ok(load) => load.into_config(),
            Err(e) => {
                logger.stage_failed(&e).await;
                return Err(e);
            }
        };

        let resolved = match ServerSelector::resolve(&pinned, &mut **backend).await {
            Ok(resolved) => resolved,
            Err(e) => {
                logger.stage_failed(&e).await;
                return Err(e);
            }
        };
        logger.server_resolved(&resolved.server, resolved.source).await;

        timed_stage(logger, MeasurementStage::Bind, backend.bind(&resolved.server)).await?;
        let download_bps = timed_stage(logger, MeasurementStage::Download, backend.download()).await?;
        let upload_bps = timed_stage(logger, MeasurementStage::Upload, backend.upload()).await?;

        let session = timed_stage(logger, MeasurementStage::Latency, read_latency(&**backend)).await?;

        let result = MeasurementResult::complete(RawMeasurements {
            download_bps,
            upload_bps,
            ping_ms: session.ping_ms,
            jitter_ms: session.jitter_ms.filter(|jitter| jitter.is_finite() && *jitter >= 0.0),
        });

        Ok(MeasurementRun {
            result,
            server: resolved.server,
            source: resolved.source,
        })
    }
}

async fn read_latency(backend: &dyn SpeedtestBackend) -> Result<SessionResults> {
    let session = backend.results().await?;
    if !session.ping_ms.is_finite() || session.ping_ms < 0.0 {
        return Err(AppError::backend(format!("Invalid ping value {}", session.ping_ms)));
    }
    Ok(session)
}

/// Await one stage, converting any failure into a measurement error for it
async fn timed_stage<T, F>(logger: &RunLogger, stage: MeasurementStage, step: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    logger.stage_started(stage.as_str()).await;
    let started = Instant::now();

    match step.await {
        Ok(value) => {
            logger.stage_finished(stage.as_str(), started.elapsed()).await;
            Ok(value)
        }
        Err(e) => {
            let error = AppError::measurement(stage, e.to_string());
            logger.stage_failed(&error).await;
            Err(error)
        }
    }
}
