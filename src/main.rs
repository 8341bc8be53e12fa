//! Fraud Screening Service - Main Entry Point
//!
//! Consumes transaction submissions from NATS, runs the encode-then-classify
//! pipeline, and publishes screening responses. Optionally publishes periodic
//! summary statistics from the historical transaction table.

use anyhow::Result;
use fraud_screening::{
    config::AppConfig,
    consumer::SubmissionConsumer,
    context::ScreeningContext,
    error::ScreeningError,
    metrics::{MetricsReporter, ScreeningMetrics},
    producer::{ResponsePublisher, SummaryPublisher},
    summary::SummaryProvider,
    types::ScreeningResponse,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_screening=info".parse()?),
        )
        .init();

    info!("Starting Fraud Screening Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Build the immutable screening context: schema, lookup tables, model
    let context = Arc::new(ScreeningContext::from_config(&config)?);
    info!(
        features = context.encoder().schema().len(),
        model_available = context.model_available(),
        "Screening context initialized"
    );

    // Initialize metrics and the periodic reporter
    let metrics = Arc::new(ScreeningMetrics::new());
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = SubmissionConsumer::new(client.clone(), &config.nats.submission_subject);
    let publisher = ResponsePublisher::new(client.clone(), &config.nats.response_subject);

    // Optional summary surface over the historical table
    if let Some(data) = &config.data {
        match SummaryProvider::open(
            &data.database,
            data.table.clone(),
            data.row_limit,
            Duration::from_secs(data.cache_secs),
        ) {
            Ok(provider) => {
                let summary_publisher =
                    SummaryPublisher::new(client.clone(), &config.nats.summary_subject);
                let publish_secs = data.publish_secs;
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(Duration::from_secs(publish_secs));
                    loop {
                        interval.tick().await;
                        match provider.stats() {
                            Ok(stats) => {
                                if let Err(e) = summary_publisher.publish(&stats).await {
                                    error!(error = %e, "Failed to publish summary statistics");
                                }
                            }
                            Err(e) => {
                                error!(error = %e, "Summary query failed");
                            }
                        }
                    }
                });
            }
            Err(e) => {
                error!(
                    database = %data.database,
                    error = %e,
                    "Failed to open summary source, summary surface disabled"
                );
            }
        }
    }

    info!(
        submission_subject = %config.nats.submission_subject,
        response_subject = %config.nats.response_subject,
        "Starting screening loop"
    );

    // Process submissions sequentially: one encode-then-classify chain per
    // interaction, no concurrent submissions in flight.
    let mut submissions = consumer.subscribe().await?;

    while let Some(input) = submissions.next_submission().await {
        let start_time = Instant::now();
        let request_id = input.request_id.clone();

        let response = match context.screen(&input) {
            Ok(verdict) => {
                let processing_time = start_time.elapsed();
                metrics.record_verdict(processing_time, &verdict);

                info!(
                    request_id = %request_id,
                    label = ?verdict.label,
                    confidence = ?verdict.confidence,
                    processing_time_us = processing_time.as_micros(),
                    "Submission screened"
                );

                ScreeningResponse::scored(&request_id, &verdict)
            }
            Err(e) => {
                // Recovered here and rendered into the response; the
                // process keeps serving.
                match &e {
                    ScreeningError::Encode(encode_err) => {
                        metrics.record_encode_failure();
                        warn!(
                            request_id = %request_id,
                            error = %encode_err,
                            "Encoding failed"
                        );
                    }
                    ScreeningError::Classify(classify_err) => {
                        metrics.record_classify_failure();
                        error!(
                            request_id = %request_id,
                            error = %classify_err,
                            "Classification failed"
                        );
                    }
                }
                ScreeningResponse::failed(&request_id, &e)
            }
        };

        if let Err(e) = publisher.publish(&response).await {
            error!(
                request_id = %request_id,
                error = %e,
                "Failed to publish screening response"
            );
        } else {
            debug!(
                request_id = %request_id,
                response_id = %response.response_id,
                "Screening response published"
            );
        }
    }

    info!("Screening service shutting down...");
    metrics.print_summary();

    Ok(())
}
