use oxitel_core::{AggregateRecord, VitalSample};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::CycleConfig;
use crate::reader::FrameReader;
use crate::transport::{ByteSource, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The cycle was interrupted; no aggregate is produced.
    #[error("measurement cycle cancelled")]
    Cancelled,
}

/// Run one measurement cycle: `sample_count` acquisition attempts reduced
/// to a single aggregate record.
///
/// A failed slot (short frame, rejected digits, transport hiccup) is logged
/// and skipped; it is neither retried nor fatal, so a cycle can finish with
/// fewer samples than attempts, including none at all. Cycles keep no state
/// between invocations.
pub async fn run_cycle(
    source: &mut dyn ByteSource,
    reader: &FrameReader,
    config: &CycleConfig,
    cancel: &CancellationToken,
) -> Result<AggregateRecord, CycleError> {
    let mut samples: Vec<VitalSample> = Vec::with_capacity(config.sample_count);

    for slot in 0..config.sample_count {
        if cancel.is_cancelled() {
            return Err(CycleError::Cancelled);
        }

        match reader.next_frame(source, cancel).await {
            Ok(frame) => match reader.decode(&frame) {
                Ok(sample) => {
                    info!(
                        slot,
                        heart_rate = sample.heart_rate,
                        spo2 = sample.spo2,
                        "Decoded sample"
                    );
                    samples.push(sample);
                }
                Err(e) => {
                    warn!(slot, frame_len = frame.len(), error = %e, "Frame rejected, slot skipped");
                }
            },
            Err(TransportError::Cancelled) => return Err(CycleError::Cancelled),
            Err(e) => {
                warn!(slot, error = %e, "Frame acquisition failed, slot skipped");
            }
        }

        // Cooperative pacing only; decode itself may already have blocked
        // for the transport timeout.
        if slot + 1 < config.sample_count {
            tokio::select! {
                _ = cancel.cancelled() => return Err(CycleError::Cancelled),
                _ = tokio::time::sleep(config.interval()) => {}
            }
        }
    }

    let record = aggregate(&samples);
    info!(
        samples = samples.len(),
        attempts = config.sample_count,
        avg_heart_rate = record.avg_heart_rate,
        avg_spo2 = record.avg_spo2,
        "Cycle aggregated"
    );

    Ok(record)
}

/// Reduce a cycle's samples to per-metric means, stamped with today's date.
///
/// An empty set yields zero averages by policy, not an error.
pub fn aggregate(samples: &[VitalSample]) -> AggregateRecord {
    let (avg_heart_rate, avg_spo2) = if samples.is_empty() {
        (0.0, 0.0)
    } else {
        let n = samples.len() as f64;
        (
            samples.iter().map(|s| f64::from(s.heart_rate)).sum::<f64>() / n,
            samples.iter().map(|s| f64::from(s.spo2)).sum::<f64>() / n,
        )
    };

    AggregateRecord {
        avg_heart_rate,
        avg_spo2,
        measured_on: jiff::Zoned::now().date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_of_empty_set_is_zero() {
        let record = aggregate(&[]);
        assert_eq!(record.avg_heart_rate, 0.0);
        assert_eq!(record.avg_spo2, 0.0);
    }

    #[test]
    fn aggregate_means_both_metrics() {
        let samples = [
            VitalSample {
                heart_rate: 60,
                spo2: 95,
            },
            VitalSample {
                heart_rate: 80,
                spo2: 97,
            },
        ];
        let record = aggregate(&samples);
        assert_eq!(record.avg_heart_rate, 70.0);
        assert_eq!(record.avg_spo2, 96.0);
    }

    #[test]
    fn aggregate_stamps_current_date() {
        let record = aggregate(&[]);
        assert_eq!(record.measured_on, jiff::Zoned::now().date());
    }
}
