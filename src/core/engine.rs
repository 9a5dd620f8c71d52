use crate::core::Pipeline;
use crate::utils::error::Result;

/// Drives one extract → transform → load pass.
///
/// A failed extract does not stop the run: it is logged and the dashboard is
/// built from an empty dataset, so every view reports its empty state.
pub struct ObservatoryEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ObservatoryEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting dashboard refresh");

        tracing::info!("📥 Extracting postings...");
        let raw_data = match self.pipeline.extract().await {
            Ok(data) => {
                tracing::info!("Extracted {} postings", data.len());
                data
            }
            Err(e) => {
                tracing::error!(
                    "❌ Error loading data: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::warn!("💡 {}", e.recovery_suggestion());
                Vec::new()
            }
        };

        tracing::info!("🔄 Normalizing postings...");
        let prepared = self.pipeline.transform(raw_data).await?;

        tracing::info!("💾 Computing views and writing output...");
        let output_path = self.pipeline.load(prepared).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RawRecord;
    use crate::utils::error::ObservatoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records what load received.
    struct ScriptedPipeline {
        fail_extract: bool,
        loaded: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl Pipeline for ScriptedPipeline {
        type Loaded = usize;

        async fn extract(&self) -> Result<Vec<RawRecord>> {
            if self.fail_extract {
                return Err(ObservatoryError::FetchStatusError {
                    url: "http://jobs.test/api/data".to_string(),
                    status: 503,
                });
            }
            Ok(vec![RawRecord::default(), RawRecord::default()])
        }

        async fn transform(&self, data: Vec<RawRecord>) -> Result<usize> {
            Ok(data.len())
        }

        async fn load(&self, loaded: usize) -> Result<String> {
            *self.loaded.lock().unwrap() = Some(loaded);
            Ok("out/dashboard.json".to_string())
        }
    }

    #[test]
    fn test_run_passes_extracted_rows_through() {
        let engine = ObservatoryEngine::new(ScriptedPipeline {
            fail_extract: false,
            loaded: Mutex::new(None),
        });
        let output = tokio_test::block_on(engine.run()).unwrap();
        assert_eq!(output, "out/dashboard.json");
        assert_eq!(*engine.pipeline().loaded.lock().unwrap(), Some(2));
    }

    #[test]
    fn test_failed_extract_continues_with_empty_dataset() {
        let engine = ObservatoryEngine::new(ScriptedPipeline {
            fail_extract: true,
            loaded: Mutex::new(None),
        });
        assert!(tokio_test::block_on(engine.run()).is_ok());
        assert_eq!(*engine.pipeline().loaded.lock().unwrap(), Some(0));
    }
}
