use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ndarray::{Array4, CowArray, IxDyn};
use once_cell::sync::OnceCell;
use ort::environment::Environment;
use ort::error::OrtError;
use ort::session::{Session, SessionBuilder};
use ort::value::Value;
use table_text_types::{ImageFrame, Polygon};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::engine::TextDetector;
use crate::error::DetectorError;
use crate::postprocess::{ProbabilityMap, polygons_from_map};
use crate::preprocess::{normalized_chw, resize_target};

#[derive(Debug)]
struct ModelHandle {
    _environment: Arc<Environment>,
    session: Session,
}

/// One session per model path for the whole process.
struct ModelRegistry {
    environment: Arc<Environment>,
    handles: Mutex<HashMap<PathBuf, Arc<ModelHandle>>>,
}

impl ModelRegistry {
    fn new() -> Result<Self, DetectorError> {
        let environment = Environment::builder()
            .with_name("table-text-detector")
            .build()
            .map_err(map_environment_error)?;
        Ok(Self {
            environment: Arc::new(environment),
            handles: Mutex::new(HashMap::new()),
        })
    }

    fn get(&self, path: &Path) -> Result<Arc<ModelHandle>, DetectorError> {
        let mut handles = self
            .handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = handles.get(path) {
            return Ok(handle.clone());
        }

        let session = SessionBuilder::new(&self.environment)
            .map_err(map_session_error)?
            .with_model_from_file(path)
            .map_err(map_session_error)?;
        info!(model = %path.display(), "loaded text detection model");

        let handle = Arc::new(ModelHandle {
            _environment: Arc::clone(&self.environment),
            session,
        });
        handles.insert(path.to_path_buf(), handle.clone());
        Ok(handle)
    }
}

static MODEL_REGISTRY: OnceCell<ModelRegistry> = OnceCell::new();

fn registry() -> Result<&'static ModelRegistry, DetectorError> {
    MODEL_REGISTRY.get_or_try_init(ModelRegistry::new)
}

pub fn ensure_model_ready(model_path: Option<&Path>) -> Result<(), DetectorError> {
    let path = existing_model(model_path)?;
    registry()?.get(path)?;
    Ok(())
}

fn existing_model(model_path: Option<&Path>) -> Result<&Path, DetectorError> {
    let path = model_path.ok_or(DetectorError::MissingModelPath)?;
    if !path.exists() {
        return Err(DetectorError::ModelNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(path)
}

/// DB text detector backed by an ONNX export of a PP-OCR detection model.
#[derive(Debug, Clone)]
pub struct OnnxDbDetector {
    config: DetectorConfig,
    model: Arc<ModelHandle>,
}

impl OnnxDbDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        let model_path = existing_model(config.model_path.as_deref())?;
        let model = registry()?.get(model_path)?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl TextDetector for OnnxDbDetector {
    fn name(&self) -> &'static str {
        "onnx-db"
    }

    fn warm_up(&self) -> Result<(), DetectorError> {
        let (width, height) = (32, 32);
        let input = prepare_input_tensor(vec![0.0; 3 * width * height], width, height)?;
        run_model(&self.model, &input).map(|_| ())
    }

    fn detect(&self, image: &ImageFrame) -> Result<Vec<Polygon>, DetectorError> {
        if image.is_empty() {
            return Ok(Vec::new());
        }

        let src_width = image.width() as usize;
        let src_height = image.height() as usize;
        let (width, height) = resize_target(
            src_width,
            src_height,
            self.config.limit_side_len,
            self.config.limit_type,
        );
        let input = prepare_input_tensor(normalized_chw(image, width, height), width, height)?;
        let (output, shape) = run_model(&self.model, &input)?;
        let map =
            ProbabilityMap::from_output(&output, &shape).ok_or(DetectorError::InvalidOutputShape)?;
        let polygons = polygons_from_map(&map, src_width, src_height, &self.config);
        debug!(
            width = src_width,
            height = src_height,
            input_width = width,
            input_height = height,
            polygons = polygons.len(),
            "db detection finished"
        );
        Ok(polygons)
    }
}

fn map_environment_error(err: OrtError) -> DetectorError {
    map_schema_conflict(err, DetectorError::Environment)
}

fn map_session_error(err: OrtError) -> DetectorError {
    map_schema_conflict(err, DetectorError::Session)
}

fn map_schema_conflict<F>(err: OrtError, default: F) -> DetectorError
where
    F: FnOnce(String) -> DetectorError,
{
    let message = err.to_string();
    if message.contains("Trying to register schema with name") {
        DetectorError::RuntimeSchemaConflict { message }
    } else {
        default(message)
    }
}

fn prepare_input_tensor(
    planes: Vec<f32>,
    width: usize,
    height: usize,
) -> Result<Array4<f32>, DetectorError> {
    Array4::from_shape_vec((1, 3, height, width), planes)
        .map_err(|err| DetectorError::Input(err.to_string()))
}

fn run_model(
    model: &ModelHandle,
    input: &Array4<f32>,
) -> Result<(Vec<f32>, Vec<usize>), DetectorError> {
    let session = &model.session;
    let allocator = session.allocator();
    let input_dyn: CowArray<'_, f32, IxDyn> = CowArray::from(input.view().into_dyn());
    let value = Value::from_array(allocator, &input_dyn)
        .map_err(|err| DetectorError::Input(err.to_string()))?;
    let outputs = session
        .run(vec![value])
        .map_err(|err| DetectorError::Inference(err.to_string()))?;
    let tensor = outputs
        .into_iter()
        .next()
        .ok_or(DetectorError::InvalidOutputShape)?
        .try_extract::<f32>()
        .map_err(|err| DetectorError::Inference(err.to_string()))?;
    let view = tensor.view();
    let shape = view.shape().to_vec();
    let data = view.iter().copied().collect::<Vec<f32>>();
    Ok((data, shape))
}
