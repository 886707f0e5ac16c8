use aquavision_contracts::image::ImageData;
use aquavision_contracts::models::{Capability, ModelSelection, ModelSelector, SelectionError};
use aquavision_contracts::outcome::{IdentifyError, IdentifyOutcome};
use aquavision_contracts::report::{
    identification_schema, similar_species_schema, validate_similar_species, IdentificationReport,
    SimilarSpeciesEntry, IDENTIFICATION_KEY, SIMILAR_KEY, STATUS_IDENTIFIED, STATUS_KEY,
    STATUS_NOT_RECOGNIZED,
};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::prompts::{
    illustration_prompt, image_identification_prompt, similar_species_prompt,
    text_identification_prompt,
};
use crate::transport::{
    classify_transport_error, GenerateRequest, GenerateResponse, ModelTransport, OutputMode,
    RequestPart,
};

pub const IDENTIFICATION_CAPABILITIES: [Capability; 2] =
    [Capability::Vision, Capability::StructuredText];
pub const ILLUSTRATION_CAPABILITIES: [Capability; 1] = [Capability::ImageOutput];

/// The four model-backed operations the session controller depends on.
pub trait Identifier {
    fn identify_from_image(&self, image: &ImageData, hint: Option<&str>) -> IdentifyOutcome;
    fn identify_from_text(&self, description: &str) -> IdentifyOutcome;
    fn generate_illustrative_image(&self, species_name: &str) -> Result<ImageData, IdentifyError>;
    fn find_similar_species(
        &self,
        report: &IdentificationReport,
    ) -> Result<Vec<SimilarSpeciesEntry>, IdentifyError>;
}

pub struct IdentificationClient<T: ModelTransport> {
    transport: T,
    text_model: ModelSelection,
    image_model: ModelSelection,
    timeout_s: u64,
}

impl<T: ModelTransport> IdentificationClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Result<Self, SelectionError> {
        Self::with_selector(transport, config, &ModelSelector::default())
    }

    pub fn with_selector(
        transport: T,
        config: &ClientConfig,
        selector: &ModelSelector,
    ) -> Result<Self, SelectionError> {
        let text_model =
            selector.select(config.text_model.as_deref(), &IDENTIFICATION_CAPABILITIES)?;
        let image_model =
            selector.select(config.image_model.as_deref(), &ILLUSTRATION_CAPABILITIES)?;
        Ok(Self {
            transport,
            text_model,
            image_model,
            timeout_s: config.request_timeout().as_secs_f64().ceil() as u64,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn text_model(&self) -> &ModelSelection {
        &self.text_model
    }

    pub fn image_model(&self) -> &ModelSelection {
        &self.image_model
    }

    fn call(&self, request: GenerateRequest) -> Result<GenerateResponse, IdentifyError> {
        let response = self
            .transport
            .generate(&request)
            .map_err(|err| classify_transport_error(&err, self.timeout_s))?;
        if let Some(reason) = blocked_reason(&response) {
            return Err(IdentifyError::NetworkOrPlatform(format!(
                "Модель відхилила запит ({reason})."
            )));
        }
        Ok(response)
    }

    fn structured_request(&self, parts: Vec<RequestPart>, schema: Value) -> GenerateRequest {
        GenerateRequest {
            model: self.text_model.model.name.clone(),
            parts,
            output: OutputMode::Json { schema },
        }
    }
}

impl<T: ModelTransport> Identifier for IdentificationClient<T> {
    fn identify_from_image(&self, image: &ImageData, hint: Option<&str>) -> IdentifyOutcome {
        let request = self.structured_request(
            vec![
                RequestPart::InlineImage(image.clone()),
                RequestPart::Text(image_identification_prompt(hint)),
            ],
            identification_schema(),
        );
        self.call(request)
            .and_then(|response| parse_identification(response.text.as_deref()))
            .into()
    }

    fn identify_from_text(&self, description: &str) -> IdentifyOutcome {
        let request = self.structured_request(
            vec![RequestPart::Text(text_identification_prompt(description))],
            identification_schema(),
        );
        self.call(request)
            .and_then(|response| parse_identification(response.text.as_deref()))
            .into()
    }

    fn generate_illustrative_image(&self, species_name: &str) -> Result<ImageData, IdentifyError> {
        let request = GenerateRequest {
            model: self.image_model.model.name.clone(),
            parts: vec![RequestPart::Text(illustration_prompt(species_name))],
            output: OutputMode::Image,
        };
        self.call(request)?
            .images
            .into_iter()
            .find(|image| !image.is_empty())
            .ok_or(IdentifyError::NoImageReturned)
    }

    fn find_similar_species(
        &self,
        report: &IdentificationReport,
    ) -> Result<Vec<SimilarSpeciesEntry>, IdentifyError> {
        let request = self.structured_request(
            vec![RequestPart::Text(similar_species_prompt(report))],
            similar_species_schema(),
        );
        let response = self.call(request)?;
        parse_similar_species(response.text.as_deref())
    }
}

/// Finish reason of a reply that came back with nothing because generation stopped early.
fn blocked_reason(response: &GenerateResponse) -> Option<&str> {
    if response.text.is_some() || !response.images.is_empty() {
        return None;
    }
    response
        .finish_reason
        .as_deref()
        .filter(|reason| !matches!(*reason, "STOP" | "MAX_TOKENS" | "FINISH_REASON_UNSPECIFIED"))
}

fn parse_envelope(text: Option<&str>) -> Result<serde_json::Map<String, Value>, IdentifyError> {
    let text = text
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(IdentifyError::EmptyResponse)?;
    let value: Value = serde_json::from_str(text)
        .map_err(|err| IdentifyError::malformed(format!("invalid JSON ({err})")))?;
    match value {
        Value::Object(envelope) => Ok(envelope),
        _ => Err(IdentifyError::malformed("expected a JSON object")),
    }
}

/// Decides the outcome of an identification response.
///
/// `status = not_recognized` is the only path to [`IdentifyOutcome::NotRecognized`];
/// a missing status with a well-formed payload counts as identified.
pub fn parse_identification(text: Option<&str>) -> Result<IdentifyOutcome, IdentifyError> {
    let mut envelope = parse_envelope(text)?;
    match envelope.get(STATUS_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::String(status)) if status == STATUS_IDENTIFIED => {}
        Some(Value::String(status)) if status == STATUS_NOT_RECOGNIZED => {
            return Ok(IdentifyOutcome::NotRecognized);
        }
        Some(other) => {
            return Err(IdentifyError::malformed(format!("unknown status {other}")));
        }
    }
    let payload = envelope
        .remove(IDENTIFICATION_KEY)
        .filter(|value| !value.is_null())
        .ok_or_else(|| IdentifyError::malformed(format!("missing `{IDENTIFICATION_KEY}`")))?;
    let report: IdentificationReport =
        serde_json::from_value(payload).map_err(IdentifyError::malformed)?;
    report.validate().map_err(IdentifyError::malformed)?;
    Ok(IdentifyOutcome::Identified(report))
}

pub fn parse_similar_species(text: Option<&str>) -> Result<Vec<SimilarSpeciesEntry>, IdentifyError> {
    let mut envelope = parse_envelope(text)?;
    let payload = envelope
        .remove(SIMILAR_KEY)
        .ok_or_else(|| IdentifyError::malformed(format!("missing `{SIMILAR_KEY}`")))?;
    if !payload.is_array() {
        return Err(IdentifyError::malformed(format!("`{SIMILAR_KEY}` is not an array")));
    }
    let entries: Vec<SimilarSpeciesEntry> =
        serde_json::from_value(payload).map_err(IdentifyError::malformed)?;
    validate_similar_species(&entries).map_err(IdentifyError::malformed)?;
    Ok(entries)
}
