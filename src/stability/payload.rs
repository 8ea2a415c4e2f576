use crate::{
    config::{EndpointRouting, StabilityConfig},
    models::{GenerationRequest, Model, ModelFamily},
};
use serde_json::{Map, Value};

pub const IMAGE_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct ImagePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// One fully resolved outbound call.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub url: String,
    pub api_key: String,
    pub accept: &'static str,
    /// Text parts, in the order they are sent.
    pub fields: Vec<(&'static str, String)>,
    /// Same fields as `fields`, sent as the JSON `data` part.
    pub metadata: Value,
    pub image: Option<ImagePart>,
}

impl ApiCall {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

pub fn endpoint_for(model: Model, routing: EndpointRouting) -> &'static str {
    match routing {
        EndpointRouting::Generic => ModelFamily::Sd3.endpoint(),
        EndpointRouting::ByModel => model.family().endpoint(),
    }
}

#[derive(Default)]
struct Fields {
    text: Vec<(&'static str, String)>,
    json: Map<String, Value>,
}

impl Fields {
    fn push(&mut self, name: &'static str, value: impl Into<Value>) {
        let value = value.into();
        let text = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.text.push((name, text));
        self.json.insert(name.to_string(), value);
    }
}

/// Applies the field inclusion policy: image-to-image with an image sends
/// `strength` and the image part, anything else sends `aspect_ratio`.
pub fn build_call(config: &StabilityConfig, request: &GenerationRequest) -> ApiCall {
    let mut fields = Fields::default();

    fields.push("prompt", request.prompt.as_str());
    fields.push("negative_prompt", request.negative_prompt.as_str());
    fields.push("mode", request.mode.as_str());
    fields.push("seed", request.seed);
    fields.push("output_format", request.output_format.as_str());
    fields.push("model", request.model.as_str());

    let image = match request.image_input() {
        Some(source) => {
            fields.push("strength", request.strength());
            Some(ImagePart {
                file_name: source.file_name.clone(),
                bytes: source.bytes.clone(),
                content_type: IMAGE_CONTENT_TYPE,
            })
        }
        None => {
            fields.push("aspect_ratio", request.aspect_ratio.as_str());
            None
        }
    };

    let endpoint = endpoint_for(request.model, config.routing);

    ApiCall {
        url: format!("{}/{}", config.base_url.trim_end_matches('/'), endpoint),
        api_key: config.api_key.clone(),
        accept: request.output_format.accept(),
        fields: fields.text,
        metadata: Value::Object(fields.json),
        image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, GenerationMode, OutputFormat, SourceImage};
    use serde_json::json;

    fn config(routing: EndpointRouting) -> StabilityConfig {
        StabilityConfig::new()
            .with_api_key("sk-test")
            .with_base_url("https://api.example.test/generate/")
            .with_routing(routing)
    }

    #[test]
    fn test_text_to_image_sends_aspect_ratio() {
        let request = GenerationRequest::new("a lighthouse at dusk")
            .with_aspect_ratio(AspectRatio::Widescreen)
            .with_strength(0.8)
            .with_source_image(SourceImage::new("ignored.png", vec![0u8; 4]));

        let call = build_call(&config(EndpointRouting::ByModel), &request);

        assert_eq!(call.field("aspect_ratio"), Some("16:9"));
        assert!(!call.has_field("strength"));
        assert!(call.image.is_none());
        assert_eq!(call.metadata["aspect_ratio"], json!("16:9"));
        assert!(call.metadata.get("strength").is_none());
    }

    #[test]
    fn test_image_to_image_sends_strength_and_image() {
        let request = GenerationRequest::new("make it snow")
            .with_mode(GenerationMode::ImageToImage)
            .with_strength(0.25)
            .with_source_image(SourceImage::new("house.jpg", vec![7, 8, 9]));

        let call = build_call(&config(EndpointRouting::ByModel), &request);

        assert_eq!(call.field("strength"), Some("0.25"));
        assert!(!call.has_field("aspect_ratio"));
        let image = call.image.expect("image part");
        assert_eq!(image.file_name, "house.jpg");
        assert_eq!(image.bytes, vec![7, 8, 9]);
        assert_eq!(image.content_type, IMAGE_CONTENT_TYPE);
        assert_eq!(call.metadata["strength"], json!(0.25));
    }

    #[test]
    fn test_image_to_image_without_image_falls_back() {
        let request = GenerationRequest::new("no upload").with_mode(GenerationMode::ImageToImage);

        let call = build_call(&config(EndpointRouting::ByModel), &request);

        assert_eq!(call.field("aspect_ratio"), Some("1:1"));
        assert!(!call.has_field("strength"));
        assert!(call.image.is_none());
        assert_eq!(call.field("mode"), Some("image-to-image"));
    }

    #[test]
    fn test_strength_sent_in_range() {
        for (requested, sent) in [(f64::NAN, "0.5"), (3.0, "1.0"), (-1.0, "0.0")] {
            let request = GenerationRequest::new("p")
                .with_mode(GenerationMode::ImageToImage)
                .with_strength(requested)
                .with_source_image(SourceImage::new("in.png", vec![1]));

            let call = build_call(&config(EndpointRouting::ByModel), &request);

            assert_eq!(call.field("strength"), Some(sent));
            assert!(call.metadata["strength"].is_number());
        }
    }

    #[test]
    fn test_common_fields_always_present() {
        let request = GenerationRequest::new("p")
            .with_negative_prompt("blurry")
            .with_seed(42)
            .with_model(Model::Sd3Turbo)
            .with_output_format(OutputFormat::Png);

        let call = build_call(&config(EndpointRouting::ByModel), &request);

        assert_eq!(call.field("prompt"), Some("p"));
        assert_eq!(call.field("negative_prompt"), Some("blurry"));
        assert_eq!(call.field("seed"), Some("42"));
        assert_eq!(call.field("output_format"), Some("png"));
        assert_eq!(call.field("model"), Some("sd3-turbo"));
        assert_eq!(call.metadata["seed"], json!(42));
        assert_eq!(call.api_key, "sk-test");
    }

    #[test]
    fn test_accept_negotiation() {
        let cfg = config(EndpointRouting::ByModel);
        for (format, accept) in [
            (OutputFormat::Jpeg, "image/*"),
            (OutputFormat::Png, "image/*"),
            (OutputFormat::Json, "application/json"),
        ] {
            let call = build_call(&cfg, &GenerationRequest::new("p").with_output_format(format));
            assert_eq!(call.accept, accept);
        }
    }

    #[test]
    fn test_routing_by_model() {
        let cfg = config(EndpointRouting::ByModel);

        let core = build_call(&cfg, &GenerationRequest::new("p").with_model(Model::Core));
        assert_eq!(core.url, "https://api.example.test/generate/core");

        for model in [Model::Sd3, Model::Sd3Turbo, Model::Sd3Large] {
            let call = build_call(&cfg, &GenerationRequest::new("p").with_model(model));
            assert!(call.url.ends_with("/sd3"), "{} routed to {}", model, call.url);
        }
    }

    #[test]
    fn test_generic_routing_ignores_model() {
        assert_eq!(endpoint_for(Model::Core, EndpointRouting::Generic), "sd3");
        assert_eq!(endpoint_for(Model::Sd3Turbo, EndpointRouting::Generic), "sd3");
        assert_eq!(endpoint_for(Model::Core, EndpointRouting::ByModel), "core");
    }
}
