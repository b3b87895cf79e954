//! Client hydration: recover the props the server rendered with and mount
//! the component over the server markup.

use std::sync::Arc;

use crate::codec::{PropCodec, DEFAULT_SECRET_SALT, PROPS_GLOBAL};
use crate::client::document::HostDocument;
use crate::error::{BoxError, HydrateError};
use crate::template::Selector;
use crate::Props;

/// A component mountable in a host document.
pub trait ClientComponent: Send + Sync + 'static {
    fn mount(&self, document: &mut dyn HostDocument, target: &Selector, props: &Props) -> Result<(), BoxError>;
}

impl<F> ClientComponent for F
where
    F: Fn(&mut dyn HostDocument, &Selector, &Props) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn mount(&self, document: &mut dyn HostDocument, target: &Selector, props: &Props) -> Result<(), BoxError> {
        self(document, target, props)
    }
}

/// Options for [`hydrate`]. Required: component and target.
#[derive(Default, Clone)]
pub struct HydrateOptions {
    pub component: Option<Arc<dyn ClientComponent>>,
    pub target: Option<String>,
    /// Overlaid on the server props.
    pub props: Option<Props>,
    pub secret_salt: Option<String>,
    /// Keep the server's `path` and `query` in the mounted props.
    pub include_server_location: bool,
}

impl HydrateOptions {
    pub fn new(component: impl ClientComponent, target: impl Into<String>) -> Self {
        Self {
            component: Some(Arc::new(component)),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    pub fn secret_salt(mut self, secret: impl Into<String>) -> Self {
        self.secret_salt = Some(secret.into());
        self
    }

    pub fn include_server_location(mut self, include: bool) -> Self {
        self.include_server_location = include;
        self
    }
}

/// Server props embedded in `document`, or empty when absent or undecodable.
fn server_props(document: &dyn HostDocument, secret: &str) -> Props {
    let Some(payload) = document.global(PROPS_GLOBAL) else {
        return Props::new();
    };
    match PropCodec::new(secret).and_then(|codec| codec.decode(&payload)) {
        Ok(props) => props,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring server props");
            Props::new()
        }
    }
}

/// Mount `options.component` into `options.target`, returning the props it
/// was mounted with.
pub fn hydrate(document: &mut dyn HostDocument, options: HydrateOptions) -> Result<Props, HydrateError> {
    let component = options.component.ok_or(HydrateError::Configuration("component"))?;
    let target = options
        .target
        .filter(|t| !t.trim().is_empty())
        .ok_or(HydrateError::Configuration("target"))?;
    let selector = Selector::parse(&target).map_err(|_| HydrateError::InvalidSelector(target.clone()))?;
    if !document.contains(&selector) {
        return Err(HydrateError::TargetNotFound(target));
    }

    let secret = options
        .secret_salt
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SECRET_SALT.to_string());
    let mut props = server_props(document, &secret);
    if let Some(overlay) = options.props {
        props.extend(overlay);
    }
    if !options.include_server_location {
        props.remove("path");
        props.remove("query");
    }

    document.clear(&selector);
    component
        .mount(document, &selector, &props)
        .map_err(HydrateError::Mount)?;
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HtmlDocument;
    use crate::codec;
    use serde_json::json;

    const SECRET: &str = "hydrate-secret";

    fn page(props: serde_json::Value) -> HtmlDocument {
        let props = props.as_object().cloned().unwrap_or_default();
        let payload = codec::encode(&props, SECRET).unwrap();
        HtmlDocument::new(format!(
            "<html><head>{}</head><body><div id=\"app\"><h1>server</h1></div></body></html>",
            codec::props_script(&payload)
        ))
    }

    fn greeting(document: &mut dyn HostDocument, target: &Selector, props: &Props) -> Result<(), BoxError> {
        let name = props.get("name").and_then(|v| v.as_str()).unwrap_or("nobody");
        document.set_inner(target, &format!("<h1>{}</h1>", name));
        Ok(())
    }

    #[test]
    fn test_mounts_with_server_props() {
        let mut document = page(json!({"path": "/x", "query": {}, "name": "ada"}));
        let props = hydrate(
            &mut document,
            HydrateOptions::new(greeting, "#app").secret_salt(SECRET),
        )
        .unwrap();

        assert_eq!(props.get("name"), Some(&json!("ada")));
        assert!(props.get("path").is_none());
        assert!(props.get("query").is_none());
        let app = Selector::parse("#app").unwrap();
        assert_eq!(document.inner_html(&app), Some("<h1>ada</h1>"));
    }

    #[test]
    fn test_caller_props_win_and_location_kept() {
        let mut document = page(json!({"path": "/x", "name": "ada"}));
        let overlay = json!({"name": "grace"}).as_object().cloned().unwrap();
        let props = hydrate(
            &mut document,
            HydrateOptions::new(greeting, "#app")
                .secret_salt(SECRET)
                .props(overlay)
                .include_server_location(true),
        )
        .unwrap();

        assert_eq!(props.get("name"), Some(&json!("grace")));
        assert_eq!(props.get("path"), Some(&json!("/x")));
    }

    #[test]
    fn test_wrong_secret_falls_back_to_empty() {
        let mut document = page(json!({"name": "ada"}));
        let props = hydrate(
            &mut document,
            HydrateOptions::new(greeting, "#app").secret_salt("other"),
        )
        .unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn test_no_payload_starts_empty() {
        let mut document = HtmlDocument::new("<div id=\"app\">stale</div>");
        let props = hydrate(&mut document, HydrateOptions::new(greeting, "#app")).unwrap();
        assert!(props.is_empty());
        assert_eq!(document.html(), "<div id=\"app\"><h1>nobody</h1></div>");
    }

    #[test]
    fn test_idempotent_remount() {
        let mut document = page(json!({"name": "ada"}));
        let options = HydrateOptions::new(greeting, "#app").secret_salt(SECRET);

        let first = hydrate(&mut document, options.clone()).unwrap();
        let html = document.html().to_string();
        let second = hydrate(&mut document, options).unwrap();

        assert_eq!(first, second);
        assert_eq!(document.html(), html);
    }

    #[test]
    fn test_configuration_errors() {
        let mut document = page(json!({}));
        assert!(matches!(
            hydrate(&mut document, HydrateOptions::default()),
            Err(HydrateError::Configuration("component"))
        ));

        let options = HydrateOptions {
            target: None,
            ..HydrateOptions::new(greeting, "#app")
        };
        assert!(matches!(
            hydrate(&mut document, options),
            Err(HydrateError::Configuration("target"))
        ));

        assert!(matches!(
            hydrate(&mut document, HydrateOptions::new(greeting, "#missing")),
            Err(HydrateError::TargetNotFound(_))
        ));
    }
}
