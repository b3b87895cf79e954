//! Template file watcher for development reloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::template::{SharedTemplate, TemplateRepresentative};

/// Re-parses the template when its file changes and swaps it in place.
pub struct TemplateWatcher {
    path: PathBuf,
    selector: String,
    template: SharedTemplate,
}

impl TemplateWatcher {
    pub fn new(path: &Path, selector: impl Into<String>, template: SharedTemplate) -> Self {
        Self {
            path: path.to_path_buf(),
            selector: selector.into(),
            template,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for reloads to happen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let selector = self.selector.clone();
        let template = self.template.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Template change detected, reloading...");
                        reload(&path, &selector, &template);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Template watcher started");
        Ok(watcher)
    }
}

/// Reload the template, keeping the current one if the new file is invalid.
pub fn reload(path: &Path, selector: &str, template: &SharedTemplate) -> bool {
    match TemplateRepresentative::load(path, selector) {
        Ok(fresh) => {
            template.store(Arc::new(fresh));
            true
        }
        Err(e) => {
            tracing::error!("Failed to reload template: {}. Keeping current template.", e);
            false
        }
    }
}
