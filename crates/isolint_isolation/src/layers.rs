use anyhow::Result;
use globset::GlobSet;
use isolint_core::compile_globs;
use log::trace;
use std::path::Path;

use crate::{config::LayerPatterns, types::Layer};

/// Maps root-relative paths to architectural layers.
#[derive(Debug, Clone)]
pub struct LayerClassifier {
    sets: Vec<(Layer, GlobSet)>,
}

impl LayerClassifier {
    pub fn new(patterns: &LayerPatterns) -> Result<Self> {
        let mut sets = Vec::with_capacity(Layer::ALL.len());
        for layer in Layer::ALL {
            let globs = match layer {
                Layer::Presentation => &patterns.presentation,
                Layer::Application => &patterns.application,
                Layer::Domain => &patterns.domain,
                Layer::Infrastructure => &patterns.infrastructure,
            };
            sets.push((layer, compile_globs(globs)?));
        }
        Ok(Self { sets })
    }

    /// First matching layer in priority order, or `None` when unclassified.
    pub fn classify(&self, relative: &Path) -> Option<Layer> {
        let layer = self.sets.iter().find(|(_, set)| set.is_match(relative)).map(|(l, _)| *l);
        trace!("Classified {} as {:?}", relative.display(), layer);
        layer
    }
}
