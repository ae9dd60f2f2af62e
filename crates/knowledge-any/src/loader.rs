// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML tag registration.
//!
//! Lets deployments declare their application tags next to the rest of
//! their configuration instead of in code.
//!
//! # Example YAML
//!
//! ```yaml
//! # knowledge_types.yaml
//! tags:
//!   readings: seq<float64>
//!   labels: map<string>
//!   station_id: uint16
//!
//! aliases:
//!   temps: dblvec
//!   samples: readings
//! ```
//!
//! Object kinds cannot be declared here; their adapters must be registered
//! in code with [`TypeRegistry::register_adapter`].

use crate::error::AnyError;
use crate::kind::Kind;
use crate::registry::{TypeRegistry, TypeTag};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from loading or applying a tag document.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read tag file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("registration failed: {0}")]
    Registry(#[from] AnyError),
}

/// Root document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagDocument {
    /// Tag name -> kind grammar.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Tag name -> existing tag name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// YAML tag loader.
pub struct RegistryLoader;

impl RegistryLoader {
    /// Load a tag document from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<TagDocument, LoaderError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a tag document from a string.
    pub fn parse_yaml(yaml_content: &str) -> Result<TagDocument, LoaderError> {
        Ok(serde_yaml::from_str(yaml_content)?)
    }

    /// Register every tag, then every alias, in name order.
    ///
    /// All or nothing: on error `registry` is left as it was.
    pub fn apply(
        doc: &TagDocument,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<TypeTag>, LoaderError> {
        let mut staged = registry.clone();
        let mut added = Vec::with_capacity(doc.tags.len() + doc.aliases.len());

        for (name, spec) in &doc.tags {
            let kind: Kind = spec.parse()?;
            added.push(staged.register(name, kind)?);
        }
        for (name, existing) in &doc.aliases {
            added.push(staged.alias(name, existing)?);
        }

        log::debug!("[TypeRegistry] loaded {} tags from YAML", added.len());
        *registry = staged;
        Ok(added)
    }

    /// Read `path` and apply it to `registry`.
    pub fn load_into<P: AsRef<Path>>(
        path: P,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<TypeTag>, LoaderError> {
        let doc = Self::load_from_file(path)?;
        Self::apply(&doc, registry)
    }
}
