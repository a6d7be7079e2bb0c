//! Shader configuration file parsing
//!
//! The configuration is a JSON object mapping shader names to descriptors:
//!
//! ```json
//! {
//!     "example_ps": {
//!         "version": "ps_3_0",
//!         "centroid": 0,
//!         "files": ["example_ps.fxc"],
//!         "static": [{ "name": "HDR", "minVal": 0, "maxVal": 1 }],
//!         "dynamic": [{ "name": "FOG", "minVal": 0, "maxVal": 1 }],
//!         "skip": "$HDR && $FOG"
//!     }
//! }
//! ```
//!
//! Deserialization goes through a `BTreeMap`, so shaders are processed in
//! name order. Dynamic defines enter a shader's generator before static
//! ones; the resulting slot order is what the mixed-radix command encoding
//! keys off, so it must not be reshuffled after load.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::define::Define;
use crate::entry::{CfgEntry, CfgEntryInfo};
use crate::error::ConfigError;
use crate::expr::Expression;
use crate::generator::ComboGenerator;

/// One shader's descriptor in the configuration file.
#[derive(Debug, Deserialize)]
pub struct ShaderDescriptor {
    /// Shader target version, e.g. "ps_3_0"
    pub version: String,
    /// Centroid interpolation mask
    #[serde(default)]
    pub centroid: i32,
    /// Source files; the first is the shader itself, the rest are includes
    #[serde(default)]
    pub files: Vec<String>,
    /// Static defines (reporting split only; enumeration ignores the flag)
    #[serde(default, rename = "static")]
    pub static_defines: Vec<DefineDescriptor>,
    /// Dynamic defines; these occupy the low mixed-radix slots
    #[serde(default, rename = "dynamic")]
    pub dynamic_defines: Vec<DefineDescriptor>,
    /// Skip expression; combos it evaluates true for are not compiled
    #[serde(default)]
    pub skip: String,
}

/// One define declaration in the configuration file.
#[derive(Debug, Deserialize)]
pub struct DefineDescriptor {
    pub name: String,
    #[serde(rename = "minVal")]
    pub min_val: i32,
    #[serde(rename = "maxVal")]
    pub max_val: i32,
}

/// Parse the configuration file at `path` into entries, one per shader, in
/// name order. Command-axis ranges are not assigned here; the catalog does
/// that after sorting.
pub(crate) fn load_entries(path: &Path) -> Result<Vec<CfgEntry>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let shaders: BTreeMap<String, ShaderDescriptor> =
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

    let mut entries = Vec::with_capacity(shaders.len());
    let mut used_files = BTreeSet::new();

    for (name, descriptor) in &shaders {
        entries.push(build_entry(name, descriptor)?);
        used_files.extend(descriptor.files.iter().cloned());
    }

    // The shader sources themselves are compiled elsewhere; a missing file
    // is worth a warning but never aborts the load.
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for file in &used_files {
        let resolved = if Path::new(file).is_absolute() {
            Path::new(file).to_owned()
        } else {
            base_dir.join(file)
        };
        if !resolved.exists() {
            warn!("Can't find shader source file: {}", resolved.display());
        }
    }

    Ok(entries)
}

fn build_entry(name: &str, descriptor: &ShaderDescriptor) -> Result<CfgEntry, ConfigError> {
    let mut generator = ComboGenerator::new();
    for define in &descriptor.dynamic_defines {
        add_define(&mut generator, name, define, false)?;
    }
    for define in &descriptor.static_defines {
        add_define(&mut generator, name, define, true)?;
    }

    let skip = Expression::parse(&descriptor.skip, &generator);

    let shader_src = descriptor.files.first().map(String::as_str).unwrap_or("");
    let num_combos = generator.num_combos();
    let info = CfgEntryInfo {
        name: Arc::from(name),
        shader_file_name: Arc::from(shader_src),
        shader_version: Arc::from(descriptor.version.as_str()),
        centroid_mask: descriptor.centroid,
        num_combos,
        num_static_combos: generator.num_combos_of(true),
        num_dynamic_combos: generator.num_combos_of(false),
        command_start: 0,
        command_end: num_combos,
    };

    Ok(CfgEntry::new(generator, skip, info))
}

fn add_define(
    generator: &mut ComboGenerator,
    shader: &str,
    descriptor: &DefineDescriptor,
    is_static: bool,
) -> Result<(), ConfigError> {
    if descriptor.min_val > descriptor.max_val {
        return Err(ConfigError::InvalidDefineRange {
            shader: shader.to_owned(),
            define: descriptor.name.clone(),
            min: descriptor.min_val,
            max: descriptor.max_val,
        });
    }
    let define = Define::new(
        descriptor.name.as_str(),
        descriptor.min_val,
        descriptor.max_val,
        is_static,
    );
    if generator.add_define(define).is_none() {
        return Err(ConfigError::DuplicateDefine {
            shader: shader.to_owned(),
            define: descriptor.name.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_shaders(json: &str) -> BTreeMap<String, ShaderDescriptor> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_descriptor_minimal() {
        let shaders = parse_shaders(r#"{ "bare_ps": { "version": "ps_2_0" } }"#);
        let bare = &shaders["bare_ps"];
        assert_eq!(bare.version, "ps_2_0");
        assert_eq!(bare.centroid, 0);
        assert!(bare.files.is_empty());
        assert!(bare.static_defines.is_empty());
        assert!(bare.dynamic_defines.is_empty());
        assert!(bare.skip.is_empty());
    }

    #[test]
    fn test_descriptor_full() {
        let shaders = parse_shaders(
            r#"{
                "water_ps": {
                    "version": "ps_3_0",
                    "centroid": 3,
                    "files": ["water_ps.fxc", "common.h"],
                    "static": [{ "name": "HDR", "minVal": 0, "maxVal": 1 }],
                    "dynamic": [{ "name": "FOG", "minVal": 1, "maxVal": 2 }],
                    "skip": "$HDR && $FOG"
                }
            }"#,
        );
        let water = &shaders["water_ps"];
        assert_eq!(water.centroid, 3);
        assert_eq!(water.files, ["water_ps.fxc", "common.h"]);
        assert_eq!(water.static_defines[0].name, "HDR");
        assert_eq!(water.dynamic_defines[0].min_val, 1);
        assert_eq!(water.dynamic_defines[0].max_val, 2);
        assert_eq!(water.skip, "$HDR && $FOG");
    }

    #[test]
    fn test_dynamic_defines_take_low_slots() {
        let shaders = parse_shaders(
            r#"{
                "s": {
                    "version": "ps_2_0",
                    "static": [{ "name": "S", "minVal": 0, "maxVal": 1 }],
                    "dynamic": [{ "name": "D", "minVal": 0, "maxVal": 1 }]
                }
            }"#,
        );
        let entry = build_entry("s", &shaders["s"]).unwrap();
        assert_eq!(entry.generator().slot_of("D"), 0);
        assert_eq!(entry.generator().slot_of("S"), 1);
        assert_eq!(entry.info().num_static_combos, 2);
        assert_eq!(entry.info().num_dynamic_combos, 2);
        assert_eq!(entry.info().num_combos, 4);
    }

    #[test]
    fn test_duplicate_define_is_an_error() {
        let shaders = parse_shaders(
            r#"{
                "s": {
                    "version": "ps_2_0",
                    "static": [{ "name": "X", "minVal": 0, "maxVal": 1 }],
                    "dynamic": [{ "name": "X", "minVal": 0, "maxVal": 1 }]
                }
            }"#,
        );
        let err = build_entry("s", &shaders["s"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateDefine { ref shader, ref define }
                if shader == "s" && define == "X"
        ));
    }

    #[test]
    fn test_inverted_range_is_an_error() {
        let shaders = parse_shaders(
            r#"{
                "s": {
                    "version": "ps_2_0",
                    "dynamic": [{ "name": "X", "minVal": 2, "maxVal": 1 }]
                }
            }"#,
        );
        let err = build_entry("s", &shaders["s"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefineRange { min: 2, max: 1, .. }));
    }
}
